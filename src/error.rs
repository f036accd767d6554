// A tiny error type so we don't rely on anyhow/thiserror.
// Every variant states *where* things went wrong.
use std::fmt::{self, Display};
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    WindowInit(String),   // Creating the window failed
    WindowUpdate(String), // Pushing the frame to the window failed
    TextureLoad { path: PathBuf, reason: String },  // Decoding a texture file failed
    TemplateRead { path: PathBuf, reason: String }, // Bitmap header template missing/short
    ExportWrite { path: PathBuf, reason: String },  // Writing the exported bitmap failed
    InvalidSize(String),  // A zero or mismatched dimension reached a buffer routine
}

impl Display for Error {
    // This decides how the error is printed to your console.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::WindowInit(s) => write!(f, "Window init error: {s}"),
            Error::WindowUpdate(s) => write!(f, "Window update error: {s}"),
            Error::TextureLoad { path, reason } => {
                write!(f, "Texture load error ({}): {reason}", path.display())
            }
            Error::TemplateRead { path, reason } => {
                write!(f, "Bitmap template error ({}): {reason}", path.display())
            }
            Error::ExportWrite { path, reason } => {
                write!(f, "Bitmap export error ({}): {reason}", path.display())
            }
            Error::InvalidSize(s) => write!(f, "Invalid size: {s}"),
        }
    }
}

impl std::error::Error for Error {}
