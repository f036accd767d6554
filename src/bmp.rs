// Saves the visible (letterboxed) part of the frame as a .bmp.
// The 54-byte header is copied from a template bitmap and only patched,
// never built from scratch; pixel rows go bottom-up as BGR, unpadded.

use crate::error::Error;
use crate::types::FrameBuffer;
use log::info;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

pub const BMP_HEADER_LENGTH: usize = 54;
const SIZE_FIELD_OFFSET: usize = 0x12;

/// Window-pixel rectangle to capture; `y` counts from the bottom edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Region {
    /// The centered `W*width_ratio x H*height_ratio` box the mesh is drawn in.
    pub fn letterbox(fb_width: usize, fb_height: usize, width_ratio: f32, height_ratio: f32) -> Self {
        let width = ((fb_width as f32 * width_ratio) as usize).min(fb_width);
        let height = ((fb_height as f32 * height_ratio) as usize).min(fb_height);
        Self {
            x: (fb_width - width) / 2,
            y: (fb_height - height) / 2,
            width,
            height,
        }
    }
}

/// Read the first 54 bytes of the template bitmap.
pub fn read_template(path: &Path) -> Result<[u8; BMP_HEADER_LENGTH], Error> {
    let mut header = [0u8; BMP_HEADER_LENGTH];
    let mut file = fs::File::open(path)
        .map_err(|e| Error::TemplateRead { path: path.to_path_buf(), reason: e.to_string() })?;
    file.read_exact(&mut header)
        .map_err(|e| Error::TemplateRead { path: path.to_path_buf(), reason: e.to_string() })?;
    Ok(header)
}

/// Build the complete file image in memory.
///
/// The window height is written at 0x12 and then again straight after it
/// (0x16), so the header's width field also ends up holding the height.
/// Readers that trust the header only decode this correctly for square
/// captures of the full window height.
pub fn encode(header: &[u8; BMP_HEADER_LENGTH], fb: &FrameBuffer, region: Region) -> Result<Vec<u8>, Error> {
    if region.x + region.width > fb.width || region.y + region.height > fb.height {
        return Err(Error::InvalidSize(format!(
            "capture {region:?} outside {}x{} frame",
            fb.width, fb.height
        )));
    }

    let data_len = region.width * region.height * 3;
    let mut out = Vec::with_capacity(BMP_HEADER_LENGTH + data_len);
    out.extend_from_slice(header);

    let size = (fb.height as i32).to_le_bytes();
    out[SIZE_FIELD_OFFSET..SIZE_FIELD_OFFSET + 4].copy_from_slice(&size);
    out[SIZE_FIELD_OFFSET + 4..SIZE_FIELD_OFFSET + 8].copy_from_slice(&size);

    // Bottom-up: region row 0 is the lowest captured screen row.
    for r in 0..region.height {
        let screen_row = fb.height - 1 - (region.y + r);
        let start = screen_row * fb.width + region.x;
        for &px in &fb.pixels[start..start + region.width] {
            out.push((px & 0xFF) as u8);         // B
            out.push(((px >> 8) & 0xFF) as u8);  // G
            out.push(((px >> 16) & 0xFF) as u8); // R
        }
    }

    Ok(out)
}

/// Capture `region` of `fb` into `output`, using `template` for the header.
/// The file is written under a temporary name and renamed into place.
pub fn export(fb: &FrameBuffer, region: Region, template: &Path, output: &Path) -> Result<usize, Error> {
    let header = read_template(template)?;
    let bytes = encode(&header, fb, region)?;

    let tmp = tmp_path(output);
    let write_err = |e: std::io::Error| Error::ExportWrite { path: output.to_path_buf(), reason: e.to_string() };
    if let Err(e) = fs::write(&tmp, &bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(e));
    }
    fs::rename(&tmp, output).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        write_err(e)
    })?;

    info!(
        "Saved {}x{} capture to {} ({} bytes)",
        region.width,
        region.height,
        output.display(),
        bytes.len()
    );
    Ok(bytes.len())
}

fn tmp_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
