use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Interactive texture deformation on a tessellated grid
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// First texture (menu entry "TextureA")
    #[arg(long, default_value = "textureA.png")]
    pub texture_a: PathBuf,

    /// Second texture (menu entry "TextureB")
    #[arg(long, default_value = "textureB.jpeg")]
    pub texture_b: PathBuf,

    /// Bitmap whose 54-byte header is copied into every export
    #[arg(long, default_value = "sample.bmp")]
    pub template: PathBuf,

    /// Export path, also the file "Reload saved image file" reads back
    #[arg(long, default_value = "output.bmp")]
    pub output: PathBuf,

    /// Initial window width
    #[arg(long, default_value_t = 800)]
    pub width: usize,

    /// Initial window height
    #[arg(long, default_value_t = 600)]
    pub height: usize,

    /// Longest grid side; bigger textures get a proportionally smaller grid
    #[arg(long, default_value_t = 128, value_parser = clap::value_parser!(u32).range(2..=2048))]
    pub max_grid: u32,

    /// Milliseconds between repeated deformations while the button is held
    #[arg(long, default_value_t = 16)]
    pub tick_ms: u64,

    /// Start drawing the grid as lines instead of filled triangles
    #[arg(long)]
    pub wireframe: bool,
}

impl Config {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::parse_from(["mesh-warp"])
    }
}
