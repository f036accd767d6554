// Loads image files into packed 0x00RRGGBB texel buffers.
// Each Texture owns its pixels; replacing a slot drops the old buffer.

use crate::error::Error;
use image::RgbImage;
use log::info;
use std::path::{Path, PathBuf};

pub struct Texture {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    // Row 0 is the *bottom* image row, so v = 0 samples the bottom edge.
    texels: Vec<u32>,
}

impl Texture {
    /// Decode `path` (png/jpeg/bmp, anything `image` knows) into RGB texels.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let img = image::open(path)
            .map_err(|e| Error::TextureLoad { path: path.to_path_buf(), reason: e.to_string() })?
            .to_rgb8();
        let tex = Self::from_rgb(path, &img)?;
        info!("Loaded texture {} ({}x{})", path.display(), tex.width, tex.height);
        Ok(tex)
    }

    pub fn from_rgb(path: &Path, img: &RgbImage) -> Result<Self, Error> {
        let (w, h) = img.dimensions();
        if w == 0 || h == 0 {
            return Err(Error::TextureLoad {
                path: path.to_path_buf(),
                reason: format!("empty image {w}x{h}"),
            });
        }

        // Walk rows bottom-up and pack each RGB pixel as 0x00RRGGBB.
        let mut texels = Vec::with_capacity((w as usize) * (h as usize));
        for row in (0..h).rev() {
            for x in 0..w {
                let p = img.get_pixel(x, row);
                texels.push(((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32);
            }
        }

        Ok(Self { path: path.to_path_buf(), width: w, height: h, texels })
    }

    /// Nearest texel for a texture coordinate; out-of-range coordinates clamp.
    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> u32 {
        let x = (u.clamp(0.0, 1.0) * (self.width - 1) as f32).round() as usize;
        let y = (v.clamp(0.0, 1.0) * (self.height - 1) as f32).round() as usize;
        self.texels[y * self.width as usize + x]
    }
}

/// Which loaded texture is on the mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureSlot {
    A,
    B,
    Saved,
}

/// The three texture slots. A and B must exist; Saved appears after a reload.
pub struct Textures {
    pub a: Texture,
    pub b: Texture,
    pub saved: Option<Texture>,
}

impl Textures {
    pub fn get(&self, slot: TextureSlot) -> Option<&Texture> {
        match slot {
            TextureSlot::A => Some(&self.a),
            TextureSlot::B => Some(&self.b),
            TextureSlot::Saved => self.saved.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn two_rows() -> Texture {
        // top row red, bottom row blue
        let img = RgbImage::from_fn(2, 2, |_, y| if y == 0 { Rgb([255, 0, 0]) } else { Rgb([0, 0, 255]) });
        Texture::from_rgb(Path::new("mem"), &img).unwrap()
    }

    #[test]
    fn v_zero_is_bottom_row() {
        let t = two_rows();
        assert_eq!(t.sample(0.0, 0.0), 0x00_00_00_FF);
        assert_eq!(t.sample(1.0, 1.0), 0x00_FF_00_00);
    }

    #[test]
    fn sample_clamps() {
        let t = two_rows();
        assert_eq!(t.sample(-3.0, -1.0), t.sample(0.0, 0.0));
        assert_eq!(t.sample(7.0, 9.0), t.sample(1.0, 1.0));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = Texture::load(Path::new("/definitely/not/here.png")).err().unwrap();
        assert!(matches!(err, Error::TextureLoad { .. }));
    }

    #[test]
    fn saved_slot_empty_until_reloaded() {
        let textures = Textures { a: two_rows(), b: two_rows(), saved: None };
        assert!(textures.get(TextureSlot::A).is_some());
        assert!(textures.get(TextureSlot::Saved).is_none());
    }
}
