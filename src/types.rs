// Core types shared by the grid, the deformations and the renderer.

use glam::{Vec2, Vec3};

#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    /// Reallocate for a new window size; contents become black.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, 0);
    }

    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color);
    }
}

/// One lattice point. `position` is deformed in place, `tex_coord` never changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridVertex {
    pub position: Vec3,  // mesh-local units (one unit = one grid cell)
    pub tex_coord: Vec2, // in [0,1], v = 0 is the bottom image row
}

/// Row-major lattice of `width * height` vertices plus the triangle index list.
#[derive(Clone, Debug, Default)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    pub vertices: Vec<GridVertex>,
    pub indices: Vec<u32>,
}

/// Which displacement formula a click applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DeformMode {
    #[default]
    SquashA, // push away from the center
    SquashB, // pull toward the center
    Swirl,   // rotate around the center
}

impl DeformMode {
    pub fn label(self) -> &'static str {
        match self {
            DeformMode::SquashA => "SquashA",
            DeformMode::SquashB => "SquashB",
            DeformMode::Swirl => "Swirl",
        }
    }
}

/// Mesh-local point under the held pointer; `None` whenever nothing should deform.
pub type DeformCenter = Option<Vec3>;
