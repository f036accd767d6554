// The tessellated quad the texture is stretched over.
// A grid is rebuilt from scratch whenever its size or the deformation mode
// changes; deformations only ever move `position`, never the indices.

use crate::deform;
use crate::types::{DeformMode, Grid, GridVertex};
use glam::{Vec2, Vec3};

impl Grid {
    /// Build the undeformed `width x height` lattice centered on the origin.
    ///
    /// Vertex `(u, v)` sits at `(u - width/2 + du, v - height/2 + dv)` where
    /// `du`/`dv` are 0.5 for even sides, so both parities are centered.
    /// Every interior cell contributes two triangles:
    /// `[idx, idx+1, idx+width+1]` and `[idx, idx+width, idx+width+1]`.
    pub fn generate(width: usize, height: usize) -> Self {
        let offset_u = (width / 2) as f32;
        let offset_v = (height / 2) as f32;
        let du = if width % 2 == 0 { 0.5 } else { 0.0 };
        let dv = if height % 2 == 0 { 0.5 } else { 0.0 };
        // A 1-wide side would divide by zero; it never happens through
        // grid_size_for, but keep the coordinates finite anyway.
        let u_span = (width.max(2) - 1) as f32;
        let v_span = (height.max(2) - 1) as f32;

        let mut vertices = Vec::with_capacity(width * height);
        let mut indices = Vec::with_capacity(6 * width.saturating_sub(1) * height.saturating_sub(1));

        for v in 0..height {
            for u in 0..width {
                vertices.push(GridVertex {
                    position: Vec3::new(
                        u as f32 - offset_u + du,
                        v as f32 - offset_v + dv,
                        0.0,
                    ),
                    tex_coord: Vec2::new(u as f32 / u_span, v as f32 / v_span),
                });

                if u + 1 < width && v + 1 < height {
                    let idx = (u + v * width) as u32;
                    let w = width as u32;
                    indices.extend_from_slice(&[idx, idx + 1, idx + w + 1]);
                    indices.extend_from_slice(&[idx, idx + w, idx + w + 1]);
                }
            }
        }

        Grid { width, height, vertices, indices }
    }

    /// Move every vertex according to `mode` around `center` (mesh-local).
    pub fn apply_deformation(&mut self, center: Vec3, mode: DeformMode) {
        let aspect = self.width as f32 / self.height.max(1) as f32;
        deform::apply(&mut self.vertices, center, mode, aspect);
    }

    /// Half extents a click must stay strictly inside to hit the lattice.
    pub fn click_limits(&self) -> (f32, f32) {
        (
            0.5 * self.width as f32 - 0.5,
            0.5 * self.height as f32 - 0.5,
        )
    }

    /// True when a mapped click lies inside the lattice's outermost vertices.
    pub fn contains(&self, local: Vec3) -> bool {
        let (max_x, max_y) = self.click_limits();
        local.x.abs() < max_x && local.y.abs() < max_y
    }
}

/// Grid dimensions for a texture: its pixel size, scaled down (aspect kept)
/// until the longer side fits `max_side`, never below 2 per side.
pub fn grid_size_for(tex_width: u32, tex_height: u32, max_side: usize) -> (usize, usize) {
    let (w, h) = (tex_width.max(1) as f32, tex_height.max(1) as f32);
    let longest = w.max(h);
    let limit = max_side.max(2) as f32;
    let scale = if longest > limit { limit / longest } else { 1.0 };
    let gw = (w * scale).round() as usize;
    let gh = (h * scale).round() as usize;
    (gw.max(2), gh.max(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_and_index_counts() {
        for (w, h) in [(2, 2), (3, 5), (4, 4), (17, 9), (128, 128)] {
            let g = Grid::generate(w, h);
            assert_eq!(g.vertices.len(), w * h);
            assert_eq!(g.indices.len(), 6 * (w - 1) * (h - 1));
        }
    }

    #[test]
    fn indices_stay_in_range() {
        let g = Grid::generate(7, 4);
        let n = (7 * 4) as u32;
        assert!(g.indices.iter().all(|&i| i < n));
    }

    #[test]
    fn first_cell_triangles() {
        let g = Grid::generate(3, 3);
        assert_eq!(&g.indices[..6], &[0, 1, 4, 0, 3, 4]);
    }

    #[test]
    fn odd_width_starts_at_half_span() {
        for w in [3usize, 5, 9, 127] {
            let g = Grid::generate(w, 3);
            assert_eq!(g.vertices[0].position.x, -((w - 1) as f32) / 2.0);
        }
    }

    #[test]
    fn even_width_is_centered() {
        for w in [2usize, 4, 10, 128] {
            let g = Grid::generate(w, 2);
            let first = g.vertices[0].position.x;
            let last = g.vertices[w - 1].position.x;
            assert_eq!(first, -(w as f32) / 2.0 + 0.5);
            assert_eq!(first, -last);
        }
    }

    #[test]
    fn tex_coords_span_unit_square() {
        let g = Grid::generate(4, 3);
        assert_eq!(g.vertices[0].tex_coord, Vec2::new(0.0, 0.0));
        assert_eq!(g.vertices[4 * 3 - 1].tex_coord, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn generate_ignores_previous_deformation() {
        let mut g = Grid::generate(5, 5);
        g.apply_deformation(Vec3::ZERO, DeformMode::SquashA);
        let fresh = Grid::generate(5, 5);
        assert_ne!(g.vertices, fresh.vertices);
        g = Grid::generate(5, 5);
        assert_eq!(g.vertices, fresh.vertices);
        assert_eq!(g.indices, fresh.indices);
    }

    #[test]
    fn click_bounds() {
        let g = Grid::generate(128, 64);
        assert!(g.contains(Vec3::new(63.4, 31.4, 0.0)));
        assert!(!g.contains(Vec3::new(63.5, 0.0, 0.0)));
        assert!(!g.contains(Vec3::new(0.0, -31.5, 0.0)));
    }

    #[test]
    fn grid_size_keeps_aspect_and_caps() {
        assert_eq!(grid_size_for(64, 32, 128), (64, 32));
        assert_eq!(grid_size_for(1024, 512, 128), (128, 64));
        assert_eq!(grid_size_for(1, 1000, 128), (2, 128));
    }
}
