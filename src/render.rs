// Software stand-in for the GPU path: transforms the grid with the view
// matrix and fills each triangle with nearest-sampled texels.

use crate::draw::draw_line;
use crate::mapper::{ndc_to_pixel, ViewTransform};
use crate::texture::Texture;
use crate::types::{FrameBuffer, Grid};
use glam::{Vec2, Vec3};

const CLEAR_COLOR: u32 = 0x00_00_00_00;

/// A vertex after the view transform: window pixels + NDC depth.
#[derive(Clone, Copy, Debug)]
struct ScreenVertex {
    pos: Vec2,
    depth: f32,
    uv: Vec2,
}

#[derive(Default)]
pub struct Renderer {
    z_buffer: Vec<f32>,
    projected: Vec<ScreenVertex>,
}

/// Edge function used in rasterization
#[inline]
fn edge_function(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (c.x - a.x) * (b.y - a.y) - (c.y - a.y) * (b.x - a.x)
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear `fb` and draw the whole grid, filled or as a wireframe.
    pub fn draw(&mut self, fb: &mut FrameBuffer, grid: &Grid, texture: &Texture, xform: &ViewTransform, wireframe: bool) {
        fb.clear(CLEAR_COLOR);
        self.z_buffer.clear();
        self.z_buffer.resize(fb.width * fb.height, f32::INFINITY);

        self.projected.clear();
        self.projected.extend(grid.vertices.iter().map(|v| {
            let ndc: Vec3 = xform.to_ndc(v.position);
            let (x, y) = ndc_to_pixel(ndc.x, ndc.y, fb.width, fb.height);
            ScreenVertex { pos: Vec2::new(x, y), depth: ndc.z, uv: v.tex_coord }
        }));

        for tri in grid.indices.chunks_exact(3) {
            let v0 = self.projected[tri[0] as usize];
            let v1 = self.projected[tri[1] as usize];
            let v2 = self.projected[tri[2] as usize];
            if wireframe {
                for (a, b) in [(v0, v1), (v1, v2), (v2, v0)] {
                    let color = texture.sample(a.uv.x, a.uv.y);
                    draw_line(
                        fb,
                        a.pos.x.round() as i32,
                        a.pos.y.round() as i32,
                        b.pos.x.round() as i32,
                        b.pos.y.round() as i32,
                        color,
                    );
                }
            } else {
                fill_triangle(fb, &mut self.z_buffer, texture, v0, v1, v2);
            }
        }
    }
}

/// Draws a textured triangle with a depth test. Either winding is accepted.
fn fill_triangle(
    fb: &mut FrameBuffer,
    z_buffer: &mut [f32],
    texture: &Texture,
    v0: ScreenVertex,
    v1: ScreenVertex,
    v2: ScreenVertex,
) {
    let area = edge_function(v0.pos, v1.pos, v2.pos);
    if area.abs() < f32::EPSILON || fb.width == 0 || fb.height == 0 {
        return;
    }

    // Compute bounding box of the triangle
    let min = v0.pos.min(v1.pos).min(v2.pos).floor().max(Vec2::ZERO);
    let max = v0.pos.max(v1.pos).max(v2.pos).ceil();
    let max_x = max.x.min(fb.width as f32 - 1.0);
    let max_y = max.y.min(fb.height as f32 - 1.0);
    if min.x > max_x || min.y > max_y {
        return;
    }

    for y in min.y as usize..=max_y as usize {
        for x in min.x as usize..=max_x as usize {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            // Normalized barycentric weights; all >= 0 inside regardless of winding.
            let w0 = edge_function(v1.pos, v2.pos, p) / area;
            let w1 = edge_function(v2.pos, v0.pos, p) / area;
            let w2 = edge_function(v0.pos, v1.pos, p) / area;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }

            let depth = v0.depth * w0 + v1.depth * w1 + v2.depth * w2;
            let offset = y * fb.width + x;
            if depth < z_buffer[offset] {
                z_buffer[offset] = depth;
                let uv = v0.uv * w0 + v1.uv * w1 + v2.uv * w2;
                fb.pixels[offset] = texture.sample(uv.x, uv.y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::View;
    use image::{Rgb, RgbImage};
    use std::path::Path;

    fn solid(color: [u8; 3]) -> Texture {
        let img = RgbImage::from_pixel(4, 4, Rgb(color));
        Texture::from_rgb(Path::new("mem"), &img).unwrap()
    }

    fn view(ww: usize, wh: usize, gw: usize, gh: usize) -> View {
        View { window_width: ww, window_height: wh, grid_width: gw, grid_height: gh, rotation_deg: 0.0 }
    }

    #[test]
    fn square_grid_fills_letterbox_only() {
        let grid = Grid::generate(8, 8);
        let v = view(40, 20, 8, 8);
        let mut fb = FrameBuffer::new(40, 20);
        Renderer::new().draw(&mut fb, &grid, &solid([255, 0, 0]), &v.transform(), false);

        // center is covered, far left/right columns are letterbox
        assert_eq!(fb.pixels[10 * 40 + 20], 0x00_FF_00_00);
        assert_eq!(fb.pixels[10 * 40], CLEAR_COLOR);
        assert_eq!(fb.pixels[10 * 40 + 39], CLEAR_COLOR);
    }

    #[test]
    fn wireframe_leaves_gaps() {
        let grid = Grid::generate(4, 4);
        let v = view(64, 64, 4, 4);
        let mut filled = FrameBuffer::new(64, 64);
        let mut wired = FrameBuffer::new(64, 64);
        let tex = solid([0, 255, 0]);
        let mut r = Renderer::new();
        r.draw(&mut filled, &grid, &tex, &v.transform(), false);
        r.draw(&mut wired, &grid, &tex, &v.transform(), true);
        let lit = |fb: &FrameBuffer| fb.pixels.iter().filter(|&&p| p != CLEAR_COLOR).count();
        assert!(lit(&wired) > 0);
        assert!(lit(&wired) < lit(&filled));
    }

    #[test]
    fn half_turn_still_draws() {
        let grid = Grid::generate(6, 6);
        let mut v = view(30, 30, 6, 6);
        v.rotate(180.0);
        let mut fb = FrameBuffer::new(30, 30);
        Renderer::new().draw(&mut fb, &grid, &solid([0, 0, 255]), &v.transform(), false);
        assert_eq!(fb.pixels[15 * 30 + 15], 0x00_00_00_FF);
    }
}
