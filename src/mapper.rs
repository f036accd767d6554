// Window pixels <-> mesh-local coordinates.
// The forward direction (ViewTransform) is what the renderer uses every frame;
// the inverse (pixel_to_local) turns a click into a deformation center.

use glam::{Mat4, Vec3, Vec4};

/// Everything the view depends on. Rebuilt from app state, never cached.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct View {
    pub window_width: usize,
    pub window_height: usize,
    pub grid_width: usize,
    pub grid_height: usize,
    pub rotation_deg: f32, // about the vertical axis, kept in [-180, 180]
}

/// Per-frame forward transform: `rotation * scale * aspect`.
#[derive(Clone, Copy, Debug)]
pub struct ViewTransform {
    pub width_ratio: f32,  // in (0,1]
    pub height_ratio: f32, // in (0,1]
    pub matrix: Mat4,
}

impl View {
    fn win_aspect(&self) -> f32 {
        self.window_width as f32 / self.window_height.max(1) as f32
    }

    fn tex_aspect(&self) -> f32 {
        self.grid_width as f32 / self.grid_height.max(1) as f32
    }

    /// Letterboxing ratios so the grid keeps its proportions inside the window.
    pub fn aspect_ratios(&self) -> (f32, f32) {
        let (win, tex) = (self.win_aspect(), self.tex_aspect());
        ((tex / win).min(1.0), (win / tex).min(1.0))
    }

    pub fn transform(&self) -> ViewTransform {
        let (width_ratio, height_ratio) = self.aspect_ratios();
        let aspect = Mat4::from_scale(Vec3::new(width_ratio, height_ratio, 1.0));
        let scale = Mat4::from_scale(Vec3::new(
            2.0 / self.grid_width.max(1) as f32,
            2.0 / self.grid_height.max(1) as f32,
            0.0,
        ));
        let rotation = Mat4::from_rotation_y(self.rotation_deg.to_radians());
        ViewTransform { width_ratio, height_ratio, matrix: rotation * scale * aspect }
    }

    /// Map a window pixel to mesh-local units (z = 0).
    ///
    /// Only the aspect correction is undone. The rotation is not: once the
    /// mesh is rotated, a click lands where the unrotated mesh would be.
    pub fn pixel_to_local(&self, x: f32, y: f32) -> Vec3 {
        let ndc_x = 2.0 * x / self.window_width.max(1) as f32 - 1.0;
        let ndc_y = 1.0 - 2.0 * y / self.window_height.max(1) as f32;

        let (win, tex) = (self.win_aspect(), self.tex_aspect());
        let clip_x = ndc_x * (win / tex).max(1.0);
        let clip_y = ndc_y * (tex / win).max(1.0);

        Vec3::new(
            clip_x * self.grid_width as f32 * 0.5,
            clip_y * self.grid_height as f32 * 0.5,
            0.0,
        )
    }

    /// Rotate by `delta` degrees, wrapping back into [-180, 180].
    pub fn rotate(&mut self, delta: f32) {
        self.rotation_deg += delta;
        if self.rotation_deg > 180.0 {
            self.rotation_deg -= 360.0;
        } else if self.rotation_deg < -180.0 {
            self.rotation_deg += 360.0;
        }
    }
}

impl ViewTransform {
    /// Mesh-local point to NDC (x, y, depth).
    #[inline]
    pub fn to_ndc(&self, local: Vec3) -> Vec3 {
        let p = self.matrix * Vec4::new(local.x, local.y, local.z, 1.0);
        p.truncate()
    }
}

/// NDC to window pixels (origin top-left, y down).
#[inline]
pub fn ndc_to_pixel(ndc_x: f32, ndc_y: f32, width: usize, height: usize) -> (f32, f32) {
    (
        (ndc_x + 1.0) * 0.5 * width as f32,
        (1.0 - ndc_y) * 0.5 * height as f32,
    )
}
