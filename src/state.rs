// Application state and the transitions driven by input events.
// Everything the grid, mapper and kernel need is owned here and passed
// down explicitly; the main loop only shuttles events, ticks and frames.

use crate::bmp::{self, Region};
use crate::config::Config;
use crate::draw::InputEvent;
use crate::grid::grid_size_for;
use crate::mapper::View;
use crate::menu::{self, Command, PopupMenu};
use crate::texture::{Texture, TextureSlot, Textures};
use crate::types::{DeformCenter, DeformMode, FrameBuffer, Grid};
use log::{debug, info, warn};
use minifb::Key;
use std::path::PathBuf;
use std::time::{Duration, Instant};

const ROTATION_STEP: f32 = 10.0;

pub struct App {
    pub textures: Textures,
    pub active: TextureSlot,
    pub mode: DeformMode,
    pub grid: Grid,
    pub view: View,
    pub center: DeformCenter,
    pub wireframe: bool,
    pub menu: PopupMenu,
    pub running: bool,
    pointer_held: bool,
    dirty: bool,
    pending_save: bool,
    last_tick: Option<Instant>,
    tick_interval: Duration,
    max_grid: usize,
    template: PathBuf,
    output: PathBuf,
}

impl App {
    pub fn new(config: &Config, textures: Textures, window_width: usize, window_height: usize) -> Self {
        let mut app = Self {
            textures,
            active: TextureSlot::A,
            mode: DeformMode::default(),
            grid: Grid::default(),
            view: View {
                window_width,
                window_height,
                grid_width: 0,
                grid_height: 0,
                rotation_deg: 0.0,
            },
            center: None,
            wireframe: config.wireframe,
            menu: PopupMenu::default(),
            running: true,
            pointer_held: false,
            dirty: true,
            pending_save: false,
            last_tick: None,
            tick_interval: config.tick_interval(),
            max_grid: config.max_grid as usize,
            template: config.template.clone(),
            output: config.output.clone(),
        };
        app.regenerate();
        app
    }

    pub fn texture(&self) -> &Texture {
        // Saved is only ever made active after it was loaded.
        self.textures.get(self.active).unwrap_or(&self.textures.a)
    }

    /// Reset the lattice for the active texture; drops any pending deformation.
    fn regenerate(&mut self) {
        let tex = self.texture();
        let (gw, gh) = grid_size_for(tex.width, tex.height, self.max_grid);
        self.grid = Grid::generate(gw, gh);
        self.view.grid_width = gw;
        self.view.grid_height = gh;
        self.center = None;
        self.dirty = true;
        debug!("Grid regenerated: {gw}x{gh} ({} indices)", self.grid.indices.len());
    }

    /// True once after any change that needs the scene re-rasterised.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if (width, height) != (self.view.window_width, self.view.window_height) {
            self.view.window_width = width;
            self.view.window_height = height;
            self.menu.close();
            self.dirty = true;
        }
    }

    /// Mesh-local point under a window pixel, if it lands on the lattice.
    fn pick(&self, x: f32, y: f32) -> DeformCenter {
        let local = self.view.pixel_to_local(x, y);
        self.grid.contains(local).then_some(local)
    }

    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown { x, y } => {
                if self.menu.is_open() {
                    let picked = self.menu.hit(x, y);
                    self.menu.close();
                    if let Some(cmd) = picked {
                        self.dispatch(cmd);
                    }
                    return;
                }
                self.pointer_held = true;
                self.center = self.pick(x, y);
                match self.center {
                    Some(c) => {
                        self.grid.apply_deformation(c, self.mode);
                        self.last_tick = Some(Instant::now());
                        self.dirty = true;
                    }
                    None => debug!("Click at ({x}, {y}) is outside the grid"),
                }
            }
            InputEvent::PointerDrag { x, y } => {
                if self.pointer_held {
                    self.center = self.pick(x, y);
                }
            }
            InputEvent::PointerUp => {
                self.pointer_held = false;
                self.center = None;
            }
            InputEvent::RightClick { x, y } => {
                if self.menu.is_open() {
                    self.menu.close();
                } else {
                    self.menu.open_at(x, y, self.view.window_width, self.view.window_height);
                }
            }
            InputEvent::KeyDown(key) => match key {
                Key::A => self.rotate(-ROTATION_STEP),
                Key::D => self.rotate(ROTATION_STEP),
                Key::W => self.dispatch(Command::ToggleWireframe),
                other => {
                    if let Some(cmd) = menu::shortcut(other) {
                        self.dispatch(cmd);
                    }
                }
            },
            // Only rotation auto-repeats; commands fire once per press.
            InputEvent::KeyRepeat(Key::A) => self.rotate(-ROTATION_STEP),
            InputEvent::KeyRepeat(Key::D) => self.rotate(ROTATION_STEP),
            InputEvent::KeyRepeat(_) => {}
            InputEvent::KeyUp(Key::Escape) => self.dispatch(Command::Exit),
            InputEvent::KeyUp(_) => {}
        }
    }

    fn rotate(&mut self, delta: f32) {
        self.view.rotate(delta);
        self.dirty = true;
    }

    /// Idle step: while a center is held, deform again once per tick interval.
    pub fn tick(&mut self, now: Instant) {
        let Some(center) = self.center else { return };
        let due = self
            .last_tick
            .map_or(true, |last| now.saturating_duration_since(last) >= self.tick_interval);
        if due {
            self.grid.apply_deformation(center, self.mode);
            self.last_tick = Some(now);
            self.dirty = true;
        }
    }

    pub fn dispatch(&mut self, cmd: Command) {
        info!("Command: {cmd:?}");
        match cmd {
            Command::SelectTexture(slot) => {
                self.active = slot;
                self.regenerate();
            }
            Command::SelectMode(mode) => {
                self.mode = mode;
                self.regenerate();
            }
            Command::SaveImage => self.pending_save = true,
            Command::ReloadSaved => match Texture::load(&self.output) {
                Ok(tex) => {
                    info!("Now showing {}", tex.path.display());
                    self.textures.saved = Some(tex);
                    self.active = TextureSlot::Saved;
                    self.regenerate();
                }
                Err(e) => warn!("{e}; keeping the current texture"),
            },
            Command::ToggleWireframe => {
                self.wireframe = !self.wireframe;
                self.dirty = true;
            }
            Command::Exit => self.running = false,
        }
    }

    /// True once after a save was requested; the caller exports after re-rastering.
    pub fn take_pending_save(&mut self) -> bool {
        std::mem::take(&mut self.pending_save)
    }

    /// Export the letterboxed part of `scene` to the configured output path.
    pub fn save(&self, scene: &FrameBuffer) {
        let xf = self.view.transform();
        let region = Region::letterbox(scene.width, scene.height, xf.width_ratio, xf.height_ratio);
        if let Err(e) = bmp::export(scene, region, &self.template, &self.output) {
            warn!("{e}");
        }
    }

    /// One-line status for the HUD.
    pub fn status_line(&self) -> String {
        let slot = match self.active {
            TextureSlot::A => "TEX A",
            TextureSlot::B => "TEX B",
            TextureSlot::Saved => "TEX SAVED",
        };
        let fill = if self.wireframe { "LINES" } else { "FILL" };
        format!(
            "{} | {} | GRID {}X{} | ROT {} | {}",
            self.mode.label(),
            slot,
            self.grid.width,
            self.grid.height,
            self.view.rotation_deg as i32,
            fill
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::ITEM_HEIGHT;
    use image::{Rgb, RgbImage};
    use std::path::Path;

    fn tex(w: u32, h: u32) -> Texture {
        Texture::from_rgb(Path::new("mem"), &RgbImage::from_pixel(w, h, Rgb([9, 9, 9]))).unwrap()
    }

    fn test_config() -> Config {
        use clap::Parser;
        let out = std::env::temp_dir().join(format!("mesh-warp-state-{}.bmp", std::process::id()));
        Config::parse_from(["mesh-warp", "--output", out.to_str().unwrap(), "--tick-ms", "10"])
    }

    fn app() -> App {
        App::new(&test_config(), Textures { a: tex(40, 40), b: tex(60, 30), saved: None }, 400, 400)
    }

    #[test]
    fn starts_with_texture_sized_grid() {
        let a = app();
        assert_eq!((a.grid.width, a.grid.height), (40, 40));
        assert_eq!(a.grid.vertices.len(), 1600);
    }

    #[test]
    fn click_inside_deforms_and_sets_center() {
        let mut a = app();
        let before = a.grid.vertices.clone();
        a.handle(InputEvent::PointerDown { x: 210.0, y: 190.0 });
        assert!(a.center.is_some());
        assert_ne!(a.grid.vertices, before);
        assert!(a.take_dirty());
    }

    #[test]
    fn click_outside_grid_is_ignored() {
        let mut a = app();
        a.take_dirty();
        let before = a.grid.vertices.clone();
        a.handle(InputEvent::PointerDown { x: 1.0, y: 1.0 });
        assert!(a.center.is_none());
        assert_eq!(a.grid.vertices, before);
        assert!(!a.take_dirty());
    }

    #[test]
    fn held_pointer_compounds_on_ticks() {
        let mut a = app();
        a.handle(InputEvent::PointerDown { x: 200.0, y: 200.0 });
        let after_click = a.grid.vertices.clone();
        let t0 = a.last_tick.unwrap();
        a.tick(t0 + Duration::from_millis(1));
        assert_eq!(a.grid.vertices, after_click, "tick before interval must not deform");
        a.tick(t0 + Duration::from_millis(20));
        assert_ne!(a.grid.vertices, after_click);
    }

    #[test]
    fn release_stops_ticking() {
        let mut a = app();
        a.handle(InputEvent::PointerDown { x: 200.0, y: 200.0 });
        a.handle(InputEvent::PointerUp);
        let frozen = a.grid.vertices.clone();
        a.tick(Instant::now() + Duration::from_secs(1));
        assert_eq!(a.grid.vertices, frozen);
    }

    #[test]
    fn drag_off_grid_pauses_and_back_on_resumes() {
        let mut a = app();
        a.handle(InputEvent::PointerDown { x: 200.0, y: 200.0 });
        a.handle(InputEvent::PointerDrag { x: 2.0, y: 2.0 });
        assert!(a.center.is_none());
        a.handle(InputEvent::PointerDrag { x: 220.0, y: 200.0 });
        assert!(a.center.is_some());
    }

    #[test]
    fn mode_switch_resets_grid_and_center() {
        let mut a = app();
        a.handle(InputEvent::PointerDown { x: 200.0, y: 200.0 });
        a.dispatch(Command::SelectMode(DeformMode::Swirl));
        assert_eq!(a.mode, DeformMode::Swirl);
        assert!(a.center.is_none());
        assert_eq!(a.grid.vertices, Grid::generate(40, 40).vertices);
    }

    #[test]
    fn texture_switch_resizes_grid() {
        let mut a = app();
        a.handle(InputEvent::KeyDown(Key::Key2));
        assert_eq!(a.active, TextureSlot::B);
        assert_eq!((a.grid.width, a.grid.height), (60, 30));
    }

    #[test]
    fn failed_reload_keeps_texture() {
        let mut a = app();
        a.output = PathBuf::from("/definitely/not/here.bmp");
        a.dispatch(Command::ReloadSaved);
        assert_eq!(a.active, TextureSlot::A);
        assert!(a.textures.saved.is_none());
    }

    #[test]
    fn rotation_keys_wrap() {
        let mut a = app();
        for _ in 0..19 {
            a.handle(InputEvent::KeyDown(Key::D));
        }
        assert!((a.view.rotation_deg + 170.0).abs() < 1e-4);
        a.handle(InputEvent::KeyDown(Key::A));
        assert!((a.view.rotation_deg + 180.0).abs() < 1e-4);
    }

    #[test]
    fn menu_click_dispatches_instead_of_deforming() {
        let mut a = app();
        a.handle(InputEvent::RightClick { x: 200.0, y: 200.0 });
        assert!(a.menu.is_open());
        let before = a.grid.vertices.clone();
        // fourth row: SquashB
        let row = 200.0 + 3.5 * ITEM_HEIGHT as f32;
        a.handle(InputEvent::PointerDown { x: 205.0, y: row });
        assert!(!a.menu.is_open());
        assert_eq!(a.mode, DeformMode::SquashB);
        assert_eq!(a.grid.vertices, before);
        assert!(a.center.is_none());
    }

    #[test]
    fn escape_release_exits() {
        let mut a = app();
        a.handle(InputEvent::KeyDown(Key::Escape));
        assert!(a.running);
        a.handle(InputEvent::KeyUp(Key::Escape));
        assert!(!a.running);
    }

    #[test]
    fn wireframe_toggles() {
        let mut a = app();
        a.handle(InputEvent::KeyDown(Key::W));
        assert!(a.wireframe);
        assert!(a.status_line().contains("LINES"));
    }

    #[test]
    fn second_right_click_closes_menu() {
        let mut a = app();
        a.handle(InputEvent::RightClick { x: 100.0, y: 100.0 });
        assert!(a.menu.is_open());
        a.handle(InputEvent::RightClick { x: 300.0, y: 300.0 });
        assert!(!a.menu.is_open());
        assert_eq!(a.mode, DeformMode::SquashA);
    }

    #[test]
    fn left_click_off_menu_closes_without_deforming() {
        let mut a = app();
        a.handle(InputEvent::RightClick { x: 10.0, y: 10.0 });
        let before = a.grid.vertices.clone();
        // on the grid, but well right of the popup
        a.handle(InputEvent::PointerDown { x: 300.0, y: 200.0 });
        assert!(!a.menu.is_open());
        assert_eq!(a.grid.vertices, before);
        assert!(a.center.is_none());
        assert_eq!(a.active, TextureSlot::A);
    }

    #[test]
    fn held_command_keys_fire_once() {
        let mut a = app();
        a.handle(InputEvent::KeyDown(Key::W));
        for _ in 0..5 {
            a.handle(InputEvent::KeyRepeat(Key::W));
            a.handle(InputEvent::KeyRepeat(Key::Key6));
        }
        assert!(a.wireframe);
        assert!(!a.take_pending_save());
    }

    #[test]
    fn held_rotation_keys_repeat() {
        let mut a = app();
        a.handle(InputEvent::KeyDown(Key::D));
        a.handle(InputEvent::KeyRepeat(Key::D));
        a.handle(InputEvent::KeyRepeat(Key::D));
        assert!((a.view.rotation_deg - 30.0).abs() < 1e-4);
        a.handle(InputEvent::KeyRepeat(Key::A));
        assert!((a.view.rotation_deg - 20.0).abs() < 1e-4);
    }

    #[test]
    fn save_waits_for_the_main_loop() {
        let mut a = app();
        a.take_dirty();
        a.handle(InputEvent::KeyDown(Key::Key6));
        a.handle(InputEvent::KeyDown(Key::D));
        // the rotation in the same batch must be in the exported frame
        assert!(a.take_dirty());
        assert!(a.take_pending_save());
        assert!(!a.take_pending_save());
    }
}
