// What you SEE:
// • A texture stretched over a fine grid, letterboxed to keep its aspect.
// • Hold Left Mouse on the image: the grid deforms around the cursor
//   (SquashA pushes away, SquashB pulls in, Swirl twists), compounding while held.
// • Right click: popup menu (textures, modes, save/reload bitmap, exit). Keys 1-8 do the same.
// • A / D rotate the mesh about the vertical axis, W toggles wireframe, ESC quits.

mod bmp;
mod config;
mod deform;
mod draw;
mod error;
mod grid;
mod mapper;
mod menu;
mod render;
mod state;
mod texture;
mod types;

use clap::Parser;
use config::Config;
use draw::{draw_crosshair, draw_text_5x7, Drawer};
use error::Error;
use log::{error, info};
use render::Renderer;
use state::App;
use std::time::Instant;
use texture::{Texture, Textures};
use types::FrameBuffer;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    info!("Starting with {config:?}");

    if let Err(e) = run(&config) {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), Error> {
    /* --- Textures first: without both there is nothing to show --- */
    let textures = Textures {
        a: Texture::load(&config.texture_a)?,
        b: Texture::load(&config.texture_b)?,
        saved: None,
    };

    let mut drawer = Drawer::new("Mesh Warp", config.width, config.height)?;
    let (w, h) = drawer.size();
    let mut app = App::new(config, textures, w, h);
    let mut renderer = Renderer::new();

    /* --- Two buffers ---
       `scene` only ever holds the rendered mesh (this is what gets exported);
       `screen` is scene + menu/HUD overlays and is what the window shows. */
    let mut scene = FrameBuffer::new(w, h);
    let mut screen = FrameBuffer::new(w, h);

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && app.running {
        let (w, h) = drawer.size();
        // A minimized window reports 0x0; keep the last frame size until it's back.
        if w > 0 && h > 0 && (w, h) != (scene.width, scene.height) {
            scene.resize(w, h);
            screen.resize(w, h);
            app.resize(w, h);
        }

        for event in drawer.poll_events() {
            app.handle(event);
        }
        app.tick(Instant::now());

        // Any number of mutations above collapse into a single re-raster.
        if app.take_dirty() {
            let xform = app.view.transform();
            renderer.draw(&mut scene, &app.grid, app.texture(), &xform, app.wireframe);
        }
        if app.take_pending_save() {
            app.save(&scene);
        }

        screen.pixels.copy_from_slice(&scene.pixels);
        if app.center.is_some() {
            if let Some((mx, my)) = drawer.mouse_pos() {
                draw_crosshair(&mut screen, mx as i32, my as i32, 8, 0x00_FF_CC_33);
            }
        }
        app.menu.draw(&mut screen);
        draw_text_5x7(&mut screen, 8, 8, &app.status_line(), 0x00_FF_FF_FF);

        drawer.present(&screen)?;
    }

    info!("Exiting");
    Ok(())
}
