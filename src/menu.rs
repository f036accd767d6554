// The command set and the right-click popup that exposes it.

use crate::draw::{draw_text_5x7, fill_rect, stroke_rect, GLYPH_ADVANCE, GLYPH_HEIGHT};
use crate::texture::TextureSlot;
use crate::types::{DeformMode, FrameBuffer};

/// Everything the user can ask for besides clicking on the mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    SelectTexture(TextureSlot),
    SelectMode(DeformMode),
    SaveImage,
    ReloadSaved,
    ToggleWireframe,
    Exit,
}

/// Popup entries, top to bottom. Number keys 1..=8 pick the same entries.
pub const MENU_ENTRIES: [(&str, Command); 8] = [
    ("TextureA", Command::SelectTexture(TextureSlot::A)),
    ("TextureB", Command::SelectTexture(TextureSlot::B)),
    ("SquashA", Command::SelectMode(DeformMode::SquashA)),
    ("SquashB", Command::SelectMode(DeformMode::SquashB)),
    ("Swirl", Command::SelectMode(DeformMode::Swirl)),
    ("Save to image file", Command::SaveImage),
    ("Reload saved image file", Command::ReloadSaved),
    ("Exit", Command::Exit),
];

pub const ITEM_HEIGHT: i32 = GLYPH_HEIGHT + 6;
const PADDING: i32 = 4;
const BG: u32 = 0x00_20_20_28;
const BORDER: u32 = 0x00_90_90_A0;
const TEXT: u32 = 0x00_FF_FF_FF;

/// Right-click popup; `origin` is its top-left corner while open.
#[derive(Default, Debug)]
pub struct PopupMenu {
    origin: Option<(i32, i32)>,
}

impl PopupMenu {
    pub fn is_open(&self) -> bool {
        self.origin.is_some()
    }

    /// Pixel size of the whole popup.
    pub fn size() -> (i32, i32) {
        let longest = MENU_ENTRIES.iter().map(|(label, _)| label.len()).max().unwrap_or(0) as i32;
        (longest * GLYPH_ADVANCE + 2 * PADDING, MENU_ENTRIES.len() as i32 * ITEM_HEIGHT)
    }

    /// Open at the cursor, shifted so the popup stays inside the window.
    pub fn open_at(&mut self, x: f32, y: f32, win_w: usize, win_h: usize) {
        let (w, h) = Self::size();
        let ox = (x as i32).min(win_w as i32 - w).max(0);
        let oy = (y as i32).min(win_h as i32 - h).max(0);
        self.origin = Some((ox, oy));
    }

    pub fn close(&mut self) {
        self.origin = None;
    }

    /// The entry under (x,y), if the popup is open and the point is on it.
    pub fn hit(&self, x: f32, y: f32) -> Option<Command> {
        let (ox, oy) = self.origin?;
        let (w, h) = Self::size();
        let (px, py) = (x as i32 - ox, y as i32 - oy);
        if px < 0 || py < 0 || px >= w || py >= h {
            return None;
        }
        MENU_ENTRIES.get((py / ITEM_HEIGHT) as usize).map(|(_, cmd)| *cmd)
    }

    pub fn draw(&self, fb: &mut FrameBuffer) {
        let Some((ox, oy)) = self.origin else { return };
        let (w, h) = Self::size();
        fill_rect(fb, ox, oy, w, h, BG);
        stroke_rect(fb, ox, oy, w, h, BORDER);
        for (i, (label, _)) in MENU_ENTRIES.iter().enumerate() {
            let y = oy + i as i32 * ITEM_HEIGHT + (ITEM_HEIGHT - GLYPH_HEIGHT) / 2;
            draw_text_5x7(fb, ox + PADDING, y, label, TEXT);
        }
    }
}

/// Number-row shortcut for the n-th popup entry.
pub fn shortcut(key: minifb::Key) -> Option<Command> {
    use minifb::Key;
    let idx = match key {
        Key::Key1 => 0,
        Key::Key2 => 1,
        Key::Key3 => 2,
        Key::Key4 => 3,
        Key::Key5 => 4,
        Key::Key6 => 5,
        Key::Key7 => 6,
        Key::Key8 => 7,
        _ => return None,
    };
    Some(MENU_ENTRIES[idx].1)
}
