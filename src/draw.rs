// Window + software drawing utilities.
// What lives here:
// 1) The window, and turning its polled mouse/keyboard state into events.
// 2) Lines, filled boxes and a crosshair drawn straight into a FrameBuffer.
// 3) A tiny 5x7 bitmap font for the HUD and the popup menu.

use crate::error::Error;
use crate::types::FrameBuffer;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

/// What happened since the previous frame, in window pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f32, y: f32 },
    PointerDrag { x: f32, y: f32 },
    PointerUp,
    RightClick { x: f32, y: f32 },
    KeyDown(Key),
    KeyRepeat(Key), // auto-repeat while held, after the first KeyDown
    KeyUp(Key),
}

pub struct Drawer {
    window: Window, // the on-screen window you see
    left_was_down: bool,
    right_was_down: bool,
    last_pos: Option<(f32, f32)>,
}

impl Drawer {
    /// Create a resizable window.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let options = WindowOptions { resize: true, ..WindowOptions::default() };
        let mut window = Window::new(title, width, height, options)
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window, left_was_down: false, right_was_down: false, last_pos: None })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Current client area in pixels.
    pub fn size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    /// Current mouse position in window pixel coordinates, `None` outside the window.
    pub fn mouse_pos(&self) -> Option<(f32, f32)> {
        self.window.get_mouse_pos(MouseMode::Discard)
    }

    /// Diff the polled button/key state against last frame's.
    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let pos = self.mouse_pos();
        let left = self.window.get_mouse_down(MouseButton::Left);
        let right = self.window.get_mouse_down(MouseButton::Right);

        match (self.left_was_down, left, pos) {
            (false, true, Some((x, y))) => events.push(InputEvent::PointerDown { x, y }),
            (true, true, Some((x, y))) if self.last_pos != pos => {
                events.push(InputEvent::PointerDrag { x, y })
            }
            (true, false, _) => events.push(InputEvent::PointerUp),
            _ => {}
        }
        if right && !self.right_was_down {
            if let Some((x, y)) = pos {
                events.push(InputEvent::RightClick { x, y });
            }
        }

        let fresh = self.window.get_keys_pressed(KeyRepeat::No);
        let repeated = self
            .window
            .get_keys_pressed(KeyRepeat::Yes)
            .into_iter()
            .filter(|k| !fresh.contains(k))
            .map(InputEvent::KeyRepeat);
        events.extend(fresh.iter().copied().map(InputEvent::KeyDown));
        events.extend(repeated);
        events.extend(self.window.get_keys_released().into_iter().map(InputEvent::KeyUp));

        self.left_was_down = left;
        self.right_was_down = right;
        self.last_pos = pos;
        events
    }
}

/* ---------- Software drawing: pixels, lines, boxes, crosshair ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Draw a thin line between (x0,y0) and (x1,y1) using Bresenham.
pub fn draw_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    let (mut x0, mut y0, x1, y1) = (x0, y0, x1, y1);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(fb, x0, y0, color);
        if x0 == x1 && y0 == y1 { break; }
        let e2 = 2 * err;
        if e2 >= dy { err += dy; x0 += sx; }
        if e2 <= dx { err += dx; y0 += sy; }
    }
}

/// Solid axis-aligned box, clipped to the framebuffer.
pub fn fill_rect(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, color: u32) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(fb.width as i32);
    let y1 = (y + h).min(fb.height as i32);
    if x0 >= x1 || y0 >= y1 {
        return;
    }
    for py in y0..y1 {
        let row = py as usize * fb.width;
        fb.pixels[row + x0 as usize..row + x1 as usize].fill(color);
    }
}

/// One-pixel outline of a box.
pub fn stroke_rect(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, color: u32) {
    draw_line(fb, x, y, x + w - 1, y, color);
    draw_line(fb, x, y + h - 1, x + w - 1, y + h - 1, color);
    draw_line(fb, x, y, x, y + h - 1, color);
    draw_line(fb, x + w - 1, y, x + w - 1, y + h - 1, color);
}

/// Draw a small crosshair centered at (cx,cy).
pub fn draw_crosshair(fb: &mut FrameBuffer, cx: i32, cy: i32, size: i32, color: u32) {
    draw_line(fb, cx - size, cy, cx - 2, cy, color);
    draw_line(fb, cx + 2, cy, cx + size, cy, color);
    draw_line(fb, cx, cy - size, cx, cy - 2, color);
    draw_line(fb, cx, cy + 2, cx, cy + size, color);
    put_pixel(fb, cx, cy, color);
}

/* ---------- 5x7 bitmap font (digits, A-Z, a little punctuation) ---------- */

pub const GLYPH_ADVANCE: i32 = 6; // 5 pixels glyph width + 1 pixel spacing
pub const GLYPH_HEIGHT: i32 = 7;

/// Return a 5x7 glyph bitmap. Lowercase letters render as uppercase.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y) with a 1-pixel black shadow.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    if let Some(rows) = glyph5x7(ch) {
        // Shadow pass first, glyph on top
        for (dx, dy, c) in [(1, 1, 0x00000000), (0, 0, color)] {
            for (ry, rowbits) in rows.iter().enumerate() {
                for rx in 0..5 {
                    if (rowbits & (1 << (4 - rx))) != 0 {
                        put_pixel(fb, x + rx as i32 + dx, y + ry as i32 + dy, c);
                    }
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += GLYPH_ADVANCE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_endpoints_are_drawn() {
        let mut fb = FrameBuffer::new(8, 8);
        draw_line(&mut fb, 1, 1, 6, 4, 0xFF);
        assert_eq!(fb.pixels[8 + 1], 0xFF);
        assert_eq!(fb.pixels[4 * 8 + 6], 0xFF);
    }

    #[test]
    fn fill_rect_clips() {
        let mut fb = FrameBuffer::new(4, 4);
        fill_rect(&mut fb, -2, 2, 10, 10, 7);
        assert_eq!(fb.pixels.iter().filter(|&&p| p == 7).count(), 8);
    }

    #[test]
    fn menu_labels_have_glyphs() {
        for ch in "TextureA Save to image file Reload saved image file Exit SquashB Swirl".chars() {
            assert!(glyph5x7(ch).is_some(), "missing glyph for {ch:?}");
        }
    }
}
