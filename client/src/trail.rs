//! Offscreen trail buffer.
//!
//! Living players stamp a cell-sized square of their color wherever they go;
//! moving obstacles erase the rectangle they roll onto. The buffer is a
//! CPU-side [`Image`] so it can be written (and tested) without a window;
//! the renderer uploads it to a texture whenever it is dirty.

use log::warn;
use macroquad::prelude::{Color, Image, BLANK, GRAY};
use shared::{Rect, BOX_SIZE, TRAIL_SIZE};

pub struct TrailCanvas {
    image: Image,
    dirty: bool,
}

impl TrailCanvas {
    pub fn new() -> Self {
        Self {
            image: Image::gen_image_color(TRAIL_SIZE, TRAIL_SIZE, BLANK),
            dirty: false,
        }
    }

    /// Fill one cell-sized square at the center of a player footprint.
    pub fn stamp(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        let px = BOX_SIZE * x as f32 + width as f32 / 2.0 * BOX_SIZE - BOX_SIZE / 2.0;
        let py = BOX_SIZE * y as f32 + height as f32 / 2.0 * BOX_SIZE - BOX_SIZE / 2.0;
        self.fill(
            px.round() as i32,
            py.round() as i32,
            BOX_SIZE as i32,
            BOX_SIZE as i32,
            color,
        );
    }

    /// Clear the scaled rectangle to transparent (an obstacle rolled over
    /// whatever trail was there).
    pub fn erase(&mut self, rect: &Rect) {
        self.fill(
            (BOX_SIZE * rect.x as f32) as i32,
            (BOX_SIZE * rect.y as f32) as i32,
            (BOX_SIZE * rect.width as f32) as i32,
            (BOX_SIZE * rect.height as f32) as i32,
            BLANK,
        );
    }

    /// Flag the buffer for re-upload into the visible trail texture.
    pub fn materialize(&mut self) {
        self.dirty = true;
    }

    /// True once since the last call if the buffer changed.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        self.image.get_pixel(x, y)
    }

    fn fill(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        // clip at the surface edge
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + width).min(TRAIL_SIZE as i32);
        let y1 = (y + height).min(TRAIL_SIZE as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                self.image.set_pixel(px as u32, py as u32, color);
            }
        }
    }
}

impl Default for TrailCanvas {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a `#rrggbb` color string as sent by the server. Falls back to gray
/// on anything it cannot parse.
pub fn hex_color(value: &str) -> Color {
    let digits = value.strip_prefix('#').unwrap_or(value);
    if digits.len() == 6 {
        if let (Ok(r), Ok(g), Ok(b)) = (
            u8::from_str_radix(&digits[0..2], 16),
            u8::from_str_radix(&digits[2..4], 16),
            u8::from_str_radix(&digits[4..6], 16),
        ) {
            return Color::from_rgba(r, g, b, 255);
        }
    }
    warn!("unparseable color {:?}", value);
    GRAY
}
