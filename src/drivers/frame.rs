// Air-Sentinel - Frame Buffer
//
// In-memory 1bpp framebuffer for the 128x32 SSD1306 panel. Views draw into
// it through embedded-graphics and the panel driver flushes it page by page.

use core::convert::Infallible;

use embedded_graphics::{
    mono_font::{ascii::FONT_5X8, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};

use crate::config::{DISPLAY_BUFFER_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Glyph advance of the UI font, used for centring.
pub const CHAR_WIDTH: i32 = 5;

/// Page-major layout as the controller expects it: byte `x + (y / 8) * 128`,
/// bit `y % 8`.
#[derive(Clone)]
pub struct Frame {
    bytes: [u8; DISPLAY_BUFFER_SIZE],
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    pub const fn new() -> Self {
        Self {
            bytes: [0u8; DISPLAY_BUFFER_SIZE],
        }
    }

    pub fn bytes(&self) -> &[u8; DISPLAY_BUFFER_SIZE] {
        &self.bytes
    }

    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<bool> {
        let (index, mask) = Self::locate(x, y)?;
        Some(self.bytes[index] & mask != 0)
    }

    fn set_pixel(&mut self, x: u32, y: u32, on: bool) {
        let Some((index, mask)) = Self::locate(x, y) else {
            return;
        };
        if on {
            self.bytes[index] |= mask;
        } else {
            self.bytes[index] &= !mask;
        }
    }

    fn locate(x: u32, y: u32) -> Option<(usize, u8)> {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return None;
        }
        let index = x as usize + (y as usize / 8) * SCREEN_WIDTH as usize;
        Some((index, 1u8 << (y % 8)))
    }

    /// Draw `text` with its top-left corner at (`x`, `y`).
    pub fn text(&mut self, text: &str, x: i32, y: i32) {
        let style = MonoTextStyle::new(&FONT_5X8, BinaryColor::On);
        let _ = Text::with_baseline(text, Point::new(x, y), style, Baseline::Top).draw(self);
    }

    /// Draw `text` horizontally centred on row `y`.
    pub fn text_centered(&mut self, text: &str, y: i32) {
        let width = text.chars().count() as i32 * CHAR_WIDTH;
        let x = ((SCREEN_WIDTH as i32 - width) / 2).max(0);
        self.text(text, x, y);
    }

    /// One-pixel outline.
    pub fn rect(&mut self, x: i32, y: i32, w: u32, h: u32) {
        let _ = Rectangle::new(Point::new(x, y), Size::new(w, h))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(self);
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32) {
        let _ = Rectangle::new(Point::new(x, y), Size::new(w, h))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(self);
    }
}

impl OriginDimensions for Frame {
    fn size(&self) -> Size {
        Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

impl DrawTarget for Frame {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            self.set_pixel(x, y, color.is_on());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixels_use_page_layout() {
        let mut frame = Frame::new();
        frame.set_pixel(3, 9, true);
        assert_eq!(frame.bytes()[128 + 3], 0b0000_0010);
        assert_eq!(frame.pixel(3, 9), Some(true));
        assert_eq!(frame.pixel(128, 0), None);
    }

    #[test]
    fn fill_rect_covers_exact_area() {
        let mut frame = Frame::new();
        frame.fill_rect(12, 22, 10, 6);
        assert_eq!(frame.pixel(12, 22), Some(true));
        assert_eq!(frame.pixel(21, 27), Some(true));
        assert_eq!(frame.pixel(22, 22), Some(false));
        assert_eq!(frame.pixel(12, 28), Some(false));
    }

    #[test]
    fn outline_leaves_the_inside_clear() {
        let mut frame = Frame::new();
        frame.rect(10, 20, 108, 10);
        assert_eq!(frame.pixel(10, 20), Some(true));
        assert_eq!(frame.pixel(117, 29), Some(true));
        assert_eq!(frame.pixel(50, 25), Some(false));
    }

    #[test]
    fn off_screen_drawing_is_clipped() {
        let mut frame = Frame::new();
        frame.fill_rect(-5, -5, 300, 300);
        assert!(frame.bytes().iter().all(|b| *b == 0xFF));
        frame.clear();
        assert!(frame.bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn text_sets_some_pixels() {
        let mut frame = Frame::new();
        frame.text("GOOD", 0, 0);
        assert!(frame.bytes()[..128].iter().any(|b| *b != 0));
        assert!(frame.bytes()[128..].iter().all(|b| *b == 0));
    }
}
