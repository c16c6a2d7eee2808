//! Minimal RGB raster with the primitives a box plot needs.

use super::font::{self, ADVANCE, GLYPH_HEIGHT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const EDGE: Rgb = Rgb(63, 63, 63);
    pub const GRID: Rgb = Rgb(222, 222, 222);
}

/// Row-major 8-bit RGB image. Drawing outside the bounds is clipped.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgb) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..width as usize * height as usize {
            pixels.extend_from_slice(&[background.0, background.1, background.2]);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn get(&self, x: i64, y: i64) -> Option<Rgb> {
        let i = self.offset(x, y)?;
        Some(Rgb(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]))
    }

    fn offset(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 3)
    }

    pub fn set(&mut self, x: i64, y: i64, color: Rgb) {
        if let Some(i) = self.offset(x, y) {
            self.pixels[i] = color.0;
            self.pixels[i + 1] = color.1;
            self.pixels[i + 2] = color.2;
        }
    }

    /// Filled rectangle spanning both corners inclusive.
    pub fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb) {
        let (xa, xb) = (x0.min(x1), x0.max(x1));
        let (ya, yb) = (y0.min(y1), y0.max(y1));
        for y in ya..=yb {
            for x in xa..=xb {
                self.set(x, y, color);
            }
        }
    }

    pub fn stroke_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb) {
        self.line(x0, y0, x1, y0, color);
        self.line(x1, y0, x1, y1, color);
        self.line(x1, y1, x0, y1, color);
        self.line(x0, y1, x0, y0, color);
    }

    /// Bresenham line, endpoints included.
    pub fn line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let (mut x, mut y) = (x0, y0);
        let mut err = dx + dy;
        loop {
            self.set(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Diamond marker of half-size `r` centred on `(cx, cy)`.
    pub fn diamond(&mut self, cx: i64, cy: i64, r: i64, color: Rgb) {
        self.line(cx - r, cy, cx, cy - r, color);
        self.line(cx, cy - r, cx + r, cy, color);
        self.line(cx + r, cy, cx, cy + r, color);
        self.line(cx, cy + r, cx - r, cy, color);
    }

    /// Horizontal text with its top-left corner at `(x, y)`.
    pub fn text(&mut self, x: i64, y: i64, text: &str, scale: usize, color: Rgb) {
        let s = scale as i64;
        for (n, c) in text.chars().enumerate() {
            let gx = x + (n * ADVANCE) as i64 * s;
            for (col, &bits) in font::glyph(c).iter().enumerate() {
                for row in 0..GLYPH_HEIGHT {
                    if bits >> row & 1 == 1 {
                        let px = gx + col as i64 * s;
                        let py = y + row as i64 * s;
                        self.fill_rect(px, py, px + s - 1, py + s - 1, color);
                    }
                }
            }
        }
    }

    /// Text rotated 90° counter-clockwise, reading bottom to top, with the
    /// bottom-left corner of the first glyph at `(x, y)`.
    pub fn text_vertical(&mut self, x: i64, y: i64, text: &str, scale: usize, color: Rgb) {
        let s = scale as i64;
        for (n, c) in text.chars().enumerate() {
            let gy = y - (n * ADVANCE) as i64 * s;
            for (col, &bits) in font::glyph(c).iter().enumerate() {
                for row in 0..GLYPH_HEIGHT {
                    if bits >> row & 1 == 1 {
                        let px = x + row as i64 * s;
                        let py = gy - col as i64 * s;
                        self.fill_rect(px, py - s + 1, px + s - 1, py, color);
                    }
                }
            }
        }
    }

    /// Horizontal text centred on `cx`.
    pub fn text_centered(&mut self, cx: i64, y: i64, text: &str, scale: usize, color: Rgb) {
        let w = font::text_width(text, scale) as i64;
        self.text(cx - w / 2, y, text, scale, color);
    }

    pub fn glyph_height(scale: usize) -> i64 {
        (GLYPH_HEIGHT * scale) as i64
    }
}
