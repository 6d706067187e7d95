//! Low-level raster canvas.
//!
//! Thin software-rendering layer over an RGB image buffer: clipped pixel
//! writes, line and polygon drawing, markers and bitmap text. Everything
//! higher-level (axes, contours, barbs) is built from these primitives.

use std::path::Path;

use image::{Rgb, RgbImage};
use thiserror::Error;

use super::font;

/// Error type for figure output.
#[derive(Debug, Error)]
pub enum RenderError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encoding error
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Inclusive pixel rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl PixelRect {
    /// Create a rectangle; corners are normalized so `x0 <= x1`,
    /// `y0 <= y1`.
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> i32 {
        self.x1 - self.x0 + 1
    }

    /// Height in pixels.
    pub fn height(&self) -> i32 {
        self.y1 - self.y0 + 1
    }

    /// Whether a pixel lies inside.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }
}

/// RGB raster canvas with an optional clip rectangle.
pub struct Canvas {
    img: RgbImage,
    clip: Option<PixelRect>,
}

impl Canvas {
    /// Create a canvas filled with a background color.
    pub fn new(width: u32, height: u32, background: Rgb<u8>) -> Self {
        let img = RgbImage::from_pixel(width, height, background);
        Self { img, clip: None }
    }

    /// Canvas width in pixels.
    pub fn width(&self) -> u32 {
        self.img.width()
    }

    /// Canvas height in pixels.
    pub fn height(&self) -> u32 {
        self.img.height()
    }

    /// Restrict subsequent drawing to a rectangle (None to clear).
    pub fn set_clip(&mut self, clip: Option<PixelRect>) {
        self.clip = clip;
    }

    /// Borrow the underlying image.
    pub fn image(&self) -> &RgbImage {
        &self.img
    }

    /// Write the canvas to a PNG file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        self.img.save(path.as_ref())?;
        Ok(())
    }

    /// Set one pixel, honoring canvas bounds and the clip rectangle.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgb<u8>) {
        if x < 0 || y < 0 || x >= self.img.width() as i32 || y >= self.img.height() as i32 {
            return;
        }
        if let Some(clip) = self.clip {
            if !clip.contains(x, y) {
                return;
            }
        }
        self.img.put_pixel(x as u32, y as u32, color);
    }

    /// Draw a 1-pixel line between two points (Bresenham).
    pub fn draw_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgb<u8>) {
        let (mut x, mut y) = (x0.round() as i32, y0.round() as i32);
        let (xe, ye) = (x1.round() as i32, y1.round() as i32);

        let dx = (xe - x).abs();
        let dy = -(ye - y).abs();
        let sx = if x < xe { 1 } else { -1 };
        let sy = if y < ye { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.set_pixel(x, y, color);
            if x == xe && y == ye {
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

    /// Draw connected line segments.
    pub fn draw_polyline(&mut self, points: &[(f64, f64)], color: Rgb<u8>) {
        for w in points.windows(2) {
            self.draw_line(w[0].0, w[0].1, w[1].0, w[1].1, color);
        }
    }

    /// Fill an axis-aligned rectangle (inclusive corners).
    pub fn fill_rect(&mut self, rect: PixelRect, color: Rgb<u8>) {
        for y in rect.y0..=rect.y1 {
            for x in rect.x0..=rect.x1 {
                self.set_pixel(x, y, color);
            }
        }
    }

    /// Fill a simple polygon by even-odd scanline.
    pub fn fill_polygon(&mut self, points: &[(f64, f64)], color: Rgb<u8>) {
        if points.len() < 3 {
            return;
        }

        let y_min = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let y_max = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
        let y_lo = y_min.floor() as i32;
        let y_hi = y_max.ceil() as i32;

        let n = points.len();
        let mut xs: Vec<f64> = Vec::with_capacity(8);

        for y in y_lo..=y_hi {
            let yc = y as f64 + 0.5;
            xs.clear();
            for k in 0..n {
                let (xa, ya) = points[k];
                let (xb, yb) = points[(k + 1) % n];
                if (ya <= yc && yb > yc) || (yb <= yc && ya > yc) {
                    let t = (yc - ya) / (yb - ya);
                    xs.push(xa + t * (xb - xa));
                }
            }
            xs.sort_by(f64::total_cmp);
            for pair in xs.chunks_exact(2) {
                let x_start = pair[0].round() as i32;
                let x_end = pair[1].round() as i32;
                for x in x_start..=x_end {
                    self.set_pixel(x, y, color);
                }
            }
        }
    }

    /// Draw a filled circular marker.
    pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgb<u8>) {
        let r = radius.ceil() as i32;
        let (cxi, cyi) = (cx.round() as i32, cy.round() as i32);
        let r2 = radius * radius;
        for dy in -r..=r {
            for dx in -r..=r {
                if (dx * dx + dy * dy) as f64 <= r2 {
                    self.set_pixel(cxi + dx, cyi + dy, color);
                }
            }
        }
    }

    /// Draw a circle outline.
    pub fn draw_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgb<u8>) {
        let steps = (radius * 8.0).max(12.0) as usize;
        let pts: Vec<(f64, f64)> = (0..=steps)
            .map(|s| {
                let a = 2.0 * std::f64::consts::PI * s as f64 / steps as f64;
                (cx + radius * a.cos(), cy + radius * a.sin())
            })
            .collect();
        self.draw_polyline(&pts, color);
    }

    /// Draw text with the built-in 5x7 font; `(x, y)` is the top-left
    /// corner, `scale` the integer cell size.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, scale: u32, color: Rgb<u8>) {
        let s = scale as i32;
        let mut pen_x = x;
        for c in text.chars() {
            let cols = font::glyph(c);
            for (ci, col) in cols.iter().enumerate() {
                for row in 0..font::GLYPH_H {
                    if col >> row & 1 == 1 {
                        let px = pen_x + ci as i32 * s;
                        let py = y + row as i32 * s;
                        for sy in 0..s {
                            for sx in 0..s {
                                self.set_pixel(px + sx, py + sy, color);
                            }
                        }
                    }
                }
            }
            pen_x += font::ADVANCE as i32 * s;
        }
    }

    /// Draw text horizontally centered on `cx`.
    pub fn draw_text_centered(&mut self, cx: i32, y: i32, text: &str, scale: u32, color: Rgb<u8>) {
        let w = font::text_width(text, scale) as i32;
        self.draw_text(cx - w / 2, y, text, scale, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    #[test]
    fn test_pixel_bounds() {
        let mut c = Canvas::new(4, 4, WHITE);
        c.set_pixel(-1, 0, BLACK);
        c.set_pixel(0, 4, BLACK);
        c.set_pixel(2, 2, BLACK);
        assert_eq!(*c.image().get_pixel(2, 2), BLACK);
        assert_eq!(*c.image().get_pixel(0, 0), WHITE);
    }

    #[test]
    fn test_clip() {
        let mut c = Canvas::new(8, 8, WHITE);
        c.set_clip(Some(PixelRect::new(2, 2, 5, 5)));
        c.draw_line(0.0, 3.0, 7.0, 3.0, BLACK);
        assert_eq!(*c.image().get_pixel(0, 3), WHITE);
        assert_eq!(*c.image().get_pixel(3, 3), BLACK);
        assert_eq!(*c.image().get_pixel(7, 3), WHITE);

        c.set_clip(None);
        c.draw_line(0.0, 6.0, 7.0, 6.0, BLACK);
        assert_eq!(*c.image().get_pixel(0, 6), BLACK);
    }

    #[test]
    fn test_horizontal_line() {
        let mut c = Canvas::new(10, 3, WHITE);
        c.draw_line(1.0, 1.0, 8.0, 1.0, BLACK);
        for x in 1..=8 {
            assert_eq!(*c.image().get_pixel(x, 1), BLACK);
        }
    }

    #[test]
    fn test_fill_polygon_triangle() {
        let mut c = Canvas::new(20, 20, WHITE);
        c.fill_polygon(
            &[(2.0, 2.0), (17.0, 2.0), (2.0, 17.0)],
            BLACK,
        );
        // Centroid-ish point inside
        assert_eq!(*c.image().get_pixel(5, 5), BLACK);
        // Far corner outside the hypotenuse
        assert_eq!(*c.image().get_pixel(17, 17), WHITE);
    }

    #[test]
    fn test_fill_rect() {
        let mut c = Canvas::new(6, 6, WHITE);
        c.fill_rect(PixelRect::new(1, 1, 3, 2), BLACK);
        assert_eq!(*c.image().get_pixel(3, 2), BLACK);
        assert_eq!(*c.image().get_pixel(4, 2), WHITE);
    }
}
