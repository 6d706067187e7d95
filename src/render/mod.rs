//! Figure rendering to PNG.
//!
//! A [`Figure`] owns a pixel canvas and hands out [`Panel`]s, each a
//! rectangular axes area with a data-coordinate extent. Panels shade
//! filled contours, draw contour lines with inline labels, wind barbs,
//! line plots, and coastline/border overlays, all rasterized in
//! software onto an RGB image.
//!
//! # Example
//!
//! ```rust,ignore
//! use wrfvis::render::{Colormap, Extend, Extent, Figure};
//!
//! let mut fig = Figure::single();
//! let extent = Extent::of_field(&t2);
//! let mut panel = fig.panel(0, 1, extent);
//! let levels = wrfvis::render::level_range(t2.min() as f64, t2.max() as f64, 2.0);
//! panel.contourf(&t2, &levels, &Colormap::rainbow(), Extend::Max);
//! panel.colorbar(&levels, &Colormap::rainbow(), Extend::Max);
//! panel.axes();
//! panel.title("T2m and winds");
//! fig.save("T2m_uv10_time_0.png")?;
//! ```

pub mod barbs;
pub mod canvas;
pub mod colormap;
pub mod contour;
mod font;

pub use canvas::{Canvas, PixelRect, RenderError};
pub use colormap::Colormap;
pub use contour::{band_index, iso_lines, level_arange, level_range};

use image::Rgb;

use crate::grid::{CrossSection, Field2D};
use crate::interp;

// ============================================================
// Layout constants
// ============================================================

const MARGIN_LEFT: i32 = 58;
const MARGIN_RIGHT: i32 = 74;
const MARGIN_TOP: i32 = 32;
const MARGIN_BOTTOM: i32 = 42;

const COLORBAR_GAP: i32 = 14;
const COLORBAR_WIDTH: i32 = 14;

const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const GRID_GREY: Rgb<u8> = Rgb([170, 170, 170]);

/// Per-cell subdivision factor for filled contours: smooths band edges
/// on coarse grids without a full marching-squares fill.
const SHADE_SUBDIV: usize = 4;

// ============================================================
// Geometry
// ============================================================

/// Data-coordinate bounds of a panel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Extent {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self { x_min, x_max, y_min, y_max }
    }

    /// Extent covering a field's horizontal coordinates.
    pub fn of_field(field: &Field2D) -> Self {
        let (x_min, x_max) = field.coords.x_range();
        let (y_min, y_max) = field.coords.y_range();
        Self { x_min, x_max, y_min, y_max }
    }

    /// Extent of a cross-section: sample index along x, height along y,
    /// capped above at `y_top`.
    pub fn of_section(section: &CrossSection, y_top: f64) -> Self {
        Self {
            x_min: 0.0,
            x_max: (section.n_points().max(2) - 1) as f64,
            y_min: *section.levels.first().unwrap_or(&0.0),
            y_max: y_top,
        }
    }

    fn x_span(&self) -> f64 {
        self.x_max - self.x_min
    }

    fn y_span(&self) -> f64 {
        self.y_max - self.y_min
    }
}

/// How values outside the level range are shaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Extend {
    /// Out-of-range values stay unshaded
    Neither,
    /// Values below the first level take the low end of the colormap
    Min,
    /// Values above the last level take the high end of the colormap
    Max,
    /// Both of the above
    Both,
}

impl Extend {
    fn low(self) -> bool {
        matches!(self, Extend::Min | Extend::Both)
    }

    fn high(self) -> bool {
        matches!(self, Extend::Max | Extend::Both)
    }
}

// ============================================================
// Figure
// ============================================================

/// A whole output image; panels are carved out of it on demand.
pub struct Figure {
    canvas: Canvas,
}

impl Figure {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: Canvas::new(width, height, WHITE),
        }
    }

    /// Standard single-panel figure.
    pub fn single() -> Self {
        Self::new(680, 500)
    }

    /// Standard side-by-side two-panel figure.
    pub fn two_panel() -> Self {
        Self::new(980, 440)
    }

    /// Panel `index` of `of` equal columns, with the given data extent.
    ///
    /// # Panics
    ///
    /// Panics if `index >= of` or the column is too narrow for the
    /// margins.
    pub fn panel(&mut self, index: usize, of: usize, extent: Extent) -> Panel<'_> {
        assert!(index < of, "panel index {index} out of {of}");
        let col_w = self.canvas.width() as i32 / of as i32;
        let x_off = index as i32 * col_w;
        let area = PixelRect::new(
            x_off + MARGIN_LEFT,
            MARGIN_TOP,
            x_off + col_w - 1 - MARGIN_RIGHT,
            self.canvas.height() as i32 - 1 - MARGIN_BOTTOM,
        );
        assert!(
            area.width() > 10 && area.height() > 10,
            "panel area too small"
        );
        Panel {
            canvas: &mut self.canvas,
            area,
            extent,
        }
    }

    /// Write the figure as a PNG file.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), RenderError> {
        self.canvas.save(path)
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }
}

// ============================================================
// Panel
// ============================================================

/// One axes area of a figure, mapping data coordinates to pixels.
pub struct Panel<'a> {
    canvas: &'a mut Canvas,
    area: PixelRect,
    extent: Extent,
}

impl Panel<'_> {
    fn x_to_px(&self, x: f64) -> f64 {
        let f = (x - self.extent.x_min) / self.extent.x_span();
        self.area.x0 as f64 + f * (self.area.width() - 1) as f64
    }

    /// Pixel rows grow downward, data y grows upward.
    fn y_to_px(&self, y: f64) -> f64 {
        let f = (y - self.extent.y_min) / self.extent.y_span();
        self.area.y1 as f64 - f * (self.area.height() - 1) as f64
    }

    fn to_px(&self, x: f64, y: f64) -> (f64, f64) {
        (self.x_to_px(x), self.y_to_px(y))
    }

    // ------------------------------------------------------------
    // Filled contours
    // ------------------------------------------------------------

    /// Shade a field into color bands between `levels`.
    pub fn contourf(
        &mut self,
        field: &Field2D,
        levels: &[f64],
        cmap: &Colormap,
        extend: Extend,
    ) {
        let coords = &field.coords;
        self.shade(&field.data, levels, cmap, extend, &|yj, xi| {
            coords.at_fractional(yj, xi)
        });
    }

    /// Shade a vertical cross-section; x is the sample index, y the
    /// target height.
    pub fn contourf_section(
        &mut self,
        section: &CrossSection,
        levels: &[f64],
        cmap: &Colormap,
        extend: Extend,
    ) {
        let z0 = *section.levels.first().unwrap_or(&0.0);
        let dz = if section.n_levels() > 1 {
            section.levels[1] - section.levels[0]
        } else {
            1.0
        };
        self.shade(&section.values, levels, cmap, extend, &|yj, xi| {
            (xi, z0 + yj * dz)
        });
    }

    /// Subdivide every grid cell and fill each piece as a quad colored
    /// by its center value. `coord_at` maps fractional grid indices
    /// `(yj, xi)` to data coordinates.
    fn shade(
        &mut self,
        data: &[Vec<f32>],
        levels: &[f64],
        cmap: &Colormap,
        extend: Extend,
        coord_at: &dyn Fn(f64, f64) -> (f64, f64),
    ) {
        if levels.len() < 2 || data.len() < 2 || data[0].len() < 2 {
            return;
        }
        let ny = data.len();
        let nx = data[0].len();
        let n_bands = levels.len() - 1;
        let step = 1.0 / SHADE_SUBDIV as f64;

        self.canvas.set_clip(Some(self.area));
        for j in 0..ny - 1 {
            for i in 0..nx - 1 {
                for sj in 0..SHADE_SUBDIV {
                    for si in 0..SHADE_SUBDIV {
                        let yj = j as f64 + sj as f64 * step;
                        let xi = i as f64 + si as f64 * step;
                        let v = interp::bilinear(data, yj + step / 2.0, xi + step / 2.0);
                        if !v.is_finite() {
                            continue;
                        }
                        let color = match band_index(levels, v as f64) {
                            Some(k) => {
                                let t = if n_bands > 1 {
                                    k as f64 / (n_bands - 1) as f64
                                } else {
                                    0.5
                                };
                                cmap.sample(t)
                            }
                            None if (v as f64) < levels[0] && extend.low() => cmap.sample(0.0),
                            None if (v as f64) >= levels[n_bands] && extend.high() => {
                                cmap.sample(1.0)
                            }
                            None => continue,
                        };
                        let quad = [
                            (yj, xi),
                            (yj, xi + step),
                            (yj + step, xi + step),
                            (yj + step, xi),
                        ]
                        .map(|(fy, fx)| {
                            let (x, y) = coord_at(fy, fx);
                            self.to_px(x, y)
                        });
                        self.canvas.fill_polygon(&quad, color);
                    }
                }
            }
        }
        self.canvas.set_clip(None);
    }

    /// Vertical colorbar to the right of the panel, one swatch per band,
    /// with level labels on its right edge.
    pub fn colorbar(&mut self, levels: &[f64], cmap: &Colormap, extend: Extend) {
        if levels.len() < 2 {
            return;
        }
        let n_bands = levels.len() - 1;
        let x0 = self.area.x1 + COLORBAR_GAP;
        let x1 = x0 + COLORBAR_WIDTH;
        let bar = PixelRect::new(x0, self.area.y0, x1, self.area.y1);
        let band_h = bar.height() as f64 / n_bands as f64;

        for k in 0..n_bands {
            let t = if n_bands > 1 {
                k as f64 / (n_bands - 1) as f64
            } else {
                0.5
            };
            // Band 0 at the bottom
            let top = bar.y1 - ((k + 1) as f64 * band_h).round() as i32 + 1;
            let bottom = bar.y1 - (k as f64 * band_h).round() as i32;
            self.canvas
                .fill_rect(PixelRect::new(x0, top, x1, bottom), cmap.sample(t));
        }
        if extend.high() {
            // Arrow head above the bar for overflow values
            let cx = (x0 + x1) as f64 / 2.0;
            self.canvas.fill_polygon(
                &[
                    (x0 as f64, bar.y0 as f64),
                    (x1 as f64, bar.y0 as f64),
                    (cx, bar.y0 as f64 - 9.0),
                ],
                cmap.sample(1.0),
            );
        }
        if extend.low() {
            let cx = (x0 + x1) as f64 / 2.0;
            self.canvas.fill_polygon(
                &[
                    (x0 as f64, bar.y1 as f64),
                    (x1 as f64, bar.y1 as f64),
                    (cx, bar.y1 as f64 + 9.0),
                ],
                cmap.sample(0.0),
            );
        }
        self.canvas.draw_line(
            x0 as f64 - 1.0,
            bar.y0 as f64,
            x0 as f64 - 1.0,
            bar.y1 as f64,
            BLACK,
        );

        // Label at most ~8 edges to keep them readable
        let label_stride = (levels.len() / 8).max(1);
        for (k, &level) in levels.iter().enumerate().step_by(label_stride) {
            let y = bar.y1 - (k as f64 * band_h).round() as i32;
            self.canvas.draw_line(x1 as f64, y as f64, (x1 + 3) as f64, y as f64, BLACK);
            self.canvas
                .draw_text(x1 + 5, y - 3, &format_tick(level), 1, BLACK);
        }
    }

    // ------------------------------------------------------------
    // Contour lines
    // ------------------------------------------------------------

    /// Draw contour lines at each level; `labeled` puts the level value
    /// on a white patch halfway along lines long enough to carry one.
    pub fn contour(&mut self, field: &Field2D, levels: &[f64], color: Rgb<u8>, labeled: bool) {
        self.canvas.set_clip(Some(self.area));
        let mut labels: Vec<(i32, i32, String)> = Vec::new();

        for &level in levels {
            for line in iso_lines(&field.data, level) {
                let px: Vec<(f64, f64)> = line
                    .iter()
                    .map(|&(xi, yj)| {
                        let (x, y) = field.coords.at_fractional(yj, xi);
                        self.to_px(x, y)
                    })
                    .collect();
                self.canvas.draw_polyline(&px, color);
                if labeled && px.len() >= 8 {
                    let (lx, ly) = px[px.len() / 2];
                    labels.push((lx.round() as i32, ly.round() as i32, format_tick(level)));
                }
            }
        }
        // Patches go on after all lines so labels stay readable where
        // contours cross
        for (lx, ly, text) in labels {
            let w = font::text_width(&text, 1) as i32;
            self.canvas.fill_rect(
                PixelRect::new(lx - w / 2 - 1, ly - 4, lx + w / 2 + 1, ly + 4),
                WHITE,
            );
            self.canvas.draw_text_centered(lx, ly - 3, &text, 1, color);
        }
        self.canvas.set_clip(None);
    }

    // ------------------------------------------------------------
    // Wind barbs
    // ------------------------------------------------------------

    /// Wind barbs every `stride` grid points. `u` and `v` must share a
    /// grid.
    pub fn barbs(&mut self, u: &Field2D, v: &Field2D, stride: usize, color: Rgb<u8>) {
        assert_eq!(
            (u.ny(), u.nx()),
            (v.ny(), v.nx()),
            "wind component shape mismatch"
        );
        let stride = stride.max(1);
        self.canvas.set_clip(Some(self.area));
        for j in (0..u.ny()).step_by(stride) {
            for i in (0..u.nx()).step_by(stride) {
                let (px, py) = self.to_px(u.coords.x_at(j, i), u.coords.y_at(j, i));
                barbs::draw_barb(
                    self.canvas,
                    px,
                    py,
                    u.data[j][i] as f64,
                    v.data[j][i] as f64,
                    color,
                );
            }
        }
        self.canvas.set_clip(None);
    }

    // ------------------------------------------------------------
    // Lines, markers, overlays
    // ------------------------------------------------------------

    /// Line plot through `(xs, ys)` with optional circle markers.
    pub fn plot(&mut self, xs: &[f64], ys: &[f64], color: Rgb<u8>, markers: bool) {
        assert_eq!(xs.len(), ys.len(), "series length mismatch");
        self.canvas.set_clip(Some(self.area));
        let px: Vec<(f64, f64)> = xs
            .iter()
            .zip(ys)
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(&x, &y)| self.to_px(x, y))
            .collect();
        self.canvas.draw_polyline(&px, color);
        if markers {
            for &(x, y) in &px {
                self.canvas.fill_circle(x, y, 2.5, color);
            }
        }
        self.canvas.set_clip(None);
    }

    /// Single marker at a data point.
    pub fn marker(&mut self, x: f64, y: f64, color: Rgb<u8>) {
        let (px, py) = self.to_px(x, y);
        if self.area.contains(px.round() as i32, py.round() as i32) {
            self.canvas.fill_circle(px, py, 3.5, color);
            self.canvas.draw_circle(px, py, 3.5, BLACK);
        }
    }

    /// Draw overlay segments (coastlines, borders) given as data-space
    /// polylines, clipped to the panel.
    pub fn overlay(&mut self, segments: &[Vec<(f64, f64)>], color: Rgb<u8>) {
        self.canvas.set_clip(Some(self.area));
        for segment in segments {
            let px: Vec<(f64, f64)> = segment.iter().map(|&(x, y)| self.to_px(x, y)).collect();
            self.canvas.draw_polyline(&px, color);
        }
        self.canvas.set_clip(None);
    }

    /// Fill the area between a curve and a horizontal baseline, for
    /// terrain silhouettes under cross-sections.
    pub fn fill_below(&mut self, xs: &[f64], ys: &[f64], base: f64, color: Rgb<u8>) {
        assert_eq!(xs.len(), ys.len(), "series length mismatch");
        if xs.len() < 2 {
            return;
        }
        self.canvas.set_clip(Some(self.area));
        let mut poly: Vec<(f64, f64)> = xs
            .iter()
            .zip(ys)
            .map(|(&x, &y)| self.to_px(x, y))
            .collect();
        poly.push(self.to_px(xs[xs.len() - 1], base));
        poly.push(self.to_px(xs[0], base));
        self.canvas.fill_polygon(&poly, color);
        self.canvas.set_clip(None);
    }

    // ------------------------------------------------------------
    // Axes decoration
    // ------------------------------------------------------------

    /// Frame, default numeric ticks on both axes, and their labels.
    pub fn axes(&mut self) {
        self.frame();
        let xt = nice_ticks(self.extent.x_min, self.extent.x_max);
        for &x in &xt {
            let px = self.x_to_px(x).round() as i32;
            self.canvas
                .draw_line(px as f64, self.area.y1 as f64, px as f64, (self.area.y1 + 4) as f64, BLACK);
            self.canvas
                .draw_text_centered(px, self.area.y1 + 8, &format_tick(x), 1, BLACK);
        }
        self.y_ticks();
    }

    /// Frame plus custom x tick labels at data positions, with default
    /// y ticks. Used where x positions stand for something else, like
    /// coordinates along a cross-section path.
    pub fn axes_with_x_labels(&mut self, positions: &[f64], labels: &[String]) {
        assert_eq!(positions.len(), labels.len(), "tick label count mismatch");
        self.frame();
        for (&x, label) in positions.iter().zip(labels) {
            let px = self.x_to_px(x).round() as i32;
            self.canvas
                .draw_line(px as f64, self.area.y1 as f64, px as f64, (self.area.y1 + 4) as f64, BLACK);
            self.canvas.draw_text_centered(px, self.area.y1 + 8, label, 1, BLACK);
        }
        self.y_ticks();
    }

    fn frame(&mut self) {
        let (x0, y0, x1, y1) = (
            self.area.x0 as f64,
            self.area.y0 as f64,
            self.area.x1 as f64,
            self.area.y1 as f64,
        );
        self.canvas.draw_line(x0, y0, x1, y0, BLACK);
        self.canvas.draw_line(x1, y0, x1, y1, BLACK);
        self.canvas.draw_line(x1, y1, x0, y1, BLACK);
        self.canvas.draw_line(x0, y1, x0, y0, BLACK);
    }

    fn y_ticks(&mut self) {
        let yt = nice_ticks(self.extent.y_min, self.extent.y_max);
        for &y in &yt {
            let py = self.y_to_px(y).round() as i32;
            self.canvas
                .draw_line((self.area.x0 - 4) as f64, py as f64, self.area.x0 as f64, py as f64, BLACK);
            let label = format_tick(y);
            let w = font::text_width(&label, 1) as i32;
            self.canvas
                .draw_text(self.area.x0 - 7 - w, py - 3, &label, 1, BLACK);
        }
    }

    /// Dotted graticule at the default tick positions.
    pub fn grid_lines(&mut self) {
        self.canvas.set_clip(Some(self.area));
        for &x in &nice_ticks(self.extent.x_min, self.extent.x_max) {
            let px = self.x_to_px(x).round() as i32;
            let mut y = self.area.y0;
            while y <= self.area.y1 {
                self.canvas.set_pixel(px, y, GRID_GREY);
                y += 4;
            }
        }
        for &y in &nice_ticks(self.extent.y_min, self.extent.y_max) {
            let py = self.y_to_px(y).round() as i32;
            let mut x = self.area.x0;
            while x <= self.area.x1 {
                self.canvas.set_pixel(x, py, GRID_GREY);
                x += 4;
            }
        }
        self.canvas.set_clip(None);
    }

    /// Title centered above the panel.
    pub fn title(&mut self, text: &str) {
        let cx = (self.area.x0 + self.area.x1) / 2;
        self.canvas
            .draw_text_centered(cx, self.area.y0 - 16, text, 1, BLACK);
    }

    /// Axis caption centered under the x tick labels.
    pub fn x_label(&mut self, text: &str) {
        let cx = (self.area.x0 + self.area.x1) / 2;
        self.canvas
            .draw_text_centered(cx, self.area.y1 + 22, text, 1, BLACK);
    }

    /// Axis caption above the top-left corner, next to the title row.
    pub fn y_label(&mut self, text: &str) {
        self.canvas
            .draw_text(self.area.x0 - MARGIN_LEFT + 4, self.area.y0 - 16, text, 1, BLACK);
    }

    /// Legend box in the top-right corner of the panel.
    pub fn legend(&mut self, entries: &[(&str, Rgb<u8>)]) {
        if entries.is_empty() {
            return;
        }
        let text_w = entries
            .iter()
            .map(|(name, _)| font::text_width(name, 1))
            .max()
            .unwrap_or(0) as i32;
        let box_w = text_w + 28;
        let box_h = entries.len() as i32 * 11 + 6;
        let x1 = self.area.x1 - 4;
        let x0 = x1 - box_w;
        let y0 = self.area.y0 + 4;
        let rect = PixelRect::new(x0, y0, x1, y0 + box_h);

        self.canvas.fill_rect(rect, WHITE);
        self.canvas.draw_line(x0 as f64, y0 as f64, x1 as f64, y0 as f64, BLACK);
        self.canvas
            .draw_line(x1 as f64, y0 as f64, x1 as f64, rect.y1 as f64, BLACK);
        self.canvas
            .draw_line(x1 as f64, rect.y1 as f64, x0 as f64, rect.y1 as f64, BLACK);
        self.canvas
            .draw_line(x0 as f64, rect.y1 as f64, x0 as f64, y0 as f64, BLACK);

        for (k, (name, color)) in entries.iter().enumerate() {
            let y = y0 + 6 + k as i32 * 11;
            self.canvas
                .draw_line((x0 + 4) as f64, (y + 3) as f64, (x0 + 18) as f64, (y + 3) as f64, *color);
            self.canvas.draw_text(x0 + 22, y, name, 1, BLACK);
        }
    }
}

// ============================================================
// Tick helpers
// ============================================================

/// Tick positions on a 1-2-5 scale, aiming for five to eight ticks.
pub fn nice_ticks(min: f64, max: f64) -> Vec<f64> {
    let span = max - min;
    if !(span.is_finite() && span > 0.0) {
        return vec![min];
    }
    let raw_step = span / 6.0;
    let mag = 10f64.powf(raw_step.log10().floor());
    let norm = raw_step / mag;
    let step = if norm < 1.5 {
        mag
    } else if norm < 3.5 {
        2.0 * mag
    } else if norm < 7.5 {
        5.0 * mag
    } else {
        10.0 * mag
    };

    let first = (min / step).ceil() * step;
    let mut ticks = Vec::new();
    let mut k = 0u32;
    loop {
        let v = first + k as f64 * step;
        if v > max + step * 1e-9 {
            break;
        }
        // Snap values like -0.0000000001 back onto zero
        ticks.push(if v.abs() < step * 1e-9 { 0.0 } else { v });
        k += 1;
    }
    ticks
}

/// Compact numeric label: integers without decimals, small values with
/// one decimal place.
pub fn format_tick(v: f64) -> String {
    if (v - v.round()).abs() < 1e-6 {
        format!("{:.0}", v)
    } else {
        format!("{:.1}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Coords2D;

    fn ramp_field(ny: usize, nx: usize) -> Field2D {
        let data = (0..ny)
            .map(|j| (0..nx).map(|i| (j + i) as f32).collect())
            .collect();
        Field2D::new("ramp", "1", data, Coords2D::index(ny, nx))
    }

    #[test]
    fn test_nice_ticks_cover_range() {
        let ticks = nice_ticks(-31.5, -28.2);
        assert!(!ticks.is_empty());
        assert!(ticks.iter().all(|&t| t >= -31.5 && t <= -28.2));
        let step = ticks[1] - ticks[0];
        for w in ticks.windows(2) {
            assert!((w[1] - w[0] - step).abs() < 1e-9);
        }
    }

    #[test]
    fn test_nice_ticks_degenerate_span() {
        assert_eq!(nice_ticks(5.0, 5.0), vec![5.0]);
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(300.0), "300");
        assert_eq!(format_tick(-31.1), "-31.1");
        assert_eq!(format_tick(0.0), "0");
    }

    #[test]
    fn test_panel_pixel_mapping_inverts_y() {
        let mut fig = Figure::new(300, 200);
        let panel = fig.panel(0, 1, Extent::new(0.0, 10.0, 0.0, 5.0));
        let (_, py_low) = panel.to_px(0.0, 0.0);
        let (_, py_high) = panel.to_px(0.0, 5.0);
        assert!(py_high < py_low, "larger y must map to smaller row");
        let (px0, _) = panel.to_px(0.0, 0.0);
        let (px1, _) = panel.to_px(10.0, 0.0);
        assert!(px1 > px0);
    }

    #[test]
    fn test_contourf_shades_inside_area() {
        let field = ramp_field(6, 8);
        let levels = level_range(field.min() as f64, field.max() as f64, 2.0);
        let mut fig = Figure::single();
        let mut panel = fig.panel(0, 1, Extent::of_field(&field));
        panel.contourf(&field, &levels, &Colormap::rainbow(), Extend::Neither);
        drop(panel);
        let non_white = fig
            .canvas()
            .image()
            .pixels()
            .filter(|&&p| p != Rgb([255, 255, 255]))
            .count();
        assert!(non_white > 1000, "shaded pixels: {non_white}");
    }

    #[test]
    fn test_contourf_deterministic() {
        let field = ramp_field(5, 5);
        let levels = level_range(field.min() as f64, field.max() as f64, 2.0);
        let render = || {
            let mut fig = Figure::single();
            let mut panel = fig.panel(0, 1, Extent::of_field(&field));
            panel.contourf(&field, &levels, &Colormap::rainbow(), Extend::Both);
            panel.colorbar(&levels, &Colormap::rainbow(), Extend::Both);
            panel.axes();
            fig.canvas().image().clone()
        };
        assert_eq!(render(), render(), "same inputs must give identical pixels");
    }

    #[test]
    fn test_two_panel_areas_disjoint() {
        let mut fig = Figure::two_panel();
        let a = fig.panel(0, 2, Extent::new(0.0, 1.0, 0.0, 1.0)).area;
        let b = fig.panel(1, 2, Extent::new(0.0, 1.0, 0.0, 1.0)).area;
        assert!(a.x1 < b.x0, "panel areas overlap: {a:?} vs {b:?}");
    }

    #[test]
    #[should_panic(expected = "panel index")]
    fn test_panel_index_out_of_range() {
        let mut fig = Figure::single();
        let _ = fig.panel(1, 1, Extent::new(0.0, 1.0, 0.0, 1.0));
    }
}
