//! Wind barb glyphs drawn in pixel space.
//!
//! Feathers follow the usual station-model convention: a pennant for
//! every 50 units of speed, a full barb for 10, a half barb for 5,
//! rounded to the nearest 5. Speeds below 2.5 draw a calm circle.

use image::Rgb;

use super::canvas::Canvas;

const STAFF_LEN: f64 = 18.0;
const FEATHER_LEN: f64 = 7.0;
const FEATHER_SPACING: f64 = 3.2;

/// Draw one wind barb at pixel `(px, py)` for wind components `(u, v)`,
/// with `v > 0` pointing up on screen.
pub fn draw_barb(canvas: &mut Canvas, px: f64, py: f64, u: f64, v: f64, color: Rgb<u8>) {
    let speed = (u * u + v * v).sqrt();
    if !speed.is_finite() {
        return;
    }
    if speed < 2.5 {
        canvas.draw_circle(px, py, 2.0, color);
        return;
    }

    // Staff points upwind from the station; canvas y grows downward
    let dx = -u / speed;
    let dy = v / speed;
    let tip_x = px + dx * STAFF_LEN;
    let tip_y = py + dy * STAFF_LEN;
    canvas.draw_line(px, py, tip_x, tip_y, color);

    // Feathers extend to the left of the wind vector
    let fx = -dy * FEATHER_LEN + dx * (FEATHER_LEN * 0.45);
    let fy = dx * FEATHER_LEN + dy * (FEATHER_LEN * 0.45);

    let mut remaining = ((speed / 5.0).round() * 5.0) as i64;
    let mut pos = 0.0f64; // distance from the upwind tip along the staff

    while remaining >= 50 {
        let (bx, by) = (tip_x - dx * pos, tip_y - dy * pos);
        let (nx, ny) = (tip_x - dx * (pos + FEATHER_SPACING), tip_y - dy * (pos + FEATHER_SPACING));
        canvas.fill_polygon(
            &[(bx, by), (bx + fx, by + fy), (nx, ny)],
            color,
        );
        pos += FEATHER_SPACING + 1.5;
        remaining -= 50;
    }
    while remaining >= 10 {
        let (bx, by) = (tip_x - dx * pos, tip_y - dy * pos);
        canvas.draw_line(bx, by, bx + fx, by + fy, color);
        pos += FEATHER_SPACING;
        remaining -= 10;
    }
    if remaining >= 5 {
        // A lone half barb sits one spacing in from the tip
        if pos == 0.0 {
            pos = FEATHER_SPACING;
        }
        let (bx, by) = (tip_x - dx * pos, tip_y - dy * pos);
        canvas.draw_line(bx, by, bx + fx * 0.5, by + fy * 0.5, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_colored(canvas: &Canvas, color: Rgb<u8>) -> usize {
        canvas
            .image()
            .pixels()
            .filter(|&&p| p == color)
            .count()
    }

    #[test]
    fn test_calm_draws_small_circle() {
        let mut canvas = Canvas::new(60, 60, Rgb([255, 255, 255]));
        draw_barb(&mut canvas, 30.0, 30.0, 1.0, 0.5, Rgb([0, 0, 0]));
        let n = count_colored(&canvas, Rgb([0, 0, 0]));
        assert!(n > 0 && n < 30, "calm circle pixel count: {n}");
    }

    #[test]
    fn test_stronger_wind_draws_more() {
        let mut weak = Canvas::new(80, 80, Rgb([255, 255, 255]));
        let mut strong = Canvas::new(80, 80, Rgb([255, 255, 255]));
        draw_barb(&mut weak, 40.0, 40.0, 5.0, 0.0, Rgb([0, 0, 0]));
        draw_barb(&mut strong, 40.0, 40.0, 55.0, 0.0, Rgb([0, 0, 0]));
        assert!(
            count_colored(&strong, Rgb([0, 0, 0])) > count_colored(&weak, Rgb([0, 0, 0])),
            "55 units should draw a pennant beyond the bare staff"
        );
    }

    #[test]
    fn test_nan_wind_is_skipped() {
        let mut canvas = Canvas::new(40, 40, Rgb([255, 255, 255]));
        draw_barb(&mut canvas, 20.0, 20.0, f64::NAN, 3.0, Rgb([0, 0, 0]));
        assert_eq!(count_colored(&canvas, Rgb([0, 0, 0])), 0);
    }
}
