//! Integration tests for figure composition.
//!
//! These render small figures entirely in memory and compare pixel
//! buffers, plus one save-to-disk check.

use image::Rgb;

use wrfvis::diag;
use wrfvis::grid::{Coords2D, Field2D};
use wrfvis::render::{level_range, Colormap, Extend, Extent, Figure};

fn gradient_field(ny: usize, nx: usize) -> Field2D {
    let data = (0..ny)
        .map(|j| (0..nx).map(|i| 280.0 + (j + 2 * i) as f32).collect())
        .collect();
    Field2D::new("T2", "K", data, Coords2D::index(ny, nx))
}

fn render_map(overlay: Option<&[Vec<(f64, f64)>]>) -> image::RgbImage {
    let field = gradient_field(8, 10);
    let levels = level_range(field.min() as f64, field.max() as f64, 2.0);

    let mut fig = Figure::single();
    let mut panel = fig.panel(0, 1, Extent::of_field(&field));
    panel.contourf(&field, &levels, &Colormap::rainbow(), Extend::Max);
    panel.colorbar(&levels, &Colormap::rainbow(), Extend::Max);
    if let Some(segments) = overlay {
        panel.overlay(segments, Rgb([60, 60, 60]));
    }
    panel.axes();
    panel.title("T2m");
    drop(panel);
    fig.canvas().image().clone()
}

#[test]
fn test_rendering_is_deterministic() {
    assert_eq!(
        render_map(None),
        render_map(None),
        "same inputs must give identical pixels"
    );
}

#[test]
fn test_disabled_overlay_changes_nothing() {
    let empty: Vec<Vec<(f64, f64)>> = Vec::new();
    assert_eq!(
        render_map(None),
        render_map(Some(&empty)),
        "an empty overlay must leave the figure untouched"
    );
}

#[test]
fn test_overlay_lines_are_drawn() {
    let border = vec![vec![(1.0, 1.0), (8.0, 1.0), (8.0, 6.0)]];
    assert_ne!(
        render_map(None),
        render_map(Some(&border)),
        "overlay lines must show up in the figure"
    );
}

/// Surface-workflow composition: filled temperature, labeled wind-speed
/// line contours, barbs. With and without the speed contours.
fn render_surface(with_speed_contours: bool) -> image::RgbImage {
    let field = gradient_field(8, 10);
    let levels = level_range(field.min() as f64, field.max() as f64, 2.0);

    let u = Field2D::new(
        "U10",
        "m s-1",
        (0..8).map(|_| (0..10).map(|i| i as f32 * 2.0).collect()).collect(),
        Coords2D::index(8, 10),
    );
    let v = Field2D::new(
        "V10",
        "m s-1",
        vec![vec![0.0; 10]; 8],
        Coords2D::index(8, 10),
    );
    let speed = diag::wind_speed(&u, &v);

    let mut fig = Figure::single();
    let mut panel = fig.panel(0, 1, Extent::of_field(&field));
    panel.contourf(&field, &levels, &Colormap::rainbow(), Extend::Max);
    if with_speed_contours {
        panel.contour(&speed, &[1.0, 5.0, 10.0, 15.0], Rgb([0, 0, 0]), true);
    }
    panel.barbs(&u, &v, 2, Rgb([0, 0, 0]));
    panel.axes();
    drop(panel);
    fig.canvas().image().clone()
}

#[test]
fn test_wind_speed_contours_are_drawn() {
    assert_ne!(
        render_surface(false),
        render_surface(true),
        "labeled wind-speed contours must show up over the filled field"
    );
}

#[test]
fn test_plot_markers_change_the_line() {
    let xs = [1.0, 8.0];
    let ys = [2.0, 6.0];
    let render = |markers: bool| {
        let mut fig = Figure::single();
        let mut panel = fig.panel(0, 1, Extent::new(0.0, 9.0, 0.0, 7.0));
        panel.plot(&xs, &ys, Rgb([200, 0, 0]), markers);
        drop(panel);
        fig.canvas().image().clone()
    };
    assert_ne!(
        render(false),
        render(true),
        "endpoint markers must be visible on the section line"
    );
}

#[test]
fn test_save_writes_png() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let out = dir.path().join("T2m_time_0.png");

    let field = gradient_field(6, 6);
    let levels = level_range(field.min() as f64, field.max() as f64, 2.0);
    let mut fig = Figure::single();
    let mut panel = fig.panel(0, 1, Extent::of_field(&field));
    panel.contourf(&field, &levels, &Colormap::rainbow(), Extend::Neither);
    panel.axes();
    drop(panel);
    fig.save(&out).expect("save figure");

    let meta = std::fs::metadata(&out).expect("output file exists");
    assert!(meta.len() > 0, "PNG file is empty");
    let img = image::open(&out).expect("file reads back as an image");
    assert_eq!(img.to_rgb8().dimensions(), (680, 500));
}
