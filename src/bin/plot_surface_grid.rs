//! Surface temperature and wind over an idealized domain.
//!
//! Plots 2 m temperature as filled contours with labeled 10 m
//! wind-speed contours and wind barbs on grid-index axes, from one
//! time step of a wrfout sequence.
//!
//! Run with: cargo run --bin plot_surface_grid

use std::error::Error;

use image::Rgb;

use wrfvis::diag;
use wrfvis::io::{discover_wrfout, select_time, WrfFile};
use wrfvis::render::{level_range, Colormap, Extend, Extent, Figure};

const WRF_DIR: &str = ".";
const FILE_PREFIX: &str = "wrfout_d01_";
const PLOT_TIME: usize = 20;
const FIGURE_NAME: &str = "T2m_uv10";
const BARB_STRIDE: usize = 2;

/// Labeled wind-speed contour values (m/s).
const SPEED_LEVELS: [f64; 4] = [1.0, 5.0, 10.0, 15.0];

fn main() -> Result<(), Box<dyn Error>> {
    let files = discover_wrfout(WRF_DIR, FILE_PREFIX)?;
    println!("Found {} wrfout files under {}", files.len(), WRF_DIR);

    let path = select_time(&files, PLOT_TIME)?;
    println!("Reading time index {}: {}", PLOT_TIME, path.display());
    let file = WrfFile::open(path)?;

    let t2 = diag::temperature_2m(&file)?;
    let (u10, v10) = diag::wind_10m(&file)?;
    let speed = diag::wind_speed(&u10, &v10);
    let when = file.valid_time()?;
    println!(
        "T2 range: {:.1} .. {:.1} K at {}",
        t2.min(),
        t2.max(),
        when
    );

    let levels = level_range(t2.min() as f64, t2.max() as f64, 2.0);
    let cmap = Colormap::rainbow();

    let mut fig = Figure::single();
    let mut panel = fig.panel(0, 1, Extent::of_field(&t2));
    panel.contourf(&t2, &levels, &cmap, Extend::Max);
    panel.colorbar(&levels, &cmap, Extend::Max);
    panel.contour(&speed, &SPEED_LEVELS, Rgb([0, 0, 0]), true);
    panel.barbs(&u10, &v10, BARB_STRIDE, Rgb([0, 0, 0]));
    panel.grid_lines();
    panel.axes();
    panel.title(&format!(
        "2 m temperature (K) and 10 m wind, {}",
        when.format("%Y-%m-%d %H:%M")
    ));
    drop(panel);

    let out = format!("{FIGURE_NAME}_time_{PLOT_TIME}.png");
    fig.save(&out)?;
    println!("Wrote {out}");

    Ok(())
}
