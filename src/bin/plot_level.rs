//! Temperature and wind interpolated to a constant height level.
//!
//! Interpolates 3D temperature and rotated winds onto a fixed height
//! above sea level, then plots filled temperature contours, labeled
//! wind-speed contours, and wind barbs.
//!
//! Run with: cargo run --bin plot_level

use std::error::Error;

use image::Rgb;

use wrfvis::diag;
use wrfvis::interp::interp_to_level;
use wrfvis::io::{discover_wrfout, select_time, MapOverlay, WrfFile};
use wrfvis::render::{level_range, Colormap, Extend, Extent, Figure};

const WRF_DIR: &str = ".";
const FILE_PREFIX: &str = "wrfout_d01_";
const PLOT_TIME: usize = 0;
const FIGURE_NAME: &str = "T_uv";
const BARB_STRIDE: usize = 10;

/// Draw coastlines and province borders from `OVERLAY_PATH`.
const PLOT_MAP: bool = true;
const OVERLAY_PATH: &str = "map_lines.txt";

/// Target height above sea level (m).
const LEVEL: f64 = 5000.0;

/// Labeled wind-speed contour values (m/s).
const SPEED_LEVELS: [f64; 4] = [1.0, 5.0, 10.0, 15.0];

fn main() -> Result<(), Box<dyn Error>> {
    let files = discover_wrfout(WRF_DIR, FILE_PREFIX)?;
    println!("Found {} wrfout files under {}", files.len(), WRF_DIR);

    let path = select_time(&files, PLOT_TIME)?;
    println!("Reading time index {}: {}", PLOT_TIME, path.display());
    let file = WrfFile::open(path)?;

    let tk = diag::temperature(&file)?;
    let (u, v) = diag::wind(&file)?;
    let z = diag::geopotential_height(&file)?;
    let when = file.valid_time()?;

    println!("Interpolating to {LEVEL} m");
    let t_lev = interp_to_level(&tk, &z, LEVEL)?;
    let u_lev = interp_to_level(&u, &z, LEVEL)?;
    let v_lev = interp_to_level(&v, &z, LEVEL)?;
    let speed = diag::wind_speed(&u_lev, &v_lev);

    let levels = level_range(t_lev.min() as f64, t_lev.max() as f64, 2.0);
    let cmap = Colormap::rainbow();

    let mut fig = Figure::single();
    let mut panel = fig.panel(0, 1, Extent::of_field(&t_lev));
    panel.contourf(&t_lev, &levels, &cmap, Extend::Max);
    panel.colorbar(&levels, &cmap, Extend::Max);
    panel.contour(&speed, &SPEED_LEVELS, Rgb([0, 0, 0]), true);
    panel.barbs(&u_lev, &v_lev, BARB_STRIDE, Rgb([0, 0, 0]));

    if PLOT_MAP {
        let overlay = MapOverlay::load(OVERLAY_PATH)?;
        for name in ["samerica", "provincias"] {
            match overlay.get(name) {
                Some(set) => panel.overlay(&set.segments, Rgb([60, 60, 60])),
                None => println!("Overlay set '{name}' not found in {OVERLAY_PATH}"),
            }
        }
    }

    panel.grid_lines();
    panel.axes();
    panel.title(&format!(
        "Temperature (K) and wind at {LEVEL} m, {}",
        when.format("%Y-%m-%d %H:%M")
    ));
    drop(panel);

    let out = format!("{FIGURE_NAME}_time_{PLOT_TIME}_level_{LEVEL}.png");
    fig.save(&out)?;
    println!("Wrote {out}");

    Ok(())
}
