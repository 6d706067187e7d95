//! Surface temperature and wind over a real geographic domain.
//!
//! Same fields as `plot_surface_grid`, but on latitude/longitude axes
//! with an optional border overlay read from a polyline file.
//!
//! Run with: cargo run --bin plot_surface_map

use std::error::Error;

use image::Rgb;

use wrfvis::diag;
use wrfvis::io::{discover_wrfout, select_time, MapOverlay, WrfFile};
use wrfvis::render::{level_range, Colormap, Extend, Extent, Figure};

const WRF_DIR: &str = ".";
const FILE_PREFIX: &str = "wrfout_d01_";
const PLOT_TIME: usize = 0;
const FIGURE_NAME: &str = "T2m_uv10";
const BARB_STRIDE: usize = 10;

/// Labeled wind-speed contour values (m/s).
const SPEED_LEVELS: [f64; 4] = [1.0, 5.0, 10.0, 15.0];

/// Draw coastlines and province borders from `OVERLAY_PATH`.
const PLOT_MAP: bool = true;
const OVERLAY_PATH: &str = "map_lines.txt";

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

    let levels = level_range(t2.min() as f64, t2.max() as f64, 2.0);
    let cmap = Colormap::rainbow();

    let mut fig = Figure::single();
    let mut panel = fig.panel(0, 1, Extent::of_field(&t2));
    panel.contourf(&t2, &levels, &cmap, Extend::Max);
    panel.colorbar(&levels, &cmap, Extend::Max);
    panel.contour(&speed, &SPEED_LEVELS, Rgb([0, 0, 0]), true);
    panel.barbs(&u10, &v10, BARB_STRIDE, Rgb([0, 0, 0]));

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
        "2 m temperature (K) and 10 m wind, {}",
        when.format("%Y-%m-%d %H:%M")
    ));
    drop(panel);

    let out = format!("{FIGURE_NAME}_time_{PLOT_TIME}.png");
    fig.save(&out)?;
    println!("Wrote {out}");

    Ok(())
}
