//! Vertical cross-section of radar reflectivity.
//!
//! Interpolates simulated reflectivity onto the vertical plane between
//! two geographic points and renders a two-panel figure: a terrain plan
//! view with the section line, and the cross-section itself with the
//! terrain silhouette filled in.
//!
//! Run with: cargo run --bin plot_cross_section

use std::error::Error;

use image::Rgb;

use wrfvis::diag;
use wrfvis::grid::CoordPair;
use wrfvis::interp::{interp_line, vert_cross};
use wrfvis::io::{discover_wrfout, select_time, MapOverlay, WrfFile};
use wrfvis::render::{level_arange, Colormap, Extend, Extent, Figure};

const WRF_DIR: &str = ".";
const FILE_PREFIX: &str = "wrfout_d01_";
const PLOT_TIME: usize = 10;
const FIGURE_NAME: &str = "CrossRef";

/// Section endpoints (lat, lon).
const START: (f64, f64) = (-31.1, -67.0);
const END: (f64, f64) = (-31.1, -58.0);

/// Vertical extent of the section panel (m) and number of target levels.
const TOP_HEIGHT: f64 = 15000.0;
const N_LEVELS: usize = 100;

const TERRAIN_FILL: Rgb<u8> = Rgb([139, 69, 19]);

/// Draw coastlines and province borders from `OVERLAY_PATH` on the plan view.
const PLOT_MAP: bool = true;
const OVERLAY_PATH: &str = "map_lines.txt";

fn main() -> Result<(), Box<dyn Error>> {
    let files = discover_wrfout(WRF_DIR, FILE_PREFIX)?;
    println!("Found {} wrfout files under {}", files.len(), WRF_DIR);

    let path = select_time(&files, PLOT_TIME)?;
    println!("Reading time index {}: {}", PLOT_TIME, path.display());
    let file = WrfFile::open(path)?;

    let dbz = diag::reflectivity(&file)?;
    let z = diag::geopotential_height(&file)?;
    let ter = diag::terrain(&file)?;
    let when = file.valid_time()?;

    let start_xy = file.to_grid_xy(CoordPair::latlon(START.0, START.1))?;
    let end_xy = file.to_grid_xy(CoordPair::latlon(END.0, END.1))?;
    println!(
        "Section from ({:.1}, {:.1}) to ({:.1}, {:.1}), grid ({:.0}, {:.0}) to ({:.0}, {:.0})",
        START.0, START.1, END.0, END.1, start_xy.0, start_xy.1, end_xy.0, end_xy.1
    );

    let section = vert_cross(&dbz, &z, start_xy, end_xy, N_LEVELS)?;
    let ter_line = interp_line(&ter, start_xy, end_xy)?;

    let dbz_levels = level_arange(0.0, 60.0, 5.0);
    let dbz_cmap = Colormap::reflectivity();
    let ter_levels = level_arange(-1000.0, 5000.0, 500.0);
    let ter_cmap = Colormap::terrain();

    let mut fig = Figure::two_panel();

    // Plan view with the section line
    let ter_masked = ter.clone().mask_below(1.0);
    let mut plan = fig.panel(0, 2, Extent::of_field(&ter));
    plan.contourf(&ter_masked, &ter_levels, &ter_cmap, Extend::Max);
    plan.colorbar(&ter_levels, &ter_cmap, Extend::Max);
    plan.plot(&[START.1, END.1], &[START.0, END.0], Rgb([200, 0, 0]), true);

    if PLOT_MAP {
        let overlay = MapOverlay::load(OVERLAY_PATH)?;
        for name in ["samerica", "provincias"] {
            match overlay.get(name) {
                Some(set) => plan.overlay(&set.segments, Rgb([60, 60, 60])),
                None => println!("Overlay set '{name}' not found in {OVERLAY_PATH}"),
            }
        }
    }

    plan.grid_lines();
    plan.axes();
    plan.title("Terrain height (m) and section");
    drop(plan);

    // The section itself
    let mut sec = fig.panel(1, 2, Extent::of_section(&section, TOP_HEIGHT));
    sec.contourf_section(&section, &dbz_levels, &dbz_cmap, Extend::Max);
    sec.colorbar(&dbz_levels, &dbz_cmap, Extend::Max);

    let xs: Vec<f64> = (0..ter_line.len()).map(|i| i as f64).collect();
    let ter_ys: Vec<f64> = ter_line.iter().map(|&h| h as f64).collect();
    sec.fill_below(&xs, &ter_ys, 0.0, TERRAIN_FILL);

    let (positions, labels) = section_ticks(&section, 5);
    sec.axes_with_x_labels(&positions, &labels);
    sec.title(&format!(
        "Reflectivity (dBZ), {}",
        when.format("%Y-%m-%d %H:%M")
    ));
    drop(sec);

    let out = format!("{FIGURE_NAME}_time_{PLOT_TIME}.png");
    fig.save(&out)?;
    println!("Wrote {out}");

    Ok(())
}

/// Evenly spaced x ticks along a section, labeled with the geographic
/// coordinates of the sample points when available.
fn section_ticks(section: &wrfvis::CrossSection, count: usize) -> (Vec<f64>, Vec<String>) {
    let n = section.n_points();
    let mut positions = Vec::new();
    let mut labels = Vec::new();
    for k in 0..count {
        let p = if count > 1 {
            k * (n - 1) / (count - 1)
        } else {
            0
        };
        positions.push(p as f64);
        let label = match &section.latlon {
            Some(pts) => format!("{:.1},{:.1}", pts[p].0, pts[p].1),
            None => format!("{p}"),
        };
        labels.push(label);
    }
    (positions, labels)
}
