//! Station meteogram of 2 m temperature and dewpoint.
//!
//! Walks the whole wrfout sequence, samples both fields at the grid
//! point nearest a fixed station, and renders a two-panel figure: a
//! terrain map with the station marked, and the time series in hours
//! since the first file.
//!
//! Run with: cargo run --bin plot_meteogram

use std::error::Error;

use image::Rgb;

use wrfvis::diag;
use wrfvis::io::{discover_wrfout, MapOverlay, WrfFile};
use wrfvis::render::{level_arange, Colormap, Extend, Extent, Figure};

const WRF_DIR: &str = ".";
const FILE_PREFIX: &str = "wrfout_d01_";
const FIGURE_NAME: &str = "T2m_td2m";

/// Station location (geographic).
const STATION_LAT: f64 = -35.0;
const STATION_LON: f64 = -60.0;

const KELVIN_OFFSET: f32 = 273.16;

/// Draw coastlines and province borders from `OVERLAY_PATH` on the map panel.
const PLOT_MAP: bool = true;
const OVERLAY_PATH: &str = "map_lines.txt";

fn main() -> Result<(), Box<dyn Error>> {
    let files = discover_wrfout(WRF_DIR, FILE_PREFIX)?;
    println!("Found {} wrfout files under {}", files.len(), WRF_DIR);

    let mut hours: Vec<f64> = Vec::new();
    let mut t2_series: Vec<f64> = Vec::new();
    let mut td2_series: Vec<f64> = Vec::new();
    let mut start_time = None;
    let mut terrain = None;
    let mut station_ij = (0usize, 0usize);

    for (n, path) in files.iter().enumerate() {
        let file = WrfFile::open(path)?;
        let when = file.valid_time()?;
        let start = *start_time.get_or_insert(when);
        let elapsed = (when - start).num_seconds() as f64 / 3600.0;

        if terrain.is_none() {
            station_ij = file.nearest_grid_point(STATION_LAT, STATION_LON)?;
            terrain = Some(diag::terrain(&file)?);
            println!(
                "Station ({STATION_LAT}, {STATION_LON}) -> grid point {:?}",
                station_ij
            );
        }
        let (i, j) = station_ij;

        let t2 = diag::temperature_2m(&file)?;
        let td2 = diag::dewpoint_2m(&file)?;
        hours.push(elapsed);
        t2_series.push((t2.data[j][i] - KELVIN_OFFSET) as f64);
        td2_series.push(td2.data[j][i] as f64);
        println!(
            "  [{}/{}] +{:.1} h: T2 {:.1} C, Td2 {:.1} C",
            n + 1,
            files.len(),
            elapsed,
            t2_series[n],
            td2_series[n]
        );
    }

    let ter = terrain.ok_or("no wrfout files found")?;

    let mut fig = Figure::two_panel();

    // Station location over terrain
    let ter_levels = level_arange(-1000.0, 5000.0, 500.0);
    let ter_masked = ter.clone().mask_below(1.0);
    let mut map = fig.panel(0, 2, Extent::of_field(&ter));
    map.contourf(&ter_masked, &ter_levels, &Colormap::terrain(), Extend::Max);
    map.colorbar(&ter_levels, &Colormap::terrain(), Extend::Max);
    map.marker(STATION_LON, STATION_LAT, Rgb([200, 0, 0]));

    if PLOT_MAP {
        let overlay = MapOverlay::load(OVERLAY_PATH)?;
        for name in ["samerica", "provincias"] {
            match overlay.get(name) {
                Some(set) => map.overlay(&set.segments, Rgb([60, 60, 60])),
                None => println!("Overlay set '{name}' not found in {OVERLAY_PATH}"),
            }
        }
    }

    map.grid_lines();
    map.axes();
    map.title("Station location");
    drop(map);

    // Time series
    let (lo, hi) = series_range(&t2_series, &td2_series);
    let extent = Extent::new(
        hours.first().copied().unwrap_or(0.0),
        hours.last().copied().unwrap_or(1.0).max(1.0),
        lo,
        hi,
    );
    let mut series = fig.panel(1, 2, extent);
    series.grid_lines();
    series.plot(&hours, &t2_series, Rgb([200, 0, 0]), true);
    series.plot(&hours, &td2_series, Rgb([0, 0, 200]), true);
    series.legend(&[("T2m", Rgb([200, 0, 0])), ("Td2m", Rgb([0, 0, 200]))]);
    series.axes();
    series.x_label("Hours since start");
    series.y_label("deg C");
    series.title(&format!(
        "2 m temperature and dewpoint at ({STATION_LAT}, {STATION_LON})"
    ));
    drop(series);

    let out = format!("{FIGURE_NAME}_lon_{STATION_LON}_lat_{STATION_LAT}.png");
    fig.save(&out)?;
    println!("Wrote {out}");

    Ok(())
}

/// Shared y range over both series, padded by two degrees, ignoring NaN
/// dewpoints from dry columns.
fn series_range(a: &[f64], b: &[f64]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in a.iter().chain(b) {
        if v.is_finite() {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    if lo > hi {
        (0.0, 1.0)
    } else {
        (lo - 2.0, hi + 2.0)
    }
}
