//! End-to-end tests over synthetic wrfout files.
//!
//! Each test writes a small NetCDF file with the WRF variable layout,
//! then runs the reading, diagnostics, and interpolation pipeline over
//! it.

use std::error::Error;
use std::path::{Path, PathBuf};

use wrfvis::diag;
use wrfvis::grid::CoordPair;
use wrfvis::interp::{interp_to_level, vert_cross};
use wrfvis::io::{discover_wrfout, WrfFile};

const NY: usize = 6;
const NX: usize = 8;
const NZ: usize = 4;

/// Base geopotential chosen so destaggered mass levels sit at
/// 250, 750, 1250, 1750 m.
const LAYER_DEPTH: f32 = 500.0;

fn add_2d(
    file: &mut netcdf::FileMut,
    name: &str,
    f: impl Fn(usize, usize) -> f32,
) -> Result<(), Box<dyn Error>> {
    let mut flat = Vec::with_capacity(NY * NX);
    for j in 0..NY {
        for i in 0..NX {
            flat.push(f(j, i));
        }
    }
    let mut var = file.add_variable::<f32>(name, &["Time", "south_north", "west_east"])?;
    var.put_values(&flat, (0, .., ..))?;
    Ok(())
}

fn add_3d(
    file: &mut netcdf::FileMut,
    name: &str,
    dims: [&str; 3],
    shape: (usize, usize, usize),
    f: impl Fn(usize, usize, usize) -> f32,
) -> Result<(), Box<dyn Error>> {
    let (nz, ny, nx) = shape;
    let mut flat = Vec::with_capacity(nz * ny * nx);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                flat.push(f(k, j, i));
            }
        }
    }
    let mut var = file.add_variable::<f32>(name, &["Time", dims[0], dims[1], dims[2]])?;
    var.put_values(&flat, (0, .., .., ..))?;
    Ok(())
}

/// Write one synthetic wrfout file valid at the given hour of
/// 2023-01-01. The grid carries geographic coordinates, a west-east
/// temperature gradient, uniform 10 m winds, and a single rain layer.
fn write_wrfout(path: &Path, hour: u32) -> Result<(), Box<dyn Error>> {
    let mut file = netcdf::create(path)?;
    file.add_unlimited_dimension("Time")?;
    file.add_dimension("DateStrLen", 19)?;
    file.add_dimension("south_north", NY)?;
    file.add_dimension("west_east", NX)?;
    file.add_dimension("south_north_stag", NY + 1)?;
    file.add_dimension("west_east_stag", NX + 1)?;
    file.add_dimension("bottom_top", NZ)?;
    file.add_dimension("bottom_top_stag", NZ + 1)?;

    let stamp = format!("2023-01-01_{:02}:00:00", hour);
    {
        let mut times = file.add_variable::<u8>("Times", &["Time", "DateStrLen"])?;
        times.put_values(stamp.as_bytes(), (0, ..))?;
    }

    add_2d(&mut file, "T2", |j, i| 290.0 + 0.5 * (j + i) as f32)?;
    add_2d(&mut file, "Q2", |_, _| 0.008)?;
    add_2d(&mut file, "PSFC", |_, _| 100_000.0)?;
    add_2d(&mut file, "U10", |_, _| 3.0)?;
    add_2d(&mut file, "V10", |_, _| 4.0)?;
    add_2d(&mut file, "HGT", |_, i| if i < 2 { 0.0 } else { 100.0 * i as f32 })?;
    add_2d(&mut file, "XLAT", |j, _| -36.0 + 0.5 * j as f32)?;
    add_2d(&mut file, "XLONG", |_, i| -62.0 + 0.5 * i as f32)?;

    let mass = ["bottom_top", "south_north", "west_east"];
    let mass_shape = (NZ, NY, NX);
    add_3d(&mut file, "T", mass, mass_shape, |_, _, _| 0.0)?;
    add_3d(&mut file, "P", mass, mass_shape, |_, _, _| 0.0)?;
    add_3d(&mut file, "PB", mass, mass_shape, |k, _, _| {
        90_000.0 - 10_000.0 * k as f32
    })?;
    add_3d(&mut file, "QVAPOR", mass, mass_shape, |_, _, _| 0.005)?;
    add_3d(&mut file, "QRAIN", mass, mass_shape, |k, _, _| {
        if k == 1 {
            0.001
        } else {
            0.0
        }
    })?;

    let z_stag = ["bottom_top_stag", "south_north", "west_east"];
    let z_stag_shape = (NZ + 1, NY, NX);
    add_3d(&mut file, "PH", z_stag, z_stag_shape, |_, _, _| 0.0)?;
    add_3d(&mut file, "PHB", z_stag, z_stag_shape, |k, _, _| {
        9.81 * LAYER_DEPTH * k as f32
    })?;
    add_3d(&mut file, "W", z_stag, z_stag_shape, |_, _, _| 0.5)?;

    add_3d(
        &mut file,
        "U",
        ["bottom_top", "south_north", "west_east_stag"],
        (NZ, NY, NX + 1),
        |_, _, _| 10.0,
    )?;
    add_3d(
        &mut file,
        "V",
        ["bottom_top", "south_north_stag", "west_east"],
        (NZ, NY + 1, NX),
        |_, _, _| 0.0,
    )?;

    Ok(())
}

/// Directory with `count` synthetic wrfout files, three hours apart.
fn wrfout_dir(count: u32) -> (tempfile::TempDir, Vec<PathBuf>) {
    let dir = tempfile::tempdir().expect("create temp dir");
    for n in 0..count {
        let hour = 3 * n;
        let path = dir
            .path()
            .join(format!("wrfout_d01_2023-01-01_{hour:02}:00:00"));
        write_wrfout(&path, hour).expect("write synthetic wrfout");
    }
    let files = discover_wrfout(dir.path(), "wrfout_d01_").expect("discover files");
    assert_eq!(files.len(), count as usize);
    (dir, files)
}

#[test]
fn test_surface_temperature_and_dewpoint() {
    let (_dir, files) = wrfout_dir(1);
    let file = WrfFile::open(&files[0]).unwrap();

    let t2 = diag::temperature_2m(&file).unwrap();
    assert_eq!((t2.ny(), t2.nx()), (NY, NX));
    assert!(
        (t2.data[2][3] - 292.5).abs() < 1e-4,
        "T2 at (2,3): {}",
        t2.data[2][3]
    );

    // qv = 8 g/kg at 1000 hPa gives a dewpoint near 10.5 C
    let td2 = diag::dewpoint_2m(&file).unwrap();
    let td = td2.data[0][0];
    assert!(
        (10.0..11.0).contains(&td),
        "dewpoint for 8 g/kg at 1000 hPa: {td} C"
    );
}

#[test]
fn test_wind_without_rotation_arrays() {
    let (_dir, files) = wrfout_dir(1);
    let file = WrfFile::open(&files[0]).unwrap();

    // No SINALPHA/COSALPHA in the file, so rotation is the identity
    let (u10, v10) = diag::wind_10m(&file).unwrap();
    assert!((u10.data[3][3] - 3.0).abs() < 1e-6);
    assert!((v10.data[3][3] - 4.0).abs() < 1e-6);

    let speed = diag::wind_speed(&u10, &v10);
    assert!(
        (speed.data[3][3] - 5.0).abs() < 1e-6,
        "3-4-5 wind speed: {}",
        speed.data[3][3]
    );
}

#[test]
fn test_geopotential_height_destaggers_to_layer_midpoints() {
    let (_dir, files) = wrfout_dir(1);
    let file = WrfFile::open(&files[0]).unwrap();

    let z = diag::geopotential_height(&file).unwrap();
    assert_eq!(z.nz(), NZ);
    for (k, expected) in [250.0, 750.0, 1250.0, 1750.0].iter().enumerate() {
        assert!(
            (z.data[k][2][2] - expected).abs() < 0.5,
            "level {k} height: {}",
            z.data[k][2][2]
        );
    }
}

#[test]
fn test_interp_to_level_and_out_of_range() {
    let (_dir, files) = wrfout_dir(1);
    let file = WrfFile::open(&files[0]).unwrap();

    let tk = diag::temperature(&file).unwrap();
    let z = diag::geopotential_height(&file).unwrap();

    // 750 m is exactly the second mass level: theta 300 at 800 hPa
    let t_750 = interp_to_level(&tk, &z, 750.0).unwrap();
    let expected = 300.0 * (0.8f32).powf(287.04 / 1004.0);
    assert!(
        (t_750.data[2][2] - expected).abs() < 0.1,
        "T at 750 m: {} vs {}",
        t_750.data[2][2],
        expected
    );

    // Above the model top every column comes back NaN
    let t_high = interp_to_level(&tk, &z, 99_999.0).unwrap();
    assert!(t_high.data.iter().flatten().all(|v| v.is_nan()));
}

#[test]
fn test_reflectivity_rain_layer() {
    let (_dir, files) = wrfout_dir(1);
    let file = WrfFile::open(&files[0]).unwrap();

    let dbz = diag::reflectivity(&file).unwrap();
    // Dry levels sit on the -30 dBZ floor, the rain layer well above it
    assert!(
        (dbz.data[0][2][2] - (-30.0)).abs() < 1e-3,
        "dry level: {} dBZ",
        dbz.data[0][2][2]
    );
    assert!(
        dbz.data[1][2][2] > 0.0,
        "1 g/kg rain layer: {} dBZ",
        dbz.data[1][2][2]
    );
}

#[test]
fn test_nearest_grid_point() {
    let (_dir, files) = wrfout_dir(1);
    let file = WrfFile::open(&files[0]).unwrap();

    // lat = -36 + 0.5 j, lon = -62 + 0.5 i
    let (i, j) = file.nearest_grid_point(-35.0, -60.0).unwrap();
    assert_eq!((i, j), (4, 2));

    let (x, y) = file.to_grid_xy(CoordPair::latlon(-35.0, -60.0)).unwrap();
    assert_eq!((x, y), (4.0, 2.0));
}

#[test]
fn test_elapsed_hours_from_first_file() {
    let (_dir, files) = wrfout_dir(3);

    let mut hours = Vec::new();
    let mut start = None;
    for path in &files {
        let file = WrfFile::open(path).unwrap();
        let when = file.valid_time().unwrap();
        let t0 = *start.get_or_insert(when);
        hours.push((when - t0).num_seconds() as f64 / 3600.0);
    }
    assert_eq!(hours, vec![0.0, 3.0, 6.0]);
}

#[test]
fn test_vert_cross_respects_terrain_free_columns() {
    let (_dir, files) = wrfout_dir(1);
    let file = WrfFile::open(&files[0]).unwrap();

    let dbz = diag::reflectivity(&file).unwrap();
    let z = diag::geopotential_height(&file).unwrap();
    let section = vert_cross(&dbz, &z, (0.0, 2.0), (7.0, 2.0), 20).unwrap();

    assert_eq!(section.n_levels(), 20);
    assert_eq!(section.n_points(), 8);
    assert!(
        section.latlon.is_some(),
        "geographic grids carry lat/lon along the path"
    );

    // Levels inside the column range hold finite values somewhere
    let finite = section
        .values
        .iter()
        .flatten()
        .filter(|v| v.is_finite())
        .count();
    assert!(finite > 0, "section entirely NaN");
}
