//! Derived meteorological quantities.
//!
//! The equivalent of the "diagnostics library" the workflows delegate to:
//! every function takes an open [`WrfFile`], reads the raw model variables
//! it needs and returns a field with coordinate metadata attached.
//! Semantics follow the WRF diagnostic conventions (perturbation variables,
//! staggered winds, earth-rotated components).
//!
//! - surface: [`terrain`], [`landmask`], [`thermo::temperature_2m`],
//!   [`thermo::dewpoint_2m`], [`wind::wind_10m`]
//! - 3D: [`geopotential_height`], [`thermo::temperature`], [`wind::wind`],
//!   [`wind::vertical_velocity`], [`reflectivity::reflectivity`]
//!
//! All functions are read-only and propagate [`WrfError`] unchanged.

pub mod reflectivity;
pub mod thermo;
pub mod wind;

pub use reflectivity::reflectivity;
pub use thermo::{dewpoint_2m, temperature, temperature_2m};
pub use wind::{vertical_velocity, wind, wind_10m, wind_speed};

use crate::grid::{Coords2D, Field2D, Field3D};
use crate::io::{WrfError, WrfFile};

/// Gravitational acceleration (m s-2).
pub(crate) const G: f64 = 9.81;

/// Terrain height (`HGT`, m).
pub fn terrain(file: &WrfFile) -> Result<Field2D, WrfError> {
    let data = file.var_2d("HGT")?;
    let coords = horizontal_coords(file, data.len(), data[0].len())?;
    Ok(Field2D::new("ter", "m", data, coords))
}

/// Land/water mask (`LANDMASK`, 1 = land, 0 = water).
pub fn landmask(file: &WrfFile) -> Result<Field2D, WrfError> {
    let data = file.var_2d("LANDMASK")?;
    let coords = horizontal_coords(file, data.len(), data[0].len())?;
    Ok(Field2D::new("landmask", "", data, coords))
}

/// Geopotential height above sea level (m) on mass levels.
///
/// `(PH + PHB) / g`, destaggered from the vertically staggered levels.
pub fn geopotential_height(file: &WrfFile) -> Result<Field3D, WrfError> {
    let ph = file.var_3d("PH")?;
    let phb = file.var_3d("PHB")?;

    let full: Vec<Vec<Vec<f32>>> = ph
        .iter()
        .zip(phb.iter())
        .map(|(pk, bk)| {
            pk.iter()
                .zip(bk.iter())
                .map(|(pr, br)| {
                    pr.iter()
                        .zip(br.iter())
                        .map(|(&p, &b)| ((p as f64 + b as f64) / G) as f32)
                        .collect()
                })
                .collect()
        })
        .collect();

    let data = destagger_z(&full);
    let coords = horizontal_coords(file, data[0].len(), data[0][0].len())?;
    Ok(Field3D::new("height", "m", data, coords))
}

/// Coordinate metadata for a mass-point field: geographic when the file
/// carries `XLAT`/`XLONG`, bare grid indices otherwise.
pub(crate) fn horizontal_coords(
    file: &WrfFile,
    ny: usize,
    nx: usize,
) -> Result<Coords2D, WrfError> {
    match file.latlon_coords() {
        Ok(coords) => Ok(coords),
        Err(WrfError::MissingVariable(_)) => Ok(Coords2D::index(ny, nx)),
        Err(e) => Err(e),
    }
}

/// Average a west-east staggered 3D array onto mass points.
pub(crate) fn destagger_x(a: &[Vec<Vec<f32>>]) -> Vec<Vec<Vec<f32>>> {
    a.iter()
        .map(|level| {
            level
                .iter()
                .map(|row| row.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect())
                .collect()
        })
        .collect()
}

/// Average a south-north staggered 3D array onto mass points.
pub(crate) fn destagger_y(a: &[Vec<Vec<f32>>]) -> Vec<Vec<Vec<f32>>> {
    a.iter()
        .map(|level| {
            (0..level.len() - 1)
                .map(|j| {
                    level[j]
                        .iter()
                        .zip(level[j + 1].iter())
                        .map(|(&a, &b)| 0.5 * (a + b))
                        .collect()
                })
                .collect()
        })
        .collect()
}

/// Average a vertically staggered 3D array onto mass levels.
pub(crate) fn destagger_z(a: &[Vec<Vec<f32>>]) -> Vec<Vec<Vec<f32>>> {
    (0..a.len() - 1)
        .map(|k| {
            a[k].iter()
                .zip(a[k + 1].iter())
                .map(|(r0, r1)| {
                    r0.iter()
                        .zip(r1.iter())
                        .map(|(&v0, &v1)| 0.5 * (v0 + v1))
                        .collect()
                })
                .collect()
        })
        .collect()
}
