//! Grid-aware interpolation.
//!
//! The reduction steps between extraction and rendering:
//!
//! - [`interp_to_level`]: 3D field onto a constant-height surface
//! - [`vert_cross`]: 3D field onto the vertical plane through a start/end
//!   pair
//! - [`interp_line`]: 2D field sampled along the same path (terrain
//!   transects)
//!
//! Heights are expected to increase with level index (geopotential height
//! on mass levels). Points outside a column's height range interpolate to
//! NaN, never to an extrapolated value; renderers leave NaN blank.

use thiserror::Error;

use crate::grid::{CrossSection, Field2D, Field3D};

/// Error type for interpolation.
#[derive(Debug, Error)]
pub enum InterpError {
    /// Field and height grids disagree
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Cross-section endpoints coincide
    #[error("cross-section start and end points coincide")]
    DegeneratePath,

    /// Too few target levels for a cross-section
    #[error("cross-section needs at least 2 levels, got {0}")]
    BadLevelCount(usize),
}

/// Interpolate a 3D field onto a constant-height surface.
///
/// Per-column linear interpolation of `field` against `height` (same grid,
/// meters). Columns whose height range excludes `level` yield NaN.
pub fn interp_to_level(
    field: &Field3D,
    height: &Field3D,
    level: f64,
) -> Result<Field2D, InterpError> {
    check_same_shape(field, height)?;

    let (nz, ny, nx) = (field.nz(), field.ny(), field.nx());
    let mut out = vec![vec![f32::NAN; nx]; ny];

    for j in 0..ny {
        for i in 0..nx {
            for k in 0..nz - 1 {
                let z0 = height.data[k][j][i] as f64;
                let z1 = height.data[k + 1][j][i] as f64;
                if z0 <= level && level <= z1 && z1 > z0 {
                    let v0 = field.data[k][j][i] as f64;
                    let v1 = field.data[k + 1][j][i] as f64;
                    let w = (level - z0) / (z1 - z0);
                    out[j][i] = (v0 * (1.0 - w) + v1 * w) as f32;
                    break;
                }
            }
        }
    }

    Ok(Field2D::new(
        field.name.clone(),
        field.units.clone(),
        out,
        field.coords.clone(),
    ))
}

/// Horizontal sample points along the straight grid-space line from
/// `start` to `end`, spaced roughly one grid interval apart.
pub fn section_path(start: (f64, f64), end: (f64, f64)) -> Result<Vec<(f64, f64)>, InterpError> {
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return Err(InterpError::DegeneratePath);
    }

    let n = length.ceil() as usize + 1;
    let points = (0..n)
        .map(|s| {
            let f = s as f64 / (n - 1) as f64;
            (start.0 + f * dx, start.1 + f * dy)
        })
        .collect();
    Ok(points)
}

/// Interpolate a 3D field onto the vertical plane through `start`/`end`
/// (grid-space coordinates).
///
/// Columns are sampled bilinearly along the path, then interpolated onto
/// `n_levels` evenly spaced heights spanning the sampled columns. Carries
/// per-point lat/lon when the source grid has geographic coordinates.
pub fn vert_cross(
    field: &Field3D,
    height: &Field3D,
    start: (f64, f64),
    end: (f64, f64),
    n_levels: usize,
) -> Result<CrossSection, InterpError> {
    check_same_shape(field, height)?;
    if n_levels < 2 {
        return Err(InterpError::BadLevelCount(n_levels));
    }

    let path = section_path(start, end)?;
    let nz = field.nz();
    let n_points = path.len();

    // Sample every column along the path
    let mut col_values = vec![vec![f32::NAN; nz]; n_points];
    let mut col_heights = vec![vec![f32::NAN; nz]; n_points];
    for (p, &(x, y)) in path.iter().enumerate() {
        for k in 0..nz {
            col_values[p][k] = bilinear(&field.data[k], y, x);
            col_heights[p][k] = bilinear(&height.data[k], y, x);
        }
    }

    // Target heights span the sampled columns
    let mut z_lo = f64::INFINITY;
    let mut z_hi = f64::NEG_INFINITY;
    for col in &col_heights {
        for &z in col {
            if z.is_finite() {
                z_lo = z_lo.min(z as f64);
                z_hi = z_hi.max(z as f64);
            }
        }
    }
    if !z_lo.is_finite() || z_hi <= z_lo {
        return Err(InterpError::ShapeMismatch(
            "no finite heights along the cross-section path".to_string(),
        ));
    }

    let levels: Vec<f64> = (0..n_levels)
        .map(|l| z_lo + (z_hi - z_lo) * l as f64 / (n_levels - 1) as f64)
        .collect();

    let mut values = vec![vec![f32::NAN; n_points]; n_levels];
    for (l, &level) in levels.iter().enumerate() {
        for p in 0..n_points {
            values[l][p] = interp_column(&col_values[p], &col_heights[p], level);
        }
    }

    let latlon = match &field.coords {
        crate::grid::Coords2D::LatLon { .. } => Some(
            path.iter()
                .map(|&(x, y)| {
                    let (lon, lat) = field.coords.at_fractional(y, x);
                    (lat, lon)
                })
                .collect(),
        ),
        crate::grid::Coords2D::Index { .. } => None,
    };

    Ok(CrossSection {
        values,
        levels,
        path,
        latlon,
    })
}

/// Sample a 2D field along the straight grid-space line from `start` to
/// `end` (terrain transects).
pub fn interp_line(
    field: &Field2D,
    start: (f64, f64),
    end: (f64, f64),
) -> Result<Vec<f32>, InterpError> {
    let path = section_path(start, end)?;
    Ok(path
        .iter()
        .map(|&(x, y)| bilinear(&field.data, y, x))
        .collect())
}

/// Linear interpolation within a single sampled column; NaN outside the
/// column's height range.
fn interp_column(values: &[f32], heights: &[f32], level: f64) -> f32 {
    for k in 0..heights.len() - 1 {
        let z0 = heights[k] as f64;
        let z1 = heights[k + 1] as f64;
        if !z0.is_finite() || !z1.is_finite() {
            continue;
        }
        if z0 <= level && level <= z1 && z1 > z0 {
            let w = (level - z0) / (z1 - z0);
            return (values[k] as f64 * (1.0 - w) + values[k + 1] as f64 * w) as f32;
        }
    }
    f32::NAN
}

/// Bilinear sample of a `[ny][nx]` array at fractional position
/// `(y, x)`; NaN when any contributing corner is not finite or the point
/// lies outside the grid.
pub(crate) fn bilinear(data: &[Vec<f32>], y: f64, x: f64) -> f32 {
    let ny = data.len();
    let nx = data[0].len();
    if x < 0.0 || y < 0.0 || x > (nx - 1) as f64 || y > (ny - 1) as f64 {
        return f32::NAN;
    }

    let i0 = (x.floor() as usize).min(nx - 1);
    let j0 = (y.floor() as usize).min(ny - 1);
    let i1 = (i0 + 1).min(nx - 1);
    let j1 = (j0 + 1).min(ny - 1);
    let fx = (x - i0 as f64) as f32;
    let fy = (y - j0 as f64) as f32;

    let (v00, v01, v10, v11) = (data[j0][i0], data[j0][i1], data[j1][i0], data[j1][i1]);
    if !v00.is_finite() || !v01.is_finite() || !v10.is_finite() || !v11.is_finite() {
        return f32::NAN;
    }

    let v0 = v00 * (1.0 - fx) + v01 * fx;
    let v1 = v10 * (1.0 - fx) + v11 * fx;
    v0 * (1.0 - fy) + v1 * fy
}

fn check_same_shape(field: &Field3D, height: &Field3D) -> Result<(), InterpError> {
    if (field.nz(), field.ny(), field.nx()) != (height.nz(), height.ny(), height.nx()) {
        return Err(InterpError::ShapeMismatch(format!(
            "field is {}x{}x{}, height is {}x{}x{}",
            field.nz(),
            field.ny(),
            field.nx(),
            height.nz(),
            height.ny(),
            height.nx()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Coords2D;

    /// Field whose value equals its height: interpolation must return the
    /// requested level exactly.
    fn height_equals_value(nz: usize, ny: usize, nx: usize, dz: f32) -> (Field3D, Field3D) {
        let data: Vec<Vec<Vec<f32>>> = (0..nz)
            .map(|k| vec![vec![k as f32 * dz; nx]; ny])
            .collect();
        let coords = Coords2D::index(ny, nx);
        (
            Field3D::new("v", "m", data.clone(), coords.clone()),
            Field3D::new("height", "m", data, coords),
        )
    }

    #[test]
    fn test_interp_to_level_exact() {
        let (field, height) = height_equals_value(5, 3, 3, 500.0);
        let sliced = interp_to_level(&field, &height, 750.0).unwrap();
        for row in &sliced.data {
            for &v in row {
                assert!((v - 750.0).abs() < 1e-3, "interpolated value: {v}");
            }
        }
    }

    #[test]
    fn test_interp_to_level_outside_range_is_nan() {
        let (field, height) = height_equals_value(5, 2, 2, 500.0);
        let below = interp_to_level(&field, &height, -100.0).unwrap();
        let above = interp_to_level(&field, &height, 99_000.0).unwrap();
        assert!(below.data[0][0].is_nan());
        assert!(above.data[1][1].is_nan());
    }

    #[test]
    fn test_section_path_endpoints_and_spacing() {
        let path = section_path((10.0, 10.0), (49.0, 10.0)).unwrap();
        assert_eq!(path[0], (10.0, 10.0));
        assert_eq!(*path.last().unwrap(), (49.0, 10.0));
        assert_eq!(path.len(), 40);
    }

    #[test]
    fn test_section_path_degenerate() {
        assert!(matches!(
            section_path((5.0, 5.0), (5.0, 5.0)),
            Err(InterpError::DegeneratePath)
        ));
    }

    #[test]
    fn test_vert_cross_recovers_levels() {
        let (field, height) = height_equals_value(6, 8, 8, 1000.0);
        let cross = vert_cross(&field, &height, (1.0, 1.0), (6.0, 6.0), 11).unwrap();
        assert_eq!(cross.n_levels(), 11);
        assert_eq!(cross.levels[0], 0.0);
        assert_eq!(*cross.levels.last().unwrap(), 5000.0);
        // Value equals height everywhere, so each row equals its level
        for (l, row) in cross.values.iter().enumerate() {
            for &v in row {
                assert!(
                    (v as f64 - cross.levels[l]).abs() < 1e-2,
                    "level {l}: {v}"
                );
            }
        }
        assert!(cross.latlon.is_none());
    }

    #[test]
    fn test_interp_line_constant_field() {
        let field = Field2D::new(
            "ter",
            "m",
            vec![vec![7.0; 10]; 10],
            Coords2D::index(10, 10),
        );
        let line = interp_line(&field, (0.0, 0.0), (9.0, 9.0)).unwrap();
        assert!(line.iter().all(|&v| (v - 7.0).abs() < 1e-6));
    }

    #[test]
    fn test_bilinear_center() {
        let data = vec![vec![0.0, 1.0], vec![2.0, 3.0]];
        let v = bilinear(&data, 0.5, 0.5);
        assert!((v - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_bilinear_outside_is_nan() {
        let data = vec![vec![0.0, 1.0], vec![2.0, 3.0]];
        assert!(bilinear(&data, -0.1, 0.0).is_nan());
        assert!(bilinear(&data, 0.0, 1.5).is_nan());
    }
}
