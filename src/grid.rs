//! Plain-data carriers for extracted and derived fields.
//!
//! Fields are numeric arrays plus the coordinate metadata needed to plot
//! them. They are produced by [`crate::diag`] and [`crate::interp`] and
//! consumed by [`crate::render`]; nothing here touches the filesystem.
//!
//! Array layout follows the row-major `[y][x]` / `[z][y][x]` convention of
//! the underlying model output ("south_north" before "west_east").

/// Horizontal coordinate metadata for a 2D grid.
///
/// Either bare grid indices (idealized domains) or per-cell geographic
/// coordinates (real domains, curvilinear in general).
#[derive(Clone, Debug)]
pub enum Coords2D {
    /// Grid-index coordinates: x = column index, y = row index.
    Index {
        /// Number of rows (south-north)
        ny: usize,
        /// Number of columns (west-east)
        nx: usize,
    },
    /// Geographic coordinates per grid cell.
    LatLon {
        /// Latitude (degrees north), `[ny][nx]`
        lat: Vec<Vec<f64>>,
        /// Longitude (degrees east), `[ny][nx]`
        lon: Vec<Vec<f64>>,
    },
}

impl Coords2D {
    /// Grid-index coordinates for an `ny` x `nx` grid.
    pub fn index(ny: usize, nx: usize) -> Self {
        Coords2D::Index { ny, nx }
    }

    /// Geographic coordinates from 2D latitude/longitude arrays.
    ///
    /// # Panics
    ///
    /// Panics if the arrays are empty or their shapes differ.
    pub fn latlon(lat: Vec<Vec<f64>>, lon: Vec<Vec<f64>>) -> Self {
        assert!(!lat.is_empty() && !lat[0].is_empty(), "empty coordinate array");
        assert_eq!(lat.len(), lon.len(), "lat/lon row count mismatch");
        assert_eq!(lat[0].len(), lon[0].len(), "lat/lon column count mismatch");
        Coords2D::LatLon { lat, lon }
    }

    /// Grid shape as `(ny, nx)`.
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Coords2D::Index { ny, nx } => (*ny, *nx),
            Coords2D::LatLon { lat, .. } => (lat.len(), lat[0].len()),
        }
    }

    /// Plot-space x coordinate of grid point `(j, i)`.
    pub fn x_at(&self, j: usize, i: usize) -> f64 {
        match self {
            Coords2D::Index { .. } => i as f64,
            Coords2D::LatLon { lon, .. } => lon[j][i],
        }
    }

    /// Plot-space y coordinate of grid point `(j, i)`.
    pub fn y_at(&self, j: usize, i: usize) -> f64 {
        match self {
            Coords2D::Index { .. } => j as f64,
            Coords2D::LatLon { lat, .. } => lat[j][i],
        }
    }

    /// Plot-space coordinates `(x, y)` at a fractional grid position,
    /// bilinearly interpolated for geographic grids.
    pub fn at_fractional(&self, yj: f64, xi: f64) -> (f64, f64) {
        match self {
            Coords2D::Index { .. } => (xi, yj),
            Coords2D::LatLon { lat, lon } => {
                let (ny, nx) = self.shape();
                let j0 = (yj.floor().max(0.0) as usize).min(ny - 1);
                let i0 = (xi.floor().max(0.0) as usize).min(nx - 1);
                let j1 = (j0 + 1).min(ny - 1);
                let i1 = (i0 + 1).min(nx - 1);
                let fy = (yj - j0 as f64).clamp(0.0, 1.0);
                let fx = (xi - i0 as f64).clamp(0.0, 1.0);
                let interp = |a: &Vec<Vec<f64>>| {
                    let v0 = a[j0][i0] * (1.0 - fx) + a[j0][i1] * fx;
                    let v1 = a[j1][i0] * (1.0 - fx) + a[j1][i1] * fx;
                    v0 * (1.0 - fy) + v1 * fy
                };
                (interp(lon), interp(lat))
            }
        }
    }

    /// Range of plot-space x coordinates `(min, max)`.
    pub fn x_range(&self) -> (f64, f64) {
        match self {
            Coords2D::Index { nx, .. } => (0.0, (*nx - 1) as f64),
            Coords2D::LatLon { lon, .. } => minmax_2d(lon),
        }
    }

    /// Range of plot-space y coordinates `(min, max)`.
    pub fn y_range(&self) -> (f64, f64) {
        match self {
            Coords2D::Index { ny, .. } => (0.0, (*ny - 1) as f64),
            Coords2D::LatLon { lat, .. } => minmax_2d(lat),
        }
    }
}

fn minmax_2d(a: &[Vec<f64>]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for row in a {
        for &v in row {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    (lo, hi)
}

/// A 2D horizontal field with coordinate metadata.
#[derive(Clone, Debug)]
pub struct Field2D {
    /// Short variable name (e.g. "T2")
    pub name: String,
    /// Unit string (e.g. "K")
    pub units: String,
    /// Values, `[ny][nx]`; NaN marks missing/masked points
    pub data: Vec<Vec<f32>>,
    /// Horizontal coordinates
    pub coords: Coords2D,
}

impl Field2D {
    /// Create a field; shape is taken from `data`.
    ///
    /// # Panics
    ///
    /// Panics if `data` is empty or its shape disagrees with `coords`.
    pub fn new(
        name: impl Into<String>,
        units: impl Into<String>,
        data: Vec<Vec<f32>>,
        coords: Coords2D,
    ) -> Self {
        assert!(!data.is_empty() && !data[0].is_empty(), "empty field");
        assert_eq!(
            (data.len(), data[0].len()),
            coords.shape(),
            "field/coordinate shape mismatch"
        );
        Self {
            name: name.into(),
            units: units.into(),
            data,
            coords,
        }
    }

    /// Number of rows (south-north).
    pub fn ny(&self) -> usize {
        self.data.len()
    }

    /// Number of columns (west-east).
    pub fn nx(&self) -> usize {
        self.data[0].len()
    }

    /// Minimum finite value, NaN if none.
    pub fn min(&self) -> f32 {
        fold_finite(&self.data, f32::INFINITY, f32::min)
    }

    /// Maximum finite value, NaN if none.
    pub fn max(&self) -> f32 {
        fold_finite(&self.data, f32::NEG_INFINITY, f32::max)
    }

    /// Replace values at or below `threshold` with NaN (masking for plots).
    pub fn mask_below(mut self, threshold: f32) -> Self {
        for row in &mut self.data {
            for v in row.iter_mut() {
                if *v <= threshold {
                    *v = f32::NAN;
                }
            }
        }
        self
    }
}

fn fold_finite(data: &[Vec<f32>], init: f32, f: fn(f32, f32) -> f32) -> f32 {
    let mut acc = init;
    let mut seen = false;
    for row in data {
        for &v in row {
            if v.is_finite() {
                acc = f(acc, v);
                seen = true;
            }
        }
    }
    if seen { acc } else { f32::NAN }
}

/// A 3D field with coordinate metadata.
///
/// The vertical axis carries no fixed coordinate; pair with a geopotential
/// height field for level interpolation (see [`crate::interp`]).
#[derive(Clone, Debug)]
pub struct Field3D {
    /// Short variable name (e.g. "tk")
    pub name: String,
    /// Unit string
    pub units: String,
    /// Values, `[nz][ny][nx]`
    pub data: Vec<Vec<Vec<f32>>>,
    /// Horizontal coordinates
    pub coords: Coords2D,
}

impl Field3D {
    /// Create a field; shape is taken from `data`.
    ///
    /// # Panics
    ///
    /// Panics if `data` is empty or its horizontal shape disagrees with
    /// `coords`.
    pub fn new(
        name: impl Into<String>,
        units: impl Into<String>,
        data: Vec<Vec<Vec<f32>>>,
        coords: Coords2D,
    ) -> Self {
        assert!(
            !data.is_empty() && !data[0].is_empty() && !data[0][0].is_empty(),
            "empty field"
        );
        assert_eq!(
            (data[0].len(), data[0][0].len()),
            coords.shape(),
            "field/coordinate shape mismatch"
        );
        Self {
            name: name.into(),
            units: units.into(),
            data,
            coords,
        }
    }

    /// Number of vertical levels.
    pub fn nz(&self) -> usize {
        self.data.len()
    }

    /// Number of rows (south-north).
    pub fn ny(&self) -> usize {
        self.data[0].len()
    }

    /// Number of columns (west-east).
    pub fn nx(&self) -> usize {
        self.data[0][0].len()
    }
}

/// Start or end point of a cross-section path, or a station location.
///
/// Matches the two ways the workflows specify locations: grid indices for
/// idealized domains, latitude/longitude for real ones.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CoordPair {
    /// Grid-space coordinates (fractional indices allowed)
    Xy { x: f64, y: f64 },
    /// Geographic coordinates in degrees
    LatLon { lat: f64, lon: f64 },
}

impl CoordPair {
    /// Grid-space point.
    pub fn xy(x: f64, y: f64) -> Self {
        CoordPair::Xy { x, y }
    }

    /// Geographic point.
    pub fn latlon(lat: f64, lon: f64) -> Self {
        CoordPair::LatLon { lat, lon }
    }
}

/// A vertical cross-section: a 3D field sampled on the vertical plane
/// through a horizontal path.
#[derive(Clone, Debug)]
pub struct CrossSection {
    /// Interpolated values, `[level][point]`; NaN below terrain or outside
    /// the sampled column range
    pub values: Vec<Vec<f32>>,
    /// Target heights of the rows (m)
    pub levels: Vec<f64>,
    /// Horizontal sample points in grid space `(x, y)`
    pub path: Vec<(f64, f64)>,
    /// Geographic coordinates `(lat, lon)` per sample point, when the
    /// source grid carries them
    pub latlon: Option<Vec<(f64, f64)>>,
}

impl CrossSection {
    /// Number of horizontal sample points.
    pub fn n_points(&self) -> usize {
        self.path.len()
    }

    /// Number of vertical levels.
    pub fn n_levels(&self) -> usize {
        self.levels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_coords() {
        let c = Coords2D::index(4, 6);
        assert_eq!(c.shape(), (4, 6));
        assert_eq!(c.x_at(2, 5), 5.0);
        assert_eq!(c.y_at(2, 5), 2.0);
        assert_eq!(c.x_range(), (0.0, 5.0));
        assert_eq!(c.y_range(), (0.0, 3.0));
        assert_eq!(c.at_fractional(1.5, 2.25), (2.25, 1.5));
    }

    #[test]
    fn test_latlon_coords_fractional() {
        // 2x2 grid spanning 1 degree in each direction
        let lat = vec![vec![-35.0, -35.0], vec![-34.0, -34.0]];
        let lon = vec![vec![-60.0, -59.0], vec![-60.0, -59.0]];
        let c = Coords2D::latlon(lat, lon);

        let (x, y) = c.at_fractional(0.5, 0.5);
        assert!((x - (-59.5)).abs() < 1e-12);
        assert!((y - (-34.5)).abs() < 1e-12);

        assert_eq!(c.x_range(), (-60.0, -59.0));
        assert_eq!(c.y_range(), (-35.0, -34.0));
    }

    #[test]
    fn test_field_minmax_skips_nan() {
        let data = vec![vec![1.0, f32::NAN], vec![3.0, -2.0]];
        let f = Field2D::new("t", "K", data, Coords2D::index(2, 2));
        assert_eq!(f.min(), -2.0);
        assert_eq!(f.max(), 3.0);
    }

    #[test]
    fn test_mask_below() {
        let data = vec![vec![0.5, 1.0], vec![2.0, 3.0]];
        let f = Field2D::new("ter", "m", data, Coords2D::index(2, 2)).mask_below(1.0);
        assert!(f.data[0][0].is_nan());
        assert!(f.data[0][1].is_nan());
        assert_eq!(f.data[1][0], 2.0);
    }
}
