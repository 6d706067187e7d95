//! wrfout NetCDF reader.
//!
//! Opens WRF model output files (one per simulation time step) and exposes
//! the raw variables and coordinate metadata the diagnostics need:
//!
//! - 2D and 3D variable reads with the leading `Time` dimension squeezed
//! - `Times` parsing to a timestamp
//! - `XLAT`/`XLONG` coordinate arrays and `SINALPHA`/`COSALPHA` rotation
//! - nearest-grid-point lookup for station coordinates
//! - chronological file discovery (lexicographic order of the fixed-width
//!   `wrfout_d01_YYYY-MM-DD_HH:MM:SS` names is chronological order)
//!
//! # Example
//!
//! ```rust,ignore
//! use wrfvis::io::{discover_wrfout, select_time, WrfFile};
//!
//! let files = discover_wrfout(".", "wrfout_d01_")?;
//! let file = WrfFile::open(select_time(&files, 20)?)?;
//! let t2 = file.var_2d("T2")?;
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::grid::{CoordPair, Coords2D};

/// Error type for wrfout access.
#[derive(Debug, Error)]
pub enum WrfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// NetCDF library error
    #[error("NetCDF error: {0}")]
    NetCDF(#[from] netcdf::Error),

    /// Variable not present in the file
    #[error("missing variable: {0}")]
    MissingVariable(String),

    /// Variable present but with an unusable shape
    #[error("variable {name} has {found} dimensions, expected {expected}")]
    BadShape {
        name: String,
        expected: &'static str,
        found: usize,
    },

    /// Requested time index beyond the discovered file list
    #[error("time index {index} out of range: {available} wrfout files found")]
    TimeIndex { index: usize, available: usize },

    /// Unparseable `Times` entry
    #[error("bad timestamp in Times variable: {0:?}")]
    BadTimestamp(String),
}

/// Find wrfout files in `dir` whose names start with `prefix`, sorted
/// lexicographically (chronologically, given WRF's fixed-width names).
///
/// An empty result is not an error here; [`select_time`] reports it when a
/// time index is actually requested.
pub fn discover_wrfout(dir: impl AsRef<Path>, prefix: &str) -> Result<Vec<PathBuf>, WrfError> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_file() {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with(prefix) {
                    files.push(path);
                }
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Select the file for a given time index from a discovered list.
pub fn select_time(files: &[PathBuf], index: usize) -> Result<&Path, WrfError> {
    files
        .get(index)
        .map(|p| p.as_path())
        .ok_or(WrfError::TimeIndex {
            index,
            available: files.len(),
        })
}

/// An open wrfout file.
///
/// Each workflow opens a file, extracts what it needs and lets it drop;
/// no handle outlives its extraction calls.
pub struct WrfFile {
    file: netcdf::File,
    path: PathBuf,
}

impl WrfFile {
    /// Open a wrfout file read-only.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WrfError> {
        let path = path.as_ref().to_path_buf();
        let file = netcdf::open(&path)?;
        Ok(Self { file, path })
    }

    /// Path this file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a 2D surface variable as `[ny][nx]`, squeezing a leading
    /// `Time` dimension if present (first record).
    pub fn var_2d(&self, name: &str) -> Result<Vec<Vec<f32>>, WrfError> {
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| WrfError::MissingVariable(name.to_string()))?;

        let dims = var.dimensions();
        let (ny, nx) = match dims.len() {
            2 => (dims[0].len(), dims[1].len()),
            3 => (dims[1].len(), dims[2].len()),
            found => {
                return Err(WrfError::BadShape {
                    name: name.to_string(),
                    expected: "2 or 3 (Time, y, x)",
                    found,
                })
            }
        };

        let flat: Vec<f32> = var.get_values(..)?;
        Ok(reshape_2d(&flat[..ny * nx], ny, nx))
    }

    /// Read a 3D variable as `[nz][ny][nx]`, squeezing a leading `Time`
    /// dimension if present (first record).
    pub fn var_3d(&self, name: &str) -> Result<Vec<Vec<Vec<f32>>>, WrfError> {
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| WrfError::MissingVariable(name.to_string()))?;

        let dims = var.dimensions();
        let (nz, ny, nx) = match dims.len() {
            3 => (dims[0].len(), dims[1].len(), dims[2].len()),
            4 => (dims[1].len(), dims[2].len(), dims[3].len()),
            found => {
                return Err(WrfError::BadShape {
                    name: name.to_string(),
                    expected: "3 or 4 (Time, z, y, x)",
                    found,
                })
            }
        };

        let flat: Vec<f32> = var.get_values(..)?;
        let flat = &flat[..nz * ny * nx];

        let mut out = vec![vec![vec![0.0f32; nx]; ny]; nz];
        for k in 0..nz {
            for j in 0..ny {
                let base = (k * ny + j) * nx;
                out[k][j].copy_from_slice(&flat[base..base + nx]);
            }
        }
        Ok(out)
    }

    /// Read a 2D variable as f64 (coordinate arrays).
    fn var_2d_f64(&self, name: &str) -> Result<Vec<Vec<f64>>, WrfError> {
        let data = self.var_2d(name)?;
        Ok(data
            .into_iter()
            .map(|row| row.into_iter().map(|v| v as f64).collect())
            .collect())
    }

    /// Geographic coordinates from `XLAT`/`XLONG`.
    pub fn latlon_coords(&self) -> Result<Coords2D, WrfError> {
        let lat = self.var_2d_f64("XLAT")?;
        let lon = self.var_2d_f64("XLONG")?;
        Ok(Coords2D::latlon(lat, lon))
    }

    /// Grid-index coordinates matching the mass-point grid shape.
    pub fn grid_coords(&self) -> Result<Coords2D, WrfError> {
        let (ny, nx) = self.mass_grid_shape()?;
        Ok(Coords2D::index(ny, nx))
    }

    /// Mass-point grid shape `(ny, nx)` from the `south_north` /
    /// `west_east` dimensions.
    pub fn mass_grid_shape(&self) -> Result<(usize, usize), WrfError> {
        let ny = self
            .file
            .dimension("south_north")
            .ok_or_else(|| WrfError::MissingVariable("south_north dimension".to_string()))?
            .len();
        let nx = self
            .file
            .dimension("west_east")
            .ok_or_else(|| WrfError::MissingVariable("west_east dimension".to_string()))?
            .len();
        Ok((ny, nx))
    }

    /// Grid rotation arrays `(SINALPHA, COSALPHA)`, if the file carries
    /// them. Idealized runs typically do not; wind rotation is then the
    /// identity.
    pub fn rotation(&self) -> Result<Option<(Vec<Vec<f32>>, Vec<Vec<f32>>)>, WrfError> {
        if self.file.variable("SINALPHA").is_none() || self.file.variable("COSALPHA").is_none() {
            return Ok(None);
        }
        let sina = self.var_2d("SINALPHA")?;
        let cosa = self.var_2d("COSALPHA")?;
        Ok(Some((sina, cosa)))
    }

    /// Valid time of this file, parsed from the first `Times` record
    /// (`YYYY-MM-DD_HH:MM:SS`).
    pub fn valid_time(&self) -> Result<NaiveDateTime, WrfError> {
        let var = self
            .file
            .variable("Times")
            .ok_or_else(|| WrfError::MissingVariable("Times".to_string()))?;

        let dims = var.dimensions();
        let len = match dims.len() {
            1 => dims[0].len(),
            2 => dims[1].len(),
            found => {
                return Err(WrfError::BadShape {
                    name: "Times".to_string(),
                    expected: "1 or 2 (Time, DateStrLen)",
                    found,
                })
            }
        };

        let raw: Vec<u8> = var.get_values(..)?;
        let text: String = raw[..len.min(raw.len())]
            .iter()
            .map(|&b| b as char)
            .filter(|c| !c.is_control())
            .collect();
        let text = text.trim();

        NaiveDateTime::parse_from_str(text, "%Y-%m-%d_%H:%M:%S")
            .map_err(|_| WrfError::BadTimestamp(text.to_string()))
    }

    /// Nearest mass grid point `(i, j)` to a geographic location, by
    /// longitude-scaled coordinate distance over `XLAT`/`XLONG`.
    pub fn nearest_grid_point(&self, lat: f64, lon: f64) -> Result<(usize, usize), WrfError> {
        let lats = self.var_2d_f64("XLAT")?;
        let lons = self.var_2d_f64("XLONG")?;

        let coslat = lat.to_radians().cos();
        let mut best = (0usize, 0usize);
        let mut best_d2 = f64::INFINITY;

        for (j, (lat_row, lon_row)) in lats.iter().zip(lons.iter()).enumerate() {
            for (i, (&plat, &plon)) in lat_row.iter().zip(lon_row.iter()).enumerate() {
                let dy = plat - lat;
                let dx = (plon - lon) * coslat;
                let d2 = dx * dx + dy * dy;
                if d2 < best_d2 {
                    best_d2 = d2;
                    best = (i, j);
                }
            }
        }

        Ok(best)
    }

    /// Resolve a [`CoordPair`] to grid-space `(x, y)`.
    pub fn to_grid_xy(&self, point: CoordPair) -> Result<(f64, f64), WrfError> {
        match point {
            CoordPair::Xy { x, y } => Ok((x, y)),
            CoordPair::LatLon { lat, lon } => {
                let (i, j) = self.nearest_grid_point(lat, lon)?;
                Ok((i as f64, j as f64))
            }
        }
    }
}

/// Reshape a flat row-major array to `[ny][nx]`.
fn reshape_2d(flat: &[f32], ny: usize, nx: usize) -> Vec<Vec<f32>> {
    let mut out = vec![vec![0.0f32; nx]; ny];
    for j in 0..ny {
        out[j].copy_from_slice(&flat[j * nx..(j + 1) * nx]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_time_empty_list() {
        let files: Vec<PathBuf> = Vec::new();
        match select_time(&files, 0) {
            Err(WrfError::TimeIndex {
                index: 0,
                available: 0,
            }) => {}
            other => panic!("expected TimeIndex error, got {:?}", other.map(|p| p.to_owned())),
        }
    }

    #[test]
    fn test_select_time_in_range() {
        let files = vec![PathBuf::from("wrfout_d01_a"), PathBuf::from("wrfout_d01_b")];
        assert_eq!(select_time(&files, 1).unwrap(), Path::new("wrfout_d01_b"));
    }

    #[test]
    fn test_reshape_2d() {
        let flat = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let a = reshape_2d(&flat, 2, 3);
        assert_eq!(a[0], vec![1.0, 2.0, 3.0]);
        assert_eq!(a[1], vec![4.0, 5.0, 6.0]);
    }
}
