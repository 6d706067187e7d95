//! Static basemap overlay reader.
//!
//! Loads named `(x, y)` polyline sets (country and province borders) from a
//! single pre-saved text file. The polylines are drawn as-is on geographic
//! plots; nothing is computed from them.
//!
//! # File Format
//!
//! ```text
//! # South America basemap
//! > provincias
//! -60.00 -35.00
//! -60.15 -34.82
//!
//! -61.30 -33.10
//! -61.45 -33.05
//! > samerica
//! -68.50 -54.90
//! -68.30 -54.80
//! ```
//!
//! `> name` starts a named polyline set, a blank line lifts the pen
//! (starts a new segment within the set), `#` starts a comment. Each data
//! line is an `x y` (longitude latitude) pair.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

/// Error type for overlay file parsing.
#[derive(Debug, Error)]
pub enum OverlayError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error with line number
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Vertex data before any `> name` header
    #[error("vertex at line {line} before any polyline header")]
    MissingHeader { line: usize },

    /// File contains no polyline sets
    #[error("overlay file contains no polylines")]
    Empty,
}

/// A named set of polyline segments.
#[derive(Clone, Debug)]
pub struct PolylineSet {
    /// Set name (e.g. "provincias", "samerica")
    pub name: String,
    /// Segments; each is a sequence of `(x, y)` vertices
    pub segments: Vec<Vec<(f64, f64)>>,
}

impl PolylineSet {
    /// Total number of vertices across all segments.
    pub fn n_vertices(&self) -> usize {
        self.segments.iter().map(|s| s.len()).sum()
    }
}

/// Basemap overlay: named polyline sets loaded from a static file.
#[derive(Clone, Debug)]
pub struct MapOverlay {
    sets: Vec<PolylineSet>,
}

impl MapOverlay {
    /// Load an overlay file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OverlayError> {
        let file = File::open(path)?;
        parse_overlay(BufReader::new(file))
    }

    /// Look up a polyline set by name.
    pub fn get(&self, name: &str) -> Option<&PolylineSet> {
        self.sets.iter().find(|s| s.name == name)
    }

    /// All polyline sets, in file order.
    pub fn sets(&self) -> &[PolylineSet] {
        &self.sets
    }
}

/// Parse overlay polylines from a reader.
pub fn parse_overlay(reader: impl BufRead) -> Result<MapOverlay, OverlayError> {
    let mut sets: Vec<PolylineSet> = Vec::new();
    let mut current_segment: Vec<(f64, f64)> = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line?;
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => &line[..],
        };
        let trimmed = line.trim();

        if trimmed.is_empty() {
            // Pen up: close the running segment
            flush_segment(&mut sets, &mut current_segment);
            continue;
        }

        if let Some(name) = trimmed.strip_prefix('>') {
            flush_segment(&mut sets, &mut current_segment);
            sets.push(PolylineSet {
                name: name.trim().to_string(),
                segments: Vec::new(),
            });
            continue;
        }

        if sets.is_empty() {
            return Err(OverlayError::MissingHeader { line: line_no });
        }

        let mut parts = trimmed.split_whitespace();
        let x = parse_coord(parts.next(), line_no)?;
        let y = parse_coord(parts.next(), line_no)?;
        if parts.next().is_some() {
            return Err(OverlayError::Parse {
                line: line_no,
                message: "expected exactly two values per vertex".to_string(),
            });
        }
        current_segment.push((x, y));
    }

    flush_segment(&mut sets, &mut current_segment);

    if sets.is_empty() {
        return Err(OverlayError::Empty);
    }
    Ok(MapOverlay { sets })
}

fn flush_segment(sets: &mut [PolylineSet], segment: &mut Vec<(f64, f64)>) {
    if segment.is_empty() {
        return;
    }
    if let Some(set) = sets.last_mut() {
        set.segments.push(std::mem::take(segment));
    } else {
        segment.clear();
    }
}

fn parse_coord(token: Option<&str>, line: usize) -> Result<f64, OverlayError> {
    let token = token.ok_or(OverlayError::Parse {
        line,
        message: "expected two values per vertex".to_string(),
    })?;
    token.parse::<f64>().map_err(|_| OverlayError::Parse {
        line,
        message: format!("bad number: {token:?}"),
    })
}
