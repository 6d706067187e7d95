//! # wrfvis
//!
//! Diagnostics and plotting for WRF model output.
//!
//! This crate provides the building blocks for turning `wrfout` NetCDF
//! files into figures:
//! - NetCDF reading and file discovery ([`io`])
//! - Derived meteorological fields: temperature, dewpoint, rotated
//!   winds, geopotential height, radar reflectivity ([`diag`])
//! - Vertical interpolation to height levels and cross-sections
//!   ([`interp`])
//! - Software-rasterized figures with filled contours, contour lines,
//!   wind barbs, and map overlays ([`render`])
//!
//! The plotting workflows themselves live in `src/bin/`: surface maps,
//! constant-height maps, vertical cross-sections, and station
//! meteograms.

pub mod diag;
pub mod grid;
pub mod interp;
pub mod io;
pub mod render;

// Re-export main types for convenience
pub use grid::{CoordPair, Coords2D, CrossSection, Field2D, Field3D};
pub use interp::InterpError;
pub use io::{MapOverlay, OverlayError, WrfError, WrfFile};
pub use render::{Colormap, Extend, Extent, Figure, RenderError};
