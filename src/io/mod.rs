//! Input readers for the visualization workflows.
//!
//! - **wrfout**: WRF model output (NetCDF), one file per time step
//! - **overlay**: static basemap polyline file for geographic plots
//!
//! All inputs are read-only; nothing here writes files.

mod overlay;
mod wrfout;

pub use overlay::{parse_overlay, MapOverlay, OverlayError, PolylineSet};
pub use wrfout::{discover_wrfout, select_time, WrfError, WrfFile};
