//! Coverage overlays for NTv2 grid-shift files.
//!
//! A grid file is opened through a [`readers::GridReader`], one rectangle is derived per
//! grid from its geotransform, and two KMZ files are written: one polygon per grid and
//! the union of all of them.

pub mod batch;
pub mod config;
pub mod coverage;
pub mod extent;
pub mod kml;
pub mod logging;
pub mod readers;

pub use batch::{BatchError, BatchRunner};
pub use config::BatchConfig;
pub use coverage::{Conversion, CoverageConverter, CoverageError, MergedRegion};
pub use extent::Extent;
