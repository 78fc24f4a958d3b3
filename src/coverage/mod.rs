pub mod converter;
pub mod error;
pub mod merge;
pub mod paths;

pub use converter::{Conversion, CoverageConverter, collect_extents};
pub use error::CoverageError;
pub use merge::MergedRegion;
pub use paths::{batch_output_path, derive_merged_path};
