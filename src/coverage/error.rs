use std::path::PathBuf;
use thiserror::Error;

use crate::kml::KmlError;
use crate::readers::ReadError;

#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("failed to open {path} as a grid dataset")]
    Open {
        path: PathBuf,
        #[source]
        source: ReadError,
    },
    #[error(
        "no extents could be derived from {0} (dataset or subdatasets missing geotransform)"
    )]
    NoExtents(PathBuf),
    #[error("merged output path {0} would overwrite the detail output")]
    MergedPathCollision(PathBuf),
    #[error(transparent)]
    Kml(#[from] KmlError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
