use clap::ValueEnum;
use serde::Deserialize;
use thiserror::Error;

use crate::extent::Extent;

/// Access to the georeferencing of a grid file and its sub-grids.
pub trait GridReader {
    /// Extent of the top-level dataset.
    fn extent(&self) -> Result<Extent, ReadError>;

    /// Openable names of the sub-datasets, in file order.
    fn subdatasets(&self) -> Vec<String>;

    /// Opens one sub-dataset, reads its extent and releases it.
    fn subdataset_extent(&self, name: &str) -> Result<Extent, ReadError>;
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to open {path}: {reason}")]
    Open { path: String, reason: String },
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed NTv2 file: {0}")]
    Format(String),
    #[error("no usable geometry: {0}")]
    InvalidGeometry(String),
    #[error("unknown sub-dataset {0}")]
    UnknownSubdataset(String),
}

#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReaderKind {
    #[default]
    #[serde(rename(deserialize = "gdal"))]
    Gdal,
    #[serde(rename(deserialize = "ntv2"))]
    Ntv2,
}
