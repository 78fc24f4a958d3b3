use gdal::{Dataset, Metadata};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{GridReader, ReadError};
use crate::extent::Extent;

/// Reads grids through GDAL's NTv2 driver.
pub struct GdalReader {
    path: PathBuf,
    dataset: Dataset,
}

impl GdalReader {
    pub fn open(path: &Path) -> Result<Self, ReadError> {
        let dataset = Dataset::open(path).map_err(|e| ReadError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        debug!(
            path = %path.display(),
            driver = %dataset.driver().short_name(),
            "Opened dataset"
        );

        Ok(Self {
            path: path.to_path_buf(),
            dataset,
        })
    }
}

fn dataset_extent(dataset: &Dataset) -> Result<Extent, ReadError> {
    let geotransform = dataset.geo_transform()?;
    let (cols, rows) = dataset.raster_size();
    Extent::from_geo_transform(&geotransform, cols, rows)
}

// SUBDATASETS entries come in pairs: SUBDATASET_<n>_NAME=... and SUBDATASET_<n>_DESC=...
fn subdataset_names(entries: Vec<String>) -> Vec<String> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let (key, value) = entry.split_once('=')?;
            key.ends_with("_NAME").then(|| value.to_string())
        })
        .collect()
}

impl GridReader for GdalReader {
    fn extent(&self) -> Result<Extent, ReadError> {
        dataset_extent(&self.dataset)
    }

    fn subdatasets(&self) -> Vec<String> {
        subdataset_names(
            self.dataset
                .metadata_domain("SUBDATASETS")
                .unwrap_or_default(),
        )
    }

    fn subdataset_extent(&self, name: &str) -> Result<Extent, ReadError> {
        let dataset = Dataset::open(name).map_err(|e| ReadError::Open {
            path: name.to_string(),
            reason: e.to_string(),
        })?;
        debug!(parent = %self.path.display(), subdataset = name, "Opened sub-dataset");

        // The handle is released when `dataset` goes out of scope.
        dataset_extent(&dataset)
    }
}
