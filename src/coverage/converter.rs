use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{CoverageError, MergedRegion, derive_merged_path};
use crate::extent::Extent;
use crate::kml::{Placemark, PolygonStyle, write_kmz};
use crate::readers::{GridReader, ReaderKind, create_reader};

/// Paths and counts produced by one conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub detail: PathBuf,
    pub merged: PathBuf,
    pub subgrids: usize,
    pub merged_parts: usize,
}

/// Gathers the top-level extent followed by every openable sub-dataset.
///
/// A top-level dataset without geometry is normal for multi-grid containers and a
/// sub-dataset that fails to open is skipped, so this never fails.
pub fn collect_extents(reader: &dyn GridReader) -> Vec<Extent> {
    let mut extents = Vec::new();

    match reader.extent() {
        Ok(extent) => extents.push(extent),
        Err(e) => debug!(error = %e, "Top-level dataset has no usable extent"),
    }

    for name in reader.subdatasets() {
        match reader.subdataset_extent(&name) {
            Ok(extent) => extents.push(extent),
            Err(e) => warn!(subdataset = %name, error = %e, "Skipping sub-dataset"),
        }
    }

    extents
}

#[derive(Debug, Clone, Default)]
pub struct CoverageConverter {
    reader: ReaderKind,
    style: PolygonStyle,
}

impl CoverageConverter {
    pub fn new(reader: ReaderKind, style: PolygonStyle) -> Self {
        Self { reader, style }
    }

    /// Writes the per-subgrid KMZ at `output` and the unioned KMZ next to it.
    pub fn convert(
        &self,
        input: &Path,
        output: &Path,
        name: Option<&str>,
    ) -> Result<Conversion, CoverageError> {
        let reader = create_reader(self.reader, input).map_err(|source| CoverageError::Open {
            path: input.to_path_buf(),
            source,
        })?;

        self.convert_with(reader.as_ref(), input, output, name)
    }

    pub fn convert_with(
        &self,
        reader: &dyn GridReader,
        input: &Path,
        output: &Path,
        name: Option<&str>,
    ) -> Result<Conversion, CoverageError> {
        let merged_path = derive_merged_path(output);
        if merged_path == output {
            return Err(CoverageError::MergedPathCollision(merged_path));
        }

        let extents = collect_extents(reader);
        if extents.is_empty() {
            return Err(CoverageError::NoExtents(input.to_path_buf()));
        }
        info!(input = %input.display(), extents = extents.len(), "Collected grid extents");

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file_name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let detail_name = name
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} Coverage", file_name));
        let merged_name = format!("{} (Merged)", name.unwrap_or(&file_name));

        let detail: Vec<Placemark> = extents
            .iter()
            .enumerate()
            .map(|(i, extent)| {
                Placemark::new(format!("Subgrid {}", i + 1), extent.to_polygon())
            })
            .collect();
        write_kmz(output, &detail_name, &detail, &self.style)?;

        let region = MergedRegion::from_extents(&extents)
            .ok_or_else(|| CoverageError::NoExtents(input.to_path_buf()))?;
        write_kmz(&merged_path, &merged_name, &region.placemarks(), &self.style)?;

        info!(
            detail = %output.display(),
            merged = %merged_path.display(),
            parts = region.part_count(),
            "Wrote coverage overlays"
        );

        Ok(Conversion {
            detail: output.to_path_buf(),
            merged: merged_path,
            subgrids: detail.len(),
            merged_parts: region.part_count(),
        })
    }
}
