use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::config::BatchConfig;
use crate::coverage::{Conversion, CoverageConverter, CoverageError, batch_output_path};
use crate::readers::is_grid_file;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error(
        "No .{extension} files found in {}/. Add your grids to {}/ and rerun.",
        .dir.display(),
        .dir.display()
    )]
    NoGrids { dir: PathBuf, extension: String },
    #[error("invalid search pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("failed to list grid files: {0}")]
    Glob(#[from] glob::GlobError),
    #[error("failed to convert {}", .input.display())]
    Convert {
        input: PathBuf,
        #[source]
        source: CoverageError,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug)]
pub struct BatchRunner {
    config: BatchConfig,
    converter: CoverageConverter,
}

impl BatchRunner {
    pub fn new(config: BatchConfig) -> Self {
        let converter = CoverageConverter::new(config.reader(), config.style().clone());
        BatchRunner { config, converter }
    }

    /// Grid files directly inside the input directory, sorted by path.
    pub fn find_grids(&self) -> Result<Vec<PathBuf>, BatchError> {
        let dir = self.config.input_dir();
        let extension = self.config.extension();
        let pattern = format!(
            "{}/*.{}",
            Pattern::escape(&dir.to_string_lossy()),
            Pattern::escape(extension)
        );

        let mut grids = Vec::new();
        for entry in glob::glob(&pattern)? {
            let path = entry?;
            if path.is_file() && is_grid_file(&path, extension) {
                grids.push(path);
            }
        }
        grids.sort();

        if grids.is_empty() {
            return Err(BatchError::NoGrids {
                dir: dir.to_path_buf(),
                extension: extension.to_string(),
            });
        }

        Ok(grids)
    }

    /// Converts every grid; the first failure aborts the batch.
    pub fn process(&self) -> Result<Vec<Conversion>, BatchError> {
        let grids = self.find_grids()?;
        info!(count = grids.len(), dir = %self.config.input_dir().display(), "Found grid files");

        let output_dir = self.config.output_dir();
        fs::create_dir_all(output_dir)?;

        let mut conversions = Vec::with_capacity(grids.len());
        for grid in &grids {
            let conversion = self.process_one(grid, output_dir)?;
            conversions.push(conversion);
        }

        Ok(conversions)
    }

    fn process_one(&self, grid: &Path, output_dir: &Path) -> Result<Conversion, BatchError> {
        let base = grid
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output = batch_output_path(output_dir, &base);
        let name = format!("{} Coverage", base);

        println!("Processing {} -> {}", grid.display(), output.display());

        let conversion = self
            .converter
            .convert(grid, &output, Some(&name))
            .map_err(|source| BatchError::Convert {
                input: grid.to_path_buf(),
                source,
            })?;

        println!("Wrote: {}", conversion.detail.display());
        println!("Wrote: {}", conversion.merged.display());

        Ok(conversion)
    }
}
