pub mod gdal_reader;
pub mod ntv2;
pub mod types;
pub mod utils;

use std::path::Path;

pub use gdal_reader::GdalReader;
pub use ntv2::Ntv2Reader;
pub use types::{GridReader, ReadError, ReaderKind};
pub use utils::{GRID_EXTENSION, is_grid_file};

pub fn create_reader(kind: ReaderKind, path: &Path) -> Result<Box<dyn GridReader>, ReadError> {
    match kind {
        ReaderKind::Gdal => Ok(Box::new(GdalReader::open(path)?)),
        ReaderKind::Ntv2 => Ok(Box::new(Ntv2Reader::open(path)?)),
    }
}
