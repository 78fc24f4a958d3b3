use thiserror::Error;

#[derive(Debug, Error)]
pub enum KmlError {
    #[error("failed to render KML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("failed to write KMZ archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
