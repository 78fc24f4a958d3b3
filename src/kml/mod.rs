pub mod document;
pub mod error;
pub mod kmz;
pub mod style;

pub use document::{Placemark, render_kml};
pub use error::KmlError;
pub use kmz::{KML_ENTRY, write_kmz};
pub use style::PolygonStyle;
