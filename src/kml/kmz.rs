use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use super::{KmlError, Placemark, PolygonStyle, render_kml};

/// Name of the KML document inside the archive.
pub const KML_ENTRY: &str = "doc.kml";

/// Renders the placemarks and writes them as a KMZ archive at `path`.
///
/// Entries carry a fixed timestamp so the same input always produces the same bytes.
pub fn write_kmz(
    path: &Path,
    name: &str,
    placemarks: &[Placemark],
    style: &PolygonStyle,
) -> Result<(), KmlError> {
    let kml = render_kml(name, placemarks, style)?;

    let file = File::create(path)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    zip.start_file(KML_ENTRY, options)?;
    zip.write_all(&kml)?;
    zip.finish()?.flush()?;

    debug!(
        path = %path.display(),
        placemarks = placemarks.len(),
        bytes = kml.len(),
        "Wrote KMZ"
    );

    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::fs::File;
    use std::io::Read;
    use std::path::Path;
    use zip::ZipArchive;

    use super::KML_ENTRY;

    pub fn read_kml(path: &Path) -> String {
        let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut entry = archive.by_name(KML_ENTRY).unwrap();
        let mut kml = String::new();
        entry.read_to_string(&mut kml).unwrap();
        kml
    }

    pub fn placemark_count(kml: &str) -> usize {
        kml.matches("<Placemark>").count()
    }
}
