use std::path::{Path, PathBuf};
use tracing::warn;

const COVERAGE_MARKER: &str = "_coverage";
const MERGED_SUFFIX: &str = "_merged.kmz";

/// `build/foo_coverage.kmz` becomes `build/foo_merged.kmz`. Only the file stem is rewritten.
pub fn derive_merged_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    if !stem.contains(COVERAGE_MARKER) {
        warn!(
            output = %output.display(),
            "Output name has no {} marker, appending {} to the full stem",
            COVERAGE_MARKER,
            MERGED_SUFFIX
        );
    }

    let merged_name = format!("{}{}", stem.replace(COVERAGE_MARKER, ""), MERGED_SUFFIX);
    match output.parent() {
        Some(parent) => parent.join(merged_name),
        None => PathBuf::from(merged_name),
    }
}

/// Detail output used by the batch driver: `<output_dir>/<basename>_coverage.kmz`.
pub fn batch_output_path(output_dir: &Path, basename: &str) -> PathBuf {
    output_dir.join(format!("{}{}.kmz", basename, COVERAGE_MARKER))
}
