use std::path::Path;

pub const GRID_EXTENSION: &str = "gsb";

pub fn is_grid_file(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == extension)
}
