use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::kml::PolygonStyle;
use crate::readers::{GRID_EXTENSION, ReaderKind};

pub mod error;
pub use error::ConfigError;

/// Configuration file picked up from the working directory by the batch driver.
pub const DEFAULT_CONFIG_FILE: &str = "coverage.json";

pub const DEFAULT_INPUT_DIR: &str = "data";
pub const DEFAULT_OUTPUT_DIR: &str = "build";

#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    input_dir: PathBuf,
    output_dir: PathBuf,
    extension: String,
    reader: ReaderKind,
    style: PolygonStyle,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            extension: GRID_EXTENSION.to_string(),
            reader: ReaderKind::default(),
            style: PolygonStyle::default(),
        }
    }
}

// Every field is optional; the extension loses any leading dot and the style color must be
// a KML aabbggrr value.
impl<'de> Deserialize<'de> for BatchConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct BatchConfigHelper {
            input_dir: Option<PathBuf>,
            output_dir: Option<PathBuf>,
            extension: Option<String>,
            reader: Option<ReaderKind>,
            style: Option<PolygonStyle>,
        }

        let helper = BatchConfigHelper::deserialize(deserializer)?;
        let defaults = BatchConfig::default();

        let extension = match helper.extension {
            Some(ext) => ext.trim_start_matches('.').to_string(),
            None => defaults.extension,
        };
        if extension.is_empty() {
            return Err(D::Error::custom(ConfigError::EmptyExtension));
        }

        let style = helper.style.unwrap_or(defaults.style);
        if !PolygonStyle::is_valid_color(&style.color) {
            return Err(D::Error::custom(ConfigError::Color(style.color)));
        }

        Ok(BatchConfig {
            input_dir: helper.input_dir.unwrap_or(defaults.input_dir),
            output_dir: helper.output_dir.unwrap_or(defaults.output_dir),
            extension,
            reader: helper.reader.unwrap_or(defaults.reader),
            style,
        })
    }
}

impl BatchConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<BatchConfig, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let config: BatchConfig = serde_json::from_reader(reader).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Reads `path` when it exists, otherwise falls back to the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<BatchConfig, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn with_reader(mut self, reader: ReaderKind) -> Self {
        self.reader = reader;
        self
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn reader(&self) -> ReaderKind {
        self.reader
    }

    pub fn style(&self) -> &PolygonStyle {
        &self.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn parse(json: &str) -> Result<BatchConfig, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("coverage.json");
        let mut file = File::create(&file_path).unwrap();

        let config_data = r#"
    {
        "input_dir": "grids",
        "output_dir": "out",
        "extension": ".GSB",
        "reader": "ntv2",
        "style": { "color": "7f0000ff", "fill": false }
    }
    "#;

        file.write_all(config_data.as_bytes()).unwrap();

        let config = BatchConfig::from_file(file_path).unwrap();

        assert_eq!(config.input_dir(), Path::new("grids"));
        assert_eq!(config.output_dir(), Path::new("out"));
        assert_eq!(config.extension(), "GSB");
        assert_eq!(config.reader(), ReaderKind::Ntv2);
        assert_eq!(config.style().color, "7f0000ff");
        assert!(!config.style().fill);
        assert!(config.style().outline);
    }

    #[test]
    fn test_empty_object_gives_defaults() {
        let config = parse("{}").unwrap();
        assert_eq!(config, BatchConfig::default());
        assert_eq!(config.input_dir(), Path::new("data"));
        assert_eq!(config.output_dir(), Path::new("build"));
        assert_eq!(config.extension(), "gsb");
        assert_eq!(config.reader(), ReaderKind::Gdal);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(parse(r#"{ "extension": "." }"#).is_err());
        assert!(parse(r#"{ "style": { "color": "green" } }"#).is_err());
        assert!(parse(r#"{ "reader": "shapefile" }"#).is_err());
        assert!(parse(r#"{ "inputs": "data" }"#).is_err());
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = tempdir().unwrap();
        let config = BatchConfig::load_or_default(dir.path().join("coverage.json")).unwrap();
        assert_eq!(config, BatchConfig::default());
    }

    #[test]
    fn test_malformed_file_is_json_error() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("coverage.json");
        std::fs::write(&file_path, "{ not json").unwrap();

        assert!(matches!(
            BatchConfig::from_file(file_path),
            Err(ConfigError::Json(_))
        ));
    }
}
