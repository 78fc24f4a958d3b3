use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("extension must not be empty")]
    EmptyExtension,
    #[error("style color {0:?} should be 8 hex digits (aabbggrr)")]
    Color(String),
}
