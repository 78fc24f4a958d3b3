use serde::Deserialize;

/// KML `aabbggrr` semi-transparent green.
pub const DEFAULT_COLOR: &str = "7d00ff00";

pub const STYLE_ID: &str = "coverage";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PolygonStyle {
    pub color: String,
    pub fill: bool,
    pub outline: bool,
}

impl Default for PolygonStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR.to_string(),
            fill: true,
            outline: true,
        }
    }
}

impl PolygonStyle {
    pub fn is_valid_color(color: &str) -> bool {
        color.len() == 8 && color.chars().all(|c| c.is_ascii_hexdigit())
    }
}
