use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fonts::BuiltinFont;
use crate::graphics::MediaBox;

/// Settings shared by every page written into one document.
///
/// All fields have defaults, so a config file only names what it changes:
///
/// ```json
/// { "defaultFont": "Times-Roman", "compress": true }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Font for text actions without a `fontName`.
    pub default_font: BuiltinFont,
    /// Media box for created pages without a `mediaBox`.
    pub default_media_box: MediaBox,
    /// Flate-compress the content streams this crate writes.
    pub compress: bool,
    /// Header version for newly created documents.
    pub pdf_version: String,
    /// Written to the document info dictionary as `/Producer`.
    pub producer: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_font: BuiltinFont::Helvetica,
            default_media_box: MediaBox::default(),
            compress: false,
            pdf_version: "1.7".to_string(),
            producer: None,
        }
    }
}

impl Config {
    /// Read a JSON config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_override() {
        let config: Config = serde_json::from_str(
            r#"{"defaultFont": "Courier", "defaultMediaBox": {"width": 612, "height": 792}}"#,
        )
        .unwrap();
        assert_eq!(config.default_font, BuiltinFont::Courier);
        assert_eq!(config.default_media_box, MediaBox::new(0.0, 0.0, 612.0, 792.0));
        assert!(!config.compress);
        assert_eq!(config.pdf_version, "1.7");
    }
}
