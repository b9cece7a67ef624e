//! Editor configuration, read from JSON.
//!
//! ```json
//! {
//!   "log_level": "debug",
//!   "hex_scales": { "pan": { "min": -32, "max": 32, "step": "power_of_two" } }
//! }
//! ```
//!
//! `hex_scales` replaces the value range of scaled fields, keyed by
//! catalogue field name.

use std::collections::BTreeMap;
use std::path::Path;

use deluge_values::HexScale;
use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// A `tracing_subscriber` filter directive such as `info` or
    /// `deluge_patch=debug`.
    pub log_level: Option<String>,
    pub hex_scales: BTreeMap<String, HexScale>,
}

impl EditorConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deluge_values::StepRule;

    #[test]
    fn parses_scale_overrides() {
        let config = EditorConfig::from_json(
            r#"{
                "log_level": "debug",
                "hex_scales": {
                    "pan": {"min": -64, "max": 64, "step": "power_of_two"},
                    "volume": {"min": 0, "max": 100}
                }
            }"#,
        )
        .expect("config must parse");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(
            config.hex_scales["pan"],
            HexScale::new(-64, 64, StepRule::PowerOfTwo)
        );
        assert_eq!(config.hex_scales["volume"].step, StepRule::Truncated);
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(EditorConfig::from_json("{}").expect("parse"), EditorConfig::default());
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            EditorConfig::from_json(r#"{"hexScales":{}}"#),
            Err(ConfigError::Json(_))
        ));
    }
}
