//! Application configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Runtime configuration.
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Skip the check that concrete rule dependencies exist in the layout.
    pub suppress_rule_exceptions: bool,

    /// Maximum depth of rule-triggers-rule cascades for one event.
    pub max_cascade_depth: usize,

    pub toggle: TogglePalette,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            suppress_rule_exceptions: false,
            max_cascade_depth: 16,
            toggle: TogglePalette::default(),
        }
    }
}

/// The two visual states of a toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TogglePalette {
    /// Background for an even click count.
    pub even_background: String,
    /// Background for an odd click count.
    pub odd_background: String,
}

impl Default for TogglePalette {
    fn default() -> Self {
        Self {
            even_background: "#55aa55".to_string(),
            odd_background: "#aa5555".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_cascade_depth == 0 {
            return Err(ConfigError::Invalid {
                reason: "max_cascade_depth must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
