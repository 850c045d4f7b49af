//! Engine configuration
//!
//! Loadable from TOML; any missing key falls back to its default:
//!
//! ```toml
//! history_capacity = 50
//!
//! [layout]
//! buffer_y = 200.0
//! chapter_gap_x = 1500.0
//!
//! [layout.default_heights]
//! text = 160.0
//! ```

use crate::history::DEFAULT_HISTORY_CAPACITY;
use plotline_layout::LayoutConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration loading failure
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("history capacity must be at least 1")]
    ZeroHistoryCapacity,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Spacing constants for placement and shifting
    pub layout: LayoutConfig,
    /// Maximum undo snapshots kept
    pub history_capacity: usize,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With layout constants
    #[inline]
    #[must_use]
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    /// With undo depth
    #[inline]
    #[must_use]
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Parse from a TOML document
    ///
    /// # Errors
    /// Returns error if the TOML is invalid or the history capacity is zero.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or does not parse.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns [`ConfigError::ZeroHistoryCapacity`] for an empty history.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity == 0 {
            return Err(ConfigError::ZeroHistoryCapacity);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            history_capacity = 10

            [layout]
            buffer_y = 150.0

            [layout.default_heights]
            text = 90.0
            "#,
        )
        .unwrap();

        assert_eq!(config.history_capacity, 10);
        assert_eq!(config.layout.buffer_y, 150.0);
        assert_eq!(config.layout.chapter_gap_x, 1500.0);
        assert_eq!(config.layout.default_heights.text, 90.0);
        assert_eq!(config.layout.default_heights.picture, 140.0);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn rejects_zero_capacity() {
        assert!(matches!(
            EngineConfig::from_toml_str("history_capacity = 0"),
            Err(ConfigError::ZeroHistoryCapacity)
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "history_capacity = 7").unwrap();
        let config = EngineConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.history_capacity, 7);

        let missing = EngineConfig::from_toml_file("/definitely/not/here.toml");
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
