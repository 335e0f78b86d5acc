//! Engine configuration.

use crate::errors::ConfigError;
use crate::pen::Format;
use serde::Deserialize;

/// Tunables read by the engine when evaluating and rendering.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Format failure messages are rendered to.
    pub format: Format,
    /// How many levels `inspect` descends into composites.
    pub inspect_depth: usize,
    /// Equality recursion depth after which cycles are tracked.
    pub circular_check_depth: usize,
    /// Widest single-line standard message before the assertion name wraps.
    pub line_width: usize,
}

impl EngineConfig {
    /// Plain-text output with the usual limits.
    pub fn standard() -> Self {
        Self {
            format: Format::Text,
            inspect_depth: 3,
            circular_check_depth: 500,
            line_width: 120,
        }
    }

    /// Parse a configuration from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Toml(e.to_string()))
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::standard()
    }
}
