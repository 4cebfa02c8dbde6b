//! Pipeline configuration loaded from TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Could not read the config file.
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    /// Could not parse the config text.
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration for one stream pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Bound of the output channel; controls how far the pump can run ahead
    /// of a slow consumer.
    pub channel_capacity: usize,
    /// Tool names the caller may use.
    pub allowed_tools: Vec<String>,
    /// Whether the caller is eligible for premium tools.
    pub allow_premium: bool,
    /// Root directory for file-writing tools. `None` means the process
    /// working directory.
    pub write_root: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 16,
            allowed_tools: vec!["write_to_file".to_string()],
            allow_premium: false,
            write_root: None,
        }
    }
}

impl PipelineConfig {
    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a config file from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Effective write root.
    pub fn write_root(&self) -> PathBuf {
        self.write_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
