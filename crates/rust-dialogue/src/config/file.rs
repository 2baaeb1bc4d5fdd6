//! File-based configuration loading.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::FlowConfig;
use crate::error::{DialogueError, Result};

/// Configuration file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Detect format from path.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl FlowConfig {
    /// Parse a configuration from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from JSON.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration in the given format.
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        match format {
            ConfigFormat::Toml => Self::from_toml_str(content),
            ConfigFormat::Json => Self::from_json_str(content),
        }
    }
}

/// Configuration file loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Search paths.
    search_paths: Vec<PathBuf>,
    /// Default format.
    default_format: Option<ConfigFormat>,
}

impl ConfigLoader {
    /// Create a new loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a search path.
    #[must_use]
    pub fn add_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// Set default format.
    #[must_use]
    pub const fn with_format(mut self, format: ConfigFormat) -> Self {
        self.default_format = Some(format);
        self
    }

    /// Find a config file.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        let extensions = ["toml", "json"];

        for search_path in &self.search_paths {
            // Try exact name first
            let path = search_path.join(name);
            if path.is_file() {
                return Some(path);
            }

            for ext in &extensions {
                let path = search_path.join(format!("{name}.{ext}"));
                if path.is_file() {
                    return Some(path);
                }
            }
        }

        None
    }

    /// Load a config file.
    pub fn load(&self, path: &Path) -> Result<FlowConfig> {
        let content = DialogueError::with_io_context(
            std::fs::read_to_string(path),
            format!("reading config file {}", path.display()),
        )?;

        let format = ConfigFormat::from_path(path)
            .or(self.default_format)
            .ok_or_else(|| {
                DialogueError::config(format!("unknown config format: {}", path.display()))
            })?;

        debug!(path = %path.display(), ?format, "Loading flow config");
        FlowConfig::parse(&content, format)
    }

    /// Load by name (searches paths).
    pub fn load_by_name(&self, name: &str) -> Result<FlowConfig> {
        let path = self
            .find(name)
            .ok_or_else(|| DialogueError::config(format!("config file not found: {name}")))?;
        self.load(&path)
    }
}
