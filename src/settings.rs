use crate::config::{ConfigError, LiveParams, ScrollParams, TorusParams};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of `config.toml`; every table is optional
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub torus: TorusParams,
    #[serde(default)]
    pub scroll: ScrollParams,
    #[serde(default)]
    pub live: LiveParams,
}

impl Settings {
    /// Load from an explicit path; any failure is an error
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::parse(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    /// Load the default config file, falling back to defaults when it is
    /// missing or unreadable
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => {
                tracing::info!(path = %path.display(), "loaded config");
                settings
            }
            Err(err) => {
                tracing::warn!(error = %err, "ignoring config file");
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("scrolltorus")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.torus.validate()?;
        self.scroll.validate()?;
        self.live.validate()
    }
}
