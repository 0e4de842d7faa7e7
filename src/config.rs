use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Torus geometry and sweep resolution
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TorusParams {
    pub r1: f32,            // Tube (cross-section) radius
    pub r2: f32,            // Radius of revolution
    pub k2: f32,            // Distance from viewer
    pub theta_spacing: f32, // Step around the tube circle
    pub phi_spacing: f32,   // Step around the revolution
}

impl Default for TorusParams {
    fn default() -> Self {
        Self {
            r1: 1.0,
            r2: 2.0,
            k2: 5.0,
            theta_spacing: 0.07,
            phi_spacing: 0.02,
        }
    }
}

/// Finest sweep step accepted; finer grids only add samples per pixel
pub const MIN_SPACING: f32 = 1e-4;

impl TorusParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("r1", self.r1),
            ("r2", self.r2),
            ("k2", self.k2),
            ("theta_spacing", self.theta_spacing),
            ("phi_spacing", self.phi_spacing),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "torus.{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        for (name, value) in [
            ("theta_spacing", self.theta_spacing),
            ("phi_spacing", self.phi_spacing),
        ] {
            if value < MIN_SPACING {
                return Err(ConfigError::Invalid(format!(
                    "torus.{} must be at least {}, got {}",
                    name, MIN_SPACING, value
                )));
            }
        }
        if self.k2 <= self.r1 + self.r2 {
            tracing::warn!(
                k2 = self.k2,
                extent = self.r1 + self.r2,
                "viewer sits inside the torus extent; samples behind the eye are dropped"
            );
        }
        Ok(())
    }
}

/// How scroll offsets turn into rotation
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScrollParams {
    pub smoothing: f32,     // Fraction of the remaining distance covered per tick
    pub sensitivity_a: f32, // Scroll pixels per radian of A
    pub sensitivity_b: f32, // Scroll pixels per radian of B
}

impl Default for ScrollParams {
    fn default() -> Self {
        Self {
            smoothing: 0.1,
            sensitivity_a: 200.0,
            sensitivity_b: 300.0,
        }
    }
}

impl ScrollParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "scroll.smoothing must be in (0, 1], got {}",
                self.smoothing
            )));
        }
        for (name, value) in [("sensitivity_a", self.sensitivity_a), ("sensitivity_b", self.sensitivity_b)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "scroll.{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Terminal viewer defaults
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LiveParams {
    pub fps: u32,
    pub color_scheme: u8,
    pub scroll_step: f32, // Scroll pixels per wheel notch / arrow press
    pub cell_aspect: f32,
}

impl Default for LiveParams {
    fn default() -> Self {
        Self {
            fps: 60,
            color_scheme: 7,
            scroll_step: 40.0,
            cell_aspect: 0.5,
        }
    }
}

impl LiveParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.scroll_step.is_finite() || self.scroll_step <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "live.scroll_step must be a positive number, got {}",
                self.scroll_step
            )));
        }
        validate_cell_aspect("live.cell_aspect", self.cell_aspect)
    }
}

/// Height-to-width ratio of one pixel; scales projected rows
pub fn validate_cell_aspect(name: &str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::Invalid(format!(
            "{} must be a positive number, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Configuration for the interactive terminal viewer
#[derive(Clone)]
pub struct LiveConfig {
    pub torus: TorusParams,
    pub scroll: ScrollParams,
    pub live: LiveParams,
}

/// Configuration for a headless render
#[derive(Clone)]
pub struct RenderConfig {
    pub torus: TorusParams,
    pub scroll: ScrollParams,
    pub width: u32,
    pub height: u32,
    pub scroll_offset: f64,
    pub ticks: u32,
    pub cell_aspect: f32,
    pub output: Option<PathBuf>,
    pub ascii: bool,
    pub stats: bool,
}

/// Errors from loading or validating configuration
#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, io::Error),
    Parse(PathBuf, toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(path, err) => write!(f, "cannot read {}: {}", path.display(), err),
            ConfigError::Parse(path, err) => write!(f, "invalid config {}: {}", path.display(), err),
            ConfigError::Invalid(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(_, err) => Some(err),
            ConfigError::Parse(_, err) => Some(err),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<ConfigError> for io::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(_, inner) => inner,
            other => io::Error::new(io::ErrorKind::InvalidInput, other.to_string()),
        }
    }
}
