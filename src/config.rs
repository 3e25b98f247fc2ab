//! Configuration file support.
//!
//! Settings are stored as JSON. Every field has a default, so a config file
//! only needs to name what it changes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sphere_geo::coords::{AZIMUTH_RANGE, MAX_ALTITUDE, MIN_ALTITUDE};
use sphere_geo::{DEFAULT_SEGMENTS_PER_EDGE, SPHERE_RADIUS};

use crate::constants::{DEFAULT_API_URL, HANDLE_HIT_RADIUS, SAVE_STATUS_DISPLAY, ZOOM_SPEED};
use crate::interaction::InteractionLimits;
use crate::keybindings::KeyBindings;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Settings of an annotation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Log verbosity level
    pub log_level: LogLevel,

    /// Radius of the viewer's sphere mesh
    pub sphere_radius: f64,

    /// Outline subdivisions per box edge
    pub segments_per_edge: usize,

    /// Pointer distance in degrees within which a handle is grabbed
    pub handle_hit_radius: f64,

    /// Box size limits for drawing and resizing
    pub limits: InteractionLimits,

    /// Field of view change in degrees per unit of wheel delta
    pub zoom_speed: f64,

    /// How long "Saved"/"Error saving" stays visible, in milliseconds
    pub save_status_display_ms: u64,

    /// Base URL of the annotation service
    pub api_url: String,

    /// Keybinding configuration
    pub keybindings: KeyBindings,
}

impl SessionConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            log_level: LogLevel::default(),
            sphere_radius: SPHERE_RADIUS,
            segments_per_edge: DEFAULT_SEGMENTS_PER_EDGE,
            handle_hit_radius: HANDLE_HIT_RADIUS,
            limits: InteractionLimits::default(),
            zoom_speed: ZOOM_SPEED,
            save_status_display_ms: SAVE_STATUS_DISPLAY.as_millis() as u64,
            api_url: DEFAULT_API_URL.to_string(),
            keybindings: KeyBindings::default(),
        }
    }

    pub fn save_status_display(&self) -> Duration {
        Duration::from_millis(self.save_status_display_ms)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the numeric settings describe a usable viewer.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |value: f64| value.is_finite() && value > 0.0;
        let limits = &self.limits;

        if !positive(self.sphere_radius) {
            return Err(ConfigError::Invalid(format!("sphere_radius must be positive, got {}", self.sphere_radius)));
        }
        if self.segments_per_edge == 0 {
            return Err(ConfigError::Invalid("segments_per_edge must be at least 1".to_string()));
        }
        if !(self.handle_hit_radius.is_finite() && self.handle_hit_radius >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "handle_hit_radius must not be negative, got {}",
                self.handle_hit_radius
            )));
        }
        if !self.zoom_speed.is_finite() {
            return Err(ConfigError::Invalid(format!("zoom_speed must be finite, got {}", self.zoom_speed)));
        }
        if !positive(limits.min_width) || !positive(limits.min_height) || !positive(limits.max_width) {
            return Err(ConfigError::Invalid(format!("box size limits must be positive, got {:?}", limits)));
        }
        if limits.min_width > limits.max_width {
            return Err(ConfigError::Invalid(format!(
                "min_width {} is larger than max_width {}",
                limits.min_width, limits.max_width
            )));
        }
        if limits.max_width > AZIMUTH_RANGE {
            return Err(ConfigError::Invalid(format!(
                "max_width {} exceeds the full circle of {}",
                limits.max_width, AZIMUTH_RANGE
            )));
        }
        if limits.min_height > MAX_ALTITUDE - MIN_ALTITUDE {
            return Err(ConfigError::Invalid(format!(
                "min_height {} exceeds the altitude range",
                limits.min_height
            )));
        }
        Ok(())
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "spheremark.json"
    }

    /// Get the default config file path.
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("spheremark").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("spheremark")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// A setting is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
