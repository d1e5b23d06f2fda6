//! Error types for the settings crate.

use std::fmt::Display;
use std::path::Path;
use steptrace_core::ConfigError;
use thiserror::Error;

/// Errors that can occur while loading or saving settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The configuration file could not be read or decoded.
    #[error("Failed to load settings from {path}: {reason}")]
    Load { path: String, reason: String },

    /// The configuration file could not be encoded or written.
    #[error("Failed to save settings to {path}: {reason}")]
    Save { path: String, reason: String },

    /// The file extension is neither `.toml` nor `.json`.
    #[error("Unsupported config format: {0} (expected .toml or .json)")]
    UnsupportedFormat(String),

    /// No platform configuration directory could be determined.
    #[error("Config directory error: {0}")]
    ConfigDirectory(String),

    /// A value failed calibration or timing validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SettingsError {
    pub(crate) fn load(path: &Path, reason: impl Display) -> Self {
        Self::Load {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn save(path: &Path, reason: impl Display) -> Self {
        Self::Save {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether this is a calibration/timing validation failure
    pub fn is_fatal_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;
