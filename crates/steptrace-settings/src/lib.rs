//! Steptrace Settings Crate
//!
//! Calibration, timing and output configuration, loaded from TOML or JSON
//! files in the platform configuration directory.

pub mod config;
pub mod error;

pub use config::{Config, OutputSettings, CONFIG_DIR_NAME, CONFIG_FILE_NAME, MAX_PRECISION};
pub use error::{SettingsError, SettingsResult};
