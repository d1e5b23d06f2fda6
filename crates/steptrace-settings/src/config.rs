//! Configuration for steptrace conversions
//!
//! Supports JSON and TOML files. A file may omit any section; omitted
//! sections take their defaults. Inside `steps_per_mm`, however, an
//! omitted axis stays uncalibrated, and a conversion that needs it fails.
//!
//! ```toml
//! time_step = 0.01
//! start_timestamp = 0.0
//!
//! [steps_per_mm]
//! x = 6.0
//! y = 6.0
//! z = 95.2
//!
//! [output]
//! precision = 6
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use steptrace_core::{ConfigError, MotionAxis, StepTiming, StepsPerMm, DEFAULT_TIME_STEP};

use crate::error::{SettingsError, SettingsResult};

/// Largest writer precision accepted (f64 carries about 17 significant digits)
pub const MAX_PRECISION: usize = 17;

/// Name of the directory under the platform config directory
pub const CONFIG_DIR_NAME: &str = "steptrace";

/// Default config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Point-cloud output preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Fractional digits per coordinate
    pub precision: usize,
    /// Caption line; `None` uses the converter's own caption
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            precision: 6,
            caption: None,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds between synthetic events in the inverse direction
    pub time_step: f64,
    /// Running timestamp before the first synthetic event
    pub start_timestamp: f64,
    pub steps_per_mm: StepsPerMm,
    pub output: OutputSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_step: DEFAULT_TIME_STEP,
            start_timestamp: 0.0,
            steps_per_mm: StepsPerMm::default(),
            output: OutputSettings::default(),
        }
    }
}

/// File format, picked from the extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            Some(ext) => Err(SettingsError::UnsupportedFormat(ext.to_string())),
            None => Err(SettingsError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Timing for the inverse direction
    pub fn timing(&self) -> StepTiming {
        StepTiming::new(self.time_step, self.start_timestamp)
    }

    /// `<platform config dir>/steptrace/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        let mut path = dirs::config_dir().ok_or_else(|| {
            SettingsError::ConfigDirectory("no platform configuration directory".to_string())
        })?;
        path.push(CONFIG_DIR_NAME);
        path.push(CONFIG_FILE_NAME);
        Ok(path)
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = Format::of(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::load(path, e))?;

        let config: Self = match format {
            Format::Json => {
                serde_json::from_str(&content).map_err(|e| SettingsError::load(path, e))?
            }
            Format::Toml => toml::from_str(&content).map_err(|e| SettingsError::load(path, e))?,
        };

        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Save config to file (JSON or TOML), creating parent directories
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => {
                serde_json::to_string_pretty(self).map_err(|e| SettingsError::save(path, e))?
            }
            Format::Toml => toml::to_string_pretty(self).map_err(|e| SettingsError::save(path, e))?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::save(path, e))?;
        }
        std::fs::write(path, content).map_err(|e| SettingsError::save(path, e))?;
        tracing::debug!(path = %path.display(), "saved configuration");
        Ok(())
    }

    /// Load the explicit file if given, otherwise the default file if it
    /// exists, otherwise the built-in defaults
    pub fn load_or_default(path: Option<&Path>) -> SettingsResult<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }

        match Self::default_path() {
            Ok(default) if default.is_file() => Self::load_from_file(&default),
            Ok(_) => Ok(Self::default()),
            Err(e) => {
                tracing::warn!("{}; using built-in defaults", e);
                Ok(Self::default())
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.steps_per_mm.validate()?;
        self.timing().validate()?;

        if self.output.precision > MAX_PRECISION {
            return Err(ConfigError::InvalidSetting {
                key: "output.precision".to_string(),
                reason: format!("must be at most {}", MAX_PRECISION),
            });
        }
        if let Some(caption) = &self.output.caption {
            if caption.contains(['\r', '\n']) {
                return Err(ConfigError::InvalidSetting {
                    key: "output.caption".to_string(),
                    reason: "must be a single line".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Get setting by dotted key
    pub fn get_setting(&self, key: &str) -> Option<String> {
        match key {
            "time_step" => Some(self.time_step.to_string()),
            "start_timestamp" => Some(self.start_timestamp.to_string()),
            "output.precision" => Some(self.output.precision.to_string()),
            "output.caption" => self.output.caption.clone(),
            _ => {
                let axis = steps_key(key)?;
                self.steps_per_mm.get(axis).map(|v| v.to_string())
            }
        }
    }

    /// Set setting by dotted key, validating the result
    ///
    /// An empty value for `steps_per_mm.<axis>` or `output.caption`
    /// clears it. The config is unchanged if the new value is rejected.
    pub fn set_setting(&mut self, key: &str, value: &str) -> SettingsResult<()> {
        let mut updated = self.clone();
        let value = value.trim();

        match key {
            "time_step" => updated.time_step = parse_number(key, value)?,
            "start_timestamp" => updated.start_timestamp = parse_number(key, value)?,
            "output.precision" => {
                updated.output.precision =
                    value.parse().map_err(|_| ConfigError::InvalidSetting {
                        key: key.to_string(),
                        reason: format!("'{}' is not a non-negative integer", value),
                    })?
            }
            "output.caption" => {
                updated.output.caption = (!value.is_empty()).then(|| value.to_string())
            }
            _ => {
                let axis = steps_key(key).ok_or_else(|| ConfigError::InvalidSetting {
                    key: key.to_string(),
                    reason: "unknown setting".to_string(),
                })?;
                updated.steps_per_mm = if value.is_empty() {
                    updated.steps_per_mm.without_axis(axis)
                } else {
                    updated
                        .steps_per_mm
                        .with_axis(axis, parse_number(key, value)?)
                };
            }
        }

        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Apply `key=value` assignments in order
    pub fn apply_assignments<'a>(
        &mut self,
        assignments: impl IntoIterator<Item = &'a str>,
    ) -> SettingsResult<()> {
        for assignment in assignments {
            let (key, value) =
                assignment
                    .split_once('=')
                    .ok_or_else(|| ConfigError::InvalidSetting {
                        key: assignment.to_string(),
                        reason: "expected key=value".to_string(),
                    })?;
            self.set_setting(key.trim(), value)?;
        }
        Ok(())
    }
}

fn steps_key(key: &str) -> Option<MotionAxis> {
    match key.strip_prefix("steps_per_mm.")? {
        "x" => Some(MotionAxis::X),
        "y" => Some(MotionAxis::Y),
        "z" => Some(MotionAxis::Z),
        _ => None,
    }
}

fn parse_number(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidSetting {
        key: key.to_string(),
        reason: format!("'{}' is not a number", value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use steptrace_core::Axis;
    use tempfile::TempDir;

    #[test]
    fn test_config_defaults() {
        let config = Config::new();
        assert_eq!(config.steps_per_mm, StepsPerMm::new(6.0, 6.0, 95.2));
        assert_eq!(config.timing(), StepTiming::default());
        assert_eq!(config.output.precision, 6);
        assert!(config.output.caption.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::new();
        config.time_step = 0.002;
        config.output.caption = Some("bench run".to_string());
        config.save_to_file(&path).unwrap();

        assert_eq!(Config::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_json_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let config = Config {
            steps_per_mm: StepsPerMm::new(80.0, 80.0, 400.0),
            ..Config::default()
        };
        config.save_to_file(&path).unwrap();

        assert_eq!(Config::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_sections_take_defaults() {
        let config: Config = toml::from_str("time_step = 0.5\n").unwrap();
        assert_eq!(config.time_step, 0.5);
        assert_eq!(config.steps_per_mm, StepsPerMm::default());
        assert_eq!(config.output, OutputSettings::default());
    }

    #[test]
    fn test_missing_axis_is_uncalibrated() {
        let config: Config = toml::from_str("[steps_per_mm]\nx = 6.0\ny = 6.0\n").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.steps_per_mm.get(MotionAxis::Z), None);
        assert!(config.steps_per_mm.steps_per_mm(Axis::Z).is_err());
    }

    #[test]
    fn test_rejects_non_positive_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[steps_per_mm]\nx = 0.0\ny = 6.0\nz = 95.2\n").unwrap();
        let err = Config::load_from_file(&path).unwrap_err();
        assert!(err.is_fatal_config());

        let config = Config {
            time_step: -0.01,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimeStep { .. })
        ));
        assert!(config.save_to_file(&path).is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "time_step: 1").unwrap();
        assert!(matches!(
            Config::load_from_file(&path),
            Err(SettingsError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_load_errors_name_the_file() {
        let dir = TempDir::new().unwrap();

        let missing = dir.path().join("absent.toml");
        match Config::load_from_file(&missing).unwrap_err() {
            SettingsError::Load { path, .. } => assert!(path.ends_with("absent.toml")),
            other => panic!("unexpected error: {other}"),
        }

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{\"time_step\": }").unwrap();
        let err = Config::load_from_file(&broken).unwrap_err();
        assert!(matches!(err, SettingsError::Load { .. }));
        assert!(err.to_string().contains("broken.json"));
        assert!(!err.is_fatal_config());
    }

    #[test]
    fn test_save_error_names_the_file() {
        let dir = TempDir::new().unwrap();
        // A regular file where the parent directory should be
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let err = Config::new()
            .save_to_file(&blocker.join("config.toml"))
            .unwrap_err();
        match err {
            SettingsError::Save { path, .. } => assert!(path.ends_with("config.toml")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_set_setting() {
        let mut config = Config::new();
        config.set_setting("steps_per_mm.z", "400").unwrap();
        config.set_setting("time_step", "0.001").unwrap();
        config.set_setting("output.caption", "probe").unwrap();
        assert_eq!(config.get_setting("steps_per_mm.z").as_deref(), Some("400"));
        assert_eq!(config.get_setting("time_step").as_deref(), Some("0.001"));
        assert_eq!(config.get_setting("output.caption").as_deref(), Some("probe"));

        config.set_setting("steps_per_mm.y", "").unwrap();
        assert_eq!(config.get_setting("steps_per_mm.y"), None);
    }

    #[test]
    fn test_rejected_setting_leaves_config_unchanged() {
        let mut config = Config::new();
        assert!(config.set_setting("steps_per_mm.x", "-6").is_err());
        assert!(config.set_setting("output.precision", "40").is_err());
        assert!(config.set_setting("time_step", "fast").is_err());
        assert!(config.set_setting("feed_rate", "100").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_apply_assignments() {
        let mut config = Config::new();
        config
            .apply_assignments(["steps_per_mm.x = 80", "output.precision=4"])
            .unwrap();
        assert_eq!(config.steps_per_mm.get(MotionAxis::X), Some(80.0));
        assert_eq!(config.output.precision, 4);

        assert!(config.apply_assignments(["time_step"]).is_err());
    }

    #[test]
    fn test_explicit_path_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(&path, r#"{"start_timestamp": 12.5}"#).unwrap();

        let config = Config::load_or_default(Some(&path)).unwrap();
        assert_eq!(config.start_timestamp, 12.5);
        assert_eq!(config.time_step, DEFAULT_TIME_STEP);
    }
}
