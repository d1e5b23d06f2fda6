//! Calibration and timing constants
//!
//! Steps-per-mm values are device specific. The defaults match the
//! reference printer (6 steps/mm on X and Y, 95.2 steps/mm on Z); any axis
//! may also be left uncalibrated, in which case the first conversion that
//! needs it fails with [`ConfigError::UncalibratedAxis`].

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::event::{Axis, MotionAxis};

/// Default X calibration (steps per mm)
pub const DEFAULT_STEPS_PER_MM_X: f64 = 6.0;
/// Default Y calibration (steps per mm)
pub const DEFAULT_STEPS_PER_MM_Y: f64 = 6.0;
/// Default Z calibration (steps per mm)
pub const DEFAULT_STEPS_PER_MM_Z: f64 = 95.2;

/// Default spacing between synthetic events (seconds)
pub const DEFAULT_TIME_STEP: f64 = 0.01;

/// Steps-per-mm for each motion axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepsPerMm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl Default for StepsPerMm {
    fn default() -> Self {
        Self::new(
            DEFAULT_STEPS_PER_MM_X,
            DEFAULT_STEPS_PER_MM_Y,
            DEFAULT_STEPS_PER_MM_Z,
        )
    }
}

impl StepsPerMm {
    /// Calibration with all three axes set
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }

    /// Calibration with no axis set
    pub fn uncalibrated() -> Self {
        Self {
            x: None,
            y: None,
            z: None,
        }
    }

    /// Set (or replace) one axis
    pub fn with_axis(mut self, axis: MotionAxis, steps_per_mm: f64) -> Self {
        *self.slot_mut(axis) = Some(steps_per_mm);
        self
    }

    /// Clear one axis
    pub fn without_axis(mut self, axis: MotionAxis) -> Self {
        *self.slot_mut(axis) = None;
        self
    }

    /// Raw configured value, unchecked
    pub fn get(&self, axis: MotionAxis) -> Option<f64> {
        match axis {
            MotionAxis::X => self.x,
            MotionAxis::Y => self.y,
            MotionAxis::Z => self.z,
        }
    }

    fn slot_mut(&mut self, axis: MotionAxis) -> &mut Option<f64> {
        match axis {
            MotionAxis::X => &mut self.x,
            MotionAxis::Y => &mut self.y,
            MotionAxis::Z => &mut self.z,
        }
    }

    /// Checked steps-per-mm for an axis
    ///
    /// Fails for E (never calibrated), for an absent axis, and for a
    /// value that is not finite and strictly positive.
    pub fn steps_per_mm(&self, axis: Axis) -> Result<f64, ConfigError> {
        let motion = axis
            .as_motion()
            .ok_or(ConfigError::UncalibratedAxis { axis })?;
        let value = self
            .get(motion)
            .ok_or(ConfigError::UncalibratedAxis { axis })?;
        if !value.is_finite() || value <= 0.0 {
            return Err(ConfigError::InvalidStepsPerMm { axis, value });
        }
        Ok(value)
    }

    /// Linear distance of one step on an axis (mm)
    pub fn step_size(&self, axis: Axis) -> Result<f64, ConfigError> {
        self.steps_per_mm(axis).map(|steps| 1.0 / steps)
    }

    /// Check every configured value; absent axes are allowed
    pub fn validate(&self) -> Result<(), ConfigError> {
        for axis in MotionAxis::ALL {
            if self.get(axis).is_some() {
                self.steps_per_mm(axis.axis())?;
            }
        }
        Ok(())
    }
}

/// Timing of synthetic events emitted by the inverse direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepTiming {
    /// Seconds between consecutive synthetic events
    pub time_step: f64,
    /// Running timestamp before the first synthetic event
    pub start_timestamp: f64,
}

impl Default for StepTiming {
    fn default() -> Self {
        Self {
            time_step: DEFAULT_TIME_STEP,
            start_timestamp: 0.0,
        }
    }
}

impl StepTiming {
    pub fn new(time_step: f64, start_timestamp: f64) -> Self {
        Self {
            time_step,
            start_timestamp,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(ConfigError::InvalidTimeStep {
                value: self.time_step,
            });
        }
        if !self.start_timestamp.is_finite() {
            return Err(ConfigError::InvalidStartTimestamp {
                value: self.start_timestamp,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_step_sizes() {
        let cal = StepsPerMm::default();
        assert!((cal.step_size(Axis::X).unwrap() - 1.0 / 6.0).abs() < 1e-15);
        assert!((cal.step_size(Axis::Z).unwrap() - 0.010_504_201_680_672_27).abs() < 1e-12);
        assert!(cal.validate().is_ok());
    }

    #[test]
    fn test_extruder_has_no_calibration() {
        let cal = StepsPerMm::default();
        assert_eq!(
            cal.step_size(Axis::E),
            Err(ConfigError::UncalibratedAxis { axis: Axis::E })
        );
    }

    #[test]
    fn test_missing_axis() {
        let cal = StepsPerMm::default().without_axis(MotionAxis::Y);
        assert_eq!(
            cal.steps_per_mm(Axis::Y),
            Err(ConfigError::UncalibratedAxis { axis: Axis::Y })
        );
        // Partial calibration is valid until an uncalibrated axis is used
        assert!(cal.validate().is_ok());
    }

    #[test]
    fn test_invalid_values_rejected() {
        for bad in [0.0, -6.0, f64::NAN, f64::INFINITY] {
            let cal = StepsPerMm::default().with_axis(MotionAxis::X, bad);
            assert!(matches!(
                cal.validate(),
                Err(ConfigError::InvalidStepsPerMm { axis: Axis::X, .. })
            ));
        }
    }

    #[test]
    fn test_timing_validation() {
        assert!(StepTiming::default().validate().is_ok());
        assert!(StepTiming::new(0.0, 0.0).validate().is_err());
        assert!(StepTiming::new(-0.01, 0.0).validate().is_err());
        assert!(StepTiming::new(0.01, f64::NAN).validate().is_err());
        assert!(StepTiming::new(0.01, -5.0).validate().is_ok());
    }
}
