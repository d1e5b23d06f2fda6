//! # Steptrace Core
//!
//! Core types for steptrace.
//! Provides the peak event model, points and point clouds, calibration
//! constants and the error taxonomy shared by every other crate.

pub mod calibration;
pub mod error;
pub mod event;
pub mod geometry;

pub use calibration::{
    StepTiming, StepsPerMm, DEFAULT_STEPS_PER_MM_X, DEFAULT_STEPS_PER_MM_Y,
    DEFAULT_STEPS_PER_MM_Z, DEFAULT_TIME_STEP,
};
pub use error::{ConfigError, Error, EventError, InputError, ParseError, Result};
pub use event::{Axis, Direction, Dwell, EventKind, MotionAxis, PeakEvent, RawPeak};
pub use geometry::{Point3, PointCloud};
