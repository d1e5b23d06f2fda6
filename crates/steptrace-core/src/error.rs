//! Error handling for steptrace
//!
//! Provides error types for every stage of a conversion:
//! - Event errors (an event violates its axis-specific shape)
//! - Configuration errors (missing or invalid calibration)
//! - Input errors (values a conversion cannot process)
//! - Parse errors (malformed persisted files)
//!
//! All error types use `thiserror`. None of them are transient: a failed
//! conversion will fail again on the same input, so nothing here is retried.

use thiserror::Error;

use crate::event::Axis;

/// Malformed event error
///
/// Raised by the untyped event constructor when the fields supplied for
/// an axis do not describe a valid event. A malformed event never enters
/// a stream.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EventError {
    /// Motion event without a direction
    #[error("Malformed {axis} event at t={timestamp}: missing direction")]
    MissingDirection {
        /// The axis of the rejected event.
        axis: Axis,
        /// Timestamp of the rejected event.
        timestamp: f64,
    },

    /// Motion event with a direction other than +1 or -1
    #[error("Malformed {axis} event at t={timestamp}: direction must be +1 or -1, got {direction}")]
    InvalidDirection {
        /// The axis of the rejected event.
        axis: Axis,
        /// Timestamp of the rejected event.
        timestamp: f64,
        /// The direction value that was supplied.
        direction: i64,
    },

    /// Extrusion event with neither dwell marker set
    #[error("Malformed E event at t={timestamp}: one of dwell_start/dwell_end must be set")]
    MissingDwellMarker {
        /// Timestamp of the rejected event.
        timestamp: f64,
    },

    /// Extrusion event with both dwell markers set
    #[error("Malformed E event at t={timestamp}: dwell_start and dwell_end are mutually exclusive")]
    ConflictingDwellMarkers {
        /// Timestamp of the rejected event.
        timestamp: f64,
    },

    /// A field was supplied that has no meaning on this axis
    #[error("Malformed {axis} event at t={timestamp}: field '{field}' is not valid on this axis")]
    UnexpectedField {
        /// The axis of the rejected event.
        axis: Axis,
        /// Timestamp of the rejected event.
        timestamp: f64,
        /// Name of the offending field.
        field: &'static str,
    },

    /// Timestamp is NaN or infinite
    #[error("Malformed {axis} event: timestamp {timestamp} is not finite")]
    NonFiniteTimestamp {
        /// The axis of the rejected event.
        axis: Axis,
        /// The non-finite timestamp.
        timestamp: f64,
    },
}

/// Fatal configuration error
///
/// A calibration constant or timing parameter is missing or invalid.
/// Aborts the run that needed it; no partial output is produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// An event or delta needs an axis that has no steps-per-mm entry
    #[error("No steps-per-mm calibration for axis {axis}")]
    UncalibratedAxis {
        /// The axis without calibration.
        axis: Axis,
    },

    /// Steps-per-mm is zero, negative or not finite
    #[error("Invalid steps-per-mm for axis {axis}: {value} (must be finite and > 0)")]
    InvalidStepsPerMm {
        /// The axis with the invalid value.
        axis: Axis,
        /// The rejected value.
        value: f64,
    },

    /// Inverse time step is zero, negative or not finite
    #[error("Invalid time step: {value} (must be finite and > 0)")]
    InvalidTimeStep {
        /// The rejected value.
        value: f64,
    },

    /// Inverse start timestamp is not finite
    #[error("Invalid start timestamp: {value} (must be finite)")]
    InvalidStartTimestamp {
        /// The rejected value.
        value: f64,
    },

    /// Any other rejected setting
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting {
        /// The setting key.
        key: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Invalid input error
///
/// The data handed to a conversion cannot be processed as a whole.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    /// A point cloud coordinate is NaN or infinite
    #[error("Point {index} has non-finite {axis} coordinate: {value}")]
    NonFiniteCoordinate {
        /// Zero-based index of the offending point.
        index: usize,
        /// The offending axis.
        axis: Axis,
        /// The offending value.
        value: f64,
    },

    /// An event was placed in the sequence of another axis
    #[error("Event {index} in the {expected} sequence is an {found} event")]
    AxisMismatch {
        /// Axis of the sequence.
        expected: Axis,
        /// Axis of the misplaced event.
        found: Axis,
        /// Zero-based index within the sequence.
        index: usize,
    },

    /// A delta quantizes to more steps than one point pair may emit
    #[error("{axis} delta {delta} mm needs {steps} steps, more than the limit of {limit}")]
    TooManySteps {
        /// The moving axis.
        axis: Axis,
        /// The coordinate delta.
        delta: f64,
        /// The rounded step count.
        steps: f64,
        /// Largest step count accepted per axis and pair.
        limit: u64,
    },

    /// A required sequence was empty
    #[error("Empty input: {what}")]
    Empty {
        /// What was expected to be non-empty.
        what: String,
    },
}

/// Parse error for persisted files
///
/// Always names the 1-based line that could not be read.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The point-count header could not be read
    #[error("Invalid header at line {line_number}: {reason}")]
    InvalidHeader {
        /// The line number of the header.
        line_number: usize,
        /// The reason the header was rejected.
        reason: String,
    },

    /// A point row could not be read
    #[error("Invalid row at line {line_number}: {reason}")]
    InvalidRow {
        /// The line number of the row.
        line_number: usize,
        /// The reason the row was rejected.
        reason: String,
    },

    /// A structured document could not be decoded
    #[error("Invalid document at line {line_number}, column {column}: {reason}")]
    InvalidDocument {
        /// The line number reported by the decoder.
        line_number: usize,
        /// The column reported by the decoder.
        column: usize,
        /// The decoder message.
        reason: String,
    },
}

impl ParseError {
    /// The 1-based line number the error refers to
    pub fn line_number(&self) -> usize {
        match self {
            ParseError::InvalidHeader { line_number, .. }
            | ParseError::InvalidRow { line_number, .. }
            | ParseError::InvalidDocument { line_number, .. } => *line_number,
        }
    }
}

/// Main error type for steptrace
///
/// A unified error type that can represent any error from all stages.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed event
    #[error(transparent)]
    Event(#[from] EventError),

    /// Fatal configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid input
    #[error(transparent)]
    Input(#[from] InputError),

    /// Malformed persisted file
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this is a malformed event error
    pub fn is_malformed_event(&self) -> bool {
        matches!(self, Error::Event(_))
    }

    /// Check if this is a fatal configuration error
    pub fn is_fatal_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Check if this is an invalid input error
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::Input(_))
    }

    /// Check if this is a parse error
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Error::Parse(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_error_display() {
        let err = EventError::MissingDirection {
            axis: Axis::X,
            timestamp: 0.5,
        };
        assert_eq!(err.to_string(), "Malformed X event at t=0.5: missing direction");

        let err = EventError::ConflictingDwellMarkers { timestamp: 1.0 };
        assert_eq!(
            err.to_string(),
            "Malformed E event at t=1: dwell_start and dwell_end are mutually exclusive"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::UncalibratedAxis { axis: Axis::Z };
        assert_eq!(err.to_string(), "No steps-per-mm calibration for axis Z");

        let err = ConfigError::InvalidTimeStep { value: 0.0 };
        assert_eq!(err.to_string(), "Invalid time step: 0 (must be finite and > 0)");
    }

    #[test]
    fn test_parse_error_line_number() {
        let err = ParseError::InvalidRow {
            line_number: 7,
            reason: "expected 3 fields, found 2".to_string(),
        };
        assert_eq!(err.line_number(), 7);
        assert_eq!(
            err.to_string(),
            "Invalid row at line 7: expected 3 fields, found 2"
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = ConfigError::UncalibratedAxis { axis: Axis::Y }.into();
        assert!(err.is_fatal_config());
        assert!(!err.is_parse_error());

        let err: Error = InputError::Empty {
            what: "peaks".to_string(),
        }
        .into();
        assert!(err.is_invalid_input());

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
