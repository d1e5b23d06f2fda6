//! Peak event model
//!
//! A peak is one discrete occurrence on one axis: a stepper edge on a
//! motion axis (X, Y, Z) or an extrusion engagement transition on the
//! extruder axis (E). The axis-specific payload is encoded in [`EventKind`],
//! so a constructed [`PeakEvent`] is always well formed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EventError;

/// Axis tag of a peak event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// X motion axis
    X,
    /// Y motion axis
    Y,
    /// Z motion axis
    Z,
    /// Extruder
    E,
}

impl Axis {
    /// All axes in merge precedence order
    pub const ALL: [Axis; 4] = [Axis::X, Axis::Y, Axis::Z, Axis::E];

    /// Tie-break rank used when timestamps are equal across axes (X first, E last)
    pub fn precedence(self) -> u8 {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
            Axis::E => 3,
        }
    }

    /// Whether this axis moves the toolhead
    pub fn is_motion(self) -> bool {
        self.as_motion().is_some()
    }

    /// Narrow to a motion axis, `None` for E
    pub fn as_motion(self) -> Option<MotionAxis> {
        match self {
            Axis::X => Some(MotionAxis::X),
            Axis::Y => Some(MotionAxis::Y),
            Axis::Z => Some(MotionAxis::Z),
            Axis::E => None,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "X"),
            Self::Y => write!(f, "Y"),
            Self::Z => write!(f, "Z"),
            Self::E => write!(f, "E"),
        }
    }
}

impl FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "x" => Ok(Self::X),
            "y" => Ok(Self::Y),
            "z" => Ok(Self::Z),
            "e" => Ok(Self::E),
            _ => Err(format!("Unknown axis: {}", s)),
        }
    }
}

/// One of the three toolhead axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionAxis {
    X,
    Y,
    Z,
}

impl MotionAxis {
    /// Motion axes in emission order
    pub const ALL: [MotionAxis; 3] = [MotionAxis::X, MotionAxis::Y, MotionAxis::Z];

    /// Component index into an (x, y, z) triple
    pub fn index(self) -> usize {
        match self {
            MotionAxis::X => 0,
            MotionAxis::Y => 1,
            MotionAxis::Z => 2,
        }
    }

    /// Widen to the general axis tag
    pub fn axis(self) -> Axis {
        match self {
            MotionAxis::X => Axis::X,
            MotionAxis::Y => Axis::Y,
            MotionAxis::Z => Axis::Z,
        }
    }
}

impl From<MotionAxis> for Axis {
    fn from(axis: MotionAxis) -> Self {
        axis.axis()
    }
}

impl fmt::Display for MotionAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.axis().fmt(f)
    }
}

/// Step direction of a motion event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// +1
    Positive,
    /// -1
    Negative,
}

impl Direction {
    /// The direction as a unit multiplier
    pub fn sign(self) -> f64 {
        match self {
            Direction::Positive => 1.0,
            Direction::Negative => -1.0,
        }
    }

    /// The direction as a signed integer (+1 / -1)
    pub fn as_i8(self) -> i8 {
        match self {
            Direction::Positive => 1,
            Direction::Negative => -1,
        }
    }

    /// Direction of a coordinate delta; `None` when the delta is exactly zero
    pub fn from_delta(delta: f64) -> Option<Self> {
        if delta > 0.0 {
            Some(Direction::Positive)
        } else if delta < 0.0 {
            Some(Direction::Negative)
        } else {
            None
        }
    }
}

impl TryFrom<i64> for Direction {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Direction::Positive),
            -1 => Ok(Direction::Negative),
            other => Err(other),
        }
    }
}

/// Extrusion transition carried by an E event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dwell {
    /// Extrusion engages
    Start,
    /// Extrusion disengages
    End,
}

/// Axis-specific payload of a peak event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventKind {
    /// A stepper edge on a motion axis
    Step {
        axis: MotionAxis,
        direction: Direction,
        /// Carried through untouched; integration ignores it.
        reversal: bool,
    },
    /// An extrusion transition on E
    Dwell(Dwell),
}

/// A single timestamped peak on one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakEvent {
    timestamp: f64,
    kind: EventKind,
}

impl PeakEvent {
    /// Create a motion step event
    pub fn step(axis: MotionAxis, timestamp: f64, direction: Direction) -> Result<Self, EventError> {
        Self::with_kind(
            timestamp,
            EventKind::Step {
                axis,
                direction,
                reversal: false,
            },
        )
    }

    /// Create an extrusion transition event
    pub fn dwell(timestamp: f64, dwell: Dwell) -> Result<Self, EventError> {
        Self::with_kind(timestamp, EventKind::Dwell(dwell))
    }

    /// Create an extrusion-start event
    pub fn dwell_start(timestamp: f64) -> Result<Self, EventError> {
        Self::dwell(timestamp, Dwell::Start)
    }

    /// Create an extrusion-end event
    pub fn dwell_end(timestamp: f64) -> Result<Self, EventError> {
        Self::dwell(timestamp, Dwell::End)
    }

    fn with_kind(timestamp: f64, kind: EventKind) -> Result<Self, EventError> {
        if !timestamp.is_finite() {
            let axis = match kind {
                EventKind::Step { axis, .. } => axis.axis(),
                EventKind::Dwell(_) => Axis::E,
            };
            return Err(EventError::NonFiniteTimestamp { axis, timestamp });
        }
        Ok(Self { timestamp, kind })
    }

    /// Set the reversal flag on a step event; no effect on dwell events
    pub fn with_reversal(mut self, flag: bool) -> Self {
        if let EventKind::Step { reversal, .. } = &mut self.kind {
            *reversal = flag;
        }
        self
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn axis(&self) -> Axis {
        match self.kind {
            EventKind::Step { axis, .. } => axis.axis(),
            EventKind::Dwell(_) => Axis::E,
        }
    }

    /// Step direction, `None` for E events
    pub fn direction(&self) -> Option<Direction> {
        match self.kind {
            EventKind::Step { direction, .. } => Some(direction),
            EventKind::Dwell(_) => None,
        }
    }

    pub fn is_reversal(&self) -> bool {
        matches!(self.kind, EventKind::Step { reversal: true, .. })
    }

    /// Dwell transition, `None` for motion events
    pub fn dwell_marker(&self) -> Option<Dwell> {
        match self.kind {
            EventKind::Dwell(dwell) => Some(dwell),
            EventKind::Step { .. } => None,
        }
    }
}

/// Untyped event fields as they arrive from files or foreign callers
///
/// Converting into a [`PeakEvent`] checks the axis-specific shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPeak {
    pub axis: Axis,
    pub timestamp: f64,
    pub direction: Option<i64>,
    pub reversal: bool,
    pub dwell_start: bool,
    pub dwell_end: bool,
}

impl RawPeak {
    /// Empty field set for an axis at a timestamp
    pub fn new(axis: Axis, timestamp: f64) -> Self {
        Self {
            axis,
            timestamp,
            direction: None,
            reversal: false,
            dwell_start: false,
            dwell_end: false,
        }
    }
}

impl TryFrom<RawPeak> for PeakEvent {
    type Error = EventError;

    fn try_from(raw: RawPeak) -> Result<Self, Self::Error> {
        let RawPeak {
            axis,
            timestamp,
            direction,
            reversal,
            dwell_start,
            dwell_end,
        } = raw;

        if !timestamp.is_finite() {
            return Err(EventError::NonFiniteTimestamp { axis, timestamp });
        }

        match axis.as_motion() {
            Some(motion) => {
                if dwell_start || dwell_end {
                    return Err(EventError::UnexpectedField {
                        axis,
                        timestamp,
                        field: if dwell_start { "dwell_start" } else { "dwell_end" },
                    });
                }
                let value = direction.ok_or(EventError::MissingDirection { axis, timestamp })?;
                let direction = Direction::try_from(value).map_err(|direction| {
                    EventError::InvalidDirection {
                        axis,
                        timestamp,
                        direction,
                    }
                })?;
                Ok(PeakEvent::step(motion, timestamp, direction)?.with_reversal(reversal))
            }
            None => {
                if direction.is_some() {
                    return Err(EventError::UnexpectedField {
                        axis,
                        timestamp,
                        field: "direction",
                    });
                }
                if reversal {
                    return Err(EventError::UnexpectedField {
                        axis,
                        timestamp,
                        field: "reversal",
                    });
                }
                match (dwell_start, dwell_end) {
                    (true, false) => PeakEvent::dwell_start(timestamp),
                    (false, true) => PeakEvent::dwell_end(timestamp),
                    (true, true) => Err(EventError::ConflictingDwellMarkers { timestamp }),
                    (false, false) => Err(EventError::MissingDwellMarker { timestamp }),
                }
            }
        }
    }
}

impl From<&PeakEvent> for RawPeak {
    fn from(event: &PeakEvent) -> Self {
        let mut raw = RawPeak::new(event.axis(), event.timestamp());
        match event.kind() {
            EventKind::Step {
                direction,
                reversal,
                ..
            } => {
                raw.direction = Some(i64::from(direction.as_i8()));
                raw.reversal = reversal;
            }
            EventKind::Dwell(Dwell::Start) => raw.dwell_start = true,
            EventKind::Dwell(Dwell::End) => raw.dwell_end = true,
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(axis: Axis) -> RawPeak {
        RawPeak::new(axis, 0.25)
    }

    #[test]
    fn test_step_event_accessors() {
        let event = PeakEvent::step(MotionAxis::Y, 1.5, Direction::Negative)
            .unwrap()
            .with_reversal(true);

        assert_eq!(event.axis(), Axis::Y);
        assert_eq!(event.timestamp(), 1.5);
        assert_eq!(event.direction(), Some(Direction::Negative));
        assert!(event.is_reversal());
        assert_eq!(event.dwell_marker(), None);
    }

    #[test]
    fn test_dwell_event_accessors() {
        let event = PeakEvent::dwell_end(2.0).unwrap();
        assert_eq!(event.axis(), Axis::E);
        assert_eq!(event.direction(), None);
        assert_eq!(event.dwell_marker(), Some(Dwell::End));

        // Reversal has no meaning on E
        let event = event.with_reversal(true);
        assert!(!event.is_reversal());
    }

    #[test]
    fn test_non_finite_timestamp_rejected() {
        let err = PeakEvent::dwell_start(f64::NAN).unwrap_err();
        assert!(matches!(err, EventError::NonFiniteTimestamp { axis: Axis::E, .. }));

        let err = PeakEvent::step(MotionAxis::X, f64::INFINITY, Direction::Positive).unwrap_err();
        assert!(matches!(err, EventError::NonFiniteTimestamp { axis: Axis::X, .. }));
    }

    #[test]
    fn test_raw_motion_requires_direction() {
        let err = PeakEvent::try_from(raw(Axis::Z)).unwrap_err();
        assert_eq!(
            err,
            EventError::MissingDirection {
                axis: Axis::Z,
                timestamp: 0.25
            }
        );

        let mut bad = raw(Axis::X);
        bad.direction = Some(0);
        let err = PeakEvent::try_from(bad).unwrap_err();
        assert!(matches!(err, EventError::InvalidDirection { direction: 0, .. }));

        let mut good = raw(Axis::X);
        good.direction = Some(-1);
        let event = PeakEvent::try_from(good).unwrap();
        assert_eq!(event.direction(), Some(Direction::Negative));
    }

    #[test]
    fn test_raw_motion_rejects_dwell_flags() {
        let mut bad = raw(Axis::Y);
        bad.direction = Some(1);
        bad.dwell_end = true;
        let err = PeakEvent::try_from(bad).unwrap_err();
        assert!(matches!(
            err,
            EventError::UnexpectedField {
                field: "dwell_end",
                ..
            }
        ));
    }

    #[test]
    fn test_raw_extruder_requires_exactly_one_marker() {
        let err = PeakEvent::try_from(raw(Axis::E)).unwrap_err();
        assert_eq!(err, EventError::MissingDwellMarker { timestamp: 0.25 });

        let mut both = raw(Axis::E);
        both.dwell_start = true;
        both.dwell_end = true;
        let err = PeakEvent::try_from(both).unwrap_err();
        assert_eq!(err, EventError::ConflictingDwellMarkers { timestamp: 0.25 });

        let mut start = raw(Axis::E);
        start.dwell_start = true;
        let event = PeakEvent::try_from(start).unwrap();
        assert_eq!(event.dwell_marker(), Some(Dwell::Start));
    }

    #[test]
    fn test_raw_extruder_rejects_direction() {
        let mut bad = raw(Axis::E);
        bad.dwell_start = true;
        bad.direction = Some(1);
        let err = PeakEvent::try_from(bad).unwrap_err();
        assert!(matches!(
            err,
            EventError::UnexpectedField {
                field: "direction",
                ..
            }
        ));
    }

    #[test]
    fn test_raw_conversion_preserves_fields() {
        let event = PeakEvent::step(MotionAxis::Z, 3.0, Direction::Positive)
            .unwrap()
            .with_reversal(true);
        let raw = RawPeak::from(&event);
        assert_eq!(raw.axis, Axis::Z);
        assert_eq!(raw.direction, Some(1));
        assert!(raw.reversal);
        assert_eq!(PeakEvent::try_from(raw).unwrap(), event);
    }

    #[test]
    fn test_axis_parsing_and_precedence() {
        assert_eq!("x".parse::<Axis>().unwrap(), Axis::X);
        assert_eq!("E".parse::<Axis>().unwrap(), Axis::E);
        assert!("w".parse::<Axis>().is_err());

        let ranks: Vec<u8> = Axis::ALL.iter().map(|a| a.precedence()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3]);
        assert!(!Axis::E.is_motion());
    }

    #[test]
    fn test_direction_from_delta() {
        assert_eq!(Direction::from_delta(0.2), Some(Direction::Positive));
        assert_eq!(Direction::from_delta(-1e-12), Some(Direction::Negative));
        assert_eq!(Direction::from_delta(0.0), None);
        assert_eq!(Direction::from_delta(-0.0), None);
    }
}
