//! Per-axis peak sequences

use steptrace_core::{Axis, InputError, PeakEvent};

/// Four independent peak sequences, one per axis
///
/// Every event stored under an axis belongs to that axis; the checked
/// constructors enforce it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeakStreams {
    x: Vec<PeakEvent>,
    y: Vec<PeakEvent>,
    z: Vec<PeakEvent>,
    e: Vec<PeakEvent>,
}

impl PeakStreams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from four sequences, rejecting misplaced events
    pub fn from_axes(
        x: Vec<PeakEvent>,
        y: Vec<PeakEvent>,
        z: Vec<PeakEvent>,
        e: Vec<PeakEvent>,
    ) -> Result<Self, InputError> {
        for (expected, sequence) in [(Axis::X, &x), (Axis::Y, &y), (Axis::Z, &z), (Axis::E, &e)] {
            if let Some((index, event)) = sequence
                .iter()
                .enumerate()
                .find(|(_, event)| event.axis() != expected)
            {
                return Err(InputError::AxisMismatch {
                    expected,
                    found: event.axis(),
                    index,
                });
            }
        }
        Ok(Self { x, y, z, e })
    }

    /// Append an event to the sequence of its own axis
    pub fn push(&mut self, event: PeakEvent) {
        self.slot_mut(event.axis()).push(event);
    }

    pub fn get(&self, axis: Axis) -> &[PeakEvent] {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
            Axis::E => &self.e,
        }
    }

    fn slot_mut(&mut self, axis: Axis) -> &mut Vec<PeakEvent> {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
            Axis::E => &mut self.e,
        }
    }

    /// Sequences in merge precedence order (X, Y, Z, E)
    pub fn iter_axes(&self) -> impl Iterator<Item = (Axis, &[PeakEvent])> {
        Axis::ALL.into_iter().map(move |axis| (axis, self.get(axis)))
    }

    /// Total event count across all axes
    pub fn len(&self) -> usize {
        self.x.len() + self.y.len() + self.z.len() + self.e.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
