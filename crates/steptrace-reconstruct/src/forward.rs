//! Forward integration: peak events to point cloud
//!
//! Folds the chronological event stream into a toolhead position and an
//! extrusion flag. Every motion step taken while extruding samples the
//! full position into the cloud; steps taken while not extruding are
//! travel moves and leave no point.
//!
//! Accumulation is plain f64 with no rounding. A step on an axis without
//! calibration aborts the whole run; nothing accumulated so far is
//! returned.

use serde::Serialize;
use steptrace_core::{ConfigError, Dwell, EventKind, PeakEvent, Point3, PointCloud, StepsPerMm};

use crate::merger::merge_events;
use crate::streams::PeakStreams;

/// Counters collected during one forward run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IntegrationSummary {
    /// Motion events applied to the position
    pub motion_steps: usize,
    /// Motion events sampled into the cloud
    pub extruded_points: usize,
    /// Motion events taken while not extruding
    pub travel_steps: usize,
    /// Dwell events seen on E
    pub dwell_transitions: usize,
}

/// State threaded through the fold
#[derive(Debug, Default)]
struct FoldState {
    position: Point3,
    extruding: bool,
    cloud: PointCloud,
    summary: IntegrationSummary,
}

impl FoldState {
    fn apply(mut self, event: &PeakEvent, calibration: &StepsPerMm) -> Result<Self, ConfigError> {
        match event.kind() {
            EventKind::Dwell(dwell) => {
                self.extruding = dwell == Dwell::Start;
                self.summary.dwell_transitions += 1;
            }
            EventKind::Step {
                axis, direction, ..
            } => {
                let step = calibration.step_size(axis.axis())?;
                *self.position.get_mut(axis) += direction.sign() * step;
                self.summary.motion_steps += 1;

                if self.extruding {
                    self.cloud.push(self.position);
                    self.summary.extruded_points += 1;
                } else {
                    self.summary.travel_steps += 1;
                }
            }
        }
        Ok(self)
    }
}

/// Peak-to-point-cloud integrator
#[derive(Debug, Clone)]
pub struct ForwardIntegrator {
    calibration: StepsPerMm,
}

impl ForwardIntegrator {
    /// Create an integrator
    ///
    /// Every configured steps-per-mm value must be finite and positive.
    /// Absent axes are allowed here and only fail when a step needs them.
    pub fn new(calibration: StepsPerMm) -> Result<Self, ConfigError> {
        calibration.validate()?;
        Ok(Self { calibration })
    }

    pub fn calibration(&self) -> &StepsPerMm {
        &self.calibration
    }

    /// Integrate an already merged, chronological event sequence
    pub fn integrate(&self, events: &[PeakEvent]) -> Result<PointCloud, ConfigError> {
        self.integrate_with_summary(events).map(|(cloud, _)| cloud)
    }

    /// Integrate and also return the run counters
    pub fn integrate_with_summary(
        &self,
        events: &[PeakEvent],
    ) -> Result<(PointCloud, IntegrationSummary), ConfigError> {
        let state = events
            .iter()
            .try_fold(FoldState::default(), |state, event| {
                state.apply(event, &self.calibration)
            })?;

        tracing::debug!(
            events = events.len(),
            motion_steps = state.summary.motion_steps,
            extruded_points = state.summary.extruded_points,
            travel_steps = state.summary.travel_steps,
            dwell_transitions = state.summary.dwell_transitions,
            "forward integration complete"
        );

        Ok((state.cloud, state.summary))
    }

    /// Merge the per-axis sequences and integrate the result
    pub fn reconstruct(&self, streams: &PeakStreams) -> Result<PointCloud, ConfigError> {
        self.integrate(&merge_events(streams))
    }
}

/// One-shot forward conversion with the given calibration
pub fn peaks_to_point_cloud(
    streams: &PeakStreams,
    calibration: StepsPerMm,
) -> Result<PointCloud, ConfigError> {
    ForwardIntegrator::new(calibration)?.reconstruct(streams)
}
