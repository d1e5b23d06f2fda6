//! Inverse quantization: point cloud to approximate peak sequences
//!
//! For every consecutive point pair the coordinate delta is quantized to
//! whole steps per axis, and one extrusion marker is emitted per pair.
//! This is a best-effort reconstruction, not a true inverse: many event
//! streams collapse to the same cloud.
//!
//! Guarantees this module does NOT provide:
//! - reversal flags (always false)
//! - real sub-step timing (events are spaced by a fixed time step)
//! - interleaved multi-axis stepping (within a pair all X steps come
//!   first, then Y, then Z)
//! - measured extrusion (a pair with any movement is assumed extruding,
//!   a pair without movement is assumed idle)
//!
//! An axis whose delta is exactly zero emits nothing for that pair; no
//! direction is guessed for it.

use serde::Serialize;
use steptrace_core::{
    Direction, Error, InputError, MotionAxis, PeakEvent, PointCloud, StepTiming, StepsPerMm,
};

use crate::streams::PeakStreams;

/// Largest number of steps one axis may emit for a single point pair
pub const MAX_STEPS_PER_PAIR: u64 = u32::MAX as u64;

/// Counters collected during one inverse run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QuantizationSummary {
    /// Point pairs visited
    pub pairs: usize,
    /// Pairs with any movement (emitted dwell_start)
    pub moving_pairs: usize,
    /// Pairs without movement (emitted dwell_end)
    pub idle_pairs: usize,
    /// Axis/pair combinations skipped because the delta was exactly zero
    pub zero_delta_axes: usize,
    /// Axis/pair combinations that moved but rounded to zero steps
    pub sub_step_moves: usize,
}

/// Point-cloud-to-peaks quantizer
#[derive(Debug, Clone)]
pub struct InverseQuantizer {
    calibration: StepsPerMm,
    timing: StepTiming,
}

impl InverseQuantizer {
    /// Create a quantizer with validated calibration and timing
    pub fn new(calibration: StepsPerMm, timing: StepTiming) -> Result<Self, Error> {
        calibration.validate()?;
        timing.validate()?;
        Ok(Self {
            calibration,
            timing,
        })
    }

    pub fn timing(&self) -> &StepTiming {
        &self.timing
    }

    /// Number of whole steps that best approximates a delta on an axis
    ///
    /// Fails with `InvalidInput` above [`MAX_STEPS_PER_PAIR`].
    pub fn step_count(&self, axis: MotionAxis, delta: f64) -> Result<u64, Error> {
        if delta == 0.0 {
            return Ok(0);
        }
        let steps_per_mm = self.calibration.steps_per_mm(axis.axis())?;
        let steps = (delta.abs() * steps_per_mm).round();
        if steps > MAX_STEPS_PER_PAIR as f64 {
            return Err(InputError::TooManySteps {
                axis: axis.axis(),
                delta,
                steps,
                limit: MAX_STEPS_PER_PAIR,
            }
            .into());
        }
        Ok(steps as u64)
    }

    /// Reconstruct approximate per-axis peaks from a cloud
    pub fn quantize(&self, cloud: &PointCloud) -> Result<PeakStreams, Error> {
        self.quantize_with_summary(cloud).map(|(streams, _)| streams)
    }

    /// Reconstruct and also return the run counters
    ///
    /// Fails with `InvalidInput` if any coordinate is not finite, before
    /// anything is emitted. Clouds with fewer than two points yield empty
    /// sequences.
    pub fn quantize_with_summary(
        &self,
        cloud: &PointCloud,
    ) -> Result<(PeakStreams, QuantizationSummary), Error> {
        cloud.ensure_finite()?;

        let mut streams = PeakStreams::new();
        let mut summary = QuantizationSummary::default();
        let mut t = self.timing.start_timestamp;

        for (from, to) in cloud.pairs() {
            let delta = *to - *from;
            summary.pairs += 1;
            let mut moved = false;

            for axis in MotionAxis::ALL {
                let component = delta.get(axis);
                let Some(direction) = Direction::from_delta(component) else {
                    summary.zero_delta_axes += 1;
                    continue;
                };
                moved = true;

                let count = self.step_count(axis, component)?;
                if count == 0 {
                    summary.sub_step_moves += 1;
                }
                for _ in 0..count {
                    t += self.timing.time_step;
                    streams.push(PeakEvent::step(axis, t, direction)?);
                }
            }

            // Per-component check: the norm of a tiny delta underflows to 0
            if moved {
                streams.push(PeakEvent::dwell_start(t)?);
                summary.moving_pairs += 1;
            } else {
                streams.push(PeakEvent::dwell_end(t)?);
                summary.idle_pairs += 1;
            }
        }

        tracing::debug!(
            points = cloud.len(),
            pairs = summary.pairs,
            events = streams.len(),
            zero_delta_axes = summary.zero_delta_axes,
            sub_step_moves = summary.sub_step_moves,
            "inverse quantization complete"
        );

        Ok((streams, summary))
    }
}

/// One-shot inverse conversion
pub fn point_cloud_to_peaks(
    cloud: &PointCloud,
    calibration: StepsPerMm,
    timing: StepTiming,
) -> Result<PeakStreams, Error> {
    InverseQuantizer::new(calibration, timing)?.quantize(cloud)
}
