//! Synthetic round-trip harness
//!
//! Builds an idealized peak stream (a square in the XY plane drawn with
//! extrusion engaged), integrates it forward, quantizes the resulting cloud
//! back into peaks and reports what came out. Used by the `selftest`
//! command and by the integration tests.

use serde::Serialize;
use steptrace_core::{
    Axis, Direction, Error, InputError, MotionAxis, PeakEvent, Point3, PointCloud, StepTiming,
    StepsPerMm,
};

use crate::forward::{ForwardIntegrator, IntegrationSummary};
use crate::inverse::{InverseQuantizer, QuantizationSummary};
use crate::streams::PeakStreams;

/// Square path drawn one unit step at a time
///
/// Sides run +X, +Y, -X, -Y. Step `n` of the whole path (counting from
/// zero) fires at `(n + 1) * step_time`, so extrusion, which starts at
/// t=0, is already on for the first step. Extrusion ends at the timestamp
/// of the last step; that step still precedes the marker and is extruded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquarePath {
    pub steps_per_side: usize,
    pub step_time: f64,
    /// Add one +Z step at the closing timestamp. It ties with the
    /// dwell_end marker and, since Z precedes E, is still extruded.
    pub lift_z: bool,
}

impl Default for SquarePath {
    fn default() -> Self {
        Self {
            steps_per_side: 10,
            step_time: 0.01,
            lift_z: false,
        }
    }
}

impl SquarePath {
    /// Total number of steps around the square
    pub fn total_steps(&self) -> usize {
        4 * self.steps_per_side
    }

    /// Timestamp of the last step
    pub fn end_time(&self) -> f64 {
        self.total_steps() as f64 * self.step_time
    }

    fn step_timestamp(&self, n: usize) -> f64 {
        (n + 1) as f64 * self.step_time
    }

    /// Generate the per-axis peak sequences for this path
    pub fn peaks(&self) -> Result<PeakStreams, Error> {
        if self.steps_per_side == 0 {
            return Err(InputError::Empty {
                what: "square path needs at least one step per side".to_string(),
            }
            .into());
        }

        let sides = [
            (MotionAxis::X, Direction::Positive),
            (MotionAxis::Y, Direction::Positive),
            (MotionAxis::X, Direction::Negative),
            (MotionAxis::Y, Direction::Negative),
        ];

        let mut streams = PeakStreams::new();
        for n in 0..self.total_steps() {
            let (axis, direction) = sides[n / self.steps_per_side];
            streams.push(PeakEvent::step(axis, self.step_timestamp(n), direction)?);
        }

        if self.lift_z {
            streams.push(PeakEvent::step(
                MotionAxis::Z,
                self.end_time(),
                Direction::Positive,
            )?);
        }

        streams.push(PeakEvent::dwell_start(0.0)?);
        streams.push(PeakEvent::dwell_end(self.end_time())?);
        Ok(streams)
    }
}

/// Event counts per axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AxisCounts {
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub e: usize,
}

impl AxisCounts {
    pub fn of(streams: &PeakStreams) -> Self {
        Self {
            x: streams.get(Axis::X).len(),
            y: streams.get(Axis::Y).len(),
            z: streams.get(Axis::Z).len(),
            e: streams.get(Axis::E).len(),
        }
    }

    pub fn motion_total(&self) -> usize {
        self.x + self.y + self.z
    }
}

/// What a round trip produced
#[derive(Debug, Clone, Serialize)]
pub struct RoundTripReport {
    pub input: AxisCounts,
    pub forward_points: usize,
    pub first_point: Option<Point3>,
    pub last_point: Option<Point3>,
    /// Distance of the final point from the origin
    pub closure_error: Option<f64>,
    pub forward: IntegrationSummary,
    pub reconstructed: AxisCounts,
    pub inverse: QuantizationSummary,
}

impl RoundTripReport {
    /// Whether the path returned to the origin within `tolerance` mm
    pub fn is_closed(&self, tolerance: f64) -> bool {
        self.closure_error.is_some_and(|err| err <= tolerance)
    }
}

/// Everything a round trip produced
#[derive(Debug, Clone)]
pub struct RoundTrip {
    pub cloud: PointCloud,
    pub peaks: PeakStreams,
    pub report: RoundTripReport,
}

/// Run forward integration then inverse quantization on a peak set
pub fn round_trip(
    streams: &PeakStreams,
    calibration: StepsPerMm,
    timing: StepTiming,
) -> Result<RoundTrip, Error> {
    let integrator = ForwardIntegrator::new(calibration)?;
    let quantizer = InverseQuantizer::new(calibration, timing)?;

    let merged = crate::merger::merge_events(streams);
    let (cloud, forward) = integrator.integrate_with_summary(&merged)?;
    let (peaks, inverse) = quantizer.quantize_with_summary(&cloud)?;

    let last_point = cloud.last().copied();
    let report = RoundTripReport {
        input: AxisCounts::of(streams),
        forward_points: cloud.len(),
        first_point: cloud.first().copied(),
        last_point,
        closure_error: last_point.map(|p| p.distance_to(&Point3::origin())),
        forward,
        reconstructed: AxisCounts::of(&peaks),
        inverse,
    };

    tracing::info!(
        forward_points = report.forward_points,
        reconstructed_x = report.reconstructed.x,
        reconstructed_y = report.reconstructed.y,
        reconstructed_z = report.reconstructed.z,
        reconstructed_e = report.reconstructed.e,
        "round trip complete"
    );

    Ok(RoundTrip {
        cloud,
        peaks,
        report,
    })
}

/// Round trip of a synthetic square path
pub fn synthetic_round_trip(
    path: &SquarePath,
    calibration: StepsPerMm,
    timing: StepTiming,
) -> Result<RoundTrip, Error> {
    round_trip(&path.peaks()?, calibration, timing)
}
