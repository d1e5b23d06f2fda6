//! # Steptrace Reconstruct
//!
//! Bidirectional mapping between per-axis stepper peak sequences and a
//! continuous point cloud:
//! - Event merger (four axis sequences to one chronological stream)
//! - Forward integrator (chronological stream to extrusion-gated cloud)
//! - Inverse quantizer (cloud to approximate peak sequences)
//! - Synthetic round-trip harness
//!
//! Every conversion is a single synchronous pass that owns its state;
//! independent conversions can run on separate threads without
//! coordination.

pub mod forward;
pub mod harness;
pub mod inverse;
pub mod merger;
pub mod streams;

pub use forward::{peaks_to_point_cloud, ForwardIntegrator, IntegrationSummary};
pub use harness::{
    round_trip, synthetic_round_trip, AxisCounts, RoundTrip, RoundTripReport, SquarePath,
};
pub use inverse::{
    point_cloud_to_peaks, InverseQuantizer, QuantizationSummary, MAX_STEPS_PER_PAIR,
};
pub use merger::{chronological, is_chronological, merge_events};
pub use streams::PeakStreams;
