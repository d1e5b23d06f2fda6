//! # Steptrace
//!
//! Reconstructs the toolpath of a 3D printer from stepper-motor peak
//! events, and approximates the peak sequences behind a point trace.
//!
//! ## Architecture
//!
//! Steptrace is organized as a workspace with multiple crates:
//!
//! 1. **steptrace-core** - Peak events, points, calibration, errors
//! 2. **steptrace-reconstruct** - Event merger, forward integrator, inverse quantizer, round-trip harness
//! 3. **steptrace-formats** - Point-cloud, peak JSON and G-code files
//! 4. **steptrace-settings** - Configuration files
//! 5. **steptrace** - Command-line binary that ties the crates together

pub mod commands;

pub use steptrace_core::{
    Axis, ConfigError, Direction, Dwell, Error, EventError, EventKind, InputError, MotionAxis,
    ParseError, PeakEvent, Point3, PointCloud, RawPeak, Result, StepTiming, StepsPerMm,
};
pub use steptrace_formats::{
    gcode_to_point_cloud, load_gcode, load_peaks, load_xyz, save_peaks, GcodeTracer, XyzDocument,
    XyzWriter,
};
pub use steptrace_reconstruct::{
    merge_events, peaks_to_point_cloud, point_cloud_to_peaks, synthetic_round_trip,
    ForwardIntegrator, InverseQuantizer, PeakStreams, RoundTrip, RoundTripReport, SquarePath,
};
pub use steptrace_settings::{Config, OutputSettings, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Log line layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Multi-line, human oriented
    Pretty,
    /// One line per event
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

/// Initialize logging
///
/// Sets up structured logging with:
/// - stderr output, so stdout stays free for data
/// - RUST_LOG environment variable support (default level `info`)
/// - the requested line layout
pub fn init_logging(format: LogFormat) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let base = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match format {
        LogFormat::Pretty => registry.with(base.with_line_number(true).pretty()).try_init(),
        LogFormat::Compact => registry.with(base.compact()).try_init(),
        LogFormat::Json => registry.with(base.json()).try_init(),
    };
    result.map_err(|e| anyhow::anyhow!("failed to install log subscriber: {}", e))
}
