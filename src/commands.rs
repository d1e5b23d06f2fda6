//! Command implementations behind the `steptrace` binary
//!
//! Each command reads its input completely, converts in memory and only
//! then creates the output file, so a failed conversion leaves nothing
//! behind.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use steptrace_formats::{
    load_gcode, load_peaks, load_xyz, save_peaks, XyzWriter, DEFAULT_CAPTION, GCODE_CAPTION,
};
use steptrace_reconstruct::{
    merge_events, synthetic_round_trip, ForwardIntegrator, IntegrationSummary, InverseQuantizer,
    QuantizationSummary, RoundTripReport, SquarePath,
};
use steptrace_settings::Config;

/// Closure tolerance for the synthetic square (mm)
pub const SELFTEST_TOLERANCE: f64 = 1e-9;

fn writer(config: &Config, fallback_caption: &str) -> XyzWriter {
    XyzWriter::new()
        .with_precision(config.output.precision)
        .with_caption(
            config
                .output
                .caption
                .as_deref()
                .unwrap_or(fallback_caption),
        )
}

/// Peak file to point-cloud file
pub fn forward(config: &Config, peaks: &Path, output: &Path) -> Result<IntegrationSummary> {
    let streams =
        load_peaks(peaks).with_context(|| format!("reading peaks from {}", peaks.display()))?;

    let integrator = ForwardIntegrator::new(config.steps_per_mm)?;
    let (cloud, summary) = integrator.integrate_with_summary(&merge_events(&streams))?;

    writer(config, DEFAULT_CAPTION)
        .save(output, &cloud)
        .with_context(|| format!("writing point cloud to {}", output.display()))?;
    Ok(summary)
}

/// Point-cloud file to peak file
pub fn inverse(config: &Config, input: &Path, output: &Path) -> Result<QuantizationSummary> {
    let document =
        load_xyz(input).with_context(|| format!("reading point cloud from {}", input.display()))?;

    let quantizer = InverseQuantizer::new(config.steps_per_mm, config.timing())?;
    let (streams, summary) = quantizer.quantize_with_summary(&document.cloud)?;

    save_peaks(output, &streams)
        .with_context(|| format!("writing peaks to {}", output.display()))?;
    Ok(summary)
}

/// G-code file to point-cloud file; returns the number of points written
pub fn gcode(config: &Config, input: &Path, output: &Path) -> Result<usize> {
    let cloud =
        load_gcode(input).with_context(|| format!("reading G-code from {}", input.display()))?;

    writer(config, GCODE_CAPTION)
        .save(output, &cloud)
        .with_context(|| format!("writing point cloud to {}", output.display()))?;
    Ok(cloud.len())
}

/// Outcome of a self-test run
#[derive(Debug, Clone, Serialize)]
pub struct SelftestReport {
    pub generated_at: DateTime<Utc>,
    pub version: &'static str,
    pub passed: bool,
    pub expected_points: usize,
    pub round_trip: RoundTripReport,
    /// Files written, if an output directory was given
    pub artifacts: Vec<PathBuf>,
}

/// Synthetic square round trip, optionally saving every intermediate file
pub fn selftest(config: &Config, output_dir: Option<&Path>) -> Result<SelftestReport> {
    let path = SquarePath::default();
    let input = path.peaks()?;
    let trip = synthetic_round_trip(&path, config.steps_per_mm, config.timing())?;

    let expected_points = 4 * path.steps_per_side;
    let passed = trip.report.forward_points == expected_points
        && trip.report.is_closed(SELFTEST_TOLERANCE);

    let mut report = SelftestReport {
        generated_at: Utc::now(),
        version: crate::VERSION,
        passed,
        expected_points,
        round_trip: trip.report.clone(),
        artifacts: Vec::new(),
    };

    if let Some(dir) = output_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;

        let input_path = dir.join("square_peaks.json");
        save_peaks(&input_path, &input)?;
        let cloud_path = dir.join("square.xyz");
        writer(config, DEFAULT_CAPTION).save(&cloud_path, &trip.cloud)?;
        let peaks_path = dir.join("reconstructed_peaks.json");
        save_peaks(&peaks_path, &trip.peaks)?;
        let report_path = dir.join("report.json");

        report.artifacts = vec![input_path, cloud_path, peaks_path, report_path.clone()];
        fs::write(&report_path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("writing report to {}", report_path.display()))?;
    }

    if passed {
        tracing::info!(points = expected_points, "self-test passed");
    } else {
        tracing::warn!(
            points = report.round_trip.forward_points,
            closure_error = report.round_trip.closure_error,
            "self-test failed"
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selftest_passes_with_defaults() {
        let report = selftest(&Config::default(), None).unwrap();
        assert!(report.passed);
        assert_eq!(report.expected_points, 40);
        assert!(report.artifacts.is_empty());
    }

    #[test]
    fn test_configured_caption_wins() {
        let mut config = Config::default();
        assert_eq!(writer(&config, GCODE_CAPTION).caption(), GCODE_CAPTION);

        config.output.caption = Some("bench".to_string());
        assert_eq!(writer(&config, GCODE_CAPTION).caption(), "bench");
    }
}
