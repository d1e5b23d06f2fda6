//! End-to-end tests for the command layer

use std::fs;

use steptrace::commands::{self, SELFTEST_TOLERANCE};
use steptrace::{load_peaks, load_xyz, Axis, Config, Error};
use tempfile::TempDir;

const SQUARE_PEAKS: &str = r#"{
  "x": [
    {"timestamp": 0.01, "direction": 1, "reversal": false},
    {"timestamp": 0.02, "direction": 1, "reversal": false},
    {"timestamp": 0.05, "direction": -1, "reversal": true},
    {"timestamp": 0.06, "direction": -1, "reversal": false}
  ],
  "y": [
    {"timestamp": 0.03, "direction": 1, "reversal": false},
    {"timestamp": 0.04, "direction": 1, "reversal": false},
    {"timestamp": 0.07, "direction": -1, "reversal": true},
    {"timestamp": 0.08, "direction": -1, "reversal": false}
  ],
  "e": [
    {"timestamp": 0.0, "dwell_start": true},
    {"timestamp": 0.08, "dwell_end": true}
  ]
}"#;

#[test]
fn test_forward_then_inverse() {
    let dir = TempDir::new().unwrap();
    let peaks = dir.path().join("peaks.json");
    let cloud = dir.path().join("cloud.xyz");
    let back = dir.path().join("back.json");
    fs::write(&peaks, SQUARE_PEAKS).unwrap();

    let config = Config::default();
    let summary = commands::forward(&config, &peaks, &cloud).unwrap();
    assert_eq!(summary.extruded_points, 8);
    assert_eq!(summary.travel_steps, 0);

    let text = fs::read_to_string(&cloud).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("8"));
    assert_eq!(lines.next(), Some("Reconstructed from stepper peaks"));
    assert_eq!(lines.next(), Some("0.166667 0.000000 0.000000"));
    assert_eq!(text.lines().last(), Some("0.000000 0.000000 0.000000"));

    let quantized = commands::inverse(&config, &cloud, &back).unwrap();
    assert_eq!(quantized.pairs, 7);

    let peaks = load_peaks(&back).unwrap();
    assert_eq!(peaks.get(Axis::X).len(), 3);
    assert_eq!(peaks.get(Axis::Y).len(), 4);
    assert_eq!(peaks.get(Axis::E).len(), 7);
}

#[test]
fn test_forward_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let peaks = dir.path().join("peaks.json");
    fs::write(&peaks, SQUARE_PEAKS).unwrap();

    let config = Config::default();
    let first = dir.path().join("a.xyz");
    let second = dir.path().join("b.xyz");
    commands::forward(&config, &peaks, &first).unwrap();
    commands::forward(&config, &peaks, &second).unwrap();
    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn test_uncalibrated_axis_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let peaks = dir.path().join("peaks.json");
    let cloud = dir.path().join("cloud.xyz");
    fs::write(&peaks, SQUARE_PEAKS).unwrap();

    let mut config = Config::default();
    config.set_setting("steps_per_mm.y", "").unwrap();

    let err = commands::forward(&config, &peaks, &cloud).unwrap_err();
    assert!(err.to_string().contains("axis Y"));
    assert!(!cloud.exists());
}

#[test]
fn test_malformed_peaks_are_reported() {
    let dir = TempDir::new().unwrap();
    let peaks = dir.path().join("peaks.json");
    fs::write(&peaks, r#"{"e": [{"timestamp": 0.0, "dwell_start": true, "dwell_end": true}]}"#)
        .unwrap();

    let err = commands::forward(&Config::default(), &peaks, &dir.path().join("c.xyz"))
        .unwrap_err();
    let inner = err.downcast_ref::<Error>().unwrap();
    assert!(inner.is_malformed_event());
}

#[test]
fn test_gcode_with_custom_precision() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("part.gcode");
    let output = dir.path().join("part.xyz");
    fs::write(&input, "G0 X1 Y2\nG1 Z0.25 ; layer\nG92 E0\n").unwrap();

    let mut config = Config::default();
    config.set_setting("output.precision", "5").unwrap();
    assert_eq!(commands::gcode(&config, &input, &output).unwrap(), 2);

    let text = fs::read_to_string(&output).unwrap();
    assert_eq!(
        text,
        "2\nConverted from G-code\n1.00000 2.00000 0.00000\n1.00000 2.00000 0.25000\n"
    );
}

#[test]
fn test_selftest_artifacts() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("selftest");

    let report = commands::selftest(&Config::default(), Some(&out)).unwrap();
    assert!(report.passed);
    assert!(report.round_trip.is_closed(SELFTEST_TOLERANCE));
    assert_eq!(report.artifacts.len(), 4);
    for artifact in &report.artifacts {
        assert!(artifact.is_file(), "{} missing", artifact.display());
    }

    let cloud = load_xyz(out.join("square.xyz")).unwrap();
    assert_eq!(cloud.cloud.len(), 40);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("report.json")).unwrap()).unwrap();
    assert_eq!(json["passed"], true);
    assert_eq!(json["round_trip"]["forward_points"], 40);
}

#[test]
fn test_oversized_move_is_rejected_before_writing() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("huge.xyz");
    let output = dir.path().join("huge.json");
    fs::write(&input, "2\ncaption\n0 0 0\n1e300 0 0\n").unwrap();

    let err = commands::inverse(&Config::default(), &input, &output).unwrap_err();
    let inner = err.downcast_ref::<Error>().unwrap();
    assert!(inner.is_invalid_input());
    assert!(inner.to_string().contains("limit"));
    assert!(!output.exists());
}
