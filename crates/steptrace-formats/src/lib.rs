//! # Steptrace Formats
//!
//! File formats read and written by steptrace:
//! - point-cloud text files (`.xyz`)
//! - per-axis peak files (JSON)
//! - G-code motion traces (G0/G1 only)

pub mod gcode;
pub mod peaks;
pub mod xyz;

pub use gcode::{gcode_to_point_cloud, load_gcode, read_gcode, GcodeTracer, GCODE_CAPTION};
pub use peaks::{
    load_peaks, parse_peaks, peaks_to_json, read_peaks, save_peaks, write_peaks, PeakDocument,
    PeakRecord,
};
pub use xyz::{
    load_xyz, parse_xyz, read_xyz, XyzDocument, XyzWriter, CANONICAL_PRECISION, DEFAULT_CAPTION,
};
