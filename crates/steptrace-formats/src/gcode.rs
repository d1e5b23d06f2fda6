//! G-code trace converter
//!
//! Turns linear motion commands (G0/G1) into an ordered point sequence.
//! Coordinates are absolute and sticky: an axis that a line does not
//! mention keeps its previous value. Every motion line appends a point,
//! even one without coordinates. Arcs, relative mode and everything else
//! are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use steptrace_core::{MotionAxis, Point3, PointCloud, Result};

/// Caption written for clouds converted from G-code
pub const GCODE_CAPTION: &str = "Converted from G-code";

fn comment_regex() -> &'static Regex {
    static COMMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    // Parenthesised comments end at ')', semicolon comments at end of line
    COMMENT_REGEX.get_or_init(|| Regex::new(r"\([^)]*\)|;.*").expect("invalid regex pattern"))
}

fn motion_regex() -> &'static Regex {
    static MOTION_REGEX: OnceLock<Regex> = OnceLock::new();
    // G0, G00, G1, G01; not G10..G19
    MOTION_REGEX.get_or_init(|| {
        Regex::new(r"^(?:N\d+\s*)?G0*[01](?:[^0-9.]|$)").expect("invalid regex pattern")
    })
}

fn coordinate_regex() -> &'static Regex {
    static COORDINATE_REGEX: OnceLock<Regex> = OnceLock::new();
    COORDINATE_REGEX
        .get_or_init(|| Regex::new(r"([XYZ])([-+]?\d*\.?\d+)").expect("invalid regex pattern"))
}

/// Line-by-line converter with sticky position memory
#[derive(Debug, Clone, Default)]
pub struct GcodeTracer {
    position: Point3,
    motion_lines: usize,
    ignored_lines: usize,
}

impl GcodeTracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current sticky position
    pub fn position(&self) -> Point3 {
        self.position
    }

    /// Motion lines seen so far
    pub fn motion_lines(&self) -> usize {
        self.motion_lines
    }

    /// Non-empty lines that were not linear motion
    pub fn ignored_lines(&self) -> usize {
        self.ignored_lines
    }

    /// Feed one line; returns the new position if it was a motion line
    pub fn feed_line(&mut self, line: &str) -> Option<Point3> {
        let code = comment_regex().replace_all(line, " ");
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            return None;
        }
        if !motion_regex().is_match(&code) {
            self.ignored_lines += 1;
            return None;
        }

        for caps in coordinate_regex().captures_iter(&code) {
            let axis = match &caps[1] {
                "X" => MotionAxis::X,
                "Y" => MotionAxis::Y,
                _ => MotionAxis::Z,
            };
            // The pattern only admits plain decimals, which always parse
            if let Ok(value) = caps[2].parse::<f64>() {
                *self.position.get_mut(axis) = value;
            }
        }

        self.motion_lines += 1;
        Some(self.position)
    }

    /// Feed every line of a text, collecting the motion points
    pub fn trace(&mut self, text: &str) -> PointCloud {
        text.lines().filter_map(|line| self.feed_line(line)).collect()
    }
}

/// Convert G-code text into a point cloud
pub fn gcode_to_point_cloud(text: &str) -> PointCloud {
    let mut tracer = GcodeTracer::new();
    let cloud = tracer.trace(text);
    tracing::debug!(
        points = cloud.len(),
        ignored_lines = tracer.ignored_lines(),
        "converted G-code"
    );
    cloud
}

/// Convert G-code from a reader
pub fn read_gcode<R: BufRead>(reader: R) -> Result<PointCloud> {
    let mut tracer = GcodeTracer::new();
    let mut cloud = PointCloud::new();
    for line in reader.lines() {
        if let Some(point) = tracer.feed_line(&line?) {
            cloud.push(point);
        }
    }
    tracing::debug!(
        points = cloud.len(),
        ignored_lines = tracer.ignored_lines(),
        "converted G-code"
    );
    Ok(cloud)
}

/// Convert a G-code file from disk
pub fn load_gcode(path: impl AsRef<Path>) -> Result<PointCloud> {
    let path = path.as_ref();
    let cloud = read_gcode(BufReader::new(File::open(path)?))?;
    tracing::info!(points = cloud.len(), path = %path.display(), "read G-code");
    Ok(cloud)
}
