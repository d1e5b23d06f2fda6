//! Peak file format (JSON)
//!
//! One array of records per axis:
//!
//! ```json
//! {
//!   "x": [{"timestamp": 0.0, "direction": 1, "reversal": false}],
//!   "y": [],
//!   "z": [],
//!   "e": [{"timestamp": 0.0, "dwell_start": true}]
//! }
//! ```
//!
//! Missing arrays are empty. Every record is checked against the shape
//! of its axis, so a file cannot smuggle in a malformed event.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use steptrace_core::{Axis, Error, ParseError, PeakEvent, RawPeak, Result};
use steptrace_reconstruct::PeakStreams;

/// One event as stored in a peak file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakRecord {
    pub timestamp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reversal: Option<bool>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub dwell_start: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub dwell_end: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl PeakRecord {
    fn into_raw(self, axis: Axis) -> RawPeak {
        RawPeak {
            axis,
            timestamp: self.timestamp,
            direction: self.direction,
            reversal: self.reversal.unwrap_or(false),
            dwell_start: self.dwell_start,
            dwell_end: self.dwell_end,
        }
    }
}

impl From<&PeakEvent> for PeakRecord {
    fn from(event: &PeakEvent) -> Self {
        let raw = RawPeak::from(event);
        Self {
            timestamp: raw.timestamp,
            direction: raw.direction,
            reversal: event.axis().is_motion().then_some(raw.reversal),
            dwell_start: raw.dwell_start,
            dwell_end: raw.dwell_end,
        }
    }
}

/// Serialized form of a [`PeakStreams`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakDocument {
    #[serde(default)]
    pub x: Vec<PeakRecord>,
    #[serde(default)]
    pub y: Vec<PeakRecord>,
    #[serde(default)]
    pub z: Vec<PeakRecord>,
    #[serde(default)]
    pub e: Vec<PeakRecord>,
}

impl PeakDocument {
    fn records(&self, axis: Axis) -> &[PeakRecord] {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
            Axis::E => &self.e,
        }
    }

    /// Validate every record and build the per-axis sequences
    pub fn into_streams(self) -> Result<PeakStreams> {
        let mut streams = PeakStreams::new();
        for axis in Axis::ALL {
            for record in self.records(axis) {
                let event = PeakEvent::try_from(record.into_raw(axis))?;
                streams.push(event);
            }
        }
        Ok(streams)
    }
}

impl From<&PeakStreams> for PeakDocument {
    fn from(streams: &PeakStreams) -> Self {
        let records = |axis| streams.get(axis).iter().map(PeakRecord::from).collect();
        Self {
            x: records(Axis::X),
            y: records(Axis::Y),
            z: records(Axis::Z),
            e: records(Axis::E),
        }
    }
}

fn json_error(err: serde_json::Error) -> Error {
    if err.is_io() {
        return Error::Io(err.into());
    }
    ParseError::InvalidDocument {
        line_number: err.line(),
        column: err.column(),
        reason: err.to_string(),
    }
    .into()
}

/// Parse a peak file from a reader
pub fn read_peaks<R: Read>(reader: R) -> Result<PeakStreams> {
    let document: PeakDocument = serde_json::from_reader(reader).map_err(json_error)?;
    document.into_streams()
}

/// Parse a peak file from a string
pub fn parse_peaks(text: &str) -> Result<PeakStreams> {
    let document: PeakDocument = serde_json::from_str(text).map_err(json_error)?;
    document.into_streams()
}

/// Read a peak file from disk
pub fn load_peaks(path: impl AsRef<Path>) -> Result<PeakStreams> {
    let path = path.as_ref();
    let streams = read_peaks(BufReader::new(File::open(path)?))?;
    tracing::info!(events = streams.len(), path = %path.display(), "read peaks");
    Ok(streams)
}

/// Write a peak file (pretty-printed JSON)
pub fn write_peaks<W: Write>(mut writer: W, streams: &PeakStreams) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, &PeakDocument::from(streams)).map_err(json_error)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Render a peak file into a string
pub fn peaks_to_json(streams: &PeakStreams) -> Result<String> {
    serde_json::to_string_pretty(&PeakDocument::from(streams)).map_err(json_error)
}

/// Write a peak file to disk, replacing it
pub fn save_peaks(path: impl AsRef<Path>, streams: &PeakStreams) -> Result<()> {
    let path = path.as_ref();
    write_peaks(BufWriter::new(File::create(path)?), streams)?;
    tracing::info!(events = streams.len(), path = %path.display(), "wrote peaks");
    Ok(())
}
