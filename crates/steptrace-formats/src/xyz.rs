//! Point-cloud file format
//!
//! Plain text:
//!
//! ```text
//! <N>
//! <caption text>
//! <x> <y> <z>
//! ...
//! ```
//!
//! Output always uses [`CANONICAL_PRECISION`] fractional digits unless a
//! writer is configured otherwise. Input accepts any precision. The header
//! count is informational: a mismatch with the actual row count is logged
//! and tolerated. Files without the two header lines (rows only) are also
//! accepted.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use steptrace_core::{ParseError, Point3, PointCloud, Result};

/// Fractional digits written by default
pub const CANONICAL_PRECISION: usize = 6;

/// Caption written for forward reconstructions
pub const DEFAULT_CAPTION: &str = "Reconstructed from stepper peaks";

/// A parsed point-cloud file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XyzDocument {
    /// Point count from the header, if the file had one
    pub declared_count: Option<usize>,
    /// Caption line, if the file had one
    pub caption: Option<String>,
    pub cloud: PointCloud,
}

impl XyzDocument {
    /// Whether the header count agrees with the rows read
    pub fn count_matches(&self) -> bool {
        self.declared_count
            .map_or(true, |declared| declared == self.cloud.len())
    }
}

/// Point-cloud file writer
#[derive(Debug, Clone)]
pub struct XyzWriter {
    precision: usize,
    caption: String,
}

impl Default for XyzWriter {
    fn default() -> Self {
        Self {
            precision: CANONICAL_PRECISION,
            caption: DEFAULT_CAPTION.to_string(),
        }
    }
}

impl XyzWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fractional digits per coordinate
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Caption line; line breaks are flattened to spaces
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into().replace(['\r', '\n'], " ");
        self
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// Write header and rows
    pub fn write<W: Write>(&self, mut writer: W, cloud: &PointCloud) -> Result<()> {
        writeln!(writer, "{}", cloud.len())?;
        writeln!(writer, "{}", self.caption)?;
        let p = self.precision;
        for point in cloud {
            writeln!(writer, "{:.p$} {:.p$} {:.p$}", point.x, point.y, point.z)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Render the whole file into a string
    pub fn to_string(&self, cloud: &PointCloud) -> Result<String> {
        let mut buffer = Vec::new();
        self.write(&mut buffer, cloud)?;
        // Everything written came from str/format, so it is valid UTF-8
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Write to a file, replacing it
    pub fn save(&self, path: impl AsRef<Path>, cloud: &PointCloud) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        self.write(BufWriter::new(file), cloud)?;
        tracing::info!(points = cloud.len(), path = %path.display(), "wrote point cloud");
        Ok(())
    }
}

/// Parse a point-cloud file from a reader
pub fn read_xyz<R: BufRead>(reader: R) -> Result<XyzDocument> {
    let mut lines = reader.lines().enumerate().map(|(i, line)| (i + 1, line));
    let mut document = XyzDocument::default();

    let Some((first_number, first)) = lines.next() else {
        return Err(ParseError::InvalidHeader {
            line_number: 1,
            reason: "file is empty".to_string(),
        }
        .into());
    };
    let first = first?;
    let fields: Vec<&str> = first.split_whitespace().collect();

    match fields.len() {
        1 => {
            let count = fields[0]
                .parse::<usize>()
                .map_err(|e| ParseError::InvalidHeader {
                    line_number: first_number,
                    reason: format!("point count '{}' is not a number: {}", fields[0], e),
                })?;
            document.declared_count = Some(count);
            if let Some((_, caption)) = lines.next() {
                document.caption = Some(caption?.trim_end().to_string());
            }
        }
        3 => {
            // Rows only, no header
            document.cloud.push(parse_row(&first, first_number)?);
        }
        n => {
            return Err(ParseError::InvalidHeader {
                line_number: first_number,
                reason: format!("expected a point count or a point row, found {} fields", n),
            }
            .into());
        }
    }

    for (line_number, line) in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        document.cloud.push(parse_row(&line, line_number)?);
    }

    if !document.count_matches() {
        tracing::warn!(
            declared = document.declared_count,
            actual = document.cloud.len(),
            "point count header does not match rows"
        );
    }

    Ok(document)
}

/// Parse a point-cloud file from a string
pub fn parse_xyz(text: &str) -> Result<XyzDocument> {
    read_xyz(text.as_bytes())
}

/// Read a point-cloud file from disk
pub fn load_xyz(path: impl AsRef<Path>) -> Result<XyzDocument> {
    let path = path.as_ref();
    let document = read_xyz(BufReader::new(File::open(path)?))?;
    tracing::info!(points = document.cloud.len(), path = %path.display(), "read point cloud");
    Ok(document)
}

fn parse_row(line: &str, line_number: usize) -> std::result::Result<Point3, ParseError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 3 {
        return Err(ParseError::InvalidRow {
            line_number,
            reason: format!("expected 3 fields, found {}", fields.len()),
        });
    }

    let mut values = [0.0f64; 3];
    for (slot, field) in values.iter_mut().zip(&fields) {
        let value = field.parse::<f64>().map_err(|e| ParseError::InvalidRow {
            line_number,
            reason: format!("'{}' is not a number: {}", field, e),
        })?;
        if !value.is_finite() {
            return Err(ParseError::InvalidRow {
                line_number,
                reason: format!("'{}' is not a finite number", field),
            });
        }
        *slot = value;
    }

    Ok(Point3::new(values[0], values[1], values[2]))
}
