use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::layout::host::{MemoryHost, RegionMeasurement};

/// One column's entry in a measurements file
#[derive(Debug, Clone, Deserialize)]
struct ColumnMeasurement {
    #[serde(flatten)]
    regions: RegionMeasurement,
    /// Absolute bottom edge of the content area
    #[serde(default)]
    boundary: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum MeasureError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Build a host from a JSON object keyed by column id:
///
/// ```json
/// { "todo": { "margin": 4, "title": 24, "content": 120, "boundary": 148 } }
/// ```
///
/// A missing `total` is computed from the regions.
pub fn parse_measurements(json: &str) -> Result<MemoryHost, serde_json::Error> {
    let entries: IndexMap<String, ColumnMeasurement> = serde_json::from_str(json)?;
    let mut host = MemoryHost::new();
    for (column_id, entry) in entries {
        let mut m = entry.regions;
        if m.total == 0.0 {
            m.total = m.margin + m.header_bar + m.title + m.content + m.footer;
        }
        if let Some(boundary) = entry.boundary {
            host.boundaries.insert(column_id.clone(), boundary);
        }
        host.measurements.insert(column_id, m);
    }
    Ok(host)
}

pub fn load_measurements(path: &Path) -> Result<MemoryHost, MeasureError> {
    let text = fs::read_to_string(path).map_err(|e| MeasureError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_measurements(&text).map_err(|e| MeasureError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}
