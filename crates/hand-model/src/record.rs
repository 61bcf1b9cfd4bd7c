//! Timestamped detector output for recording and replay.
//!
//! Records are stored as JSONL, one detection result per line. Blank lines
//! and lines starting with `#` are ignored so files can carry comments.

use serde::{Deserialize, Serialize};

use crate::landmark::Hand;

/// Detector output for a single video frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    /// Nanoseconds since the start of the recording.
    #[serde(rename = "t")]
    pub timestamp_ns: u64,

    /// Hands the detector reported for this frame (may be empty).
    #[serde(default)]
    pub hands: Vec<Hand>,
}

/// A JSONL line that failed to parse.
#[derive(Debug, thiserror::Error)]
#[error("line {line}: {source}")]
pub struct RecordParseError {
    /// One-based line number within the input.
    pub line: usize,
    #[source]
    pub source: serde_json::Error,
}

/// Parse detection records from JSONL content.
pub fn parse_records(jsonl: &str) -> Result<Vec<DetectionRecord>, RecordParseError> {
    jsonl
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line, content)| {
            serde_json::from_str(content).map_err(|source| RecordParseError { line, source })
        })
        .collect()
}

/// Serialize records to JSONL format.
pub fn serialize_records(records: &[DetectionRecord]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for record in records {
        output.push_str(&serde_json::to_string(record)?);
        output.push('\n');
    }
    Ok(output)
}
