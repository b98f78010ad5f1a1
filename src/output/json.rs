//! JSON output formatter for duplicate scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "root": "/data",
//!   "duplicated_files": [
//!     {
//!       "root": "/data",
//!       "group_id": 1,
//!       "files": [
//!         { "path": "/data/a.csv", "relative_path": "a.csv", "modified": "2024-05-01T10:00:00Z" }
//!       ],
//!       "extensions": ["csv"],
//!       "count": 2,
//!       "size_bytes": 1024,
//!       "size_mb": 0.0009765625,
//!       "fingerprint": "abc123..."
//!     }
//!   ],
//!   "duplicated_directories": null,
//!   "summary": {
//!     "total_files": 100,
//!     "hashed_files": 100,
//!     "duplicate_groups": 5,
//!     "duplicate_directory_groups": 0,
//!     "reclaimable_space": 51200,
//!     "warnings": 0,
//!     "incomplete_directories": 0,
//!     "scan_duration_ms": 1234
//!   }
//! }
//! ```
//!
//! A table with no rows is `null`.

use std::io::Write;

use serde::Serialize;

use super::report::{DuplicateReport, DuplicatedDirectoryRow, DuplicatedFileRow};
use crate::duplicates::ScanSummary;

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Number of candidate files found by the walker
    pub total_files: usize,
    /// Total size of the candidate files in bytes
    pub total_size: u64,
    /// Number of files fingerprinted successfully
    pub hashed_files: usize,
    /// Number of duplicate file groups
    pub duplicate_groups: usize,
    /// Files in duplicate groups beyond the first of each group
    pub duplicate_files: usize,
    /// Number of duplicate directory groups
    pub duplicate_directory_groups: usize,
    /// Bytes that removing the extra copies would free
    pub reclaimable_space: u64,
    /// Number of skipped entries
    pub warnings: usize,
    /// Directories not compared because a direct file failed to hash
    pub incomplete_directories: usize,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
}

impl From<&ScanSummary> for JsonSummary {
    fn from(summary: &ScanSummary) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            hashed_files: summary.hashed_files,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            duplicate_directory_groups: summary.duplicate_directory_groups,
            reclaimable_space: summary.reclaimable_space,
            warnings: summary.warnings.len(),
            incomplete_directories: summary.incomplete_directories,
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a> {
    /// Scanned root
    pub root: &'a std::path::Path,
    /// Duplicated-files table
    pub duplicated_files: Option<&'a [DuplicatedFileRow]>,
    /// Duplicated-directories table
    pub duplicated_directories: Option<&'a [DuplicatedDirectoryRow]>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl<'a> JsonOutput<'a> {
    /// Create a new JSON output from a report and its scan summary.
    #[must_use]
    pub fn new(report: &'a DuplicateReport, summary: &ScanSummary) -> Self {
        Self {
            root: &report.root,
            duplicated_files: report.duplicated_files.as_deref(),
            duplicated_directories: report.duplicated_directories.as_deref(),
            summary: JsonSummary::from(summary),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
