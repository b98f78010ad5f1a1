//! CSV output formatter for duplicate scan results.
//!
//! CSV is flat, so each table is written separately: one row per member
//! file for the duplicated-files table, one row per member directory for the
//! duplicated-directories table. A table that is absent produces only its
//! header.
//!
//! # Columns
//!
//! Files: `group_id`, `fingerprint`, `size_bytes`, `size_mb`, `count`,
//! `extensions`, `path`, `relative_path`, `modified`, `root`.
//!
//! Directories: `group_id`, `relative_path`, `path`, `file_count`,
//! `group_size`.

use std::io;

use serde::Serialize;
use thiserror::Error;

use super::report::DuplicateReport;

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Which table to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsvTable {
    /// Duplicated files, one row per member file
    #[default]
    Files,
    /// Duplicated directories, one row per member directory
    Directories,
}

#[derive(Debug, Serialize)]
struct FileRow<'a> {
    group_id: usize,
    fingerprint: &'a str,
    size_bytes: u64,
    size_mb: f64,
    count: usize,
    extensions: String,
    path: String,
    relative_path: String,
    modified: &'a str,
    root: String,
}

#[derive(Debug, Serialize)]
struct DirectoryRow<'a> {
    group_id: usize,
    relative_path: &'a str,
    path: String,
    file_count: usize,
    group_size: usize,
}

const FILE_HEADER: [&str; 10] = [
    "group_id",
    "fingerprint",
    "size_bytes",
    "size_mb",
    "count",
    "extensions",
    "path",
    "relative_path",
    "modified",
    "root",
];

const DIRECTORY_HEADER: [&str; 5] = [
    "group_id",
    "relative_path",
    "path",
    "file_count",
    "group_size",
];

/// CSV output formatter.
pub struct CsvOutput<'a> {
    report: &'a DuplicateReport,
    table: CsvTable,
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter for one table of `report`.
    #[must_use]
    pub fn new(report: &'a DuplicateReport, table: CsvTable) -> Self {
        Self { report, table }
    }

    /// Write the CSV output to the given writer.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        match self.table {
            CsvTable::Files => {
                csv_writer.write_record(FILE_HEADER)?;
                for row in self.report.duplicated_files.iter().flatten() {
                    let extensions = row.extensions.join(";");
                    for member in &row.files {
                        csv_writer.serialize(FileRow {
                            group_id: row.group_id,
                            fingerprint: &row.fingerprint,
                            size_bytes: row.size_bytes,
                            size_mb: row.size_mb,
                            count: row.count,
                            extensions: extensions.clone(),
                            path: member.path.to_string_lossy().into_owned(),
                            relative_path: member.relative_path.to_string_lossy().into_owned(),
                            modified: &member.modified,
                            root: row.root.to_string_lossy().into_owned(),
                        })?;
                    }
                }
            }
            CsvTable::Directories => {
                csv_writer.write_record(DIRECTORY_HEADER)?;
                for row in self.report.duplicated_directories.iter().flatten() {
                    csv_writer.serialize(DirectoryRow {
                        group_id: row.group_id,
                        relative_path: &row.relative_path,
                        path: row.path.to_string_lossy().into_owned(),
                        file_count: row.file_count,
                        group_size: row.group_size,
                    })?;
                }
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}
