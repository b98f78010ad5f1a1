//! Report tables built from a finished scan.
//!
//! A [`DuplicateReport`] holds two optional tables. A table is `None` rather
//! than empty when it has no rows, so "no duplicates" is visible in the type:
//! [`DuplicateReport::has_findings`] is false exactly when both are `None`.

use std::path::PathBuf;
use std::time::SystemTime;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::duplicates::{DuplicateDirectoryGroup, DuplicateFileGroup, ScanReport};
use crate::scanner::{FileEntry, BYTES_PER_MB};

/// One member file of a duplicated-files row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberFile {
    /// Absolute path
    pub path: PathBuf,
    /// Path relative to the scanned root
    pub relative_path: PathBuf,
    /// Last modification time (RFC 3339, UTC)
    pub modified: String,
}

impl From<&FileEntry> for MemberFile {
    fn from(entry: &FileEntry) -> Self {
        Self {
            path: entry.path.clone(),
            relative_path: entry.relative_path.clone(),
            modified: format_time(entry.modified),
        }
    }
}

/// One row of the duplicated-files table: a whole duplicate group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicatedFileRow {
    /// Scanned root
    pub root: PathBuf,
    /// Group id
    pub group_id: usize,
    /// Member files in discovery order
    pub files: Vec<MemberFile>,
    /// Extensions observed among the members
    pub extensions: Vec<String>,
    /// Number of members
    pub count: usize,
    /// Size of each member in bytes
    pub size_bytes: u64,
    /// Size of each member in megabytes
    pub size_mb: f64,
    /// BLAKE3 fingerprint (hex)
    pub fingerprint: String,
}

impl DuplicatedFileRow {
    fn from_group(root: &std::path::Path, group: &DuplicateFileGroup) -> Self {
        Self {
            root: root.to_path_buf(),
            group_id: group.id,
            files: group.files.iter().map(MemberFile::from).collect(),
            extensions: group.extensions.clone(),
            count: group.len(),
            size_bytes: group.size,
            size_mb: group.size as f64 / BYTES_PER_MB as f64,
            fingerprint: group.hash_hex(),
        }
    }
}

/// One row of the duplicated-directories table: one member directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicatedDirectoryRow {
    /// Path relative to the scanned root (`.` for the root)
    pub relative_path: String,
    /// Absolute path
    pub path: PathBuf,
    /// Number of qualifying files directly inside
    pub file_count: usize,
    /// Number of directories in this row's group
    pub group_size: usize,
    /// Group id
    pub group_id: usize,
}

impl DuplicatedDirectoryRow {
    fn rows_for(group: &DuplicateDirectoryGroup) -> impl Iterator<Item = Self> + '_ {
        group.directories.iter().map(move |dir| Self {
            relative_path: dir.display_path(),
            path: dir.path.clone(),
            file_count: dir.file_count(),
            group_size: group.len(),
            group_id: group.id,
        })
    }
}

/// The two result tables of a scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateReport {
    /// Scanned root
    pub root: PathBuf,
    /// Duplicated files, `None` when there are none
    pub duplicated_files: Option<Vec<DuplicatedFileRow>>,
    /// Duplicated directories, `None` when there are none
    pub duplicated_directories: Option<Vec<DuplicatedDirectoryRow>>,
}

impl DuplicateReport {
    /// Build both tables from a scan.
    #[must_use]
    pub fn from_scan(scan: &ScanReport) -> Self {
        let files: Vec<DuplicatedFileRow> = scan
            .file_groups
            .iter()
            .map(|g| DuplicatedFileRow::from_group(&scan.root, g))
            .collect();

        let directories: Vec<DuplicatedDirectoryRow> = scan
            .directory_groups
            .iter()
            .flat_map(DuplicatedDirectoryRow::rows_for)
            .collect();

        Self {
            root: scan.root.clone(),
            duplicated_files: non_empty(files),
            duplicated_directories: non_empty(directories),
        }
    }

    /// Whether either table has rows.
    #[must_use]
    pub fn has_findings(&self) -> bool {
        self.duplicated_files.is_some() || self.duplicated_directories.is_some()
    }

    /// Number of duplicate file groups.
    #[must_use]
    pub fn file_group_count(&self) -> usize {
        self.duplicated_files.as_ref().map_or(0, Vec::len)
    }

    /// Number of duplicate directory groups.
    #[must_use]
    pub fn directory_group_count(&self) -> usize {
        self.duplicated_directories.as_ref().map_or(0, |rows| {
            let mut ids: Vec<usize> = rows.iter().map(|r| r.group_id).collect();
            ids.dedup();
            ids.len()
        })
    }
}

fn non_empty<T>(rows: Vec<T>) -> Option<Vec<T>> {
    if rows.is_empty() {
        None
    } else {
        Some(rows)
    }
}

/// RFC 3339 timestamp (UTC, whole seconds).
#[must_use]
pub fn format_time(time: SystemTime) -> String {
    let datetime: DateTime<Utc> = time.into();
    datetime.to_rfc3339_opts(SecondsFormat::Secs, true)
}
