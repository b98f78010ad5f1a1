//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Directory walking with extension and size filters using jwalk
//! - Whole-file content hashing with BLAKE3
//! - Relative path and extension normalization
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: BLAKE3 file hashing (streaming or memory-mapped)
//! - [`paths`]: Path helpers shared by the walker and the reports
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig::default().with_extensions(vec!["csv".to_string()]);
//!
//! let walker = Walker::new(Path::new("."), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.relative_path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod paths;
pub mod walker;

use std::path::PathBuf;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

pub use hasher::{hash_to_hex, hex_to_hash, Hash, Hasher};
pub use walker::Walker;

/// Metadata for a discovered file.
///
/// Entries are created by the [`Walker`] and never modified afterwards.
/// The content fingerprint is kept beside the entry (see
/// [`crate::duplicates::HashedFile`]) rather than inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Absolute path to the file
    pub path: PathBuf,
    /// Path relative to the scanned root
    pub relative_path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: SystemTime,
    /// Lower-cased extension without the dot, empty when the file has none
    pub extension: String,
}

impl FileEntry {
    /// Create a new FileEntry.
    ///
    /// The relative path defaults to the full path until
    /// [`FileEntry::with_relative_path`] is applied.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file
    /// * `size` - File size in bytes
    /// * `modified` - Last modification time
    #[must_use]
    pub fn new(path: PathBuf, size: u64, modified: SystemTime) -> Self {
        let extension = paths::extension_of(&path);
        Self {
            relative_path: path.clone(),
            path,
            size,
            modified,
            extension,
        }
    }

    /// Set the path relative to the scanned root.
    #[must_use]
    pub fn with_relative_path(mut self, relative_path: PathBuf) -> Self {
        self.relative_path = relative_path;
        self
    }

    /// Size in megabytes (1 MB = 1024 * 1024 bytes).
    #[must_use]
    pub fn size_mb(&self) -> f64 {
        self.size as f64 / BYTES_PER_MB as f64
    }
}

/// Number of bytes in one megabyte, as used by the size threshold.
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Configuration for directory walking.
///
/// Controls extension and size filtering, symlink handling and hidden files.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Accepted extensions, lower-cased and without a leading dot.
    /// An empty list accepts every file.
    pub extensions: Vec<String>,

    /// Minimum file size to include (in bytes).
    pub min_size: Option<u64>,

    /// Include zero-byte files. They all share the same fingerprint,
    /// so they are skipped unless explicitly requested.
    pub include_empty: bool,

    /// Follow symbolic links during traversal.
    /// Warning: May cause infinite loops with symlink cycles.
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,
}

impl WalkerConfig {
    /// Set the extension allow-list.
    ///
    /// Values are normalized (trimmed, lower-cased, leading dot removed);
    /// values that normalize to nothing are dropped.
    #[must_use]
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions
            .iter()
            .filter_map(|e| paths::normalize_extension(e))
            .collect();
        self.extensions.sort();
        self.extensions.dedup();
        self
    }

    /// Set the minimum file size in bytes.
    #[must_use]
    pub fn with_min_size(mut self, min_size: Option<u64>) -> Self {
        self.min_size = min_size;
        self
    }

    /// Include or skip zero-byte files.
    #[must_use]
    pub fn with_include_empty(mut self, include_empty: bool) -> Self {
        self.include_empty = include_empty;
        self
    }

    /// Follow symbolic links.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Skip hidden files and directories.
    #[must_use]
    pub fn with_skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }

    /// Whether a lower-cased extension passes the allow-list.
    #[must_use]
    pub fn accepts_extension(&self, extension: &str) -> bool {
        self.extensions.is_empty() || self.extensions.iter().any(|e| e == extension)
    }
}

/// Non-fatal errors that can occur while scanning.
///
/// None of these abort a scan: the offending entry is skipped and the error
/// is reported as a warning in the scan summary.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The entry disappeared between listing and reading.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing an entry.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A file could not be hashed.
    #[error(transparent)]
    HashError(#[from] HashError),
}

impl ScanError {
    /// Path of the entry that caused this error.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::PermissionDenied(p) | Self::NotFound(p) => p,
            Self::Io { path, .. } => path,
            Self::HashError(e) => e.path(),
        }
    }

    /// Whether this error was raised while hashing rather than walking.
    #[must_use]
    pub fn is_hash_failure(&self) -> bool {
        matches!(self, Self::HashError(_))
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error raised while hashing `path`.
    #[must_use]
    pub fn from_io(path: &std::path::Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Path of the file that failed to hash.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}
