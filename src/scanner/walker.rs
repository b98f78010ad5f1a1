//! Directory walker implementation using jwalk.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory
//! tree and collecting metadata for every candidate file. It uses [`jwalk`]
//! for parallel directory reading, with children sorted by name so that the
//! enumeration order is the same on every run.
//!
//! # Features
//!
//! - Extension allow-list (case-insensitive, no leading dot)
//! - Minimum size filter, applied before any hashing happens
//! - Optional symlink following and hidden-file skipping
//! - Unreadable entries reported as [`ScanError`] items, never fatal
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig::default().with_min_size(Some(1024));
//!
//! let walker = Walker::new(Path::new("/data/projects"), config);
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} candidate files", files.len());
//! ```

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use jwalk::WalkDir;

use super::{paths, FileEntry, ScanError, WalkerConfig};
use crate::progress::ProgressCallback;

/// Directory walker for file discovery.
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional progress callback, notified for every accepted file
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("root", &self.root)
            .field("config", &self.config)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// The path is used as given; callers that want absolute paths in the
    /// resulting entries should pass a canonical root.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if a file passes the size filters.
    fn passes_size_filter(&self, size: u64) -> bool {
        if size == 0 && !self.config.include_empty {
            return false;
        }
        match self.config.min_size {
            Some(min) => size >= min,
            None => true,
        }
    }

    /// Walk the directory tree, yielding file entries.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration; each one is also logged at warn level.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let walk_dir = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .skip_hidden(self.config.skip_hidden)
            .process_read_dir(|_depth, _path, _read_dir_state, children| {
                // Sort children for deterministic output
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        let accepted = AtomicUsize::new(0);

        walk_dir.into_iter().filter_map(move |entry_result| {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                    return Some(Err(self.handle_jwalk_error(path, e)));
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                return None;
            }

            let path = entry.path();

            let is_symlink = file_type.is_symlink();
            if is_symlink && !self.config.follow_symlinks {
                log::trace!("Skipping symlink: {}", path.display());
                return None;
            }

            // Extension check needs no metadata, so do it first
            let extension = paths::extension_of(&path);
            if !self.config.accepts_extension(&extension) {
                log::trace!("Skipping file due to extension filter: {}", path.display());
                return None;
            }

            let metadata = if self.config.follow_symlinks {
                std::fs::metadata(&path)
            } else {
                std::fs::symlink_metadata(&path)
            };
            let metadata = match metadata {
                Ok(m) => m,
                Err(e) => return Some(Err(self.handle_io_error(&path, e))),
            };

            if !metadata.is_file() {
                return None;
            }

            let file = self.process_file_entry(path, &metadata)?;

            let count = accepted.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(ref callback) = self.progress_callback {
                callback.on_progress(count, file.path.to_string_lossy().as_ref());
            }

            Some(Ok(file))
        })
    }

    /// Create a FileEntry if the file passes the size filters.
    fn process_file_entry(&self, path: PathBuf, metadata: &Metadata) -> Option<FileEntry> {
        let size = metadata.len();

        if !self.passes_size_filter(size) {
            log::trace!(
                "Skipping file due to size filter ({} bytes): {}",
                size,
                path.display()
            );
            return None;
        }

        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let relative = paths::relative_to(&path, &self.root);

        Some(FileEntry::new(path, size, modified).with_relative_path(relative))
    }

    /// Handle I/O errors during file access.
    fn handle_io_error(&self, path: &Path, error: std::io::Error) -> ScanError {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => {
                log::warn!("Permission denied: {}", path.display());
                ScanError::PermissionDenied(path.to_path_buf())
            }
            ErrorKind::NotFound => {
                log::warn!("File disappeared during scan: {}", path.display());
                ScanError::NotFound(path.to_path_buf())
            }
            _ => {
                log::warn!("I/O error for {}: {}", path.display(), error);
                ScanError::Io {
                    path: path.to_path_buf(),
                    source: error,
                }
            }
        }
    }

    /// Handle jwalk errors (typically unreadable directories).
    fn handle_jwalk_error(&self, path: PathBuf, error: jwalk::Error) -> ScanError {
        if let Some(kind) = error.io_error().map(std::io::Error::kind) {
            if kind == std::io::ErrorKind::PermissionDenied {
                log::warn!("Permission denied: {}", path.display());
                return ScanError::PermissionDenied(path);
            }
        }
        log::warn!("Walker error for {}: {}", path.display(), error);
        ScanError::Io {
            path,
            source: std::io::Error::other(error.to_string()),
        }
    }
}
