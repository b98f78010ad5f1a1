//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Fingerprint grouping of hashed files
//! - Directory comparison by direct-file fingerprint multisets
//! - The scan pipeline tying walker, executor and grouping together

pub mod directories;
pub mod finder;
pub mod groups;

pub use directories::{
    collect_directories, exclude_incomplete, group_directories, DirectoryEntry,
    DuplicateDirectoryGroup,
};
pub use finder::{
    find_duplicates, format_size, DuplicateFinder, FinderConfig, FinderError, ScanReport,
    ScanSummary,
};
pub use groups::{group_by_fingerprint, DuplicateFileGroup, GroupingStats, HashedFile};
