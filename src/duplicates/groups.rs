//! Fingerprint grouping of hashed files.
//!
//! # Overview
//!
//! Once every candidate file has a content fingerprint, files are
//! partitioned by fingerprint equality. Partitions holding a single file are
//! dropped; every remaining partition becomes a [`DuplicateFileGroup`].
//!
//! Group ids start at 1 and follow the order in which each fingerprint was
//! first seen in the input, so a deterministic input order yields
//! deterministic ids.
//!
//! # Example
//!
//! ```
//! use dupescan::scanner::FileEntry;
//! use dupescan::duplicates::{group_by_fingerprint, HashedFile};
//! use std::path::PathBuf;
//! use std::time::SystemTime;
//!
//! let entry = |p: &str| FileEntry::new(PathBuf::from(p), 5, SystemTime::now());
//! let files = vec![
//!     HashedFile::new(entry("/a.txt"), [1; 32]),
//!     HashedFile::new(entry("/b.txt"), [1; 32]),
//!     HashedFile::new(entry("/c.txt"), [2; 32]),
//! ];
//!
//! let (groups, stats) = group_by_fingerprint(&files);
//!
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].id, 1);
//! assert_eq!(groups[0].len(), 2);
//! assert_eq!(stats.unique_fingerprints, 2);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::scanner::{hash_to_hex, FileEntry, Hash};

/// A file together with its content fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedFile {
    /// The walked file
    pub entry: FileEntry,
    /// BLAKE3 fingerprint of its full content
    pub hash: Hash,
}

impl HashedFile {
    /// Pair an entry with its fingerprint.
    #[must_use]
    pub fn new(entry: FileEntry, hash: Hash) -> Self {
        Self { entry, hash }
    }
}

/// A set of two or more files with identical content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateFileGroup {
    /// Group id, 1-based, unique within one scan
    pub id: usize,
    /// BLAKE3 hash shared by every member
    pub hash: Hash,
    /// Distinct extensions observed among the members, sorted
    pub extensions: Vec<String>,
    /// Size in bytes of each member
    pub size: u64,
    /// Members in discovery order
    pub files: Vec<FileEntry>,
}

impl DuplicateFileGroup {
    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Hash as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }

    /// Space taken by all copies but one.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.files.len().saturating_sub(1) as u64
    }

    /// Observed extensions joined with `", "`.
    #[must_use]
    pub fn extensions_display(&self) -> String {
        self.extensions.join(", ")
    }
}

/// Statistics from fingerprint grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupingStats {
    /// Number of fingerprinted files grouped
    pub total_files: usize,
    /// Total size of those files in bytes
    pub total_size: u64,
    /// Number of distinct fingerprints
    pub unique_fingerprints: usize,
    /// Number of groups with 2+ files
    pub duplicate_groups: usize,
    /// Files in duplicate groups beyond the first of each group
    pub duplicate_files: usize,
    /// Bytes that removing those extra copies would free
    pub reclaimable_space: u64,
}

/// Partition fingerprinted files into duplicate groups.
///
/// Singleton partitions are dropped. Members keep input order, and group ids
/// follow the first appearance of each fingerprint. Zero input yields zero
/// groups.
///
/// # Panics
///
/// Debug assertion fails if two members of a group differ in size.
#[must_use]
pub fn group_by_fingerprint(files: &[HashedFile]) -> (Vec<DuplicateFileGroup>, GroupingStats) {
    let mut stats = GroupingStats::default();

    // fingerprint -> index into `partitions`, which is in discovery order
    let mut index: HashMap<Hash, usize> = HashMap::new();
    let mut partitions: Vec<(Hash, Vec<&FileEntry>)> = Vec::new();

    for file in files {
        stats.total_files += 1;
        stats.total_size += file.entry.size;

        match index.get(&file.hash) {
            Some(&i) => partitions[i].1.push(&file.entry),
            None => {
                index.insert(file.hash, partitions.len());
                partitions.push((file.hash, vec![&file.entry]));
            }
        }
    }

    stats.unique_fingerprints = partitions.len();

    let groups: Vec<DuplicateFileGroup> = partitions
        .into_iter()
        .filter(|(hash, members)| {
            if members.len() < 2 {
                log::trace!(
                    "Unique fingerprint {}: {}",
                    &hash_to_hex(hash)[..16],
                    members[0].path.display()
                );
                false
            } else {
                true
            }
        })
        .enumerate()
        .map(|(i, (hash, members))| {
            let size = members[0].size;
            debug_assert!(
                members.iter().all(|f| f.size == size),
                "Members of a duplicate group must share one size"
            );

            let mut extensions: Vec<String> =
                members.iter().map(|f| f.extension.clone()).collect();
            extensions.sort();
            extensions.dedup();

            DuplicateFileGroup {
                id: i + 1,
                hash,
                extensions,
                size,
                files: members.into_iter().cloned().collect(),
            }
        })
        .collect();

    stats.duplicate_groups = groups.len();
    stats.duplicate_files = groups.iter().map(|g| g.len() - 1).sum();
    stats.reclaimable_space = groups.iter().map(DuplicateFileGroup::wasted_space).sum();

    log::info!(
        "Grouping complete: {} files, {} fingerprints, {} duplicate groups",
        stats.total_files,
        stats.unique_fingerprints,
        stats.duplicate_groups
    );

    (groups, stats)
}
