//! Directory comparison by direct-file fingerprint multisets.
//!
//! A directory is described by the sorted list of fingerprints of the
//! qualifying files it contains directly. Two directories are duplicates when
//! those lists are equal, repeats included. Names and timestamps play no
//! part, and nothing below a subdirectory counts toward its parent.
//!
//! Directories without a qualifying direct file never get an entry, so empty
//! or fully filtered directories cannot match each other. Directories where a
//! direct file failed to hash are left out as well (see
//! [`exclude_incomplete`]).

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::HashedFile;
use crate::scanner::{paths, Hash};

/// A directory holding at least one fingerprinted file directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    /// Path relative to the scanned root; empty for the root itself
    pub relative_path: PathBuf,
    /// Absolute path
    pub path: PathBuf,
    /// Sorted fingerprints of the direct files, one per file
    #[serde(skip)]
    pub fingerprints: Vec<Hash>,
}

impl DirectoryEntry {
    /// Number of direct files.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.fingerprints.len()
    }

    /// Relative path for display; the root shows as `.`.
    #[must_use]
    pub fn display_path(&self) -> String {
        paths::display_relative(&self.relative_path)
    }
}

/// Two or more directories with identical fingerprint multisets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateDirectoryGroup {
    /// Group id, 1-based, numbered independently of file groups
    pub id: usize,
    /// Direct-file count shared by every member
    pub file_count: usize,
    /// Members in discovery order
    pub directories: Vec<DirectoryEntry>,
}

impl DuplicateDirectoryGroup {
    /// Number of member directories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.directories.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }
}

/// Build one [`DirectoryEntry`] per parent directory of `files`.
///
/// Entries are returned in order of the first file seen in each directory.
#[must_use]
pub fn collect_directories(files: &[HashedFile], root: &Path) -> Vec<DirectoryEntry> {
    let mut index: HashMap<&Path, usize> = HashMap::new();
    let mut entries: Vec<DirectoryEntry> = Vec::new();

    for file in files {
        let Some(parent) = file.entry.path.parent() else {
            continue;
        };

        match index.get(parent) {
            Some(&i) => entries[i].fingerprints.push(file.hash),
            None => {
                index.insert(parent, entries.len());
                entries.push(DirectoryEntry {
                    relative_path: paths::relative_to(parent, root),
                    path: parent.to_path_buf(),
                    fingerprints: vec![file.hash],
                });
            }
        }
    }

    for entry in &mut entries {
        entry.fingerprints.sort_unstable();
    }

    log::debug!("Collected {} directories with qualifying files", entries.len());
    entries
}

/// Drop directories that hold a file which failed to hash.
///
/// `failed` lists the paths of those files. The fingerprint multiset of their
/// parent directory is missing an element and must not be compared.
#[must_use]
pub fn exclude_incomplete<'a>(
    entries: Vec<DirectoryEntry>,
    failed: impl IntoIterator<Item = &'a Path>,
) -> Vec<DirectoryEntry> {
    let incomplete: HashSet<&Path> = failed.into_iter().filter_map(Path::parent).collect();
    if incomplete.is_empty() {
        return entries;
    }

    entries
        .into_iter()
        .filter(|entry| {
            if incomplete.contains(entry.path.as_path()) {
                log::debug!(
                    "Excluding {} from directory comparison: a direct file failed to hash",
                    entry.path.display()
                );
                false
            } else {
                true
            }
        })
        .collect()
}

/// Partition directories by fingerprint multiset, keeping partitions of 2+.
///
/// Ids start at 1 and follow the first member of each partition in input
/// order.
#[must_use]
pub fn group_directories(entries: Vec<DirectoryEntry>) -> Vec<DuplicateDirectoryGroup> {
    let mut index: HashMap<Vec<Hash>, usize> = HashMap::new();
    let mut partitions: Vec<Vec<DirectoryEntry>> = Vec::new();

    for entry in entries {
        match index.get(&entry.fingerprints) {
            Some(&i) => partitions[i].push(entry),
            None => {
                index.insert(entry.fingerprints.clone(), partitions.len());
                partitions.push(vec![entry]);
            }
        }
    }

    let groups: Vec<DuplicateDirectoryGroup> = partitions
        .into_iter()
        .filter(|members| members.len() > 1)
        .enumerate()
        .map(|(i, directories)| DuplicateDirectoryGroup {
            id: i + 1,
            file_count: directories[0].file_count(),
            directories,
        })
        .collect();

    log::info!("Directory comparison complete: {} duplicate groups", groups.len());
    groups
}
