//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//! This module provides the [`Hasher`] struct for computing BLAKE3 hashes
//! of whole file contents. Files are read in fixed-size chunks so memory use
//! stays flat regardless of file size; large files can optionally be hashed
//! through a memory map instead. Both paths produce the same digest.
//!
//! Hashing always covers the full content. Two files that share a prefix but
//! differ anywhere later must never be reported as duplicates.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{hash_to_hex, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let hash = hasher.full_hash(Path::new("data.csv")).unwrap();
//! println!("{}", hash_to_hex(&hash));
//! ```

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use super::HashError;

/// A BLAKE3 digest (32 bytes).
pub type Hash = [u8; 32];

/// Read buffer size for streaming hashing.
pub const BUFFER_SIZE: usize = 64 * 1024;

/// Default size above which memory mapping is used, when enabled.
pub const DEFAULT_MMAP_THRESHOLD: u64 = 64 * 1024 * 1024;

/// Content hasher for files.
///
/// `Hasher` holds no per-file state, so one instance can be shared by all
/// workers of the parallel dispatcher.
#[derive(Debug, Clone)]
pub struct Hasher {
    use_mmap: bool,
    mmap_threshold: u64,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a streaming hasher with memory mapping disabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            use_mmap: false,
            mmap_threshold: DEFAULT_MMAP_THRESHOLD,
        }
    }

    /// Enable or disable memory-mapped hashing of large files.
    #[must_use]
    pub fn with_mmap(mut self, enabled: bool) -> Self {
        self.use_mmap = enabled;
        self
    }

    /// Set the file size at or above which memory mapping is used.
    #[must_use]
    pub fn with_mmap_threshold(mut self, threshold: u64) -> Self {
        self.mmap_threshold = threshold;
        self
    }

    /// Compute the BLAKE3 hash of the entire file content.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read to the end.
    pub fn full_hash(&self, path: &Path) -> Result<Hash, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;

        if self.use_mmap {
            let len = file
                .metadata()
                .map_err(|e| HashError::from_io(path, e))?
                .len();
            if len >= self.mmap_threshold && len > 0 {
                match self.mmap_hash(&file) {
                    Ok(hash) => return Ok(hash),
                    Err(e) => {
                        log::debug!(
                            "Memory map failed for {}, falling back to streaming: {}",
                            path.display(),
                            e
                        );
                    }
                }
            }
        }

        self.stream_hash(file, path)
    }

    fn stream_hash(&self, mut file: File, path: &Path) -> Result<Hash, HashError> {
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; BUFFER_SIZE];

        loop {
            match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    hasher.update(&buffer[..n]);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            }
        }

        Ok(*hasher.finalize().as_bytes())
    }

    fn mmap_hash(&self, file: &File) -> std::io::Result<Hash> {
        // SAFETY: the map is read-only and dropped before returning. A file
        // truncated concurrently by another process can still fault.
        let map = unsafe { memmap2::Mmap::map(file)? };
        let mut hasher = blake3::Hasher::new();
        hasher.update(&map);
        Ok(*hasher.finalize().as_bytes())
    }
}

/// Render a hash as lowercase hexadecimal (64 characters).
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    blake3::Hash::from(*hash).to_hex().to_string()
}

/// Parse a 64-character hexadecimal string back into a hash.
///
/// Returns `None` if the string is not valid hex of the right length.
#[must_use]
pub fn hex_to_hash(hex: &str) -> Option<Hash> {
    blake3::Hash::from_hex(hex).ok().map(|h| *h.as_bytes())
}
