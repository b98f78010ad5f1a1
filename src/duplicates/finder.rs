//! Duplicate finder pipeline.
//!
//! # Overview
//!
//! [`DuplicateFinder`] runs one complete scan:
//!
//! 1. **Validate** - arguments first, then the root path
//! 2. **Walk** - collect candidate files (filters applied here)
//! 3. **Hash** - fingerprint every candidate through an [`Executor`]
//! 4. **Group** - partition files by fingerprint
//! 5. **Compare directories** - partition directories by fingerprint multiset
//!
//! Hashing is the only parallel phase. Grouping starts only after every
//! fingerprint is known.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let config = FinderConfig::default()
//!     .with_workers(4)
//!     .with_extensions(vec!["csv".to_string()]);
//! let finder = DuplicateFinder::new(config);
//!
//! let report = finder.find_duplicates(Path::new("/data")).unwrap();
//! println!("Found {} duplicate groups", report.summary.duplicate_groups);
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::directories::{
    collect_directories, exclude_incomplete, group_directories, DuplicateDirectoryGroup,
};
use super::groups::{group_by_fingerprint, DuplicateFileGroup, HashedFile};
use crate::executor::{executor_for, Executor, ExecutorError};
use crate::output::{DuplicateReport, SummaryOutput};
use crate::progress::ProgressCallback;
use crate::scanner::{paths, FileEntry, Hasher, ScanError, Walker, WalkerConfig, BYTES_PER_MB};

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Minimum file size in megabytes; smaller files are never hashed.
    pub size_threshold_mb: f64,
    /// Extension allow-list; empty accepts every file.
    pub extensions: Vec<String>,
    /// Number of hashing workers (at least 1).
    pub workers: usize,
    /// Print a human-readable summary once a scan completes.
    pub verbose: bool,
    /// Include zero-byte files.
    pub include_empty: bool,
    /// Follow symbolic links while walking.
    pub follow_symlinks: bool,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
    /// Hash large files through a memory map.
    pub use_mmap: bool,
    /// Executor to use instead of one built from `workers`.
    pub executor: Option<Arc<dyn Executor>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("size_threshold_mb", &self.size_threshold_mb)
            .field("extensions", &self.extensions)
            .field("workers", &self.workers)
            .field("verbose", &self.verbose)
            .field("include_empty", &self.include_empty)
            .field("follow_symlinks", &self.follow_symlinks)
            .field("skip_hidden", &self.skip_hidden)
            .field("use_mmap", &self.use_mmap)
            .field("executor", &self.executor.as_ref().map(|e| e.workers()))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            size_threshold_mb: 0.0,
            extensions: Vec::new(),
            workers: 1,
            verbose: false,
            include_empty: false,
            follow_symlinks: false,
            skip_hidden: false,
            use_mmap: false,
            executor: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the minimum file size in megabytes.
    #[must_use]
    pub fn with_size_threshold_mb(mut self, mb: f64) -> Self {
        self.size_threshold_mb = mb;
        self
    }

    /// Set the extension allow-list.
    #[must_use]
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Set the number of hashing workers.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Request human-readable summaries.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Include zero-byte files.
    #[must_use]
    pub fn with_include_empty(mut self, include: bool) -> Self {
        self.include_empty = include;
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

    /// Hash large files through a memory map.
    #[must_use]
    pub fn with_mmap(mut self, enabled: bool) -> Self {
        self.use_mmap = enabled;
        self
    }

    /// Use the given executor for hashing.
    #[must_use]
    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check every argument without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::InvalidArgument`] for a zero worker count, a
    /// negative or non-finite size threshold, or a malformed extension.
    pub fn validate(&self) -> Result<(), FinderError> {
        if self.workers == 0 {
            return Err(FinderError::InvalidArgument(
                "worker count must be a positive integer".to_string(),
            ));
        }
        if !self.size_threshold_mb.is_finite() || self.size_threshold_mb < 0.0 {
            return Err(FinderError::InvalidArgument(format!(
                "size threshold must be a non-negative number of megabytes, got {}",
                self.size_threshold_mb
            )));
        }
        for ext in &self.extensions {
            paths::validate_extension(ext).map_err(FinderError::InvalidArgument)?;
        }
        Ok(())
    }

    /// Size threshold in bytes, rounded up; `None` when there is no minimum.
    #[must_use]
    pub fn min_size_bytes(&self) -> Option<u64> {
        if self.size_threshold_mb > 0.0 {
            Some((self.size_threshold_mb * BYTES_PER_MB as f64).ceil() as u64)
        } else {
            None
        }
    }

    /// Walker configuration derived from these settings.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::default()
            .with_extensions(self.extensions.clone())
            .with_min_size(self.min_size_bytes())
            .with_include_empty(self.include_empty)
            .with_follow_symlinks(self.follow_symlinks)
            .with_skip_hidden(self.skip_hidden)
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Number of candidate files found by the walker
    pub total_files: usize,
    /// Total size of the candidate files in bytes
    pub total_size: u64,
    /// Number of files fingerprinted successfully
    pub hashed_files: usize,
    /// Number of confirmed duplicate file groups
    pub duplicate_groups: usize,
    /// Files in duplicate groups beyond the first of each group
    pub duplicate_files: usize,
    /// Space that removing the extra copies would free
    pub reclaimable_space: u64,
    /// Number of directories holding at least one fingerprinted file
    pub directories_compared: usize,
    /// Directories left out of comparison because a direct file failed to hash
    pub incomplete_directories: usize,
    /// Number of duplicate directory groups
    pub duplicate_directory_groups: usize,
    /// Duration of the walking phase
    pub walk_duration: Duration,
    /// Duration of the hashing phase
    pub hash_duration: Duration,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Entries skipped because they could not be read or hashed
    pub warnings: Vec<ScanError>,
}

impl ScanSummary {
    /// Number of entries the walker could not read.
    #[must_use]
    pub fn unreadable_entries(&self) -> usize {
        self.warnings.iter().filter(|w| !w.is_hash_failure()).count()
    }

    /// Number of files that could not be hashed.
    #[must_use]
    pub fn hash_failures(&self) -> usize {
        self.warnings.iter().filter(|w| w.is_hash_failure()).count()
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        format_size(self.reclaimable_space)
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        format_size(self.total_size)
    }
}

/// Format a byte size as a human-readable string.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Everything one scan produced.
#[derive(Debug)]
pub struct ScanReport {
    /// Canonical root that was scanned
    pub root: PathBuf,
    /// Duplicate file groups, ids 1..
    pub file_groups: Vec<DuplicateFileGroup>,
    /// Duplicate directory groups, ids 1..
    pub directory_groups: Vec<DuplicateDirectoryGroup>,
    /// Scan statistics and warnings
    pub summary: ScanSummary,
}

impl ScanReport {
    /// Whether any duplicate files or directories were found.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.file_groups.is_empty() || !self.directory_groups.is_empty()
    }
}

/// Errors that abort a scan.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The root path is missing, not a directory, or inaccessible.
    #[error("Invalid path {}: {reason}", .path.display())]
    InvalidPath {
        /// The offending path
        path: PathBuf,
        /// What is wrong with it
        reason: String,
    },

    /// An argument was rejected before any filesystem access.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The hashing executor could not be set up.
    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

/// Duplicate finder that runs the detection pipeline.
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let hasher = Hasher::new().with_mmap(config.use_mmap);
        Self { config, hasher }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The configuration this finder runs with.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find duplicate files and directories under `path`.
    ///
    /// Unreadable entries and files that fail to hash are skipped and
    /// recorded in [`ScanSummary::warnings`]; they never abort the scan.
    /// With [`FinderConfig::verbose`] set, a summary is printed to stdout.
    ///
    /// # Errors
    ///
    /// - [`FinderError::InvalidArgument`] if the configuration is invalid
    /// - [`FinderError::InvalidPath`] if `path` is not an accessible directory
    /// - [`FinderError::Executor`] if the hashing pool cannot be created
    pub fn find_duplicates(&self, path: &Path) -> Result<ScanReport, FinderError> {
        self.find_duplicates_reporting(path, &mut io::stdout())
    }

    /// Like [`find_duplicates`](Self::find_duplicates), but the verbose
    /// summary goes to `out`.
    ///
    /// # Errors
    ///
    /// Same as [`find_duplicates`](Self::find_duplicates). Failing to write
    /// the summary is logged and does not fail the scan.
    pub fn find_duplicates_reporting<W: Write>(
        &self,
        path: &Path,
        out: &mut W,
    ) -> Result<ScanReport, FinderError> {
        let scan = self.scan(path)?;

        if self.config.verbose {
            let report = DuplicateReport::from_scan(&scan);
            let text = SummaryOutput::new(&report, &scan.summary).render(false);
            if let Err(e) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
                log::warn!("Failed to write scan summary: {}", e);
            }
        }

        Ok(scan)
    }

    fn scan(&self, path: &Path) -> Result<ScanReport, FinderError> {
        let start_time = Instant::now();

        self.config.validate()?;
        let root = resolve_root(path)?;
        let executor = self.executor()?;

        log::info!(
            "Starting duplicate scan of {} with {} worker(s)",
            root.display(),
            executor.workers()
        );

        let mut summary = ScanSummary::default();

        // Walk
        let walk_start = Instant::now();
        let files = self.walk(&root, &mut summary);
        summary.walk_duration = walk_start.elapsed();
        summary.total_files = files.len();
        summary.total_size = files.iter().map(|f| f.size).sum();

        log::info!(
            "Found {} candidate files ({})",
            summary.total_files,
            summary.total_size_display()
        );

        // Hash
        let hash_start = Instant::now();
        let hashed = self.hash_all(files, executor.as_ref(), &mut summary);
        summary.hash_duration = hash_start.elapsed();
        summary.hashed_files = hashed.len();

        // Group
        let (file_groups, stats) = group_by_fingerprint(&hashed);
        let collected = collect_directories(&hashed, &root);
        let candidates = collected.len();
        let failed = summary
            .warnings
            .iter()
            .filter(|w| w.is_hash_failure())
            .map(ScanError::path);
        let directories = exclude_incomplete(collected, failed);
        summary.incomplete_directories = candidates - directories.len();
        summary.directories_compared = directories.len();
        let directory_groups = group_directories(directories);

        summary.duplicate_groups = stats.duplicate_groups;
        summary.duplicate_files = stats.duplicate_files;
        summary.reclaimable_space = stats.reclaimable_space;
        summary.duplicate_directory_groups = directory_groups.len();
        summary.scan_duration = start_time.elapsed();

        if !summary.warnings.is_empty() {
            log::warn!(
                "{} entries skipped ({} unreadable, {} failed to hash)",
                summary.warnings.len(),
                summary.unreadable_entries(),
                summary.hash_failures()
            );
        }

        log::info!(
            "Scan complete: {} file groups, {} directory groups, {} reclaimable",
            summary.duplicate_groups,
            summary.duplicate_directory_groups,
            summary.reclaimable_display()
        );

        Ok(ScanReport {
            root,
            file_groups,
            directory_groups,
            summary,
        })
    }

    fn executor(&self) -> Result<Arc<dyn Executor>, FinderError> {
        match self.config.executor {
            Some(ref executor) => Ok(Arc::clone(executor)),
            None => Ok(Arc::from(executor_for(self.config.workers)?)),
        }
    }

    fn walk(&self, root: &Path, summary: &mut ScanSummary) -> Vec<FileEntry> {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("walking", 0);
        }

        let mut walker = Walker::new(root, self.config.walker_config());
        if let Some(ref callback) = self.config.progress_callback {
            walker = walker.with_progress_callback(Arc::clone(callback));
        }

        let mut files = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(file) => files.push(file),
                Err(e) => summary.warnings.push(e),
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("walking");
        }

        files
    }

    fn hash_all(
        &self,
        files: Vec<FileEntry>,
        executor: &dyn Executor,
        summary: &mut ScanSummary,
    ) -> Vec<HashedFile> {
        if files.is_empty() {
            log::debug!("No files to hash");
            return Vec::new();
        }

        let callback = self.config.progress_callback.as_deref();
        if let Some(callback) = callback {
            callback.on_phase_start("hashing", files.len());
        }

        log::info!("Hashing {} files", files.len());

        let done = AtomicUsize::new(0);
        let hasher = &self.hasher;
        let work = |file: &FileEntry| {
            let result = hasher.full_hash(&file.path);
            let n = done.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(callback) = callback {
                callback.on_progress(n, file.path.to_string_lossy().as_ref());
                callback.on_item_completed(file.size);
            }
            result
        };

        let outcomes = executor.run(files, &work);

        // Single aggregation step after the barrier
        let mut hashed = Vec::with_capacity(outcomes.len());
        for (file, result) in outcomes {
            match result {
                Ok(hash) => {
                    log::trace!("Hashed {}", file.path.display());
                    hashed.push(HashedFile::new(file, hash));
                }
                Err(e) => {
                    log::warn!("Excluding file that could not be hashed: {}", e);
                    summary.warnings.push(ScanError::from(e));
                }
            }
        }

        if let Some(callback) = callback {
            callback.on_phase_end("hashing");
        }

        hashed
    }
}

/// Canonicalize the scan root and check that it is a directory.
fn resolve_root(path: &Path) -> Result<PathBuf, FinderError> {
    let root = std::fs::canonicalize(path).map_err(|e| FinderError::InvalidPath {
        path: path.to_path_buf(),
        reason: match e.kind() {
            std::io::ErrorKind::NotFound => "path does not exist".to_string(),
            std::io::ErrorKind::PermissionDenied => "permission denied".to_string(),
            _ => e.to_string(),
        },
    })?;

    if !root.is_dir() {
        return Err(FinderError::InvalidPath {
            path: path.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    Ok(root)
}

/// Scan `path` and return the duplicated-files and duplicated-directories
/// tables.
///
/// This is the one-call form of [`DuplicateFinder::find_duplicates`]:
/// `size_threshold_mb` is the minimum size in megabytes (files below it are
/// not hashed), `extensions` is an optional allow-list, `n_workers` the
/// hashing parallelism. With `verbose` set, a short summary of each table is
/// printed to stdout.
///
/// Both tables are `None` when nothing was found; see
/// [`DuplicateReport::has_findings`].
///
/// # Errors
///
/// Returns [`FinderError`] for invalid arguments or an invalid root path.
///
/// # Example
///
/// ```no_run
/// use dupescan::duplicates::find_duplicates;
/// use std::path::Path;
///
/// let report = find_duplicates(Path::new("/data"), 0.0, None, 2, false).unwrap();
/// if !report.has_findings() {
///     println!("No duplicates found");
/// }
/// ```
pub fn find_duplicates(
    path: &Path,
    size_threshold_mb: f64,
    extensions: Option<Vec<String>>,
    n_workers: usize,
    verbose: bool,
) -> Result<DuplicateReport, FinderError> {
    let config = FinderConfig::default()
        .with_size_threshold_mb(size_threshold_mb)
        .with_extensions(extensions.unwrap_or_default())
        .with_workers(n_workers)
        .with_verbose(verbose);

    let scan = DuplicateFinder::new(config).find_duplicates(path)?;
    Ok(DuplicateReport::from_scan(&scan))
}
