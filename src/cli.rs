//! Command-line interface definitions for dupescan.
//!
//! Global options (verbosity, colour, error format, config file) come first,
//! followed by a subcommand.
//!
//! # Example
//!
//! ```bash
//! # Find duplicates, print a summary table
//! dupescan scan ~/data
//!
//! # Only CSV and TIFF files of at least 5 MB, hashed by 4 workers, as JSON
//! dupescan scan ~/data --ext csv,tif --size-threshold 5 --workers 4 --output json
//!
//! # Duplicated directories as CSV
//! dupescan scan ~/data --output csv --table directories
//!
//! # Check that files parse
//! dupescan validate results.json layers/*.tif
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::output::CsvTable;
use crate::scanner::paths;

/// Content-based duplicate file and directory finder.
///
/// Files are compared by BLAKE3 hash of their full content; directories are
/// compared by the multiset of hashes of the files they contain directly.
#[derive(Debug, Parser)]
#[command(name = "dupescan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file (TOML); defaults to the platform config directory
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory for duplicate files and directories
    Scan(ScanArgs),
    /// Check that files parse as their format (JSON, TOML, CSV, images)
    Validate(ValidateArgs),
}

/// Arguments for the scan subcommand.
///
/// Options left unset fall back to the config file and environment.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory to scan
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Minimum file size in megabytes (1 MB = 1024 * 1024 bytes)
    ///
    /// Smaller files are neither hashed nor counted for directory comparison.
    #[arg(short = 's', long, value_name = "MB", value_parser = parse_size_mb)]
    pub size_threshold: Option<f64>,

    /// Only consider files with these extensions (case-insensitive, no dot)
    ///
    /// Accepts a comma-separated list and can be repeated.
    #[arg(
        short,
        long = "ext",
        value_name = "EXT",
        value_delimiter = ',',
        value_parser = parse_extension
    )]
    pub extensions: Vec<String>,

    /// Number of hashing workers
    #[arg(short, long, value_name = "N", value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Table written by CSV output
    #[arg(long, value_enum, default_value = "files")]
    pub table: TableArg,

    /// Include zero-byte files
    #[arg(long, overrides_with = "no_include_empty")]
    pub include_empty: bool,

    /// Skip zero-byte files, even if the config file includes them
    #[arg(long, overrides_with = "include_empty")]
    pub no_include_empty: bool,

    /// Follow symbolic links during scan
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long, overrides_with = "no_follow_symlinks")]
    pub follow_symlinks: bool,

    /// Do not follow symbolic links, even if the config file does
    #[arg(long, overrides_with = "follow_symlinks")]
    pub no_follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long, overrides_with = "no_skip_hidden")]
    pub skip_hidden: bool,

    /// Scan hidden files and directories, even if the config file skips them
    #[arg(long, overrides_with = "skip_hidden")]
    pub no_skip_hidden: bool,

    /// Hash large files through a memory map
    #[arg(long, overrides_with = "no_mmap")]
    pub mmap: bool,

    /// Always hash by streaming reads, even if the config file enables mmap
    #[arg(long, overrides_with = "mmap")]
    pub no_mmap: bool,

    /// Print the human-readable summary even with JSON or CSV output
    #[arg(long)]
    pub summary: bool,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for the validate subcommand.
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Files to check
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Output format (table or json)
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Table,
    /// JSON for scripting
    Json,
    /// CSV for spreadsheets
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Which table CSV output writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableArg {
    /// Duplicated files
    Files,
    /// Duplicated directories
    Directories,
}

impl From<TableArg> for CsvTable {
    fn from(arg: TableArg) -> Self {
        match arg {
            TableArg::Files => CsvTable::Files,
            TableArg::Directories => CsvTable::Directories,
        }
    }
}

/// Parse a size threshold in megabytes.
///
/// # Examples
///
/// ```
/// use dupescan::cli::parse_size_mb;
///
/// assert_eq!(parse_size_mb("0").unwrap(), 0.0);
/// assert_eq!(parse_size_mb("2.5").unwrap(), 2.5);
/// assert!(parse_size_mb("-1").is_err());
/// ```
///
/// # Errors
///
/// Returns an error for empty, non-numeric, negative or non-finite input.
pub fn parse_size_mb(s: &str) -> Result<f64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size threshold cannot be empty".to_string());
    }
    let mb: f64 = s
        .parse()
        .map_err(|_| format!("Invalid number of megabytes: '{s}'"))?;
    if !mb.is_finite() {
        return Err(format!("Size threshold must be finite: '{s}'"));
    }
    if mb < 0.0 {
        return Err("Size threshold cannot be negative".to_string());
    }
    Ok(mb)
}

/// Parse a worker count; must be at least 1.
///
/// # Errors
///
/// Returns an error for non-numeric input or zero.
pub fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid worker count: '{s}'"))?;
    if n == 0 {
        return Err("Worker count must be a positive integer".to_string());
    }
    Ok(n)
}

/// Parse and normalize one extension filter value.
///
/// # Errors
///
/// Returns an error for empty values and values with separators or dots.
pub fn parse_extension(s: &str) -> Result<String, String> {
    paths::validate_extension(s)
}
