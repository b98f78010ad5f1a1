//! Output formatters for duplicate scan results.
//!
//! This module provides:
//! - [`report`]: the duplicated-files and duplicated-directories tables
//! - [`json`]: JSON for automation and scripting
//! - [`csv`]: CSV for spreadsheet import, one table at a time
//! - [`summary`]: a coloured console summary
//!
//! # Example
//!
//! ```no_run
//! use dupescan::duplicates::DuplicateFinder;
//! use dupescan::output::{DuplicateReport, JsonOutput};
//! use std::path::Path;
//!
//! let scan = DuplicateFinder::with_defaults().find_duplicates(Path::new(".")).unwrap();
//! let report = DuplicateReport::from_scan(&scan);
//!
//! let output = JsonOutput::new(&report, &scan.summary);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod csv;
pub mod json;
pub mod report;
pub mod summary;

// Re-export main types
pub use csv::{CsvOutput, CsvTable};
pub use json::JsonOutput;
pub use report::{DuplicateReport, DuplicatedDirectoryRow, DuplicatedFileRow, MemberFile};
pub use summary::SummaryOutput;
