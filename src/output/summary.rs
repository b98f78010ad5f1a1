//! Human-readable console summary.
//!
//! Printed after a scan in table mode, and by
//! [`find_duplicates`](crate::duplicates::find_duplicates) when verbose
//! output is requested. Colours come from `yansi` and can be turned off per
//! render.

use std::fmt::Write as _;

use yansi::{Condition, Paint};

use super::report::DuplicateReport;
use crate::duplicates::{format_size, ScanSummary};

/// Console summary of a report.
pub struct SummaryOutput<'a> {
    report: &'a DuplicateReport,
    summary: &'a ScanSummary,
}

impl<'a> SummaryOutput<'a> {
    /// Create a summary for `report`.
    #[must_use]
    pub fn new(report: &'a DuplicateReport, summary: &'a ScanSummary) -> Self {
        Self { report, summary }
    }

    /// Render the summary, with ANSI colours when `colored` is set.
    #[must_use]
    pub fn render(&self, colored: bool) -> String {
        let cond = if colored {
            Condition::ALWAYS
        } else {
            Condition::NEVER
        };
        let mut out = String::new();

        let _ = writeln!(
            out,
            "{} {}",
            "Scanned".bold().whenever(cond),
            self.report.root.display()
        );
        let _ = writeln!(
            out,
            "  {} candidate files ({}), {} hashed",
            self.summary.total_files,
            self.summary.total_size_display(),
            self.summary.hashed_files
        );

        if !self.report.has_findings() {
            let _ = writeln!(out, "{}", "No duplicates found".green().whenever(cond));
            self.write_warnings(&mut out, cond);
            return out;
        }

        self.write_files(&mut out, cond);
        self.write_directories(&mut out, cond);
        self.write_warnings(&mut out, cond);
        out
    }

    fn write_files(&self, out: &mut String, cond: Condition) {
        let Some(rows) = self.report.duplicated_files.as_ref() else {
            let _ = writeln!(out, "Duplicated files: none");
            return;
        };

        let _ = writeln!(
            out,
            "{} {} groups, {} reclaimable",
            "Duplicated files:".yellow().bold().whenever(cond),
            rows.len(),
            self.summary.reclaimable_display()
        );
        for row in rows {
            let extensions = if row.extensions.iter().all(String::is_empty) {
                "-".to_string()
            } else {
                row.extensions.join(", ")
            };
            let _ = writeln!(
                out,
                "  [{}] {} files, {} each, {} ({})",
                row.group_id,
                row.count,
                format_size(row.size_bytes),
                extensions,
                (&row.fingerprint[..16]).dim().whenever(cond)
            );
            for member in &row.files {
                let _ = writeln!(out, "      {}", member.relative_path.display());
            }
        }
    }

    fn write_directories(&self, out: &mut String, cond: Condition) {
        let Some(rows) = self.report.duplicated_directories.as_ref() else {
            let _ = writeln!(out, "Duplicated directories: none");
            return;
        };

        let _ = writeln!(
            out,
            "{} {} groups",
            "Duplicated directories:".yellow().bold().whenever(cond),
            self.report.directory_group_count()
        );
        let mut current = None;
        for row in rows {
            if current != Some(row.group_id) {
                current = Some(row.group_id);
                let _ = writeln!(
                    out,
                    "  [{}] {} directories, {} files each",
                    row.group_id, row.group_size, row.file_count
                );
            }
            let _ = writeln!(out, "      {}", row.relative_path);
        }
    }

    fn write_warnings(&self, out: &mut String, cond: Condition) {
        let count = self.summary.warnings.len();
        if count > 0 {
            let _ = writeln!(
                out,
                "{} {} entries skipped ({} unreadable, {} failed to hash)",
                "Warning:".red().whenever(cond),
                count,
                self.summary.unreadable_entries(),
                self.summary.hash_failures()
            );
        }
        if self.summary.incomplete_directories > 0 {
            let _ = writeln!(
                out,
                "{} {} directories not compared (a file failed to hash)",
                "Warning:".red().whenever(cond),
                self.summary.incomplete_directories
            );
        }
    }
}
