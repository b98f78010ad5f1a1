//! dupescan - content-based duplicate file and directory finder
//!
//! Files are grouped by the BLAKE3 hash of their full content. Directories
//! are grouped when the multiset of hashes of the files they contain
//! directly is identical. Hashing can be spread over a bounded worker pool;
//! the result does not depend on the number of workers.
//!
//! # Library use
//!
//! ```no_run
//! use dupescan::duplicates::find_duplicates;
//! use std::path::Path;
//!
//! let report = find_duplicates(Path::new("/data"), 1.0, Some(vec!["tif".into()]), 4, false)?;
//! for row in report.duplicated_files.iter().flatten() {
//!     println!("group {}: {} copies", row.group_id, row.count);
//! }
//! # Ok::<(), dupescan::duplicates::FinderError>(())
//! ```

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod executor;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod validate;

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use anyhow::Context;

use crate::cli::{Cli, Commands, OutputFormat, ScanArgs, ValidateArgs};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::error::ExitCode;
use crate::output::{CsvOutput, DuplicateReport, JsonOutput, SummaryOutput};
use crate::progress::Progress;
use crate::validate::{validate_file, ValidationStatus};

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Returns an error for invalid configuration, an invalid scan root or
/// argument, or a failure writing output. Use [`ExitCode::from_error`] to
/// map it to a process exit code.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet, cli.no_color);
    if cli.no_color {
        yansi::disable();
    }

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    log::debug!("Effective config: {:?}", config);

    let colored = !cli.no_color && io::stdout().is_terminal();

    match cli.command {
        Commands::Scan(args) => handle_scan(args, &config, cli.quiet, colored),
        Commands::Validate(args) => handle_validate(&args, colored),
    }
}

/// Merge CLI flags over the loaded configuration.
#[must_use]
pub fn finder_config(args: &ScanArgs, config: &Config) -> FinderConfig {
    let extensions = if args.extensions.is_empty() {
        config.extensions.clone()
    } else {
        args.extensions.clone()
    };

    FinderConfig::default()
        .with_size_threshold_mb(args.size_threshold.unwrap_or(config.size_threshold_mb))
        .with_extensions(extensions)
        .with_workers(args.workers.unwrap_or(config.workers))
        .with_include_empty(resolve_flag(
            args.include_empty,
            args.no_include_empty,
            config.include_empty,
        ))
        .with_follow_symlinks(resolve_flag(
            args.follow_symlinks,
            args.no_follow_symlinks,
            config.follow_symlinks,
        ))
        .with_skip_hidden(resolve_flag(
            args.skip_hidden,
            args.no_skip_hidden,
            config.skip_hidden,
        ))
        .with_mmap(resolve_flag(args.mmap, args.no_mmap, config.use_mmap))
}

/// A `--flag` / `--no-flag` pair wins over the configured value.
fn resolve_flag(on: bool, off: bool, configured: bool) -> bool {
    match (on, off) {
        (true, _) => true,
        (_, true) => false,
        _ => configured,
    }
}

fn handle_scan(
    args: ScanArgs,
    config: &Config,
    quiet: bool,
    colored: bool,
) -> anyhow::Result<ExitCode> {
    let mut finder_config = finder_config(&args, config);

    let show_progress = !quiet
        && !args.no_progress
        && args.output == OutputFormat::Table
        && io::stderr().is_terminal();
    if show_progress {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    let scan = DuplicateFinder::new(finder_config)
        .find_duplicates(&args.path)
        .with_context(|| format!("Scan of {} failed", args.path.display()))?;
    let report = DuplicateReport::from_scan(&scan);

    if !report.has_findings() {
        log::info!("No duplicates found");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Table => {
            write!(out, "{}", SummaryOutput::new(&report, &scan.summary).render(colored))
                .context("Failed to write summary")?;
        }
        OutputFormat::Json => {
            JsonOutput::new(&report, &scan.summary)
                .write_to(&mut out, true)
                .context("Failed to write JSON output")?;
        }
        OutputFormat::Csv => {
            CsvOutput::new(&report, args.table.into())
                .write_to(&mut out)
                .context("Failed to write CSV output")?;
        }
    }
    out.flush().context("Failed to flush output")?;

    if args.summary && args.output != OutputFormat::Table {
        eprint!(
            "{}",
            SummaryOutput::new(&report, &scan.summary).render(colored && io::stderr().is_terminal())
        );
    }

    Ok(ExitCode::Success)
}

fn handle_validate(args: &ValidateArgs, colored: bool) -> anyhow::Result<ExitCode> {
    use yansi::{Condition, Paint};

    let outcomes: Vec<_> = args.paths.iter().map(|p| validate_file(p)).collect();
    let invalid = outcomes.iter().filter(|o| o.is_invalid()).count();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &outcomes)
                .context("Failed to write JSON output")?;
            writeln!(out).context("Failed to write JSON output")?;
        }
        OutputFormat::Table | OutputFormat::Csv => {
            let cond = if colored {
                Condition::ALWAYS
            } else {
                Condition::NEVER
            };
            for outcome in &outcomes {
                let format = outcome.format.unwrap_or("-");
                let line = match &outcome.status {
                    ValidationStatus::Valid => format!(
                        "{}  {:<5} {}",
                        "ok  ".green().whenever(cond),
                        format,
                        outcome.path.display()
                    ),
                    ValidationStatus::Invalid(reason) => format!(
                        "{}  {:<5} {}",
                        "FAIL".red().bold().whenever(cond),
                        format,
                        reason
                    ),
                    ValidationStatus::Unsupported => format!(
                        "{}  {:<5} {} (unsupported extension)",
                        "skip".dim().whenever(cond),
                        format,
                        outcome.path.display()
                    ),
                };
                writeln!(out, "{line}").context("Failed to write output")?;
            }
        }
    }

    if invalid > 0 {
        log::warn!("{} of {} files failed validation", invalid, outcomes.len());
        Ok(ExitCode::ValidationFailed)
    } else {
        Ok(ExitCode::Success)
    }
}
