//! Structured error handling and exit codes.

use serde::Serialize;

use crate::config::ConfigError;
use crate::duplicates::FinderError;

/// Exit codes for the dupescan binary.
///
/// - 0: Success (including a scan that found no duplicates)
/// - 1: General error (unexpected failure)
/// - 2: Invalid input (bad root path, argument or configuration)
/// - 3: Validation failed (at least one file did not parse)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the command completed.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// Invalid input: a path, argument or config value was rejected.
    InvalidInput = 2,
    /// Validation failed: some files could not be parsed.
    ValidationFailed = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DS000",
            Self::GeneralError => "DS001",
            Self::InvalidInput => "DS002",
            Self::ValidationFailed => "DS003",
        }
    }

    /// Exit code for an error that reached the top of the application.
    #[must_use]
    pub fn from_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(finder) = cause.downcast_ref::<FinderError>() {
                return match finder {
                    FinderError::InvalidPath { .. } | FinderError::InvalidArgument(_) => {
                        Self::InvalidInput
                    }
                    FinderError::Executor(_) => Self::GeneralError,
                };
            }
            if cause.downcast_ref::<ConfigError>().is_some() {
                return Self::InvalidInput;
            }
        }
        Self::GeneralError
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DS002")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
        }
    }
}
