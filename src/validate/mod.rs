//! File integrity validation.
//!
//! Each supported format has a [`FileValidator`] that tries to parse a file
//! completely and reports success or failure. [`validator_for`] is the single
//! place where a file's extension picks the validator, and [`validate_file`]
//! wraps the whole thing so that no parse failure escapes as an error.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::validate::{validate_file, ValidationStatus};
//! use std::path::Path;
//!
//! let outcome = validate_file(Path::new("occurrences.csv"));
//! if let ValidationStatus::Invalid(reason) = &outcome.status {
//!     eprintln!("{}: {}", outcome.path.display(), reason);
//! }
//! ```

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::scanner::paths;

/// Errors reported by a validator.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The file could not be read.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file was read but did not parse as its format.
    #[error("Invalid {format} file {path}: {message}")]
    Parse {
        /// Path to the file
        path: PathBuf,
        /// Format name
        format: &'static str,
        /// Parser message
        message: String,
    },
}

impl ValidationError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn parse(path: &Path, format: &'static str, message: impl ToString) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            format,
            message: message.to_string(),
        }
    }
}

/// A parser-backed integrity check for one file format.
pub trait FileValidator: Send + Sync {
    /// Short format name, e.g. `"json"`.
    fn format(&self) -> &'static str;

    /// Lower-cased extensions this validator handles.
    fn extensions(&self) -> &'static [&'static str];

    /// Parse `path` fully.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the file cannot be read or parsed.
    fn validate(&self, path: &Path) -> Result<(), ValidationError>;
}

/// JSON documents.
#[derive(Debug, Default)]
pub struct JsonValidator;

impl FileValidator for JsonValidator {
    fn format(&self) -> &'static str {
        "json"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn validate(&self, path: &Path) -> Result<(), ValidationError> {
        let file = File::open(path).map_err(|e| ValidationError::io(path, e))?;
        serde_json::from_reader::<_, serde_json::Value>(BufReader::new(file))
            .map(|_| ())
            .map_err(|e| ValidationError::parse(path, self.format(), e))
    }
}

/// TOML documents.
#[derive(Debug, Default)]
pub struct TomlValidator;

impl FileValidator for TomlValidator {
    fn format(&self) -> &'static str {
        "toml"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["toml"]
    }

    fn validate(&self, path: &Path) -> Result<(), ValidationError> {
        let content = fs::read_to_string(path).map_err(|e| ValidationError::io(path, e))?;
        content
            .parse::<toml::Table>()
            .map(|_| ())
            .map_err(|e| ValidationError::parse(path, self.format(), e.message()))
    }
}

/// Delimited text tables. Every record must have as many fields as the
/// header.
#[derive(Debug, Default)]
pub struct CsvValidator;

impl FileValidator for CsvValidator {
    fn format(&self) -> &'static str {
        "csv"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["csv", "tsv"]
    }

    fn validate(&self, path: &Path) -> Result<(), ValidationError> {
        let delimiter = if paths::extension_of(path) == "tsv" {
            b'\t'
        } else {
            b','
        };
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .from_path(path)
            .map_err(|e| match e.into_kind() {
                csv::ErrorKind::Io(io) => ValidationError::io(path, io),
                other => ValidationError::parse(path, self.format(), format!("{other:?}")),
            })?;

        reader
            .headers()
            .map_err(|e| ValidationError::parse(path, self.format(), e))?;
        for record in reader.records() {
            record.map_err(|e| ValidationError::parse(path, self.format(), e))?;
        }
        Ok(())
    }
}

/// Raster images, including TIFF. The whole image is decoded.
#[derive(Debug, Default)]
pub struct ImageValidator;

impl FileValidator for ImageValidator {
    fn format(&self) -> &'static str {
        "image"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["tif", "tiff", "png", "gif", "bmp", "webp"]
    }

    fn validate(&self, path: &Path) -> Result<(), ValidationError> {
        match image::open(path) {
            Ok(_) => Ok(()),
            Err(image::ImageError::IoError(e)) => Err(ValidationError::io(path, e)),
            Err(e) => Err(ValidationError::parse(path, self.format(), e)),
        }
    }
}

static VALIDATORS: [&dyn FileValidator; 4] =
    [&JsonValidator, &TomlValidator, &CsvValidator, &ImageValidator];

/// Every built-in validator.
#[must_use]
pub fn validators() -> &'static [&'static dyn FileValidator] {
    &VALIDATORS
}

/// Pick the validator for `path` by its lower-cased extension.
#[must_use]
pub fn validator_for(path: &Path) -> Option<&'static dyn FileValidator> {
    let extension = paths::extension_of(path);
    VALIDATORS
        .iter()
        .copied()
        .find(|v| v.extensions().contains(&extension.as_str()))
}

/// Result of checking one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ValidationStatus {
    /// The file parsed.
    Valid,
    /// The file could not be read or parsed.
    Invalid(String),
    /// No validator handles this extension.
    Unsupported,
}

/// Outcome of [`validate_file`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    /// Checked path
    pub path: PathBuf,
    /// Format of the validator used, if any
    pub format: Option<&'static str>,
    /// What happened
    #[serde(flatten)]
    pub status: ValidationStatus,
}

impl ValidationOutcome {
    /// Whether the file was found invalid.
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        matches!(self.status, ValidationStatus::Invalid(_))
    }
}

/// Validate one file, capturing every failure in the outcome.
#[must_use]
pub fn validate_file(path: &Path) -> ValidationOutcome {
    let Some(validator) = validator_for(path) else {
        log::debug!("No validator for {}", path.display());
        return ValidationOutcome {
            path: path.to_path_buf(),
            format: None,
            status: ValidationStatus::Unsupported,
        };
    };

    let status = match validator.validate(path) {
        Ok(()) => {
            log::debug!("Valid {} file: {}", validator.format(), path.display());
            ValidationStatus::Valid
        }
        Err(e) => {
            log::warn!("{}", e);
            ValidationStatus::Invalid(e.to_string())
        }
    };

    ValidationOutcome {
        path: path.to_path_buf(),
        format: Some(validator.format()),
        status,
    }
}
