//! Path helpers shared by the walker and the report assembler.
//!
//! Relative paths are normalized to NFC so that the same visual name yields
//! the same report text on every platform (macOS stores names as NFD).

use std::path::{Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

/// Lower-cased extension of `path` without the dot, or an empty string.
#[must_use]
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Normalize a user-supplied extension filter value.
///
/// Trims whitespace, lower-cases and removes one leading dot. Returns `None`
/// for values that are empty after trimming.
///
/// ```
/// use dupescan::scanner::paths::normalize_extension;
///
/// assert_eq!(normalize_extension(".TIF").as_deref(), Some("tif"));
/// assert_eq!(normalize_extension("  "), None);
/// ```
#[must_use]
pub fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('.').unwrap_or(trimmed);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Check that an extension filter value is well-formed.
///
/// # Errors
///
/// Returns a message naming the problem when the value is empty, contains a
/// path separator, or still contains a dot after the leading one is removed.
pub fn validate_extension(raw: &str) -> Result<String, String> {
    let normalized =
        normalize_extension(raw).ok_or_else(|| format!("Empty extension in filter: '{raw}'"))?;
    if normalized.contains(['/', '\\']) {
        return Err(format!("Extension must not contain a path separator: '{raw}'"));
    }
    if normalized.contains('.') {
        return Err(format!(
            "Extension must be a single component without dots: '{raw}'"
        ));
    }
    Ok(normalized)
}

/// Path of `path` relative to `root`, NFC-normalized.
///
/// Falls back to the full path when `path` is not below `root`.
#[must_use]
pub fn relative_to(path: &Path, root: &Path) -> PathBuf {
    let relative = path.strip_prefix(root).unwrap_or(path);
    normalize_nfc(relative)
}

/// NFC-normalize a path. Paths that are not valid UTF-8 are returned unchanged.
#[must_use]
pub fn normalize_nfc(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(s.nfc().collect::<String>()),
        None => path.to_path_buf(),
    }
}

/// Display form of a relative directory path; the root itself shows as `.`.
#[must_use]
pub fn display_relative(path: &Path) -> String {
    if path.as_os_str().is_empty() {
        ".".to_string()
    } else {
        path.to_string_lossy().into_owned()
    }
}
