//! Application configuration management.
//!
//! Settings are layered, later layers winning:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. A TOML file: `--config <FILE>`, or `config.toml` in the platform
//!    config directory
//! 3. Environment variables prefixed with `DUPESCAN_` (e.g. `DUPESCAN_WORKERS=4`,
//!    `DUPESCAN_EXTENSIONS=csv,tif`)
//! 4. Command-line flags, applied by the caller
//!
//! A missing default config file is not an error. A config file that does
//! not parse is.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "DUPESCAN_";

/// Keys accepted in the config file.
pub const KNOWN_KEYS: [&str; 7] = [
    "workers",
    "size_threshold_mb",
    "extensions",
    "include_empty",
    "follow_symlinks",
    "skip_hidden",
    "use_mmap",
];

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A config file given explicitly does not exist.
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The config file could not be read.
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        /// Config file path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML.
    #[error("Malformed config file {}: {message}", .path.display())]
    Parse {
        /// Config file path
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// A value has the wrong type.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

/// Scan defaults loaded from file and environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of hashing workers.
    pub workers: usize,
    /// Minimum file size in megabytes.
    pub size_threshold_mb: f64,
    /// Extension allow-list. Also accepts one comma-separated string.
    #[serde(deserialize_with = "list_or_comma_separated")]
    pub extensions: Vec<String>,
    /// Include zero-byte files.
    pub include_empty: bool,
    /// Follow symbolic links.
    pub follow_symlinks: bool,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
    /// Hash large files through a memory map.
    pub use_mmap: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: 1,
            size_threshold_mb: 0.0,
            extensions: Vec::new(),
            include_empty: false,
            follow_symlinks: false,
            skip_hidden: false,
            use_mmap: false,
        }
    }
}

impl Config {
    /// Load configuration from `path` (or the default location) and the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an explicit path is missing, the file
    /// cannot be read or parsed, or a value has the wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) if !p.exists() => return Err(ConfigError::NotFound(p.to_path_buf())),
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_path().filter(|p| p.exists()),
        };

        if let Some(ref file) = file {
            log::debug!("Loading config from {}", file.display());
            check_file(file)?;
        }

        Self::figment(file.as_deref(), ENV_PREFIX)
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// The layered figment for an optional file and an environment prefix.
    #[must_use]
    pub fn figment(file: Option<&Path>, env_prefix: &str) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(env_prefix))
    }

    /// Default platform-specific config file path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "dupescan", "dupescan")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// Accept either a list of strings or a single `"csv,tif"` string.
fn list_or_comma_separated<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrString {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match ListOrString::deserialize(deserializer)? {
        ListOrString::List(list) => list,
        ListOrString::Joined(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

/// Parse the file once to reject malformed TOML and warn about unknown keys.
fn check_file(path: &Path) -> Result<(), ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let table: toml::Table = content.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })?;

    for key in table.keys() {
        if KNOWN_KEYS.contains(&key.as_str()) {
            continue;
        }
        match suggest_key(key) {
            Some(known) => log::warn!(
                "Unknown config key '{}' in {} (did you mean '{}'?)",
                key,
                path.display(),
                known
            ),
            None => log::warn!("Unknown config key '{}' in {}", key, path.display()),
        }
    }
    Ok(())
}

/// Closest known key to `key`, if any is close enough.
#[must_use]
pub fn suggest_key(key: &str) -> Option<&'static str> {
    KNOWN_KEYS
        .iter()
        .map(|known| (*known, strsim::jaro_winkler(key, known)))
        .filter(|(_, score)| *score > 0.8)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(known, _)| known)
}
