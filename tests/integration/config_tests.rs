use clap::Parser;
use dupescan::cli::{Cli, Commands};
use dupescan::config::{Config, ConfigError};
use dupescan::finder_config;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_file_overrides_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        concat!(
            "workers = 4\n",
            "size_threshold_mb = 2.5\n",
            "extensions = [\"csv\", \"tif\"]\n",
            "skip_hidden = true\n",
        ),
    )
    .unwrap();

    let config = Config::load(Some(&path)).unwrap();

    assert_eq!(config.workers, 4);
    assert_eq!(config.size_threshold_mb, 2.5);
    assert_eq!(config.extensions, vec!["csv", "tif"]);
    assert!(config.skip_hidden);
    assert!(!config.include_empty);
}

#[test]
fn test_env_overrides_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "workers = 4\ninclude_empty = false\n").unwrap();

    // A prefix no other test touches
    std::env::set_var("DUPESCAN_ENVTEST_WORKERS", "6");
    std::env::set_var("DUPESCAN_ENVTEST_INCLUDE_EMPTY", "true");

    let config: Config = Config::figment(Some(&path), "DUPESCAN_ENVTEST_")
        .extract()
        .unwrap();

    std::env::remove_var("DUPESCAN_ENVTEST_WORKERS");
    std::env::remove_var("DUPESCAN_ENVTEST_INCLUDE_EMPTY");

    assert_eq!(config.workers, 6);
    assert!(config.include_empty);
}

#[test]
fn test_cli_overrides_config() {
    let config = Config {
        workers: 4,
        size_threshold_mb: 10.0,
        extensions: vec!["tif".to_string()],
        ..Config::default()
    };

    let cli = Cli::try_parse_from([
        "dupescan", "scan", "/data", "--workers", "2", "--ext", "csv",
    ])
    .unwrap();
    let Commands::Scan(args) = cli.command else {
        panic!("Expected Scan command");
    };

    let merged = finder_config(&args, &config);

    assert_eq!(merged.workers, 2);
    assert_eq!(merged.extensions, vec!["csv"]);
    // Not given on the command line, so the config value stays
    assert_eq!(merged.size_threshold_mb, 10.0);
}

#[test]
fn test_config_used_when_cli_silent() {
    let config = Config {
        workers: 3,
        extensions: vec!["qs2".to_string()],
        follow_symlinks: true,
        ..Config::default()
    };

    let cli = Cli::try_parse_from(["dupescan", "scan", "/data"]).unwrap();
    let Commands::Scan(args) = cli.command else {
        panic!("Expected Scan command");
    };

    let merged = finder_config(&args, &config);

    assert_eq!(merged.workers, 3);
    assert_eq!(merged.extensions, vec!["qs2"]);
    assert!(merged.follow_symlinks);
}

#[test]
fn test_negated_flags_switch_off_config() {
    let config = Config {
        include_empty: true,
        follow_symlinks: true,
        skip_hidden: true,
        use_mmap: true,
        ..Config::default()
    };

    let cli = Cli::try_parse_from([
        "dupescan",
        "scan",
        "/data",
        "--no-include-empty",
        "--no-follow-symlinks",
        "--no-skip-hidden",
        "--no-mmap",
    ])
    .unwrap();
    let Commands::Scan(args) = cli.command else {
        panic!("Expected Scan command");
    };

    let merged = finder_config(&args, &config);

    assert!(!merged.include_empty);
    assert!(!merged.follow_symlinks);
    assert!(!merged.skip_hidden);
    assert!(!merged.use_mmap);
}

#[test]
fn test_unknown_key_is_not_fatal() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "worker = 2\nskip_hidden = true\n").unwrap();

    let config = Config::load(Some(&path)).unwrap();

    assert_eq!(config.workers, 1);
    assert!(config.skip_hidden);
}

#[test]
fn test_malformed_file_is_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "workers = [unterminated\n").unwrap();

    let err = Config::load(Some(&path)).unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("config.toml"));
}

#[test]
fn test_wrong_type_is_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "workers = \"many\"\n").unwrap();

    let err = Config::load(Some(&path)).unwrap_err();

    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_missing_explicit_file() {
    let dir = tempdir().unwrap();

    let err = Config::load(Some(&dir.path().join("absent.toml"))).unwrap_err();

    assert!(matches!(err, ConfigError::NotFound(_)));
}
