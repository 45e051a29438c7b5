//! Tests for CLI argument parsing functionality
//!
//! These tests verify that command line arguments are parsed and merged into
//! the stage configuration, including the scripted-run and Hall of Howls options.

use clap::Parser;
use soapbox_stage::types::config::{CliArgs, StageConfig};
use soapbox_stage::types::RantSort;

/// Defaults when no arguments are given
#[test]
fn test_default_arguments() {
    let args = CliArgs::try_parse_from(["soapbox"]).unwrap();

    assert_eq!(args.duration_secs, 120);
    assert_eq!(args.sort, RantSort::Recent);
    assert!(args.speak_at.is_none());
    assert!(!args.hall);
    assert!(!args.realtime);
    assert!(!args.seen_example);
}

/// Scripted run arguments
#[test]
fn test_scripted_run_arguments() {
    let args = CliArgs::try_parse_from([
        "soapbox",
        "--nickname",
        "RantMaster",
        "--speak-at",
        "50",
        "--rant-text",
        "Return your carts!",
        "--duration-secs",
        "200",
        "--seed",
        "42",
    ])
    .unwrap();

    assert_eq!(args.nickname.as_deref(), Some("RantMaster"));
    assert_eq!(args.speak_at, Some(50));
    assert_eq!(args.rant_text.as_deref(), Some("Return your carts!"));
    assert_eq!(args.duration_secs, 200);

    let config = StageConfig::from_cli_args(args).unwrap();
    assert_eq!(config.seed, Some(42));
    assert!(config.validate().is_ok());
}

/// Hall of Howls arguments
#[test]
fn test_hall_arguments() {
    let args =
        CliArgs::try_parse_from(["soapbox", "--hall", "--search", "pizza", "--sort", "controversial"]).unwrap();

    assert!(args.hall);
    assert_eq!(args.search.as_deref(), Some("pizza"));
    assert_eq!(args.sort, RantSort::Controversial);
}

/// Unknown sort orders are rejected at parse time
#[test]
fn test_invalid_sort_rejected() {
    assert!(CliArgs::try_parse_from(["soapbox", "--hall", "--sort", "loudest"]).is_err());
}

/// Non-numeric durations are rejected
#[test]
fn test_invalid_number_rejected() {
    assert!(CliArgs::try_parse_from(["soapbox", "--speak-at", "soon"]).is_err());
}

/// CLI overrides win over the config file
#[test]
fn test_cli_overrides_config_file() {
    use std::io::Write;

    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    writeln!(file, r#"{{"rant_duration_secs": 30, "demo_duration_secs": 20, "seed": 1}}"#).unwrap();
    let path = file.path().to_string_lossy().to_string();

    let args = CliArgs::try_parse_from(["soapbox", "--config", path.as_str(), "--rant-duration-secs", "90"]).unwrap();
    let config = StageConfig::from_cli_args(args).unwrap();

    assert_eq!(config.rant_duration_secs, 90);
    assert_eq!(config.demo_duration_secs, 20);
    assert_eq!(config.seed, Some(1));
}

/// Missing config file is a load error
#[test]
fn test_missing_config_file() {
    let args = CliArgs::try_parse_from(["soapbox", "--config", "/no/such/stage.json"]).unwrap();
    assert!(StageConfig::from_cli_args(args).is_err());
}

/// Logging flags
#[test]
fn test_logging_flags() {
    let args = CliArgs::try_parse_from(["soapbox", "-v", "--json-logs", "--log-dir", "logs"]).unwrap();
    assert!(args.verbose);
    assert!(!args.debug);
    assert!(args.json_logs);
    assert_eq!(args.log_dir.as_deref(), Some("logs"));

    let args = CliArgs::try_parse_from(["soapbox", "--debug", "--dry-run"]).unwrap();
    assert!(args.debug);
    assert!(args.dry_run);
}
