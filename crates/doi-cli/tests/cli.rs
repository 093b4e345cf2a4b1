//! Integration tests for command-line parsing.

use clap::Parser;
use tracing::level_filters::LevelFilter;

use doi_cli::cli::{Cli, Command};
use doi_cli::logging::{DEFAULT_LOG_FILE, LogFormat};
use doi_core::DEFAULT_URL_FILTER_PREFIX;
use doi_model::Event;
use doi_registry::DEFAULT_API_URL;

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["doi-sync"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).expect("arguments parse")
}

#[test]
fn test_publish_defaults() {
    let cli = parse(&["publish", "sheet.csv", "--auth", "ANU.TEST:pw"]);
    let Command::Publish(args) = cli.command else {
        panic!("expected publish");
    };
    assert_eq!(args.file.to_str(), Some("sheet.csv"));
    assert_eq!(args.connection.api_url, DEFAULT_API_URL);
    assert_eq!(args.connection.timeout, 15);
    assert_eq!(args.event, Event::Draft);
    assert_eq!(args.url_filter_prefix, DEFAULT_URL_FILTER_PREFIX);
    assert!(!args.dry_run);
    assert!(!args.append_suffix_to_url);
    assert!(!args.no_backup);
    assert!(args.prefix.is_none());
}

#[test]
fn test_event_is_case_insensitive() {
    let cli = parse(&[
        "publish",
        "sheet.xlsx",
        "--auth",
        "ANU.TEST:pw",
        "--event",
        "PUBLISH",
        "--prefix",
        "10.5072",
    ]);
    let Command::Publish(args) = cli.command else {
        panic!("expected publish");
    };
    assert_eq!(args.event, Event::Publish);
    assert_eq!(args.prefix.as_deref(), Some("10.5072"));
}

#[test]
fn test_unknown_event_is_rejected() {
    let result = Cli::try_parse_from([
        "doi-sync",
        "publish",
        "sheet.csv",
        "--auth",
        "ANU.TEST:pw",
        "--event",
        "hide",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_auth_is_required() {
    let result = Cli::try_parse_from(["doi-sync", "prune-drafts", "--fetch"]);
    assert!(result.is_err());
}

#[test]
fn test_connection_overrides() {
    let cli = parse(&[
        "prune-drafts",
        "--auth",
        "ANU.PROD:pw",
        "--api-url",
        "https://api.datacite.org/dois",
        "--user-agent",
        "vouchers/2.0 (mailto:ops@example.org)",
        "--timeout",
        "30",
        "--dois-file",
        "drafts.txt",
        "--page-size",
        "25",
        "--dry-run",
    ]);
    let Command::PruneDrafts(args) = cli.command else {
        panic!("expected prune-drafts");
    };
    assert_eq!(args.connection.api_url, "https://api.datacite.org/dois");
    assert_eq!(
        args.connection.user_agent,
        "vouchers/2.0 (mailto:ops@example.org)"
    );
    assert_eq!(args.connection.timeout, 30);
    assert_eq!(args.page_size, 25);
    assert!(args.dry_run);
    assert!(!args.fetch);
}

#[test]
fn test_patch_related_without_file() {
    let cli = parse(&["patch-related", "--auth", "ANU.TEST:pw", "--fetch-existing"]);
    let Command::PatchRelated(args) = cli.command else {
        panic!("expected patch-related");
    };
    assert!(args.file.is_none());
    assert!(args.fetch_existing);
    assert_eq!(args.page_size, 100);
}

#[test]
fn test_log_config_defaults() {
    let cli = parse(&["patch-related", "awards.csv", "--auth", "ANU.TEST:pw"]);
    let config = cli.log_config();
    assert_eq!(config.level_filter, LevelFilter::INFO);
    assert!(config.use_env_filter);
    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(
        config.log_file.as_deref().and_then(|path| path.to_str()),
        Some(DEFAULT_LOG_FILE)
    );
}

#[test]
fn test_log_level_overrides_verbosity() {
    let cli = parse(&[
        "-v",
        "--log-level",
        "warn",
        "--log-format",
        "json",
        "--log-file",
        "run.log",
        "patch-related",
        "--auth",
        "ANU.TEST:pw",
    ]);
    let config = cli.log_config();
    assert_eq!(config.level_filter, LevelFilter::WARN);
    assert!(!config.use_env_filter);
    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(
        config.log_file.as_deref().and_then(|path| path.to_str()),
        Some("run.log")
    );
}

#[test]
fn test_verbose_flag_raises_level() {
    let cli = parse(&["-v", "patch-related", "--auth", "ANU.TEST:pw"]);
    let config = cli.log_config();
    assert_eq!(config.level_filter, LevelFilter::DEBUG);
    assert!(!config.use_env_filter);
}
