//! CLI argument definitions for doi-sync.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::builder::{PossibleValuesParser, TypedValueParser};
use clap::{Args, ColorChoice, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;
use tracing::level_filters::LevelFilter;

use doi_core::DEFAULT_URL_FILTER_PREFIX;
use doi_model::Event;
use doi_registry::{DEFAULT_API_URL, DEFAULT_USER_AGENT};

use crate::logging::{DEFAULT_LOG_FILE, LogConfig, LogFormat};

#[derive(Parser)]
#[command(
    name = "doi-sync",
    version,
    about = "Keep a spreadsheet of research outputs in step with its DataCite DOI records",
    long_about = "Create or update DataCite DOI records from a .csv or .xlsx spreadsheet,\n\
                  write minted identifiers back, prune draft records and patch related\n\
                  items onto existing records."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust console verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit console log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Console log format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "compact",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Append-only run log (always INFO and above).
    #[arg(
        long = "log-file",
        value_name = "PATH",
        default_value = DEFAULT_LOG_FILE,
        global = true
    )]
    pub log_file: PathBuf,
}

impl Cli {
    /// Builds logging configuration from CLI flags with consistent precedence.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        let mut config = LogConfig {
            level_filter: self.verbosity.tracing_level_filter(),
            ..LogConfig::default()
        };
        config.use_env_filter = !(self.verbosity.is_present() || self.log_level.is_some());
        if let Some(level) = self.log_level {
            config.level_filter = level.into();
        }
        config.format = match self.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        };
        config.log_file = Some(self.log_file.clone());
        config.with_ansi = match self.color.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => io::stderr().is_terminal(),
        };
        config
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Create DOI records from spreadsheet rows and write identifiers back.
    Publish(PublishArgs),

    /// Delete records whose confirmed state is draft.
    PruneDrafts(PruneArgs),

    /// Attach a related-item block to existing records.
    PatchRelated(PatchRelatedArgs),
}

/// Registry connection flags shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Repository credentials as REPO_ID:PASSWORD.
    #[arg(long = "auth", value_name = "REPO_ID:PASSWORD")]
    pub auth: String,

    /// DOI records endpoint.
    #[arg(long = "api-url", value_name = "URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// User-Agent header sent with every request.
    #[arg(
        long = "user-agent",
        value_name = "UA",
        env = "DATACITE_USER_AGENT",
        default_value = DEFAULT_USER_AGENT
    )]
    pub user_agent: String,

    /// Timeout in seconds for listing and patch requests.
    #[arg(long = "timeout", value_name = "SECS", default_value_t = 15)]
    pub timeout: u64,
}

#[derive(Args, Debug, Clone)]
pub struct PublishArgs {
    /// Spreadsheet to publish (.csv or .xlsx).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Build and log payloads without calling the registry or touching the file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Registry prefix used to mint identifiers for rows without a DOI.
    #[arg(long = "prefix", value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Lifecycle event requested for each record.
    #[arg(
        long = "event",
        ignore_case = true,
        default_value = "draft",
        value_parser = PossibleValuesParser::new(["draft", "publish", "register"])
            .try_map(|value| value.parse::<Event>())
    )]
    pub event: Event,

    /// Rewrite landing-page URLs to filter on the DOI suffix.
    #[arg(long = "append-suffix-to-url")]
    pub append_suffix_to_url: bool,

    /// Query fragment placed before the suffix in rewritten URLs.
    #[arg(
        long = "url-filter-prefix",
        value_name = "TEXT",
        default_value = DEFAULT_URL_FILTER_PREFIX
    )]
    pub url_filter_prefix: String,

    /// Attach the default related-item block to every record.
    #[arg(long = "embed-related-item")]
    pub embed_related_item: bool,

    /// Send the publisher as a ROR-identified object.
    #[arg(long = "publisher-ror", value_name = "ROR_URL")]
    pub publisher_ror: Option<String>,

    /// Check credentials against the registry before processing rows.
    #[arg(long = "preflight")]
    pub preflight: bool,

    /// Do not copy the spreadsheet aside before writing it back.
    #[arg(long = "no-backup")]
    pub no_backup: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PruneArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Text file with one DOI per line.
    #[arg(long = "dois-file", value_name = "PATH")]
    pub dois_file: Option<PathBuf>,

    /// Also list the repository for records requested as drafts.
    #[arg(long = "fetch")]
    pub fetch: bool,

    /// Page size for the listing.
    #[arg(long = "page-size", value_name = "N", default_value_t = 100)]
    pub page_size: usize,

    /// Report what would be deleted without deleting.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PatchRelatedArgs {
    /// Spreadsheet with a doi column and optional related_* override columns.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Also patch every record in the repository listing.
    #[arg(long = "fetch-existing")]
    pub fetch_existing: bool,

    /// Page size for the listing.
    #[arg(long = "page-size", value_name = "N", default_value_t = 100)]
    pub page_size: usize,

    /// Log payloads without sending them.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(value: LogLevelArg) -> Self {
        match value {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        }
    }
}

/// CLI log format choices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
