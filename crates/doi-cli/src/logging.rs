//! Logging infrastructure using `tracing` and `tracing-subscriber`.
//!
//! Two sinks are installed:
//!
//! - the console (stderr), at the level chosen on the command line or via
//!   `RUST_LOG`, in pretty, compact or JSON format;
//! - an append-only run log that always receives INFO and above, with
//!   timestamps and without ANSI colors, so every run leaves an audit trail.
//!
//! # Log Levels
//!
//! - `error`: Failed creates, failed patches, fatal errors
//! - `warn`: Skipped rows, unreadable records, aborted pagination
//! - `info`: Per-record progress, backups, summary counts
//! - `debug`: Payloads and raw responses
//! - `trace`: Everything else

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Run log written in the working directory unless overridden.
pub const DEFAULT_LOG_FILE: &str = "doi_sync.log";

/// Crates whose events reach the console at the configured level.
const OWN_CRATES: [&str; 5] = [
    "doi_cli",
    "doi_core",
    "doi_ingest",
    "doi_model",
    "doi_registry",
];

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Console level filter.
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` override `level_filter`.
    pub use_env_filter: bool,
    /// Whether to include timestamps in console output.
    pub with_timestamps: bool,
    /// Whether to include target (module path) in console output.
    pub with_target: bool,
    /// Whether to use ANSI colors on the console.
    pub with_ansi: bool,
    pub format: LogFormat,
    /// Append-only run log. Receives INFO and above regardless of console level.
    pub log_file: Option<PathBuf>,
}

/// Console log format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line human-readable format.
    Pretty,
    /// Single-line format.
    #[default]
    Compact,
    /// JSON format for machine parsing.
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::INFO,
            use_env_filter: true,
            with_timestamps: false,
            with_target: false,
            with_ansi: true,
            format: LogFormat::default(),
            log_file: Some(PathBuf::from(DEFAULT_LOG_FILE)),
        }
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Initialize the global tracing subscriber with the given configuration.
///
/// # Errors
///
/// Returns an error if the run log cannot be opened or a subscriber is
/// already installed.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    let file_layer = match &config.log_file {
        Some(path) => Some(file_layer(open_log_file(path)?)),
        None => None,
    };
    tracing_subscriber::registry()
        .with(console_layer(config))
        .with(file_layer)
        .try_init()
        .map_err(io::Error::other)
}

fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn console_layer(config: &LogConfig) -> BoxedLayer {
    let filter = build_env_filter(config.level_filter, config.use_env_filter);
    match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_target(config.with_target)
            .with_filter(filter)
            .boxed(),
        LogFormat::Compact if config.with_timestamps => fmt::layer()
            .compact()
            .with_writer(io::stderr)
            .with_ansi(config.with_ansi)
            .with_target(config.with_target)
            .with_filter(filter)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .without_time()
            .with_writer(io::stderr)
            .with_ansi(config.with_ansi)
            .with_target(config.with_target)
            .with_filter(filter)
            .boxed(),
        LogFormat::Pretty if config.with_timestamps => fmt::layer()
            .pretty()
            .with_writer(io::stderr)
            .with_ansi(config.with_ansi)
            .with_target(config.with_target)
            .with_filter(filter)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .without_time()
            .with_writer(io::stderr)
            .with_ansi(config.with_ansi)
            .with_target(config.with_target)
            .with_filter(filter)
            .boxed(),
    }
}

fn file_layer<S>(file: File) -> impl Layer<S> + Send + Sync + 'static
where
    S: tracing::Subscriber + for<'span> tracing_subscriber::registry::LookupSpan<'span>,
{
    fmt::layer()
        .with_writer(SharedFileWriter::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_filter(LevelFilter::INFO)
}

#[derive(Clone)]
struct SharedFileWriter {
    file: Arc<Mutex<File>>,
}

impl SharedFileWriter {
    fn new(file: File) -> Self {
        Self {
            file: Arc::new(Mutex::new(file)),
        }
    }
}

struct SharedFileGuard {
    file: Arc<Mutex<File>>,
}

impl Write for SharedFileGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        guard.flush()
    }
}

impl<'a> MakeWriter<'a> for SharedFileWriter {
    type Writer = SharedFileGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedFileGuard {
            file: Arc::clone(&self.file),
        }
    }
}

/// Builds the console filter: our crates at `level`, everything else at warn.
fn build_env_filter(level: LevelFilter, use_env: bool) -> EnvFilter {
    let directives = default_directives(level);
    if use_env {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives))
    } else {
        EnvFilter::new(directives)
    }
}

fn default_directives(level: LevelFilter) -> String {
    let level = level.to_string().to_lowercase();
    let mut directives = vec!["warn".to_string()];
    directives.extend(OWN_CRATES.iter().map(|name| format!("{name}={level}")));
    directives.join(",")
}
