//! Logging and tracing configuration
//!
//! Subscriber setup for the `soapbox` binary plus the `stage_event!` macro
//! used for the structured lifecycle events of a stage (mount, rant start,
//! ejection, completion, unmount).

use std::io;
use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Boxed error returned by logging initialization
pub type LoggingError = Box<dyn std::error::Error + Send + Sync>;

/// How console lines are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Single-line human readable output
    #[default]
    Compact,
    /// One JSON object per line
    Json,
}

/// Rolling daily log file target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    /// Directory receiving the files
    pub directory: String,
    /// File name prefix; the date is appended
    pub prefix: String,
}

/// Subscriber settings for a stage run
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Maximum level for this crate when no filter is given
    pub level: Level,
    /// Console rendering
    pub format: LogFormat,
    /// Optional JSON file output
    pub file: Option<LogFile>,
    /// Log span open/close
    pub span_events: bool,
    /// Colored console output
    pub ansi: bool,
    /// Explicit `EnvFilter` directives, overriding `RUST_LOG` and `level`
    pub filter: Option<String>,
}

/// Keeps the non-blocking log writers flushing until dropped
#[derive(Debug)]
#[must_use = "logs stop flushing once the guard is dropped"]
pub struct LoggingGuard {
    _guards: Vec<WorkerGuard>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Compact,
            file: None,
            span_events: false,
            ansi: true,
            filter: None,
        }
    }
}

impl LoggingConfig {
    /// Compact INFO logging to stderr
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Render console lines as JSON
    pub fn with_json_format(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }

    /// Also write JSON logs to daily files named `soapbox.<date>` in `directory`
    pub fn with_file_logging(mut self, directory: impl Into<String>) -> Self {
        let prefix = self.file.take().map(|f| f.prefix).unwrap_or_else(|| "soapbox".to_string());
        self.file = Some(LogFile { directory: directory.into(), prefix });
        self
    }

    /// Change the log file prefix; no effect without file logging
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        if let Some(file) = self.file.as_mut() {
            file.prefix = prefix.into();
        }
        self
    }

    /// Log span open and close events
    pub fn with_span_events(mut self) -> Self {
        self.span_events = true;
        self
    }

    /// Plain console output for terminals without color
    pub fn without_ansi(mut self) -> Self {
        self.ansi = false;
        self
    }

    /// Use explicit filter directives such as `soapbox_stage=trace`
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Whether logs also go to a file
    pub fn logs_to_file(&self) -> bool {
        self.file.is_some()
    }

    fn fmt_span(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    fn build_filter(&self) -> Result<EnvFilter, LoggingError> {
        if let Some(directives) = &self.filter {
            return Ok(EnvFilter::try_new(directives)?);
        }

        let crate_name = env!("CARGO_PKG_NAME").replace('-', "_");
        Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", crate_name, self.level))))
    }

    /// Install the global subscriber
    ///
    /// Fails if a subscriber is already installed. Hold the returned guard
    /// for as long as logs should be written.
    pub fn init(self) -> Result<LoggingGuard, LoggingError> {
        let filter = self.build_filter()?;
        let (console, console_guard) = non_blocking(io::stderr());
        let mut guards = vec![console_guard];

        let json_console = (self.format == LogFormat::Json)
            .then(|| fmt::layer().json().with_writer(console.clone()).with_span_events(self.fmt_span()));
        let compact_console = (self.format == LogFormat::Compact).then(|| {
            fmt::layer()
                .compact()
                .with_ansi(self.ansi)
                .with_writer(console)
                .with_span_events(self.fmt_span())
        });

        let file_layer = match &self.file {
            Some(target) => {
                let (writer, guard) = non_blocking(rolling::daily(&target.directory, &target.prefix));
                guards.push(guard);
                Some(fmt::layer().json().with_writer(writer).with_span_events(self.fmt_span()))
            }
            None => None,
        };

        Registry::default()
            .with(filter)
            .with(json_console)
            .with(compact_console)
            .with(file_layer)
            .try_init()?;

        info!(level = %self.level, format = ?self.format, file = self.logs_to_file(), "Logging initialized");
        Ok(LoggingGuard { _guards: guards })
    }

    /// Warnings only, no colors
    pub fn init_test() -> Result<LoggingGuard, LoggingError> {
        Self::new().with_level(Level::WARN).without_ansi().init()
    }

    /// INFO with span events, for `--verbose`
    pub fn init_verbose() -> Result<LoggingGuard, LoggingError> {
        Self::new().with_level(Level::INFO).with_span_events().init()
    }

    /// DEBUG with span events, for `--debug`
    pub fn init_debug() -> Result<LoggingGuard, LoggingError> {
        Self::new().with_level(Level::DEBUG).with_span_events().init()
    }
}

/// Emit a structured event tagged with the stage component
#[macro_export]
macro_rules! stage_event {
    ($level:ident, $message:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::$level!(
            message = $message,
            component = "stage",
            $($key = $value,)*
        );
    };
    ($level:ident, $message:expr) => {
        tracing::$level!(message = $message, component = "stage");
    };
}
