//! Logging infrastructure using `tracing` and `tracing-subscriber`.
//!
//! Run milestones reach the log through [`TracingSink`], the [`EventSink`]
//! the binary hands to the pipeline. Everything else logs with `tracing`
//! macros directly.
//!
//! # Log Levels
//!
//! - `error`: run failures
//! - `warn`: rejected rows, failed chunk inserts, reduced chunk size
//! - `info`: stage progress and the run summary
//! - `debug`: per-column inference results, per-chunk progress, SQL text
//! - `trace`: unused
//!
//! Cell values in rejection warnings are replaced by [`REDACTED_VALUE`]
//! unless `--log-data` is given.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        self, MakeWriter,
        writer::{MakeWriterExt, Tee},
    },
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use csvland_model::{EventSink, RunEvent};

/// Placeholder used when cell values must not be logged.
pub const REDACTED_VALUE: &str = "[REDACTED]";

/// Returns `value` when data logging is enabled, otherwise a redacted token.
pub fn redact_value(value: &str, log_data: bool) -> &str {
    if log_data { value } else { REDACTED_VALUE }
}

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` replace `level_filter` when set.
    pub use_env_filter: bool,
    pub with_timestamps: bool,
    /// Whether to include target (module path) in log output.
    pub with_target: bool,
    pub with_ansi: bool,
    pub format: LogFormat,
    /// Optional log file path. When set, logs are also appended to the file.
    pub log_file: Option<PathBuf>,
    /// Whether cell values may be logged.
    pub log_data: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format with colors.
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
    /// JSON format for machine parsing.
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::INFO,
            use_env_filter: true,
            with_timestamps: true,
            with_target: false,
            with_ansi: true,
            format: LogFormat::default(),
            log_file: None,
            log_data: false,
        }
    }
}

/// Initialize the global tracing subscriber with the given configuration.
///
/// This should be called once at application startup.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    if let Some(path) = &config.log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        init_logging_with_writer(config, with_log_file(io::stderr, file));
    } else {
        init_logging_with_writer(config, io::stderr);
    }
    Ok(())
}

/// Initialize logging with a custom writer (useful for testing).
pub fn init_logging_with_writer<W>(config: &LogConfig, writer: W)
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = build_env_filter(config);

    match config.format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_target(config.with_target);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .init();
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_writer(writer)
                .with_ansi(config.with_ansi)
                .with_target(config.with_target);
            if config.with_timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer)
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.without_time())
                    .init();
            }
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(config.with_ansi)
                .with_target(config.with_target);
            if config.with_timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer)
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.without_time())
                    .init();
            }
        }
    }
}

/// Writes every log line to `console` and appends it to `file`.
pub fn with_log_file<W>(console: W, file: std::fs::File) -> Tee<W, SharedFileWriter>
where
    W: for<'writer> MakeWriter<'writer>,
{
    console.and(SharedFileWriter::new(file))
}

#[derive(Clone)]
pub struct SharedFileWriter {
    file: Arc<Mutex<std::fs::File>>,
}

impl SharedFileWriter {
    fn new(file: std::fs::File) -> Self {
        Self {
            file: Arc::new(Mutex::new(file)),
        }
    }
}

pub struct SharedFileGuard {
    file: Arc<Mutex<std::fs::File>>,
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

/// Our crates log at the configured level; dependencies stay at warn.
fn build_env_filter(config: &LogConfig) -> EnvFilter {
    let level = config.level_filter.to_string().to_lowercase();
    let fallback = || {
        EnvFilter::new(format!(
            "warn,csvland={level},csvland_cli={level},csvland_ingest={level},\
             csvland_load={level},csvland_model={level}"
        ))
    };
    if config.use_env_filter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback())
    } else {
        fallback()
    }
}

/// [`EventSink`] that writes run events as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink {
    log_data: bool,
}

impl TracingSink {
    pub fn new(log_data: bool) -> Self {
        Self { log_data }
    }
}

impl EventSink for TracingSink {
    fn emit(&self, event: &RunEvent) {
        match event {
            RunEvent::RunStarted { folder, table } => {
                info!(folder = %folder.display(), table = %table, "run started");
            }
            RunEvent::FileSelected { path, modified } => {
                info!(path = %path.display(), modified = %modified, "source file selected");
            }
            RunEvent::SchemaInferred {
                rows_sampled,
                columns,
            } => {
                info!(rows_sampled, columns = columns.len(), "schema ready");
                for column in columns {
                    debug!(
                        column = %column.name,
                        column_type = %column.column_type,
                        nullable = column.nullable,
                        "inferred column"
                    );
                }
            }
            RunEvent::TableProvisioned { table, created } => {
                if *created {
                    info!(table = %table, "target table created");
                } else {
                    info!(table = %table, "using existing target table");
                }
            }
            RunEvent::RowRejected {
                row,
                line,
                rejection,
            } => {
                warn!(
                    row,
                    line,
                    column = rejection.column().unwrap_or("-"),
                    value = rejection.value().map(|v| redact_value(v, self.log_data)),
                    reason = %rejection,
                    "row rejected"
                );
            }
            RunEvent::ChunkLoaded { outcome } => {
                debug!(
                    chunk = outcome.index,
                    rows = outcome.rows,
                    inserted = outcome.inserted,
                    rejected = outcome.rejected,
                    attempts = outcome.attempts,
                    "chunk loaded"
                );
            }
            RunEvent::ChunkFailed { outcome } => {
                warn!(
                    chunk = outcome.index,
                    rows = outcome.rows,
                    attempts = outcome.attempts,
                    error = outcome.error.as_deref().unwrap_or("unknown"),
                    "chunk insert failed, rows rejected"
                );
            }
            RunEvent::RunFinished { summary } => {
                info!(
                    file = %summary.source_file.display(),
                    table = %summary.table,
                    rows_read = summary.rows_read,
                    rows_inserted = summary.rows_inserted,
                    rows_rejected = summary.rows_rejected,
                    chunks_failed = summary.chunks_failed,
                    elapsed_ms = summary.elapsed_ms,
                    "run finished"
                );
            }
            RunEvent::RunFailed { message } => {
                error!(error = %message, "run failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csvland_model::{ConversionError, RowRejection};

    #[derive(Clone, Default)]
    struct BufferWriter(Arc<Mutex<Vec<u8>>>);

    impl BufferWriter {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for BufferWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = BufferWriter;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn rejection() -> RunEvent {
        RunEvent::RowRejected {
            row: 4,
            line: 6,
            rejection: RowRejection::Conversion {
                column: "amount".to_string(),
                value: "12,50 EUR".to_string(),
                error: ConversionError::NotDecimal,
            },
        }
    }

    fn capture(sink: TracingSink, event: &RunEvent) -> String {
        let writer = BufferWriter::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer.clone())
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::with_default(subscriber, || sink.emit(event));
        writer.contents()
    }

    #[test]
    fn test_rejected_value_is_redacted_by_default() {
        let output = capture(TracingSink::new(false), &rejection());
        assert!(output.contains("row rejected"));
        assert!(output.contains("amount"));
        assert!(output.contains(REDACTED_VALUE));
        assert!(!output.contains("12,50 EUR"));
    }

    #[test]
    fn test_rejected_value_is_logged_with_log_data() {
        let output = capture(TracingSink::new(true), &rejection());
        assert!(output.contains("12,50 EUR"));
    }

    #[test]
    fn test_run_finished_names_source_file() {
        let started = chrono::Utc::now();
        let summary = csvland_model::RunSummary::new(
            PathBuf::from("/data/export.csv"),
            "imported_data".to_string(),
            true,
            &csvland_model::LoadResult::new(1000),
            started.naive_utc(),
            started,
            started,
        );
        let output = capture(TracingSink::new(false), &RunEvent::RunFinished { summary });
        assert!(output.contains("run finished"));
        assert!(output.contains("/data/export.csv"));
        assert!(output.contains("imported_data"));
    }

    #[test]
    fn test_log_file_keeps_console_output() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("csvland.log");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .unwrap();
        let console = BufferWriter::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(with_log_file(console.clone(), file))
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::with_default(subscriber, || info!("chunk written"));

        assert!(console.contents().contains("chunk written"));
        let logged = std::fs::read_to_string(&path).unwrap();
        assert!(logged.contains("chunk written"));
    }

    #[test]
    fn test_redact_value() {
        assert_eq!(redact_value("secret", false), REDACTED_VALUE);
        assert_eq!(redact_value("secret", true), "secret");
    }
}
