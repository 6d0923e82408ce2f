//! Logging configuration using tracing.
//!
//! Logs go to stderr so scan results on stdout stay machine-readable.
//! While a progress bar is attached, each log line is written with the bar
//! hidden so the two never share a terminal row.

use indicatif::ProgressBar;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};
use tracing_subscriber::{
    fmt, fmt::MakeWriter, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
    EnvFilter,
};

static ACTIVE_BAR: Mutex<Option<ProgressBar>> = Mutex::new(None);

/// Log format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Single-line format
    #[default]
    Compact,
    /// Multi-line human-readable format
    Pretty,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is not set
    pub level: String,
    pub format: LogFormat,
    /// Include target (module path)
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: String::from("warn"),
            format: LogFormat::Compact,
            with_target: false,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log level
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Set the log format
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Pick the filter from command-line verbosity flags.
    ///
    /// `-v` shows per-attempt debug output, `-q` keeps only errors,
    /// otherwise `default_level` applies.
    pub fn from_verbosity(verbose: bool, quiet: bool, default_level: &str) -> Self {
        let level = if quiet {
            "error"
        } else if verbose {
            "skitter=debug,info"
        } else {
            default_level
        };
        Self::new().level(level).format(if verbose {
            LogFormat::Pretty
        } else {
            LogFormat::Compact
        })
    }
}

/// Install the global tracing subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init(config: &LogConfig) -> Result<(), TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Compact => {
            let fmt_layer = fmt::layer()
                .compact()
                .with_writer(StderrSink)
                .with_target(config.with_target);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()
        }
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .pretty()
                .with_writer(StderrSink)
                .with_target(config.with_target);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()
        }
    }
}

/// Hide `pb` around every log line until [`detach_progress`].
pub fn attach_progress(pb: &ProgressBar) {
    *ACTIVE_BAR.lock().unwrap_or_else(PoisonError::into_inner) = Some(pb.clone());
}

pub fn detach_progress() {
    *ACTIVE_BAR.lock().unwrap_or_else(PoisonError::into_inner) = None;
}

fn active_bar() -> Option<ProgressBar> {
    ACTIVE_BAR
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Stderr target for the fmt layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrSink;

impl<'a> MakeWriter<'a> for StderrSink {
    type Writer = EventWriter;

    fn make_writer(&'a self) -> Self::Writer {
        EventWriter {
            buf: Vec::new(),
            bar: active_bar(),
        }
    }
}

/// Buffers one formatted event and writes it to stderr on drop.
pub struct EventWriter {
    buf: Vec<u8>,
    bar: Option<ProgressBar>,
}

impl Write for EventWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for EventWriter {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let emit = || {
            let _ = io::stderr().lock().write_all(&self.buf);
        };
        match &self.bar {
            Some(pb) => pb.suspend(emit),
            None => emit(),
        }
    }
}
