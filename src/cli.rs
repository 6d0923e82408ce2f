//! Command-line interface definitions for skitter.
//!
//! Uses `clap` derive macros for declarative argument parsing. Flags left
//! unset fall back to the settings file.

use crate::config::AppSettings;
use crate::error::{CliResult, ScanError};
use crate::logging;
use crate::output::{self, OutputFormat};
use crate::scanner::{ConnectScanner, ScanOptions, TcpConnector};
use crate::types::{PortSet, ScanTarget};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

/// A fast concurrent TCP connect port scanner.
#[derive(Parser, Debug)]
#[command(name = "skitter")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A fast concurrent TCP connect port scanner", long_about = None)]
pub struct Cli {
    /// IPv4 or IPv6 address to scan
    #[arg(value_name = "HOST")]
    pub host: String,

    /// Ports to scan: "*", "80", "1-1000" or "22,80,443"
    #[arg(short, long, default_value = "1-1000")]
    pub ports: String,

    /// Maximum number of in-flight connection attempts
    #[arg(short = 'c', long)]
    pub concurrency: Option<NonZeroUsize>,

    /// Connect timeout in milliseconds
    #[arg(short = 't', long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Attempts launched per second (0 = unlimited)
    #[arg(short = 'r', long = "rate", value_name = "PPS")]
    pub rate_limit: Option<u32>,

    /// Give up on the whole scan after this many milliseconds
    #[arg(long, value_name = "MS")]
    pub scan_timeout: Option<u64>,

    /// Close open connections normally instead of with a reset
    #[arg(long)]
    pub no_reset: bool,

    /// Output format for results
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Path to a settings file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbose output (progress bar and per-attempt logging)
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress everything but results and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Load the settings file named by `--config`, or the default one.
    pub fn load_settings(&self) -> CliResult<AppSettings> {
        let settings = match &self.config {
            Some(path) => AppSettings::load_from(path)?,
            None => AppSettings::load()?,
        };
        Ok(settings)
    }

    /// Scan options from `settings` with command-line overrides applied.
    pub fn scan_options(&self, settings: &AppSettings) -> CliResult<ScanOptions> {
        let mut options = settings.scan_options()?;

        if let Some(concurrency) = self.concurrency {
            options = options.with_concurrency(concurrency);
        }
        if let Some(ms) = self.timeout {
            options = options.with_timeout(Duration::from_millis(ms));
        }
        if let Some(rate) = self.rate_limit {
            options = options.with_rate_limit(rate);
        }
        if let Some(ms) = self.scan_timeout {
            options = options.with_scan_timeout(Duration::from_millis(ms));
        }

        options.validate()?;
        Ok(options)
    }

    /// The connector to scan with.
    pub fn connector(&self, settings: &AppSettings) -> TcpConnector {
        TcpConnector::new().with_reset_on_close(settings.reset_on_close && !self.no_reset)
    }

    /// The output format, from the flag or the settings file.
    pub fn output_format(&self, settings: &AppSettings) -> OutputFormat {
        self.output.unwrap_or(settings.output_format)
    }

    /// Run the scan and print the results.
    pub async fn execute(&self, settings: &AppSettings) -> CliResult<()> {
        let format = self.output_format(settings);
        let options = self.scan_options(settings)?;
        let target = ScanTarget::parse(&self.host)?;

        let parsed = PortSet::parse(&self.ports);
        if !self.quiet {
            output::print_skipped(&parsed.skipped);
        }
        if parsed.ports.is_empty() {
            return Err(ScanError::EmptyPortSet {
                skipped: parsed.skipped,
            }
            .into());
        }
        let ports = parsed.ports;

        let plain = format == OutputFormat::Plain;
        if plain && !self.quiet {
            output::print_scan_header(&target, &ports, options.connect_timeout);
        }

        let progress = (plain && self.verbose).then(|| progress_bar(ports.len()));
        if let Some(pb) = &progress {
            logging::attach_progress(pb);
        }

        let scanner = ConnectScanner::with_connector(self.connector(settings), options);
        let result = scanner
            .scan_with(target, &ports, |event| {
                if let Some(pb) = &progress {
                    pb.inc(1);
                }
                if plain && event.is_open() {
                    let line = output::format_open_port(event);
                    match &progress {
                        Some(pb) => pb.suspend(|| println!("{}", line)),
                        None => println!("{}", line),
                    }
                }
            })
            .await;

        if let Some(pb) = &progress {
            logging::detach_progress();
            pb.finish_and_clear();
        }

        let mut report = result?;
        report.skipped = parsed.skipped.iter().map(ToString::to_string).collect();

        if plain && self.quiet {
            for port in report.open_sorted() {
                println!("{}", port);
            }
            return Ok(());
        }

        output::print_results(&report, format)?;
        Ok(())
    }
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}
