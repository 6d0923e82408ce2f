//! Output formatting module.
//!
//! Plain output streams open ports as they are found and ends with a
//! summary. JSON and CSV print the finished report only.

use crate::scanner::{ScanEvent, ScanReport};
use crate::types::{PortError, PortSet, ScanTarget};
use console::style;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::time::Duration;

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Print the finished report to stdout.
pub fn print_results(report: &ScanReport, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Plain => write_plain_summary(&mut out, report),
        OutputFormat::Json => write_json(&mut out, report),
        OutputFormat::Csv => write_csv(&mut out, report),
    }
}

/// Summary printed after the streamed open ports.
pub fn write_plain_summary<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    writeln!(out)?;
    if report.open.is_empty() {
        writeln!(out, "  {}", style("No open ports found.").dim())?;
    } else {
        let open: Vec<String> = report.open_sorted().iter().map(|p| p.to_string()).collect();
        writeln!(
            out,
            "  {} {}",
            style("Open ports:").bold(),
            style(open.join(", ")).green().bold()
        )?;
    }

    writeln!(
        out,
        "  {} {} ports scanned in {:.2}s",
        style("Statistics:").bold(),
        report.ports_scanned,
        report.duration_ms as f64 / 1000.0
    )?;
    writeln!(
        out,
        "              {} open, {} closed, {} filtered, {} unreachable",
        style(report.open.len()).green().bold(),
        style(report.closed).red(),
        style(report.filtered).yellow(),
        style(report.unreachable).yellow()
    )?;
    if !report.complete {
        writeln!(
            out,
            "  {} {} attempts were cancelled; results are partial",
            style("Incomplete:").yellow().bold(),
            report.cancelled
        )?;
    }
    writeln!(out)?;
    Ok(())
}

/// Write the report as pretty JSON.
pub fn write_json<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report).map_err(io::Error::from)?;
    writeln!(out)
}

/// Write one CSV row per open port, ascending.
pub fn write_csv<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["target", "port", "status"])?;

    let target = report.target.to_string();
    for port in report.open_sorted() {
        wtr.write_record([target.as_str(), &port.to_string(), "open"])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(target: &ScanTarget, ports: &PortSet, timeout: Duration) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("skitter").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{} Target: {}", style("•").dim(), style(target).white().bold());
    println!(
        "{} Scanning {} ports ({}) with a {}ms connect timeout...",
        style("•").dim(),
        style(ports.len()).white().bold(),
        truncate_string(&ports.to_string(), 40),
        timeout.as_millis()
    );
    println!();
}

/// Format a discovered open port for streaming output.
pub fn format_open_port(event: &ScanEvent) -> String {
    format!(
        "  {} {:>5}/tcp open  {}",
        style("✓").green().bold(),
        event.port,
        style(format!("{}ms", event.elapsed.as_millis())).dim()
    )
}

/// Warn about every token the port parser dropped.
pub fn print_skipped(skipped: &[PortError]) {
    for reason in skipped {
        print_warning(&format!("ignoring {}", reason));
    }
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Truncate a string to a maximum length, adding ellipsis if truncated.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}
