//! # Skitter - A Concurrent TCP Connect Port Scanner
//!
//! Skitter parses a port expression, then tries a full TCP connect to every
//! selected port of one address with a bounded number of attempts in
//! flight. Each attempt ends exactly once as open, closed, filtered,
//! unreachable or cancelled.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use skitter::scanner::{run_scan, ScanOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), skitter::ScanError> {
//!     let report = run_scan("127.0.0.1", "1-1024", ScanOptions::new()).await?;
//!     for port in report.open_sorted() {
//!         println!("{} open", port);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Port, port set and target types, plus the port parser
//! - [`scanner`] - The concurrent connect scanner and the `Connector` trait
//! - [`config`] - Settings file handling
//! - [`error`] - Error types
//! - [`output`] - Plain, JSON and CSV output
//! - [`logging`] - `tracing` subscriber setup

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod scanner;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ConfigError, ScanError};
pub use scanner::{
    run_scan, ConnectScanner, Connector, PortStatus, ScanEvent, ScanOptions, ScanReport,
};
pub use types::{ParsedPorts, Port, PortError, PortSet, ScanId, ScanTarget};
