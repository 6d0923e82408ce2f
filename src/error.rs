//! Error types for skitter.
//!
//! Uses `thiserror` for ergonomic error definitions. Individual connection
//! failures are never errors here; they only show up as a port status.

use crate::types::{PortError, TargetError};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a scan from starting or from finishing.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("invalid host: {0}")]
    InvalidHost(String),

    #[error("no valid ports to scan")]
    EmptyPortSet {
        /// Tokens the parser dropped, if any.
        skipped: Vec<PortError>,
    },

    #[error("local resources exhausted while connecting to port {port}: {source}")]
    ResourceExhausted {
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<TargetError> for ScanError {
    fn from(err: TargetError) -> Self {
        match err {
            TargetError::InvalidAddress(host) => Self::InvalidHost(host),
        }
    }
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors raised while locating or reading settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine a configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings file: {0}")]
    InvalidFormat(String),

    #[error("invalid setting: {0}")]
    InvalidValue(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidFormat(err.to_string())
    }
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level error for the command-line front end.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error("output error: {0}")]
    Output(#[from] io::Error),
}

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
