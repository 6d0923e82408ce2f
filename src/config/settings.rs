//! Application settings and paths.
//!
//! Settings live in `settings.json` under the XDG config directory
//! (`~/.config/skitter` on Linux). A missing file means defaults.

use crate::error::{ConfigError, ConfigResult};
use crate::output::OutputFormat;
use crate::scanner::ScanOptions;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/skitter)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Locate the platform directories. Nothing is created on disk.
    pub fn discover() -> ConfigResult<Self> {
        let project =
            ProjectDirs::from("com", "skitter", "skitter").ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Maximum number of in-flight connection attempts.
    pub concurrency: usize,
    /// Per-attempt connect timeout in milliseconds.
    pub timeout_ms: u64,
    /// Attempts launched per second, 0 for unlimited.
    pub rate_limit: u32,
    /// Optional bound on a whole scan, in milliseconds.
    pub scan_timeout_ms: Option<u64>,
    /// Close open connections with a RST (`SO_LINGER` 0).
    pub reset_on_close: bool,
    /// Default output format.
    pub output_format: OutputFormat,
    /// Default log filter, overridden by `RUST_LOG`.
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            concurrency: 500,
            timeout_ms: 3000,
            rate_limit: 0,
            scan_timeout_ms: None,
            reset_on_close: true,
            output_format: OutputFormat::Plain,
            log_level: "warn".to_string(),
        }
    }
}

impl AppSettings {
    /// Load settings from the default location.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::discover()?.settings_file();

        if !file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(serde_json::from_str(&content)?)
    }

    /// Build scan options from these settings.
    pub fn scan_options(&self) -> ConfigResult<ScanOptions> {
        let concurrency = NonZeroUsize::new(self.concurrency)
            .ok_or_else(|| ConfigError::InvalidValue("concurrency must be at least 1".to_string()))?;

        let mut options = ScanOptions::new()
            .with_concurrency(concurrency)
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_rate_limit(self.rate_limit);

        if let Some(ms) = self.scan_timeout_ms {
            options = options.with_scan_timeout(Duration::from_millis(ms));
        }

        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.concurrency, 500);
        assert_eq!(settings.timeout_ms, 3000);
        assert_eq!(settings.rate_limit, 0);
        assert!(settings.scan_timeout_ms.is_none());
        assert!(settings.reset_on_close);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "timeout_ms": 1500, "output_format": "json", "reset_on_close": false }}"#
        )
        .unwrap();

        let settings = AppSettings::load_from(file.path()).unwrap();
        assert_eq!(settings.timeout_ms, 1500);
        assert!(!settings.reset_on_close);
        assert_eq!(settings.output_format, OutputFormat::Json);
        assert_eq!(settings.concurrency, 500);
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "concurrency = 10").unwrap();

        let err = AppSettings::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFormat(_)));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppSettings::load_from(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFailed { .. }));
    }

    #[test]
    fn test_scan_options_conversion() {
        let settings = AppSettings {
            concurrency: 64,
            timeout_ms: 750,
            rate_limit: 100,
            scan_timeout_ms: Some(10_000),
            ..AppSettings::default()
        };

        let options = settings.scan_options().unwrap();
        assert_eq!(options.concurrency.get(), 64);
        assert_eq!(options.connect_timeout, Duration::from_millis(750));
        assert_eq!(options.rate_limit, 100);
        assert_eq!(options.scan_timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let settings = AppSettings {
            concurrency: 0,
            ..AppSettings::default()
        };
        assert!(matches!(
            settings.scan_options(),
            Err(ConfigError::InvalidValue(_))
        ));
    }
}
