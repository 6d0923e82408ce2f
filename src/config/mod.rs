//! Configuration management for skitter.
//!
//! Provides XDG-compliant settings storage.

mod settings;

pub use settings::{AppSettings, Paths};
