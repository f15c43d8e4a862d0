//! Core error types for restcycle-core.
//!
//! Nothing in this crate is fatal to the event loop: settings problems are
//! recovered where they happen, and presentation failures come back as
//! [`ShellError`] so the session can log them in one place.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for restcycle-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Settings-related errors
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Presentation-layer errors
    #[error("Shell error: {0}")]
    Shell(#[from] ShellError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Settings-file errors.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The per-user configuration directory could not be created.
    #[error("Failed to prepare settings directory {path}: {source}")]
    DirUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read the settings file
    #[error("Failed to read settings from {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the settings file
    #[error("Failed to save settings to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// The file exists but is not valid TOML
    #[error("Failed to parse settings: {0}")]
    ParseFailed(#[from] toml::de::Error),

    /// Serialization of the record failed
    #[error("Failed to serialize settings: {0}")]
    SerializeFailed(#[from] toml::ser::Error),
}

/// Failures reported by the presentation shell.
#[derive(Error, Debug)]
pub enum ShellError {
    /// No notification daemon/backend could be reached.
    #[error("Notification backend unavailable: {0}")]
    NotificationUnavailable(String),

    /// A window, prompt or editor could not be shown.
    #[error("Failed to display {what}: {message}")]
    DisplayFailed { what: &'static str, message: String },

    /// Writing to the terminal failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
