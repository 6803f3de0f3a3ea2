//! Custom error types for auto-typer.
//!
//! Every fallible library operation returns [`TyperError`]; the binary wraps
//! these in `anyhow` for top-level reporting.

use std::io;
use thiserror::Error;

/// Main error type for auto-typer operations.
#[derive(Error, Debug)]
pub enum TyperError {
    /// The input file does not exist.
    #[error("File '{path}' not found")]
    InputNotFound { path: String },

    /// The input file exists but could not be read as UTF-8 text.
    #[error("failed to read '{path}': {reason}")]
    InputRead { path: String, reason: String },

    /// Inter-keystroke delay bounds are out of range.
    #[error("{0}")]
    InvalidDelay(String),

    /// The specified key is invalid or unsupported.
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// Error parsing a key combination.
    #[error("invalid key combination '{combo}': {reason}")]
    InvalidKeyCombination { combo: String, reason: String },

    /// Error registering or handling a global hotkey.
    #[error("hotkey error: {0}")]
    Hotkey(String),

    /// The OS refused a synthesized keystroke.
    #[error("keystroke injection failed: {0}")]
    Injection(String),

    /// The typing worker thread panicked.
    #[error("typing worker failed: {0}")]
    Worker(String),

    /// Configuration validation error.
    #[error("configuration error: {0}")]
    ConfigValidation(String),

    /// Error reading or parsing configuration file.
    #[error("failed to load config from '{path}': {reason}")]
    ConfigLoad { path: String, reason: String },

    /// Error writing configuration file.
    #[error("failed to save config to '{path}': {reason}")]
    ConfigSave { path: String, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for auto-typer operations.
pub type Result<T> = std::result::Result<T, TyperError>;

impl TyperError {
    pub fn input_not_found(path: impl Into<String>) -> Self {
        Self::InputNotFound { path: path.into() }
    }

    pub fn input_read(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InputRead {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_delay(message: impl Into<String>) -> Self {
        Self::InvalidDelay(message.into())
    }

    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_key_combination(combo: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKeyCombination {
            combo: combo.into(),
            reason: reason.into(),
        }
    }

    pub fn hotkey(message: impl Into<String>) -> Self {
        Self::Hotkey(message.into())
    }

    pub fn injection(message: impl Into<String>) -> Self {
        Self::Injection(message.into())
    }

    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker(message.into())
    }

    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation(message.into())
    }

    pub fn config_load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn config_save(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigSave {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is a user-input problem reported before typing starts.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InputNotFound { .. }
                | Self::InputRead { .. }
                | Self::InvalidDelay(_)
                | Self::InvalidKey { .. }
                | Self::InvalidKeyCombination { .. }
                | Self::ConfigValidation(_)
                | Self::ConfigLoad { .. }
        )
    }
}
