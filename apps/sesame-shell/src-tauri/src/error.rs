//! Custom error types for the Sesame shell
//!
//! Errors surface from configuration loading and from the host window
//! runtime. The navigation gate itself never returns them; it logs and
//! recovers at its boundary.

use thiserror::Error;

/// Main error type for shell operations
#[derive(Error, Debug)]
pub enum ShellError {
    /// IO-related errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors raised by the Tauri runtime
    #[error("Tauri error: {0}")]
    Tauri(#[from] tauri::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The host runtime could not create or drive a window surface
    #[error("Surface error: {0}")]
    Surface(String),

    /// The cookie store could not be queried
    #[error("Credential store error: {0}")]
    Credential(String),
}

impl ShellError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a surface error
    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }

    /// Create a credential store error
    pub fn credential(msg: impl Into<String>) -> Self {
        Self::Credential(msg.into())
    }
}

/// Result type alias using ShellError
pub type Result<T> = std::result::Result<T, ShellError>;
