//! Error types for InfraExplain.
//!
//! This module defines the error hierarchy using `thiserror`. Every variant
//! records the source location that raised it, filled in by the [`err!`]
//! macro, so errors surfaced by the CLI or the HTTP service can be traced
//! back without a backtrace.
//!
//! # Error Categories
//!
//! - **Lexical errors**: configuration text that cannot be tokenized at all
//! - **IO errors**: reading input files and writing reports
//! - **Config errors**: invalid configuration files or custom rules
//! - **HTTP errors**: completion API failures in the explanation layer
//!
//! Structural problems inside otherwise readable text (a resource missing a
//! label, a value that cannot be evaluated) are never errors: the parser
//! skips or degrades them and keeps going.
//!
//! # Example
//!
//! ```rust
//! use infraexplain::error::{InfraExplainError, Result};
//!
//! fn read_input(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path).map_err(|e| InfraExplainError::Io {
//!         path: path.into(),
//!         source: e,
//!         src_path: file!(),
//!         src_line: line!(),
//!     })
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Macro to create errors with automatic source location tracking.
///
/// Usage:
/// ```ignore
/// return Err(err!(ConfigValue { key: "server.bind".to_string(), message: "empty".to_string() }));
/// ```
#[macro_export]
macro_rules! err {
    ($variant:ident { $($field:ident $(: $value:expr)?),* $(,)? }) => {
        $crate::error::InfraExplainError::$variant {
            $($field $(: $value)?,)*
            src_path: file!(),
            src_line: line!(),
        }
    };
}

/// A specialized Result type for InfraExplain operations.
pub type Result<T> = std::result::Result<T, InfraExplainError>;

/// The main error type for InfraExplain.
#[derive(Error, Debug)]
pub enum InfraExplainError {
    // =========================================================================
    // Parsing Errors
    // =========================================================================
    /// The input could not be tokenized (unterminated string, comment or heredoc).
    #[error("Failed to tokenize configuration at line {line}, column {column} ({src_path}:{src_line}): {message}")]
    Lexical {
        /// Description of the lexical failure
        message: String,
        /// 1-based line of the offending token
        line: usize,
        /// 1-based column of the offending token
        column: usize,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    // =========================================================================
    // I/O and File System Errors
    // =========================================================================
    /// I/O error with path context.
    #[error("I/O error at '{path}' ({src_path}:{src_line}): {source}")]
    Io {
        /// The path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    /// File not found.
    #[error("File not found: {path} ({src_path}:{src_line})")]
    FileNotFound {
        /// The missing file path
        path: PathBuf,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration parsing error.
    #[error("Failed to parse configuration ({src_path}:{src_line}): {message}")]
    ConfigParse {
        /// Error message
        message: String,
        /// The underlying error (if any)
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    /// Invalid configuration value, including malformed custom rules.
    #[error("Invalid configuration value for '{key}' ({src_path}:{src_line}): {message}")]
    ConfigValue {
        /// The configuration key
        key: String,
        /// Error message
        message: String,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    // =========================================================================
    // Network Errors
    // =========================================================================
    /// Completion API request error.
    #[error("HTTP request failed ({src_path}:{src_line}): {message}")]
    Http {
        /// Error message
        message: String,
        /// HTTP status code (if available)
        status_code: Option<u16>,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    /// The HTTP service could not start or stopped unexpectedly.
    #[error("Server error ({src_path}:{src_line}): {message}")]
    Server {
        /// Error message
        message: String,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    // =========================================================================
    // Report Errors
    // =========================================================================
    /// Report generation error.
    #[error("Failed to generate report ({src_path}:{src_line}): {message}")]
    ReportGeneration {
        /// Error message
        message: String,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    // =========================================================================
    // Generic Errors
    // =========================================================================
    /// Internal error (should not happen in normal operation).
    #[error("Internal error ({src_path}:{src_line}): {message}")]
    Internal {
        /// Error message
        message: String,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },
}

impl InfraExplainError {
    /// Creates a `ConfigParse` error.
    #[must_use]
    pub fn config_parse(message: String, source: Option<Box<dyn std::error::Error + Send + Sync>>, src_path: &'static str, src_line: u32) -> Self {
        Self::ConfigParse { message, source, src_path, src_line }
    }

    /// Returns true when the configuration text itself could not be tokenized.
    #[must_use]
    pub const fn is_parse_error(&self) -> bool {
        matches!(self, Self::Lexical { .. })
    }

    /// Returns the appropriate exit code for the error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Lexical { .. } => 3,
            Self::Io { source, .. } if source.kind() == std::io::ErrorKind::PermissionDenied => 13,
            Self::FileNotFound { .. } => 14,
            Self::ConfigParse { .. } => 18,
            Self::ConfigValue { .. } => 19,
            Self::Http { .. } => 22,
            _ => 1,
        }
    }
}

/// Extension trait for `Result` to add context to errors.
pub trait ResultExt<T, E> {
    /// Adds a file path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;

    /// Converts a general error into a `ConfigParse` error with context.
    fn to_config_parse_error(self, message: String) -> Result<T>;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| {
            let path = path.into();
            let source = match e.into().downcast::<std::io::Error>() {
                Ok(io) => *io,
                Err(other) => std::io::Error::new(std::io::ErrorKind::Other, other),
            };
            if source.kind() == std::io::ErrorKind::NotFound {
                InfraExplainError::FileNotFound { path, src_path: file!(), src_line: line!() }
            } else {
                InfraExplainError::Io { path, source, src_path: file!(), src_line: line!() }
            }
        })
    }

    fn to_config_parse_error(self, message: String) -> Result<T> {
        self.map_err(|e| InfraExplainError::config_parse(message, Some(e.into()), file!(), line!()))
    }
}

impl From<std::io::Error> for InfraExplainError {
    fn from(source: std::io::Error) -> Self {
        // Prefer `ResultExt::with_path` when the path is known.
        Self::Io {
            path: PathBuf::new(),
            source,
            src_path: file!(),
            src_line: line!(),
        }
    }
}

impl From<serde_yaml::Error> for InfraExplainError {
    fn from(source: serde_yaml::Error) -> Self {
        Self::ReportGeneration {
            message: format!("YAML serialization error: {source}"),
            src_path: file!(),
            src_line: line!(),
        }
    }
}
