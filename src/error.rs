//! Error types for the Kontos library.
//!
//! All fallible operations in the library return [`Result`], with
//! [`KontosError`] describing what went wrong. Construction-time failures
//! (a missing or corrupt index artifact) are fatal for the engine instance
//! being built; query-time failures never escape the facade and are instead
//! absorbed into degraded answers.
//!
//! # Examples
//!
//! ```
//! use kontos::error::{KontosError, Result};
//!
//! fn check_result_count(k: usize) -> Result<()> {
//!     if k == 0 {
//!         return Err(KontosError::invalid_argument("k must be >= 1"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_result_count(0).is_err());
//! assert!(check_result_count(3).is_ok());
//! ```

use std::io;

use anyhow;
use thiserror::Error;

/// The main error type for Kontos operations.
///
/// This enum represents all possible errors that can occur in the Kontos
/// library. It uses the `thiserror` crate for automatic `Error` trait
/// implementation and provides convenient constructor methods for creating
/// specific error types.
#[derive(Error, Debug)]
pub enum KontosError {
    /// I/O errors (file operations, network, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The index artifact is missing or unreadable; fatal at construction.
    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    /// Index-related errors (corrupt artifact, inconsistent contents)
    #[error("Index error: {0}")]
    Index(String),

    /// Embedding-related errors (dimension mismatch, untrained embedder)
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Search-related errors
    #[error("Search error: {0}")]
    Search(String),

    /// Generation backend errors, absorbed by the orchestrator's fallback
    #[error("Backend error: {0}")]
    Backend(#[from] crate::generation::BackendError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with KontosError.
pub type Result<T> = std::result::Result<T, KontosError>;

impl KontosError {
    /// Create a new index-unavailable error.
    pub fn index_unavailable<S: Into<String>>(msg: S) -> Self {
        KontosError::IndexUnavailable(msg.into())
    }

    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        KontosError::Index(msg.into())
    }

    /// Create a new embedding error.
    pub fn embedding<S: Into<String>>(msg: S) -> Self {
        KontosError::Embedding(msg.into())
    }

    /// Create a new search error.
    pub fn search<S: Into<String>>(msg: S) -> Self {
        KontosError::Search(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        KontosError::Config(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        KontosError::Other(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        KontosError::Other(format!("Invalid argument: {}", msg.into()))
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        KontosError::Other(format!("Internal error: {}", msg.into()))
    }
}
