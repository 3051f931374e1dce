//! Walk errors, exit codes and structured error output.

use serde::Serialize;
use std::path::PathBuf;

/// Errors that abort a walk.
///
/// Every variant is terminal: the walk stops at the first error and
/// nothing is retried. Files reported before the error stay reported.
#[derive(thiserror::Error, Debug)]
pub enum WalkError {
    /// A required callback was not configured.
    #[error("Invalid configuration: {0}")]
    Validation(String),

    /// The search root could not be made absolute.
    #[error("Cannot resolve search path {path}: {source}")]
    PathResolution {
        /// Path as configured
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The directory traversal reported an error for an entry.
    #[error(transparent)]
    Traversal(#[from] walkdir::Error),

    /// A file could not be opened or read while hashing it.
    #[error("Failed to hash file '{path}': {source}")]
    Io {
        /// File being hashed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The found-file callback returned an error.
    #[error(transparent)]
    Callback(anyhow::Error),
}

/// Exit codes for the uniqwalk binary.
///
/// - 0: Success (walk completed, duplicates found or dedup disabled)
/// - 1: General error (walk aborted or bad configuration)
/// - 2: No duplicates found (walk completed with dedup enabled)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: Walk completed.
    Success = 0,
    /// General error: The walk was aborted.
    GeneralError = 1,
    /// No duplicates: Walk completed but every file was unique.
    NoDuplicates = 2,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "UW000",
            Self::GeneralError => "UW001",
            Self::NoDuplicates => "UW002",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "UW001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including the cause chain
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
        }
    }
}
