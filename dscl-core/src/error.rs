// ============================================================================
// dscl-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error Types for the dscl Command Engine
//
// This module defines the error taxonomy for every failure the engine can
// surface: bad arguments caught before a subprocess is spawned, a missing
// dscl executable, a process that could not be started, a process that ran
// and exited non-zero, and a failed read of captured output.
//
// KEY COMPONENTS:
// - CoreError: Main error enum for the library
// - ExitError: Classified failure carrying exit status and captured stderr
// - CoreResult: Type alias for Results using CoreError
//
// AI-ASSISTANT-INFO: Error types and error handling utilities for dscl-core

// ---- External crate imports ----
use thiserror::Error;

// ---- Standard library imports ----
use std::fmt;
use std::io;

// ============================================================================
// CLASSIFIED EXIT ERROR
// ============================================================================

/// A dscl invocation that ran to completion and exited non-zero.
///
/// The `Display` output is exactly the captured standard-error text, so a
/// tool failing with status 5 and stderr `boom` displays as `boom`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitError {
    status: i32,
    stderr: Vec<u8>,
}

/// Diagnostics dscl prints when a record path does not resolve.
const RECORD_NOT_FOUND_MARKERS: &[&str] = &["eDSRecordNotFound", "-14136"];

impl ExitError {
    /// Creates a classified error from an exit status and raw stderr bytes.
    pub fn new(status: i32, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            stderr: stderr.into(),
        }
    }

    /// Numeric exit status. Zero when the process was terminated by a signal.
    pub fn status(&self) -> i32 {
        self.status
    }

    /// Raw bytes captured from the tool's standard error.
    pub fn stderr(&self) -> &[u8] {
        &self.stderr
    }

    /// Whether the tool reported that the record does not exist
    /// (`DS Error: -14136 (eDSRecordNotFound)`).
    pub fn is_record_not_found(&self) -> bool {
        let stderr = String::from_utf8_lossy(&self.stderr);
        RECORD_NOT_FOUND_MARKERS
            .iter()
            .any(|marker| stderr.contains(marker))
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.stderr))
    }
}

impl std::error::Error for ExitError {}

// ============================================================================
// CORE ERROR TYPE
// ============================================================================

/// Custom error type for dscl-core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Empty path, empty key, missing property, or no operation arguments.
    /// Always raised before the mutating subprocess is spawned.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Executable '{name}' not found: {source}")]
    ExecutableNotFound {
        name: String,
        #[source]
        source: which::Error,
    },

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, #[source] io::Error),

    #[error(transparent)]
    Exit(#[from] ExitError),

    #[error("Failed to read command output: {0}")]
    StreamRead(#[source] io::Error),

    /// A multi-key delete stopped part way through. Keys listed in `deleted`
    /// were already removed from the record when `failed_key` failed.
    #[error("Delete of '{failed_key}' failed after removing {deleted:?}: {source}")]
    PartialDelete {
        deleted: Vec<String>,
        failed_key: String,
        #[source]
        source: Box<CoreError>,
    },
}

impl CoreError {
    /// Returns the classified exit error if this failure came from a
    /// non-zero exit, looking through a partial delete to its cause.
    pub fn exit_error(&self) -> Option<&ExitError> {
        match self {
            CoreError::Exit(e) => Some(e),
            CoreError::PartialDelete { source, .. } => source.exit_error(),
            _ => None,
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, CoreError::InvalidArgument(_))
    }
}

/// Result type alias for dscl-core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Shorthand for an [`CoreError::InvalidArgument`] with a message.
pub(crate) fn invalid_argument(msg: impl Into<String>) -> CoreError {
    CoreError::InvalidArgument(msg.into())
}
