/*!
 * Error types for the vidscribe application.
 *
 * This module contains custom error types for different parts of the pipeline,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when invoking an external tool
#[derive(Error, Debug)]
pub enum CommandError {
    /// Error when the tool binary could not be started at all
    #[error("Failed to launch {program}: {source}")]
    Launch {
        /// Name of the binary that was invoked
        program: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// Error when the tool did not finish within its allotted time
    #[error("{program} timed out after {timeout_secs}s")]
    TimedOut {
        /// Name of the binary that was invoked
        program: String,
        /// The timeout that was exceeded, in seconds
        timeout_secs: u64,
    },
}

/// Errors that can occur while a pipeline run moves through its stages
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Malformed or absent request data, attributable to the caller
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// A segment carried a timestamp that cannot become a subtitle timecode
    #[error("Invalid timestamp: {seconds} cannot be rendered as a timecode")]
    InvalidTimestamp {
        /// The offending value, in seconds
        seconds: f64,
    },

    /// Error from a filesystem operation on a pipeline artifact
    #[error("Storage error: {0}")]
    Storage(String),

    /// The source video artifact was gone when a render was requested
    #[error("Source video not found: {}", path.display())]
    SourceNotFound {
        /// Path that was expected to exist
        path: PathBuf,
    },

    /// The external renderer failed, with its diagnostics preserved
    #[error("Render failed: {detail}")]
    Render {
        /// Filtered diagnostic output from the renderer
        detail: String,
    },

    /// Audio extraction or speech recognition failed
    #[error("Transcription failed: {detail}")]
    Transcription {
        /// Filtered diagnostic output from the failing tool
        detail: String,
    },
}

impl PipelineError {
    /// Whether this failure is the caller's fault rather than the system's.
    /// Drives the process exit code split in the CLI.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::MissingInput(_))
    }
}

// Utility functions for error conversion
impl From<std::io::Error> for PipelineError {
    fn from(error: std::io::Error) -> Self {
        Self::Storage(error.to_string())
    }
}
