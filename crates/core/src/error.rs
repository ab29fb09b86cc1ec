// Central Error Type for batch-level failures
//
// Per-run failures never surface here; they are folded into
// domain::RunOutcome by the dispatcher.

use std::path::PathBuf;
use thiserror::Error;

/// Batch-level error type
#[derive(Error, Debug)]
pub enum BatchError {
    /// An input list could not be opened or decoded. Fatal: no run is attempted.
    #[error("Unable to open {}", .path.display())]
    FileNotReadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using BatchError
pub type Result<T> = std::result::Result<T, BatchError>;
