//! Error types for probing and run orchestration.

use thiserror::Error;

/// Result type alias for run orchestration.
pub type RunResult<T> = Result<T, RunError>;

/// Caller misuse or a dead run task. Per-request failures never surface here.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("endpoint catalog is empty")]
    EmptyCatalog,

    #[error("batch size must be positive, got {0}")]
    InvalidBatchSize(usize),

    #[error("run task failed: {0}")]
    Join(String),
}

/// Failure of a single probe request, as reported by a [`ProbeClient`].
///
/// [`ProbeClient`]: crate::client::ProbeClient
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Status {
        status: u16,
        message: String,
        elapsed_ms: u64,
    },

    /// Connection refused, DNS failure, timeout, malformed response.
    #[error("{message}")]
    Transport { message: String, elapsed_ms: u64 },

    /// The request was abandoned because the run was cancelled.
    #[error("request cancelled")]
    Cancelled,
}

impl ProbeError {
    pub fn status(status: u16, message: impl Into<String>, elapsed_ms: u64) -> Self {
        ProbeError::Status {
            status,
            message: message.into(),
            elapsed_ms,
        }
    }

    pub fn transport(message: impl Into<String>, elapsed_ms: u64) -> Self {
        ProbeError::Transport {
            message: message.into(),
            elapsed_ms,
        }
    }
}
