//! Executor errors.
//!
//! These never reach the caller of a batch; the queue records them on the
//! operation that produced them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("{message}")]
    Failed {
        message: String,
        code: Option<String>,
    },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    #[error("Operation was interrupted")]
    Interrupted,
}

impl ExecutorError {
    /// Create a failure without a structured code.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            code: None,
        }
    }

    /// Create a failure carrying a structured code.
    pub fn failed_with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            code: Some(code.into()),
        }
    }

    /// Machine-readable code for this error, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Failed { code, .. } => code.as_deref(),
            Self::UnknownTool(_) => Some("UNKNOWN_TOOL"),
            Self::Timeout(_) => Some("TIMEOUT"),
            Self::Interrupted => Some("INTERRUPTED"),
        }
    }
}
