//! Queue errors.

use thiserror::Error;

use crate::operation::OperationStatus;

/// Queue error types.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Missing or malformed input.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Unknown operation id.
    #[error("Operation not found: {0}")]
    NotFound(String),

    /// Id already present in the store.
    #[error("Duplicate operation id: {0}")]
    DuplicateId(String),

    /// The operation's status does not allow the requested action.
    #[error("Cannot {action} operation {id} with status '{status}'")]
    InvalidState {
        id: String,
        status: OperationStatus,
        action: &'static str,
    },

    /// Running operation whose tool cannot be interrupted.
    #[error("Operation {0} is executing and its tool does not support interruption")]
    NotCancellable(String),

    /// Queue is full.
    #[error("Queue size limit reached ({0})")]
    QueueFull(usize),

    /// Worker error.
    #[error("Worker error: {0}")]
    WorkerError(String),
}

impl QueueError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "OPERATION_NOT_FOUND",
            Self::DuplicateId(_) => "DUPLICATE_ID",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::NotCancellable(_) => "NOT_CANCELLABLE",
            Self::QueueFull(_) => "QUEUE_FULL",
            Self::WorkerError(_) => "WORKER_ERROR",
        }
    }

    /// A hint pointing the caller at a fix.
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Check the required fields and their formats",
            Self::NotFound(_) | Self::DuplicateId(_) => {
                "Use 'list' action to see available operation IDs"
            }
            Self::InvalidState { status, .. } if *status == OperationStatus::Executing => {
                "Cancel the operation first or wait for it to finish"
            }
            Self::InvalidState { .. } => "Use 'list' action to check the operation's current status",
            Self::NotCancellable(_) => "Wait for the operation to reach its natural outcome",
            Self::QueueFull(_) => "Clear completed operations first",
            Self::WorkerError(_) => "Check the logs for details",
        }
    }
}
