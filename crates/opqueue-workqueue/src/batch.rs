//! Enqueue-and-run helper for whole batches.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::error::QueueError;
use crate::operation::{OperationId, OperationSpec};
use crate::report::{BatchHandle, BatchReport};
use crate::SharedQueueManager;

/// One element of a batch, as submitted by a caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOperation {
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(default)]
    pub parameters: Option<Value>,
    /// Values at or below zero fall back to the minimum timeout.
    #[serde(default)]
    pub timeout_ms: Option<i64>,
}

impl BatchOperation {
    pub fn new(tool: impl Into<String>, parameters: Value) -> Self {
        Self {
            tool: Some(tool.into()),
            parameters: Some(parameters),
            timeout_ms: None,
        }
    }

    fn check(self, index: usize, default_timeout_ms: Option<u64>) -> Result<OperationSpec, BatchError> {
        let invalid = |reason: &str| BatchError::InvalidOperation {
            index,
            reason: reason.to_string(),
        };

        let tool = match self.tool {
            Some(tool) if !tool.trim().is_empty() => tool,
            _ => return Err(invalid("must have a non-empty 'tool'")),
        };
        let parameters = match self.parameters {
            Some(params @ Value::Object(_)) => params,
            Some(Value::Null) | None => return Err(invalid("must have 'parameters'")),
            Some(_) => return Err(invalid("'parameters' must be an object")),
        };

        Ok(OperationSpec {
            tool,
            parameters: Some(parameters),
            timeout_ms: self.timeout_ms.map(|t| t.max(0) as u64).or(default_timeout_ms),
        })
    }
}

/// Batch options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOptions {
    /// Run the queue right after enqueueing.
    #[serde(default = "default_execute_immediately")]
    pub execute_immediately: bool,
    /// Dispatch to the worker pool instead of running inline.
    #[serde(default)]
    pub use_async: bool,
    /// Timeout for elements that do not carry their own.
    #[serde(default)]
    pub default_timeout_ms: Option<u64>,
}

fn default_execute_immediately() -> bool {
    true
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            execute_immediately: default_execute_immediately(),
            use_async: false,
            default_timeout_ms: None,
        }
    }
}

/// How the enqueued batch was run.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BatchExecution {
    Completed(BatchReport),
    Dispatched(BatchHandle),
}

/// Result of [`queue_batch`].
#[derive(Debug, Serialize)]
pub struct BatchOutcome {
    pub operation_ids: Vec<OperationId>,
    /// `None` when the batch was only enqueued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution: Option<BatchExecution>,
}

/// Batch errors.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Operations parameter must be a non-empty list")]
    Empty,

    #[error("Operation {index} is invalid: {reason}")]
    InvalidOperation { index: usize, reason: String },

    #[error(transparent)]
    Queue(#[from] QueueError),
}

impl BatchError {
    /// Index of the offending element, if the error is about one.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::InvalidOperation { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// Validate, enqueue and optionally run a batch.
///
/// The first invalid element aborts the batch before anything is enqueued.
pub async fn queue_batch(
    manager: &SharedQueueManager,
    operations: Vec<BatchOperation>,
    options: BatchOptions,
) -> Result<BatchOutcome, BatchError> {
    if operations.is_empty() {
        return Err(BatchError::Empty);
    }

    let specs = operations
        .into_iter()
        .enumerate()
        .map(|(i, op)| op.check(i, options.default_timeout_ms))
        .collect::<Result<Vec<_>, _>>()
        .inspect_err(|e| warn!("Rejected batch: {}", e))?;

    let operation_ids = manager.add_many(specs).await?;
    info!("Queued batch of {} operations", operation_ids.len());

    let execution = if !options.execute_immediately {
        None
    } else if options.use_async {
        Some(BatchExecution::Dispatched(manager.execute_async().await))
    } else {
        Some(BatchExecution::Completed(manager.execute().await))
    };

    Ok(BatchOutcome {
        operation_ids,
        execution,
    })
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
