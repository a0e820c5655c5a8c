//! Executor protocol.
//!
//! The queue never performs work itself. It hands each operation to an
//! [`OperationExecutor`] and records whatever comes back.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ExecutorError;
use crate::tool::AbortSignal;

/// Opaque parameter payload of a queued operation.
pub type Parameters = serde_json::Map<String, serde_json::Value>;

/// One invocation handed to an executor.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    /// Queue operation id (`op_<n>`).
    pub operation_id: String,

    /// Tool to invoke.
    pub tool: String,

    /// Parameters, passed through untouched.
    pub parameters: Parameters,

    /// Time budget. The queue enforces it as well; executors may use it to
    /// bound their own work.
    pub timeout: Duration,

    /// Raised when the queue gives up on this invocation (timeout or cancel).
    pub abort_signal: Arc<AbortSignal>,
}

impl ExecutionRequest {
    /// Create a new request with a fresh abort signal.
    pub fn new(
        operation_id: impl Into<String>,
        tool: impl Into<String>,
        parameters: Parameters,
        timeout: Duration,
    ) -> Self {
        Self {
            operation_id: operation_id.into(),
            tool: tool.into(),
            parameters,
            timeout,
            abort_signal: Arc::new(AbortSignal::new()),
        }
    }
}

/// The external execution environment.
#[async_trait]
pub trait OperationExecutor: Send + Sync {
    /// Perform one operation.
    async fn execute(&self, request: ExecutionRequest) -> Result<serde_json::Value, ExecutorError>;

    /// Whether an in-flight invocation of `tool` can be interrupted.
    ///
    /// Cancelling a running operation is refused unless this returns true.
    fn supports_interruption(&self, _tool: &str) -> bool {
        false
    }
}
