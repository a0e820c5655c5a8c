//! Tool execution context.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Context for a single tool invocation.
#[derive(Clone)]
pub struct ToolContext {
    /// Queue operation this invocation belongs to.
    pub operation_id: String,

    /// Correlation ID for tracing.
    pub correlation_id: String,

    /// Time budget granted by the queue.
    pub timeout: Duration,

    /// Abort signal for cancellation.
    pub abort_signal: Arc<AbortSignal>,
}

impl ToolContext {
    /// Create a new tool context.
    pub fn new(operation_id: impl Into<String>, timeout: Duration) -> Self {
        Self {
            operation_id: operation_id.into(),
            correlation_id: uuid::Uuid::new_v4().to_string(),
            timeout,
            abort_signal: Arc::new(AbortSignal::new()),
        }
    }

    /// Use a shared abort signal.
    pub fn with_abort_signal(mut self, signal: Arc<AbortSignal>) -> Self {
        self.abort_signal = signal;
        self
    }

    /// Check if the invocation should be aborted.
    pub fn is_aborted(&self) -> bool {
        self.abort_signal.is_aborted()
    }
}

/// Raised by the queue when it stops waiting for an invocation.
///
/// Tools that advertise `interruptible` poll it and return
/// `ToolError::Cancelled` once it is set.
#[derive(Debug)]
pub struct AbortSignal {
    aborted: AtomicBool,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self {
            aborted: AtomicBool::new(false),
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    /// Idempotent.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::Release);
    }
}

impl Default for AbortSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_context_new() {
        let ctx = ToolContext::new("op_1", Duration::from_secs(30));
        assert_eq!(ctx.operation_id, "op_1");
        assert_eq!(ctx.timeout, Duration::from_secs(30));
        assert!(!ctx.correlation_id.is_empty());
        assert!(!ctx.is_aborted());
    }

    #[test]
    fn test_tool_context_shared_abort_signal() {
        let signal = Arc::new(AbortSignal::new());
        let ctx = ToolContext::new("op_1", Duration::from_secs(1)).with_abort_signal(signal.clone());
        assert!(!ctx.is_aborted());
        signal.abort();
        assert!(ctx.is_aborted());
    }

    #[test]
    fn test_abort_is_idempotent() {
        let signal = AbortSignal::default();
        signal.abort();
        signal.abort();
        assert!(signal.is_aborted());
    }
}
