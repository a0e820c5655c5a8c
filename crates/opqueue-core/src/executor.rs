//! Registry-backed operation executor.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use opqueue_protocols::error::{ExecutorError, ToolError};
use opqueue_protocols::executor::{ExecutionRequest, OperationExecutor};
use opqueue_protocols::tool::ToolContext;

use crate::registry::ToolRegistry;

/// Routes each operation to the tool registered under its `tool` id.
pub struct RegistryExecutor {
    registry: Arc<ToolRegistry>,
}

impl RegistryExecutor {
    /// Create an executor over a tool registry.
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this executor routes to.
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }
}

fn map_tool_error(err: ToolError) -> ExecutorError {
    match err {
        ToolError::Timeout(ms) => ExecutorError::Timeout(ms),
        ToolError::Cancelled => ExecutorError::Interrupted,
        ToolError::InvalidParameters(msg) | ToolError::ValidationFailed(msg) => {
            ExecutorError::failed_with_code(msg, "INVALID_PARAMETERS")
        }
    }
}

#[async_trait]
impl OperationExecutor for RegistryExecutor {
    async fn execute(&self, request: ExecutionRequest) -> Result<serde_json::Value, ExecutorError> {
        let tool = self
            .registry
            .get(&request.tool)
            .ok_or_else(|| ExecutorError::UnknownTool(request.tool.clone()))?;

        let params = serde_json::Value::Object(request.parameters);
        tool.validate(&params).map_err(map_tool_error)?;

        let ctx = ToolContext::new(request.operation_id.clone(), request.timeout)
            .with_abort_signal(request.abort_signal);

        debug!(
            "Invoking tool {} for operation {} (correlation {})",
            request.tool, request.operation_id, ctx.correlation_id
        );

        let result = tool.execute(params, ctx).await.map_err(map_tool_error)?;
        if result.success {
            Ok(result.into_value())
        } else {
            let message = result
                .error
                .unwrap_or_else(|| format!("Tool {} reported failure", request.tool));
            Err(ExecutorError::failed_with_code(message, "TOOL_FAILED"))
        }
    }

    fn supports_interruption(&self, tool: &str) -> bool {
        self.registry
            .get(tool)
            .map(|t| t.interruptible())
            .unwrap_or(false)
    }
}
