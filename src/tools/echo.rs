//! Echo tool.

use async_trait::async_trait;

use opqueue_protocols::error::ToolError;
use opqueue_protocols::tool::{Tool, ToolContext, ToolDefinition, ToolResult};

/// Returns its parameters unchanged.
pub(crate) struct EchoTool {
    definition: ToolDefinition,
}

impl EchoTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition::new("echo", "Echo", "Return the given parameters unchanged")
                .with_parameters_schema(serde_json::json!({"type": "object"})),
        }
    }
}

#[async_trait]
impl Tool for EchoTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        Ok(ToolResult::success_json("echo", params))
    }
}
