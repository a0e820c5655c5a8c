//! Fail tool.

use async_trait::async_trait;
use serde::Deserialize;

use opqueue_protocols::error::ToolError;
use opqueue_protocols::tool::{Tool, ToolContext, ToolDefinition, ToolResult};

#[derive(Debug, Deserialize)]
struct FailParams {
    #[serde(default = "default_message")]
    message: String,
}

fn default_message() -> String {
    "Operation failed".to_string()
}

/// Always reports a tool failure.
pub(crate) struct FailTool {
    definition: ToolDefinition,
}

impl FailTool {
    pub fn new() -> Self {
        let schema = serde_json::json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "Error message to report"
                }
            }
        });

        Self {
            definition: ToolDefinition::new("fail", "Fail", "Report a failure with the given message")
                .with_parameters_schema(schema),
        }
    }
}

#[async_trait]
impl Tool for FailTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: FailParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;
        Ok(ToolResult::error(params.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fail_reports_message() {
        let tool = FailTool::new();
        let ctx = ToolContext::new("op_1", Duration::from_secs(1));
        let result = tool
            .execute(serde_json::json!({"message": "asset missing"}), ctx)
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("asset missing"));
    }

    #[tokio::test]
    async fn test_fail_default_message() {
        let tool = FailTool::new();
        let ctx = ToolContext::new("op_1", Duration::from_secs(1));
        let result = tool.execute(serde_json::json!({}), ctx).await.unwrap();
        assert_eq!(result.error.as_deref(), Some("Operation failed"));
    }
}
