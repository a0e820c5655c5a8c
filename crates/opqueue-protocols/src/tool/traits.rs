//! Tool trait definition.

use async_trait::async_trait;

use super::{ToolContext, ToolDefinition, ToolResult};
use crate::error::ToolError;

/// Core trait for tools.
///
/// Tools are executable units a queued operation names by id.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool definition.
    fn definition(&self) -> &ToolDefinition;

    /// Execute the tool with the given parameters.
    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError>;

    /// Validate the parameters before execution.
    fn validate(&self, params: &serde_json::Value) -> Result<(), ToolError> {
        let definition = self.definition();
        if let Some(schema) = &definition.parameters_schema {
            if schema.get("type") == Some(&serde_json::json!("object")) && !params.is_object() {
                return Err(ToolError::ValidationFailed(
                    "Parameters must be an object".to_string(),
                ));
            }
            if let Some(required) = schema.get("required").and_then(|r| r.as_array()) {
                for field in required.iter().filter_map(|f| f.as_str()) {
                    if params.get(field).is_none() {
                        return Err(ToolError::ValidationFailed(format!(
                            "Missing required parameter: {}",
                            field
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Whether a running invocation honors its abort signal.
    fn interruptible(&self) -> bool {
        self.definition().interruptible
    }
}
