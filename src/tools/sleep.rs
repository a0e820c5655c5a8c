//! Sleep tool.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use opqueue_protocols::error::ToolError;
use opqueue_protocols::tool::{Tool, ToolContext, ToolDefinition, ToolResult};

/// Abort checks happen at least this often.
const SLICE: Duration = Duration::from_millis(50);

#[derive(Debug, Deserialize)]
struct SleepParams {
    duration_ms: u64,
}

/// Waits for `duration_ms`, stopping early when aborted.
pub(crate) struct SleepTool {
    definition: ToolDefinition,
}

impl SleepTool {
    pub fn new() -> Self {
        let schema = serde_json::json!({
            "type": "object",
            "properties": {
                "duration_ms": {
                    "type": "integer",
                    "description": "How long to sleep, in milliseconds"
                }
            },
            "required": ["duration_ms"]
        });

        Self {
            definition: ToolDefinition::new("sleep", "Sleep", "Wait for a number of milliseconds")
                .with_parameters_schema(schema)
                .interruptible(),
        }
    }
}

#[async_trait]
impl Tool for SleepTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: SleepParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;

        let total = Duration::from_millis(params.duration_ms);
        let mut slept = Duration::ZERO;
        while slept < total {
            if ctx.is_aborted() {
                debug!("Sleep for operation {} aborted after {:?}", ctx.operation_id, slept);
                return Err(ToolError::Cancelled);
            }
            let step = SLICE.min(total - slept);
            tokio::time::sleep(step).await;
            slept += step;
        }

        Ok(ToolResult::success_json(
            format!("Slept {}ms", params.duration_ms),
            serde_json::json!({"slept_ms": params.duration_ms}),
        ))
    }
}
