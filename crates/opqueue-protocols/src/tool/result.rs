//! What a tool hands back.

use serde::{Deserialize, Serialize};

/// Outcome reported by a tool that ran to completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// `false` marks a domain failure; `error` then says why.
    pub success: bool,

    /// Human-readable summary.
    pub content: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_output: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: content.into(),
            structured_output: None,
            error: None,
        }
    }

    /// Success carrying a JSON payload.
    pub fn success_json(content: impl Into<String>, output: serde_json::Value) -> Self {
        Self {
            success: true,
            content: content.into(),
            structured_output: Some(output),
            error: None,
        }
    }

    /// Domain failure.
    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            content: String::new(),
            structured_output: None,
            error: Some(error.into()),
        }
    }

    /// The payload a queue stores for this result.
    ///
    /// Structured output wins; otherwise the text content as a JSON string.
    pub fn into_value(self) -> serde_json::Value {
        match self.structured_output {
            Some(output) => output,
            None => serde_json::Value::String(self.content),
        }
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
