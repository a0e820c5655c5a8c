//! Response envelope.

use serde::Serialize;
use serde_json::Value;

use opqueue_workqueue::{BatchError, QueueError};

/// Uniform reply to every action.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_actions: Option<Vec<String>>,
}

impl ActionResponse {
    /// Successful reply.
    pub fn ok(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
            ..Default::default()
        }
    }

    /// Failed reply.
    pub fn error(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            code: Some(code.into()),
            ..Default::default()
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_valid_actions(mut self, actions: Vec<String>) -> Self {
        self.valid_actions = Some(actions);
        self
    }

    /// Render as JSON.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            serde_json::json!({"success": false, "error": e.to_string(), "code": "SERIALIZATION_ERROR"})
        })
    }
}

impl From<QueueError> for ActionResponse {
    fn from(err: QueueError) -> Self {
        Self::error(err.code(), err.to_string()).with_suggestion(err.suggestion())
    }
}

impl From<BatchError> for ActionResponse {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::Queue(inner) => inner.into(),
            BatchError::Empty => Self::error("INVALID_BATCH", err.to_string())
                .with_suggestion("Provide a list of {tool, parameters} objects"),
            BatchError::InvalidOperation { index, ref reason } => {
                Self::error("INVALID_BATCH", err.to_string())
                    .with_details(format!("index {}: {}", index, reason))
                    .with_suggestion("Each operation must have 'tool' and 'parameters' keys")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_serialization_skips_error_fields() {
        let json = ActionResponse::ok("done", Some(serde_json::json!({"n": 1}))).to_value();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "done");
        assert_eq!(json["data"]["n"], 1);
        assert!(json.get("error").is_none());
        assert!(json.get("code").is_none());
    }

    #[test]
    fn test_from_queue_error() {
        let response: ActionResponse = QueueError::NotFound("op_3".to_string()).into();
        assert!(!response.success);
        assert_eq!(response.code.as_deref(), Some("OPERATION_NOT_FOUND"));
        assert!(response.error.unwrap().contains("op_3"));
        assert!(response.suggestion.is_some());
    }

    #[test]
    fn test_from_batch_error() {
        let response: ActionResponse = BatchError::InvalidOperation {
            index: 2,
            reason: "must have 'parameters'".to_string(),
        }
        .into();
        assert_eq!(response.code.as_deref(), Some("INVALID_BATCH"));
        assert!(response.details.unwrap().starts_with("index 2"));

        let response: ActionResponse = BatchError::Queue(QueueError::QueueFull(10)).into();
        assert_eq!(response.code.as_deref(), Some("QUEUE_FULL"));
    }
}
