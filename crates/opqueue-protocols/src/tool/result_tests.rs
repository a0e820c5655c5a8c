use super::*;

#[test]
fn test_success_has_no_error_or_payload() {
    let result = ToolResult::success("slept 50ms");
    assert!(result.success);
    assert_eq!(result.content, "slept 50ms");
    assert!(result.error.is_none() && result.structured_output.is_none());
}

#[test]
fn test_error_carries_message_only() {
    let result = ToolResult::error("asset missing");
    assert!(!result.success);
    assert!(result.content.is_empty());
    assert_eq!(result.error.as_deref(), Some("asset missing"));
}

#[test]
fn test_into_value_prefers_structured_output() {
    let result = ToolResult::success_json("ignored", serde_json::json!({"n": 1}));
    assert_eq!(result.into_value(), serde_json::json!({"n": 1}));
}

#[test]
fn test_into_value_falls_back_to_content() {
    let result = ToolResult::success("plain text");
    assert_eq!(result.into_value(), serde_json::json!("plain text"));
}

#[test]
fn test_serialization_skips_empty_fields() {
    let json = serde_json::to_value(ToolResult::success("done")).unwrap();
    assert_eq!(json["content"], "done");
    assert!(json.get("structured_output").is_none());
    assert!(json.get("error").is_none());
}
