//! Action dispatcher.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use opqueue_workqueue::{
    queue_batch, BatchExecution, BatchOperation, BatchOptions, OperationId, OperationStatus,
    QueueError, SharedQueueManager,
};

use crate::request::{Action, ActionRequest, BatchRequest};
use crate::response::ActionResponse;

/// Dispatches JSON requests onto a queue manager.
#[derive(Clone)]
pub struct QueueService {
    manager: SharedQueueManager,
}

impl QueueService {
    pub fn new(manager: SharedQueueManager) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &SharedQueueManager {
        &self.manager
    }

    /// Handle one management request.
    pub async fn handle(&self, request: Value) -> ActionResponse {
        let request: ActionRequest = match serde_json::from_value(request) {
            Ok(request) => request,
            Err(e) => {
                return ActionResponse::error("VALIDATION_ERROR", "Invalid request")
                    .with_details(e.to_string());
            }
        };

        let Some(name) = request.action.as_deref().filter(|a| !a.trim().is_empty()) else {
            return ActionResponse::error("MISSING_ACTION", "Action parameter is required")
                .with_valid_actions(Action::names());
        };
        let Ok(action) = name.parse::<Action>() else {
            return ActionResponse::error("UNKNOWN_ACTION", format!("Unknown action: {}", name))
                .with_suggestion("Use one of the valid actions")
                .with_valid_actions(Action::names());
        };

        debug!("Handling queue action {}", action);
        let response = match action {
            Action::Add => self.add(&request).await,
            Action::Execute => Ok(self.execute().await),
            Action::ExecuteAsync => Ok(self.execute_async().await),
            Action::List => self.list(&request).await,
            Action::Clear => self.clear(&request).await,
            Action::Stats => Ok(self.stats().await),
            Action::Remove => self.remove(&request).await,
            Action::Cancel => self.cancel(&request).await,
        };

        response.unwrap_or_else(|e| {
            warn!("Queue action {} failed: {}", action, e);
            e.into()
        })
    }

    /// Enqueue a list of operations and optionally run them.
    pub async fn queue_batch(&self, request: Value) -> ActionResponse {
        let request: BatchRequest = match serde_json::from_value(request) {
            Ok(request) => request,
            Err(e) => {
                return ActionResponse::error("INVALID_BATCH", "Invalid batch request")
                    .with_details(e.to_string());
            }
        };

        let operations = match parse_operations(request.operations) {
            Ok(operations) => operations,
            Err(response) => return response,
        };
        let options = BatchOptions {
            execute_immediately: request.execute_immediately.unwrap_or(true),
            use_async: request.use_async.unwrap_or(false),
            default_timeout_ms: request.default_timeout_ms.map(|t| t.max(0) as u64),
        };

        let outcome = match queue_batch(&self.manager, operations, options).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Batch rejected: {}", e);
                return e.into();
            }
        };

        let total = outcome.operation_ids.len();
        let message = match &outcome.execution {
            None => format!("Queued {} operations", total),
            Some(BatchExecution::Completed(report)) => {
                format!("Queued {} operations. {}", total, report.message())
            }
            Some(BatchExecution::Dispatched(_)) => format!(
                "Queued {} operations and started async execution. Use 'stats' action to monitor progress",
                total
            ),
        };
        let data = json!({
            "operation_ids": outcome.operation_ids,
            "total_operations": total,
            "execution": to_json(&outcome.execution),
            "queue_stats": to_json(&self.manager.stats().await),
        });
        ActionResponse::ok(message, Some(data))
    }

    async fn add(&self, request: &ActionRequest) -> Result<ActionResponse, QueueError> {
        let Some(tool) = request.tool.as_deref().filter(|t| !t.trim().is_empty()) else {
            return Ok(ActionResponse::error("MISSING_TOOL", "Tool parameter is required for add action")
                .with_suggestion("Specify the tool to run, e.g. \"tool\": \"echo\""));
        };
        let Some(parameters) = request.parameters.clone().filter(|p| !p.is_null()) else {
            return Ok(
                ActionResponse::error("MISSING_PARAMETERS", "Parameters are required for add action")
                    .with_suggestion("Pass the tool's parameters as a JSON object"),
            );
        };

        let id = self
            .manager
            .add(tool, Some(parameters), request.timeout_ms())
            .await?;
        let record = self.manager.get(&id).await?;

        Ok(ActionResponse::ok(
            format!("Operation queued with ID: {}", id),
            Some(json!({
                "operation_id": id,
                "tool": record.tool,
                "timeout_ms": record.timeout_ms,
                "queued_at": record.enqueued_at,
                "queue_stats": to_json(&self.manager.stats().await),
            })),
        ))
    }

    async fn execute(&self) -> ActionResponse {
        let report = self.manager.execute().await;
        ActionResponse::ok(report.message(), Some(to_json(&report)))
    }

    async fn execute_async(&self) -> ActionResponse {
        let handle = self.manager.execute_async().await;
        let ack = handle.ack();
        let total = ack.operation_ids.len();
        let message = if total == 0 {
            "No pending operations to execute.".to_string()
        } else {
            format!("Started async execution of {} operations", total)
        };

        ActionResponse::ok(
            message,
            Some(json!({
                "batch_id": ack.batch_id,
                "operation_ids": ack.operation_ids,
                "total_operations": total,
                "status": "started_async",
                "message": "Use 'stats' action to monitor progress",
            })),
        )
    }

    async fn list(&self, request: &ActionRequest) -> Result<ActionResponse, QueueError> {
        let status = parse_status(request.status.as_deref())?;
        let operations = self.manager.list(status, request.limit()).await;

        Ok(ActionResponse::ok(
            format!("Found {} operations", operations.len()),
            Some(json!({
                "total_count": operations.len(),
                "operations": operations,
                "status_filter": status,
                "queue_stats": to_json(&self.manager.stats().await),
            })),
        ))
    }

    async fn clear(&self, request: &ActionRequest) -> Result<ActionResponse, QueueError> {
        let status = parse_status(request.status.as_deref())?;
        let removed = self.manager.clear(status).await?;

        Ok(ActionResponse::ok(
            format!("Cleared {} operations", removed),
            Some(json!({
                "removed_count": removed,
                "status_filter": status,
                "queue_stats": to_json(&self.manager.stats().await),
            })),
        ))
    }

    async fn stats(&self) -> ActionResponse {
        let stats = self.manager.stats().await;
        ActionResponse::ok("Queue statistics", Some(to_json(&stats)))
    }

    async fn remove(&self, request: &ActionRequest) -> Result<ActionResponse, QueueError> {
        let id = match operation_id(request) {
            Ok(id) => id,
            Err(response) => return Ok(response),
        };
        self.manager.remove(&id).await?;

        Ok(ActionResponse::ok(
            format!("Operation {} removed", id),
            Some(json!({
                "operation_id": id,
                "queue_stats": to_json(&self.manager.stats().await),
            })),
        ))
    }

    async fn cancel(&self, request: &ActionRequest) -> Result<ActionResponse, QueueError> {
        let id = match operation_id(request) {
            Ok(id) => id,
            Err(response) => return Ok(response),
        };
        self.manager.cancel(&id).await?;

        Ok(ActionResponse::ok(
            format!("Operation {} cancelled", id),
            Some(json!({
                "operation_id": id,
                "cancelled": true,
                "queue_stats": to_json(&self.manager.stats().await),
            })),
        ))
    }
}

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn parse_status(status: Option<&str>) -> Result<Option<OperationStatus>, QueueError> {
    status
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<OperationStatus>())
        .transpose()
}

/// Missing ids get their own code; malformed ids cannot exist, so they
/// surface as `OPERATION_NOT_FOUND`.
fn operation_id(request: &ActionRequest) -> Result<OperationId, ActionResponse> {
    let Some(raw) = request.operation_id.as_deref().filter(|s| !s.trim().is_empty()) else {
        return Err(
            ActionResponse::error("MISSING_OPERATION_ID", "Operation ID is required")
                .with_suggestion("Use 'list' action to see available operation IDs"),
        );
    };
    raw.parse::<OperationId>().map_err(ActionResponse::from)
}

fn parse_operations(operations: Option<Value>) -> Result<Vec<BatchOperation>, ActionResponse> {
    let items = match operations {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => {
            return Err(ActionResponse::error(
                "INVALID_BATCH",
                "Operations parameter must be a non-empty list",
            ));
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let invalid = || {
                ActionResponse::error(
                    "INVALID_BATCH",
                    format!("Operation {} is invalid - must have 'tool' and 'parameters' keys", i),
                )
                .with_details(format!("index {}", i))
            };
            let has_keys = item
                .as_object()
                .is_some_and(|o| o.contains_key("tool") && o.contains_key("parameters"));
            if !has_keys {
                return Err(invalid());
            }
            serde_json::from_value::<BatchOperation>(item)
                .map_err(|e| invalid().with_details(format!("index {}: {}", i, e)))
        })
        .collect()
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
