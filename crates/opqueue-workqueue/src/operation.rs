//! Operation records and status.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use opqueue_protocols::executor::Parameters;

use crate::error::QueueError;

/// Identifier of a queued operation, rendered as `op_<n>`.
///
/// Sequence numbers come from a per-manager counter and are never reused,
/// so ordering by id is insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct OperationId(u64);

impl OperationId {
    const PREFIX: &'static str = "op_";

    /// Create an id from a sequence number.
    pub fn new(sequence: u64) -> Self {
        Self(sequence)
    }

    /// The underlying sequence number.
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.0)
    }
}

impl FromStr for OperationId {
    type Err = QueueError;

    /// A string that is not a well-formed id cannot name any operation,
    /// so parse failures surface as `NotFound`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .strip_prefix(Self::PREFIX)
            .and_then(|n| n.parse::<u64>().ok())
            .map(Self)
            .ok_or_else(|| QueueError::NotFound(s.to_string()))
    }
}

impl From<OperationId> for String {
    fn from(id: OperationId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for OperationId {
    type Error = QueueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Operation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    /// Waiting for an execute call.
    Pending,
    /// Claimed by a batch.
    Executing,
    /// Executor returned success.
    Executed,
    /// Executor returned an error.
    Failed,
    /// Time budget elapsed before the executor answered.
    Timeout,
    /// Cancelled by the caller.
    Cancelled,
}

impl OperationStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [OperationStatus; 6] = [
        OperationStatus::Pending,
        OperationStatus::Executing,
        OperationStatus::Executed,
        OperationStatus::Failed,
        OperationStatus::Timeout,
        OperationStatus::Cancelled,
    ];

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Executing => "executing",
            Self::Executed => "executed",
            Self::Failed => "failed",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
        }
    }

    /// No transition leaves a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Executed | Self::Failed | Self::Timeout | Self::Cancelled
        )
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationStatus {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|s| s.as_str()).collect();
                QueueError::Validation(format!(
                    "Unknown status '{}', valid values: {}",
                    s,
                    valid.join(", ")
                ))
            })
    }
}

/// Error captured on a failed or timed-out operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationError {
    /// Human-readable message.
    pub message: String,
    /// Structured code, when the executor provided one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl OperationError {
    pub fn new(message: impl Into<String>, code: Option<String>) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }
}

/// Input for enqueueing one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationSpec {
    pub tool: String,
    /// Must be a JSON object; `None` and `null` are rejected.
    pub parameters: Option<serde_json::Value>,
    pub timeout_ms: Option<u64>,
}

impl OperationSpec {
    pub fn new(tool: impl Into<String>, parameters: serde_json::Value) -> Self {
        Self {
            tool: tool.into(),
            parameters: Some(parameters),
            timeout_ms: None,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

/// One queued unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRecord {
    pub id: OperationId,
    pub tool: String,
    pub parameters: Parameters,
    pub timeout_ms: u64,
    pub status: OperationStatus,
    /// Set only when `status == executed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Set only when `status` is `failed` or `timeout`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
    pub enqueued_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl OperationRecord {
    /// Create a pending record.
    pub fn new(id: OperationId, tool: impl Into<String>, parameters: Parameters, timeout_ms: u64) -> Self {
        Self {
            id,
            tool: tool.into(),
            parameters,
            timeout_ms,
            status: OperationStatus::Pending,
            result: None,
            error: None,
            enqueued_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// `finished_at - started_at`, for records that actually ran.
    pub fn turnaround(&self) -> Option<chrono::Duration> {
        match (self.started_at, self.finished_at) {
            (Some(started), Some(finished)) => Some(finished - started),
            _ => None,
        }
    }

    pub(crate) fn mark_executing(&mut self) {
        self.status = OperationStatus::Executing;
    }

    pub(crate) fn mark_started(&mut self) {
        self.started_at = Some(Utc::now());
    }

    pub(crate) fn complete(&mut self, result: serde_json::Value) {
        self.status = OperationStatus::Executed;
        self.result = Some(result);
        self.finished_at = Some(Utc::now());
    }

    pub(crate) fn fail(&mut self, error: OperationError) {
        self.status = OperationStatus::Failed;
        self.error = Some(error);
        self.finished_at = Some(Utc::now());
    }

    pub(crate) fn time_out(&mut self) {
        self.status = OperationStatus::Timeout;
        self.error = Some(OperationError::new(
            format!("Operation timed out after {}ms", self.timeout_ms),
            Some("TIMEOUT".to_string()),
        ));
        self.finished_at = Some(Utc::now());
    }

    pub(crate) fn cancel(&mut self) {
        self.status = OperationStatus::Cancelled;
        self.finished_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> OperationRecord {
        OperationRecord::new(OperationId::new(1), "echo", Parameters::new(), 30_000)
    }

    #[test]
    fn test_operation_id_display_and_parse() {
        let id = OperationId::new(42);
        assert_eq!(id.to_string(), "op_42");
        assert_eq!("op_42".parse::<OperationId>().unwrap(), id);
        assert_eq!(" op_42 ".parse::<OperationId>().unwrap(), id);
    }

    #[test]
    fn test_operation_id_parse_garbage_is_not_found() {
        assert!(matches!("42".parse::<OperationId>(), Err(QueueError::NotFound(_))));
        assert!(matches!("op_x".parse::<OperationId>(), Err(QueueError::NotFound(_))));
    }

    #[test]
    fn test_operation_id_serializes_as_string() {
        let json = serde_json::to_string(&OperationId::new(3)).unwrap();
        assert_eq!(json, "\"op_3\"");
        let back: OperationId = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sequence(), 3);
    }

    #[test]
    fn test_operation_id_ordering_follows_sequence() {
        assert!(OperationId::new(2) < OperationId::new(10));
    }

    #[test]
    fn test_status_parse_case_insensitive() {
        assert_eq!("FAILED".parse::<OperationStatus>().unwrap(), OperationStatus::Failed);
        assert_eq!("timeout".parse::<OperationStatus>().unwrap(), OperationStatus::Timeout);
    }

    #[test]
    fn test_status_parse_unknown_lists_valid_values() {
        let err = "done".parse::<OperationStatus>().unwrap_err();
        assert!(err.to_string().contains("executed"));
        assert!(err.to_string().contains("cancelled"));
    }

    #[test]
    fn test_terminal_statuses() {
        let terminal: Vec<_> = OperationStatus::ALL.iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal.len(), 4);
        assert!(!OperationStatus::Pending.is_terminal());
        assert!(!OperationStatus::Executing.is_terminal());
    }

    #[test]
    fn test_status_serde_lowercase() {
        let json = serde_json::to_string(&OperationStatus::Executing).unwrap();
        assert_eq!(json, "\"executing\"");
    }

    #[test]
    fn test_new_record_is_pending_without_outcome() {
        let rec = record();
        assert_eq!(rec.status, OperationStatus::Pending);
        assert!(rec.result.is_none());
        assert!(rec.error.is_none());
        assert!(rec.turnaround().is_none());
        assert_eq!(rec.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_complete_sets_result_only() {
        let mut rec = record();
        rec.mark_executing();
        rec.mark_started();
        rec.complete(serde_json::json!({"ok": true}));
        assert_eq!(rec.status, OperationStatus::Executed);
        assert!(rec.result.is_some());
        assert!(rec.error.is_none());
        assert!(rec.turnaround().is_some());
    }

    #[test]
    fn test_time_out_records_error() {
        let mut rec = record();
        rec.mark_executing();
        rec.time_out();
        assert_eq!(rec.status, OperationStatus::Timeout);
        let err = rec.error.unwrap();
        assert!(err.message.contains("30000ms"));
        assert_eq!(err.code.as_deref(), Some("TIMEOUT"));
    }

    #[test]
    fn test_cancel_leaves_no_outcome() {
        let mut rec = record();
        rec.cancel();
        assert_eq!(rec.status, OperationStatus::Cancelled);
        assert!(rec.result.is_none());
        assert!(rec.error.is_none());
        assert!(rec.finished_at.is_some());
    }
}
