//! Batch reports, dispatch handles and queue statistics.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::QueueError;
use crate::operation::{OperationId, OperationRecord, OperationStatus};

/// Outcome of a synchronous batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub executed: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub cancelled: usize,
    /// Final state of every batch record, in snapshot order.
    pub records: Vec<OperationRecord>,
}

impl BatchReport {
    /// Summarize a list of records.
    pub fn from_records(records: Vec<OperationRecord>) -> Self {
        let mut report = Self {
            total: records.len(),
            ..Default::default()
        };
        for record in &records {
            match record.status {
                OperationStatus::Executed => report.executed += 1,
                OperationStatus::Failed => report.failed += 1,
                OperationStatus::Timeout => report.timed_out += 1,
                OperationStatus::Cancelled => report.cancelled += 1,
                OperationStatus::Pending | OperationStatus::Executing => {}
            }
        }
        report.records = records;
        report
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// One-line summary.
    pub fn message(&self) -> String {
        if self.is_empty() {
            return "No pending operations to execute.".to_string();
        }
        let mut message = format!(
            "Batch executed: {} successful, {} failed",
            self.executed, self.failed
        );
        if self.timed_out > 0 {
            message.push_str(&format!(", {} timed out", self.timed_out));
        }
        if self.cancelled > 0 {
            message.push_str(&format!(", {} cancelled", self.cancelled));
        }
        message
    }
}

/// Acknowledgement that an async batch was dispatched.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchAck {
    pub batch_id: Uuid,
    /// Records claimed by this batch, now `executing`.
    pub operation_ids: Vec<OperationId>,
}

/// Handle to an asynchronous batch.
///
/// Dropping it detaches the workers; they keep running.
pub struct BatchHandle {
    ack: DispatchAck,
    workers: Vec<JoinHandle<()>>,
}

impl BatchHandle {
    pub(crate) fn new(ack: DispatchAck, workers: Vec<JoinHandle<()>>) -> Self {
        Self { ack, workers }
    }

    pub fn ack(&self) -> &DispatchAck {
        &self.ack
    }

    pub fn operation_ids(&self) -> &[OperationId] {
        &self.ack.operation_ids
    }

    /// Wait until every dispatched record has been processed.
    ///
    /// Outcomes are read back through `list`/`stats`.
    pub async fn wait(self) -> Result<DispatchAck, QueueError> {
        for joined in futures::future::join_all(self.workers).await {
            joined.map_err(|e| QueueError::WorkerError(e.to_string()))?;
        }
        Ok(self.ack)
    }
}

impl fmt::Debug for BatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchHandle")
            .field("ack", &self.ack)
            .field("workers", &self.workers.len())
            .finish()
    }
}

impl Serialize for BatchHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.ack.serialize(serializer)
    }
}

/// Record counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub executing: usize,
    pub executed: usize,
    pub failed: usize,
    pub timeout: usize,
    pub cancelled: usize,
}

impl StatusCounts {
    pub(crate) fn bump(&mut self, status: OperationStatus) {
        match status {
            OperationStatus::Pending => self.pending += 1,
            OperationStatus::Executing => self.executing += 1,
            OperationStatus::Executed => self.executed += 1,
            OperationStatus::Failed => self.failed += 1,
            OperationStatus::Timeout => self.timeout += 1,
            OperationStatus::Cancelled => self.cancelled += 1,
        }
    }

    pub fn get(&self, status: OperationStatus) -> usize {
        match status {
            OperationStatus::Pending => self.pending,
            OperationStatus::Executing => self.executing,
            OperationStatus::Executed => self.executed,
            OperationStatus::Failed => self.failed,
            OperationStatus::Timeout => self.timeout,
            OperationStatus::Cancelled => self.cancelled,
        }
    }

    pub fn terminal(&self) -> usize {
        self.executed + self.failed + self.timeout + self.cancelled
    }
}

/// Point-in-time queue statistics.
#[derive(Debug, Clone, Serialize)]
pub struct QueueStats {
    /// Records currently held.
    pub total_operations: usize,
    /// Records ever enqueued on this manager.
    pub total_enqueued: u64,
    #[serde(flatten)]
    pub counts: StatusCounts,
    /// Mean `finished_at - started_at` over records that ran.
    pub average_turnaround_ms: Option<f64>,
    pub oldest_enqueued_at: Option<DateTime<Utc>>,
    pub newest_enqueued_at: Option<DateTime<Utc>>,
    pub max_workers: u32,
    pub available_workers: usize,
    /// Pool jobs currently running an operation.
    pub active_workers: usize,
    /// Pool jobs finished since the manager was created.
    pub processed_jobs: u64,
}
