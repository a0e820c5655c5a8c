//! Batch execution for [`QueueManager`].

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use opqueue_protocols::error::ExecutorError;
use opqueue_protocols::executor::ExecutionRequest;

use crate::manager::{InFlight, QueueManager};
use crate::operation::{OperationError, OperationId, OperationStatus};
use crate::report::{BatchHandle, BatchReport, DispatchAck};
use crate::store::QueueStore;

type Outcome = Result<serde_json::Value, ExecutorError>;

impl QueueManager {
    /// Run every currently pending record, one at a time, in insertion
    /// order. Records enqueued during the run wait for the next batch.
    pub async fn execute(&self) -> BatchReport {
        let snapshot = self.store.read().await.pending_ids();
        if snapshot.is_empty() {
            debug!("No pending operations to execute");
            return BatchReport::default();
        }
        info!("Executing batch of {} operations", snapshot.len());

        let mut records = Vec::with_capacity(snapshot.len());
        for id in snapshot {
            let claimed = {
                let mut store = self.store.write().await;
                self.claim(&mut store, &[id])
            };
            if claimed.is_empty() {
                debug!("Skipping operation {}: no longer pending", id);
                continue;
            }

            self.run_claimed(id).await;

            match self.get(&id).await {
                Ok(record) => records.push(record),
                Err(_) => debug!("Operation {} removed during batch", id),
            }
        }

        let report = BatchReport::from_records(records);
        info!("{}", report.message());
        report
    }

    /// Claim every pending record and run them on the worker pool.
    ///
    /// Returns once the records are `executing`, without waiting for them.
    pub async fn execute_async(self: &Arc<Self>) -> BatchHandle {
        let claimed = {
            let mut store = self.store.write().await;
            let pending = store.pending_ids();
            self.claim(&mut store, &pending)
        };

        let ack = DispatchAck {
            batch_id: Uuid::new_v4(),
            operation_ids: claimed.clone(),
        };
        info!(
            "Dispatching batch {} with {} operations to {} workers",
            ack.batch_id,
            claimed.len(),
            self.pool.max_workers()
        );

        let workers = claimed
            .into_iter()
            .map(|id| {
                let manager = Arc::clone(self);
                self.pool.spawn(async move { manager.run_claimed(id).await })
            })
            .collect();

        BatchHandle::new(ack, workers)
    }

    /// Move pending records to `executing` and register their interrupt
    /// handles. Returns the ids actually claimed.
    fn claim(&self, store: &mut QueueStore, ids: &[OperationId]) -> Vec<OperationId> {
        let mut claimed = Vec::with_capacity(ids.len());
        for id in ids {
            let Ok(record) = store.get_mut(id) else {
                continue;
            };
            if record.status != OperationStatus::Pending {
                continue;
            }
            record.mark_executing();
            self.in_flight.insert(*id, InFlight::new());
            debug!("Operation {} claimed ({})", id, record.tool);
            claimed.push(*id);
        }
        claimed
    }

    /// Mark a claimed record as started and build its executor request.
    ///
    /// `None` when the record was cancelled or removed since it was claimed.
    async fn begin(&self, id: OperationId) -> Option<(ExecutionRequest, CancellationToken)> {
        let mut store = self.store.write().await;
        let record = store.get_mut(&id).ok()?;
        if record.status != OperationStatus::Executing || record.started_at.is_some() {
            return None;
        }
        let (token, abort_signal) = {
            let flight = self.in_flight.get(&id)?;
            (flight.token.clone(), flight.abort_signal.clone())
        };

        record.mark_started();
        let mut request = ExecutionRequest::new(
            id.to_string(),
            record.tool.clone(),
            record.parameters.clone(),
            record.timeout(),
        );
        request.abort_signal = abort_signal;
        Some((request, token))
    }

    /// Run one claimed record end-to-end.
    pub(crate) async fn run_claimed(&self, id: OperationId) {
        let Some((request, token)) = self.begin(id).await else {
            debug!("Operation {} not started: cancelled or removed", id);
            return;
        };

        let signal = request.abort_signal.clone();
        let budget = request.timeout;
        debug!("Operation {} started ({}, {}ms)", id, request.tool, budget.as_millis());

        let call = AssertUnwindSafe(self.executor.execute(request)).catch_unwind();
        let outcome: Outcome = tokio::select! {
            biased;
            _ = token.cancelled() => Err(ExecutorError::Interrupted),
            result = tokio::time::timeout(budget, call) => match result {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(panic)) => Err(ExecutorError::failed_with_code(
                    format!("Executor panicked: {}", panic_message(&*panic)),
                    "EXECUTOR_PANIC",
                )),
                Err(_) => Err(ExecutorError::Timeout(budget.as_millis() as u64)),
            },
        };

        if matches!(outcome, Err(ExecutorError::Timeout(_)) | Err(ExecutorError::Interrupted)) {
            signal.abort();
        }
        self.finish(id, outcome).await;
    }

    /// Apply an outcome, unless the record already left `executing`.
    async fn finish(&self, id: OperationId, outcome: Outcome) {
        self.in_flight.remove(&id);

        let mut store = self.store.write().await;
        let Ok(record) = store.get_mut(&id) else {
            debug!("Operation {} removed before its outcome arrived", id);
            return;
        };
        if record.status != OperationStatus::Executing {
            debug!("Discarding late outcome for operation {} ({})", id, record.status);
            return;
        }

        match outcome {
            Ok(value) => {
                record.complete(value);
                debug!("Operation {} executed", id);
            }
            Err(ExecutorError::Timeout(_)) => {
                record.time_out();
                warn!("Operation {} timed out after {}ms", id, record.timeout_ms);
            }
            Err(e) => {
                error!("Operation {} failed: {}", id, e);
                let code = e.code().map(str::to_string);
                record.fail(OperationError::new(e.to_string(), code));
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic"
    }
}
