//! Queue manager.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use opqueue_config::QueueConfig;
use opqueue_protocols::executor::{OperationExecutor, Parameters};
use opqueue_protocols::tool::AbortSignal;

use crate::error::QueueError;
use crate::operation::{OperationId, OperationRecord, OperationSpec, OperationStatus};
use crate::report::QueueStats;
use crate::store::QueueStore;
use crate::worker::WorkerPool;

/// Handles of a claimed operation, used to interrupt it.
pub(crate) struct InFlight {
    pub(crate) token: CancellationToken,
    pub(crate) abort_signal: Arc<AbortSignal>,
}

impl InFlight {
    pub(crate) fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            abort_signal: Arc::new(AbortSignal::new()),
        }
    }

    pub(crate) fn interrupt(&self) {
        self.abort_signal.abort();
        self.token.cancel();
    }
}

/// Owns the operation store and drives records through their lifecycle.
///
/// All transitions happen under the store's write lock. Executor calls never
/// hold it.
pub struct QueueManager {
    pub(crate) config: QueueConfig,
    pub(crate) executor: Arc<dyn OperationExecutor>,
    pub(crate) store: RwLock<QueueStore>,
    pub(crate) in_flight: DashMap<OperationId, InFlight>,
    pub(crate) pool: WorkerPool,
    next_seq: AtomicU64,
    total_enqueued: AtomicU64,
}

impl QueueManager {
    /// Create a manager over an executor.
    pub fn new(config: QueueConfig, executor: Arc<dyn OperationExecutor>) -> Self {
        let pool = WorkerPool::new(config.max_workers);
        Self {
            config,
            executor,
            store: RwLock::new(QueueStore::new()),
            in_flight: DashMap::new(),
            pool,
            next_seq: AtomicU64::new(1),
            total_enqueued: AtomicU64::new(0),
        }
    }

    /// Get configuration.
    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Effective timeout for a requested value.
    pub fn effective_timeout_ms(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.config.default_timeout_ms)
            .max(self.config.min_timeout_ms)
    }

    /// Enqueue one operation. Nothing runs until `execute` or `execute_async`.
    pub async fn add(
        &self,
        tool: impl Into<String>,
        parameters: Option<Value>,
        timeout_ms: Option<u64>,
    ) -> Result<OperationId, QueueError> {
        let (tool, parameters, timeout_ms) = self.validate(tool.into(), parameters, timeout_ms)?;

        let mut store = self.store.write().await;
        self.make_room(&mut store, 1)?;
        let id = self.insert(&mut store, tool, parameters, timeout_ms)?;
        Ok(id)
    }

    /// Enqueue several operations. Either all are enqueued or none is.
    pub async fn add_many(&self, specs: Vec<OperationSpec>) -> Result<Vec<OperationId>, QueueError> {
        let validated = specs
            .into_iter()
            .enumerate()
            .map(|(i, spec)| {
                self.validate(spec.tool, spec.parameters, spec.timeout_ms)
                    .map_err(|e| match e {
                        QueueError::Validation(msg) => {
                            QueueError::Validation(format!("Operation {}: {}", i, msg))
                        }
                        other => other,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut store = self.store.write().await;
        self.make_room(&mut store, validated.len())?;

        let mut ids = Vec::with_capacity(validated.len());
        for (tool, parameters, timeout_ms) in validated {
            ids.push(self.insert(&mut store, tool, parameters, timeout_ms)?);
        }
        info!("Enqueued {} operations", ids.len());
        Ok(ids)
    }

    /// Point-in-time copy of one record.
    pub async fn get(&self, id: &OperationId) -> Result<OperationRecord, QueueError> {
        self.store.read().await.get(id).cloned()
    }

    /// Records in insertion order, optionally filtered and capped.
    pub async fn list(&self, status: Option<OperationStatus>, limit: Option<usize>) -> Vec<OperationRecord> {
        self.store.read().await.filter(status, limit)
    }

    /// Remove a record that is not executing.
    pub async fn remove(&self, id: &OperationId) -> Result<OperationRecord, QueueError> {
        let mut store = self.store.write().await;
        let status = store.get(id)?.status;
        if status == OperationStatus::Executing {
            return Err(QueueError::InvalidState {
                id: id.to_string(),
                status,
                action: "remove",
            });
        }
        let record = store.delete(id)?;
        debug!("Removed operation {} ({})", id, status);
        Ok(record)
    }

    /// Cancel a pending or executing record.
    ///
    /// A running record is cancelled only when the executor can interrupt
    /// its tool; the record turns `cancelled` before this returns.
    pub async fn cancel(&self, id: &OperationId) -> Result<(), QueueError> {
        let mut store = self.store.write().await;
        let record = store.get_mut(id)?;

        match record.status {
            OperationStatus::Pending => {
                record.cancel();
                info!("Cancelled pending operation {}", id);
            }
            OperationStatus::Executing => {
                if record.started_at.is_some() && !self.executor.supports_interruption(&record.tool) {
                    return Err(QueueError::NotCancellable(id.to_string()));
                }
                record.cancel();
                if let Some((_, flight)) = self.in_flight.remove(id) {
                    flight.interrupt();
                }
                warn!("Cancelled executing operation {} ({})", id, record.tool);
            }
            status => {
                return Err(QueueError::InvalidState {
                    id: id.to_string(),
                    status,
                    action: "cancel",
                });
            }
        }
        Ok(())
    }

    /// Remove records by status, or every terminal record when `status` is
    /// `None`. Returns the number removed.
    pub async fn clear(&self, status: Option<OperationStatus>) -> Result<usize, QueueError> {
        let mut store = self.store.write().await;
        let removed = match status {
            None => store.delete_terminal(),
            Some(OperationStatus::Executing) => {
                return Err(QueueError::Validation(
                    "Executing operations cannot be cleared; cancel them first".to_string(),
                ));
            }
            Some(status) => store.delete_where(Some(status))?,
        };
        info!(
            "Cleared {} operations ({})",
            removed,
            status.map(|s| s.as_str()).unwrap_or("terminal")
        );
        Ok(removed)
    }

    /// Queue statistics.
    pub async fn stats(&self) -> QueueStats {
        let store = self.store.read().await;

        let turnarounds: Vec<f64> = store
            .iter()
            .filter_map(|r| r.turnaround())
            .map(|d| d.num_microseconds().unwrap_or(i64::MAX) as f64 / 1000.0)
            .collect();
        let average_turnaround_ms = if turnarounds.is_empty() {
            None
        } else {
            Some(turnarounds.iter().sum::<f64>() / turnarounds.len() as f64)
        };

        QueueStats {
            total_operations: store.len(),
            total_enqueued: self.total_enqueued.load(Ordering::SeqCst),
            counts: store.counts(),
            average_turnaround_ms,
            oldest_enqueued_at: store.iter().map(|r| r.enqueued_at).min(),
            newest_enqueued_at: store.iter().map(|r| r.enqueued_at).max(),
            max_workers: self.pool.max_workers(),
            available_workers: self.pool.available_workers(),
            active_workers: self.pool.active(),
            processed_jobs: self.pool.total_processed(),
        }
    }

    fn validate(
        &self,
        tool: String,
        parameters: Option<Value>,
        timeout_ms: Option<u64>,
    ) -> Result<(String, Parameters, u64), QueueError> {
        let tool = tool.trim().to_string();
        if tool.is_empty() {
            return Err(QueueError::Validation("Tool name is required".to_string()));
        }
        let parameters = match parameters {
            Some(Value::Object(map)) => map,
            None | Some(Value::Null) => {
                return Err(QueueError::Validation("Parameters are required".to_string()));
            }
            Some(_) => {
                return Err(QueueError::Validation("Parameters must be a JSON object".to_string()));
            }
        };
        Ok((tool, parameters, self.effective_timeout_ms(timeout_ms)))
    }

    fn make_room(&self, store: &mut QueueStore, incoming: usize) -> Result<(), QueueError> {
        let threshold = self.config.auto_cleanup_threshold;
        if threshold > 0 && store.len() >= threshold {
            let pruned = store.prune_terminal(self.config.keep_completed);
            if pruned > 0 {
                info!(
                    "Auto-cleanup removed {} completed operations ({} remain)",
                    pruned,
                    store.len()
                );
            }
        }

        let max = self.config.max_queue_size;
        if max > 0 && store.len() + incoming > max {
            warn!("Queue full: {} held, {} incoming, limit {}", store.len(), incoming, max);
            return Err(QueueError::QueueFull(max));
        }
        Ok(())
    }

    fn insert(
        &self,
        store: &mut QueueStore,
        tool: String,
        parameters: Parameters,
        timeout_ms: u64,
    ) -> Result<OperationId, QueueError> {
        let id = OperationId::new(self.next_seq.fetch_add(1, Ordering::SeqCst));
        store.insert(OperationRecord::new(id, tool, parameters, timeout_ms))?;
        self.total_enqueued.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
