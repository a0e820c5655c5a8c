//! Bounded worker pool for asynchronous batches.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Runs spawned jobs with at most `max_workers` in progress at once.
///
/// Jobs are spawned immediately; each waits for a permit inside its own
/// task, so spawning never blocks the caller.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    max_workers: u32,
    semaphore: Arc<Semaphore>,
    active: Arc<AtomicUsize>,
    total_processed: Arc<AtomicU64>,
}

impl WorkerPool {
    /// Create a pool. Zero workers is raised to one.
    pub fn new(max_workers: u32) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            max_workers,
            semaphore: Arc::new(Semaphore::new(max_workers as usize)),
            active: Arc::new(AtomicUsize::new(0)),
            total_processed: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn max_workers(&self) -> u32 {
        self.max_workers
    }

    /// Permits not currently held by a running job.
    pub fn available_workers(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Jobs currently holding a permit.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Jobs finished since the pool was created.
    pub fn total_processed(&self) -> u64 {
        self.total_processed.load(Ordering::SeqCst)
    }

    /// Spawn a job onto the pool.
    pub fn spawn<F>(&self, job: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let semaphore = self.semaphore.clone();
        let active = self.active.clone();
        let total_processed = self.total_processed.clone();

        tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    warn!("Worker pool closed before job could start: {}", e);
                    return;
                }
            };

            active.fetch_add(1, Ordering::SeqCst);
            job.await;
            active.fetch_sub(1, Ordering::SeqCst);
            let done = total_processed.fetch_add(1, Ordering::SeqCst) + 1;
            debug!("Worker job finished ({} processed)", done);
        })
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
