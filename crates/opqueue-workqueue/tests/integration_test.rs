//! End-to-end queue behavior with scripted executors.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use opqueue_protocols::error::ExecutorError;
use opqueue_protocols::executor::{ExecutionRequest, OperationExecutor};
use opqueue_workqueue::{
    queue_batch, BatchExecution, BatchOperation, BatchOptions, OperationStatus, QueueConfig,
    QueueManager, SharedQueueManager,
};

/// Sleeps for `delay_ms`, fails when `fail` is set, and tracks peak
/// concurrency.
#[derive(Default)]
struct DelayExecutor {
    running: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

#[async_trait]
impl OperationExecutor for DelayExecutor {
    async fn execute(&self, request: ExecutionRequest) -> Result<Value, ExecutorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = request
            .parameters
            .get("delay_ms")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.running.fetch_sub(1, Ordering::SeqCst);

        if request.parameters.get("fail").and_then(Value::as_bool) == Some(true) {
            return Err(ExecutorError::failed_with_code("scripted failure", "SCRIPTED"));
        }
        Ok(json!({"tool": request.tool, "operation_id": request.operation_id}))
    }

    fn supports_interruption(&self, _tool: &str) -> bool {
        true
    }
}

fn setup(max_workers: u32) -> (SharedQueueManager, Arc<DelayExecutor>) {
    let executor = Arc::new(DelayExecutor::default());
    let config = QueueConfig {
        max_workers,
        ..Default::default()
    };
    let manager = Arc::new(QueueManager::new(config, executor.clone()));
    (manager, executor)
}

#[tokio::test(start_paused = true)]
async fn test_async_batch_respects_worker_limit() {
    let (manager, executor) = setup(2);
    for _ in 0..6 {
        manager
            .add("work", Some(json!({"delay_ms": 100})), None)
            .await
            .unwrap();
    }

    let handle = manager.execute_async().await;
    assert_eq!(
        manager.list(Some(OperationStatus::Executing), None).await.len(),
        6
    );

    handle.wait().await.unwrap();
    assert!(executor.peak.load(Ordering::SeqCst) <= 2);
    assert_eq!(manager.stats().await.counts.executed, 6);
}

#[tokio::test(start_paused = true)]
async fn test_partial_failure_all_terminal() {
    let (manager, _) = setup(4);
    let operations: Vec<BatchOperation> = (0..5)
        .map(|i| BatchOperation::new("work", json!({"delay_ms": 10, "fail": i % 2 == 0})))
        .collect();

    let outcome = queue_batch(&manager, operations, BatchOptions::default())
        .await
        .unwrap();
    let Some(BatchExecution::Completed(report)) = outcome.execution else {
        panic!("expected a completed batch");
    };

    assert_eq!(report.total, 5);
    assert_eq!(report.failed, 3);
    assert_eq!(report.executed, 2);
    for record in manager.list(None, None).await {
        assert!(record.is_terminal());
        if record.status == OperationStatus::Failed {
            assert_eq!(record.error.unwrap().code.as_deref(), Some("SCRIPTED"));
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_timeout_produces_timeout_status() {
    let (manager, _) = setup(1);
    let slow = manager
        .add("work", Some(json!({"delay_ms": 5000})), Some(1000))
        .await
        .unwrap();
    let quick = manager
        .add("work", Some(json!({"delay_ms": 10})), Some(1000))
        .await
        .unwrap();

    let report = manager.execute().await;
    assert_eq!(report.timed_out, 1);
    assert_eq!(report.executed, 1);
    assert_eq!(manager.get(&slow).await.unwrap().status, OperationStatus::Timeout);
    assert_eq!(manager.get(&quick).await.unwrap().status, OperationStatus::Executed);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_race_yields_single_outcome() {
    let (manager, executor) = setup(1);
    let id = manager
        .add("work", Some(json!({"delay_ms": 500})), None)
        .await
        .unwrap();

    let handle = manager.execute_async().await;
    while executor.calls.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }

    manager.cancel(&id).await.unwrap();
    handle.wait().await.unwrap();
    tokio::time::sleep(Duration::from_millis(1000)).await;

    let record = manager.get(&id).await.unwrap();
    assert_eq!(record.status, OperationStatus::Cancelled);
    assert!(record.result.is_none());
    assert!(record.error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_execute_never_runs_a_record_twice() {
    let (manager, executor) = setup(4);
    for _ in 0..8 {
        manager
            .add("work", Some(json!({"delay_ms": 20})), None)
            .await
            .unwrap();
    }

    let handle = manager.execute_async().await;
    let inline = manager.execute().await;
    handle.wait().await.unwrap();

    assert_eq!(inline.total, 0);
    assert_eq!(executor.calls.load(Ordering::SeqCst), 8);
    assert_eq!(manager.stats().await.counts.executed, 8);
}

#[tokio::test]
async fn test_independent_queues() {
    let (first, _) = setup(1);
    let (second, _) = setup(1);
    first.add("work", Some(json!({})), None).await.unwrap();

    assert_eq!(first.stats().await.total_operations, 1);
    assert_eq!(second.stats().await.total_operations, 0);
}

#[tokio::test(start_paused = true)]
async fn test_list_then_clear_lifecycle() {
    let (manager, _) = setup(2);
    for i in 0..10 {
        manager
            .add("work", Some(json!({"i": i, "fail": i >= 7})), None)
            .await
            .unwrap();
    }
    manager.execute().await;

    let first_five = manager.list(Some(OperationStatus::Executed), Some(5)).await;
    let seqs: Vec<u64> = first_five.iter().map(|r| r.id.sequence()).collect();
    assert_eq!(seqs, vec![1, 2, 3, 4, 5]);

    assert_eq!(manager.clear(Some(OperationStatus::Failed)).await.unwrap(), 3);
    assert_eq!(manager.clear(None).await.unwrap(), 7);
    assert_eq!(manager.stats().await.total_operations, 0);
    assert_eq!(manager.stats().await.total_enqueued, 10);
}
