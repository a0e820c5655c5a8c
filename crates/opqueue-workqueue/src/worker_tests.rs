use super::*;
use std::time::Duration;

#[test]
fn test_pool_new() {
    let pool = WorkerPool::new(4);
    assert_eq!(pool.max_workers(), 4);
    assert_eq!(pool.available_workers(), 4);
    assert_eq!(pool.active(), 0);
    assert_eq!(pool.total_processed(), 0);
}

#[test]
fn test_pool_zero_workers_raised_to_one() {
    let pool = WorkerPool::new(0);
    assert_eq!(pool.max_workers(), 1);
    assert_eq!(pool.available_workers(), 1);
}

#[tokio::test]
async fn test_pool_spawn_runs_job() {
    let pool = WorkerPool::new(2);
    let flag = Arc::new(AtomicUsize::new(0));
    let seen = flag.clone();

    pool.spawn(async move {
        seen.fetch_add(1, Ordering::SeqCst);
    })
    .await
    .unwrap();

    assert_eq!(flag.load(Ordering::SeqCst), 1);
    assert_eq!(pool.total_processed(), 1);
    assert_eq!(pool.available_workers(), 2);
}

#[tokio::test]
async fn test_pool_bounds_concurrency() {
    let pool = WorkerPool::new(2);
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let running = running.clone();
            let peak = peak.clone();
            pool.spawn(async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    assert!(peak.load(Ordering::SeqCst) <= 2);
    assert_eq!(pool.total_processed(), 6);
}
