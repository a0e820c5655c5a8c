use super::*;
use opqueue_protocols::executor::Parameters;

fn record(seq: u64, status: OperationStatus) -> OperationRecord {
    let mut rec = OperationRecord::new(OperationId::new(seq), format!("tool{}", seq), Parameters::new(), 1000);
    rec.status = status;
    rec
}

fn store_with(statuses: &[OperationStatus]) -> QueueStore {
    let mut store = QueueStore::new();
    for (i, status) in statuses.iter().enumerate() {
        store.insert(record(i as u64 + 1, *status)).unwrap();
    }
    store
}

#[test]
fn test_insert_and_get() {
    let mut store = QueueStore::new();
    store.insert(record(1, OperationStatus::Pending)).unwrap();
    assert_eq!(store.get(&OperationId::new(1)).unwrap().tool, "tool1");
    assert_eq!(store.len(), 1);
}

#[test]
fn test_insert_duplicate() {
    let mut store = QueueStore::new();
    store.insert(record(1, OperationStatus::Pending)).unwrap();
    let result = store.insert(record(1, OperationStatus::Pending));
    assert!(matches!(result, Err(QueueError::DuplicateId(_))));
}

#[test]
fn test_get_missing() {
    let store = QueueStore::new();
    assert!(matches!(store.get(&OperationId::new(9)), Err(QueueError::NotFound(_))));
}

#[test]
fn test_filter_insertion_order_status_and_limit() {
    use OperationStatus::*;
    let store = store_with(&[Executed, Pending, Executed, Failed, Executed]);

    let all = store.filter(None, None);
    let seqs: Vec<u64> = all.iter().map(|r| r.id.sequence()).collect();
    assert_eq!(seqs, vec![1, 2, 3, 4, 5]);

    let executed = store.filter(Some(Executed), Some(2));
    let seqs: Vec<u64> = executed.iter().map(|r| r.id.sequence()).collect();
    assert_eq!(seqs, vec![1, 3]);
}

#[test]
fn test_pending_ids() {
    use OperationStatus::*;
    let store = store_with(&[Pending, Executing, Pending]);
    let ids: Vec<u64> = store.pending_ids().iter().map(|id| id.sequence()).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn test_delete() {
    let mut store = store_with(&[OperationStatus::Pending]);
    let removed = store.delete(&OperationId::new(1)).unwrap();
    assert_eq!(removed.id.sequence(), 1);
    assert!(store.is_empty());
    assert!(store.delete(&OperationId::new(1)).is_err());
}

#[test]
fn test_delete_where_requires_status() {
    let mut store = store_with(&[OperationStatus::Failed]);
    assert!(matches!(store.delete_where(None), Err(QueueError::Validation(_))));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_delete_where_status() {
    use OperationStatus::*;
    let mut store = store_with(&[Failed, Executed, Failed, Pending]);
    assert_eq!(store.delete_where(Some(Failed)).unwrap(), 2);
    assert_eq!(store.counts().failed, 0);
    assert_eq!(store.len(), 2);
}

#[test]
fn test_delete_terminal_keeps_in_flight() {
    use OperationStatus::*;
    let mut store = store_with(&[Pending, Executing, Executed, Failed, Timeout, Cancelled]);
    assert_eq!(store.delete_terminal(), 4);
    let counts = store.counts();
    assert_eq!(counts.pending, 1);
    assert_eq!(counts.executing, 1);
}

#[test]
fn test_prune_terminal_keeps_newest() {
    use OperationStatus::*;
    let mut store = store_with(&[Executed, Pending, Executed, Failed, Executed]);
    assert_eq!(store.prune_terminal(2), 2);
    let seqs: Vec<u64> = store.iter().map(|r| r.id.sequence()).collect();
    assert_eq!(seqs, vec![2, 4, 5]);
}

#[test]
fn test_counts() {
    use OperationStatus::*;
    let store = store_with(&[Pending, Pending, Timeout]);
    let counts = store.counts();
    assert_eq!(counts.pending, 2);
    assert_eq!(counts.timeout, 1);
    assert_eq!(counts.executed, 0);
}
