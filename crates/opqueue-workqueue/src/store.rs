//! In-memory operation store.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::QueueError;
use crate::operation::{OperationId, OperationRecord, OperationStatus};
use crate::report::StatusCounts;

/// Keyed collection of operation records.
///
/// Ids are allocated monotonically, so iterating the map in key order is
/// insertion order.
#[derive(Debug, Default)]
pub struct QueueStore {
    records: BTreeMap<OperationId, OperationRecord>,
}

impl QueueStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new record.
    pub fn insert(&mut self, record: OperationRecord) -> Result<(), QueueError> {
        if self.records.contains_key(&record.id) {
            return Err(QueueError::DuplicateId(record.id.to_string()));
        }
        debug!("Storing operation {} ({})", record.id, record.tool);
        self.records.insert(record.id, record);
        Ok(())
    }

    /// Look up a record.
    pub fn get(&self, id: &OperationId) -> Result<&OperationRecord, QueueError> {
        self.records
            .get(id)
            .ok_or_else(|| QueueError::NotFound(id.to_string()))
    }

    pub(crate) fn get_mut(&mut self, id: &OperationId) -> Result<&mut OperationRecord, QueueError> {
        self.records
            .get_mut(id)
            .ok_or_else(|| QueueError::NotFound(id.to_string()))
    }

    /// Records in insertion order, optionally restricted to one status and
    /// capped at `limit` entries.
    pub fn filter(&self, status: Option<OperationStatus>, limit: Option<usize>) -> Vec<OperationRecord> {
        self.records
            .values()
            .filter(|r| status.is_none_or(|s| r.status == s))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    /// Ids of pending records, in insertion order.
    pub fn pending_ids(&self) -> Vec<OperationId> {
        self.records
            .values()
            .filter(|r| r.status == OperationStatus::Pending)
            .map(|r| r.id)
            .collect()
    }

    /// Remove one record.
    pub fn delete(&mut self, id: &OperationId) -> Result<OperationRecord, QueueError> {
        self.records
            .remove(id)
            .ok_or_else(|| QueueError::NotFound(id.to_string()))
    }

    /// Remove every record with the given status.
    ///
    /// `None` is rejected: callers must name a scope, or use
    /// [`QueueStore::delete_terminal`].
    pub fn delete_where(&mut self, status: Option<OperationStatus>) -> Result<usize, QueueError> {
        let status = status.ok_or_else(|| {
            QueueError::Validation("A status is required to delete records by status".to_string())
        })?;
        Ok(self.remove_matching(|r| r.status == status))
    }

    /// Remove every record in a terminal status.
    pub fn delete_terminal(&mut self) -> usize {
        self.remove_matching(|r| r.is_terminal())
    }

    /// Drop terminal records beyond the `keep` most recently enqueued.
    pub fn prune_terminal(&mut self, keep: usize) -> usize {
        let stale: Vec<OperationId> = self
            .records
            .values()
            .rev()
            .filter(|r| r.is_terminal())
            .skip(keep)
            .map(|r| r.id)
            .collect();
        for id in &stale {
            self.records.remove(id);
        }
        stale.len()
    }

    /// Record counts per status.
    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for record in self.records.values() {
            counts.bump(record.status);
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &OperationRecord> {
        self.records.values()
    }

    fn remove_matching(&mut self, predicate: impl Fn(&OperationRecord) -> bool) -> usize {
        let before = self.records.len();
        self.records.retain(|_, r| !predicate(r));
        before - self.records.len()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
