//! # OpQueue Work Queue
//!
//! In-memory operation queue for batched tool execution.
//!
//! ## Features
//!
//! - Insertion-ordered store of operation records with monotonic ids
//! - Synchronous batch execution with partial-failure semantics
//! - Asynchronous batch dispatch onto a bounded worker pool
//! - Per-operation timeouts and best-effort cancellation
//! - All-or-nothing batch enqueue

pub mod batch;
pub mod error;
pub mod manager;
mod manager_execution;
pub mod operation;
pub mod report;
pub mod store;
pub mod worker;

use std::sync::Arc;

pub use batch::{queue_batch, BatchError, BatchExecution, BatchOperation, BatchOptions, BatchOutcome};
pub use error::QueueError;
pub use manager::QueueManager;
pub use operation::{OperationError, OperationId, OperationRecord, OperationSpec, OperationStatus};
pub use report::{BatchHandle, BatchReport, DispatchAck, QueueStats, StatusCounts};
pub use store::QueueStore;
pub use worker::WorkerPool;

pub use opqueue_config::QueueConfig;

/// Shared queue manager handle.
pub type SharedQueueManager = Arc<QueueManager>;
