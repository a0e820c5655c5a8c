//! # OpQueue API
//!
//! JSON action-dispatch surface over a [`QueueManager`](opqueue_workqueue::QueueManager).
//!
//! Every request is a JSON object with an `action` field; every reply is an
//! [`ActionResponse`] carrying either a message and data or an error with a
//! machine-readable code.

pub mod request;
pub mod response;
pub mod service;

pub use request::{Action, ActionRequest, BatchRequest};
pub use response::ActionResponse;
pub use service::QueueService;
