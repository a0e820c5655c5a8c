//! # OpQueue Protocols
//!
//! Interface definitions shared across the OpQueue workspace.
//! Contains only traits and plain data types - no queue logic.
//!
//! ## Core Traits
//!
//! - [`OperationExecutor`] - The execution environment a queue hands operations to
//! - [`Tool`] - A single named capability an executor may route to

pub mod error;
pub mod executor;
pub mod tool;

pub use error::{ExecutorError, RegistryError, ToolError};
pub use executor::{ExecutionRequest, OperationExecutor, Parameters};
pub use tool::{AbortSignal, Tool, ToolContext, ToolDefinition, ToolResult};
