//! # OpQueue Core
//!
//! Tool registry and the [`RegistryExecutor`] that routes queued operations
//! to registered tools.

pub mod executor;
pub mod registry;

pub use executor::RegistryExecutor;
pub use registry::ToolRegistry;
