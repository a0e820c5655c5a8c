//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

mod schema_logging;
mod schema_queue;

pub use schema_logging::*;
pub use schema_queue::*;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub queue: QueueConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
