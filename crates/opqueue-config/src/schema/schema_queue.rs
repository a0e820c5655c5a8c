//! Operation queue configuration.

use serde::{Deserialize, Serialize};

/// Queue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Timeout applied when an operation does not specify one.
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,

    /// Lower bound; shorter timeouts are clamped up to this.
    #[serde(default = "default_min_timeout_ms")]
    pub min_timeout_ms: u64,

    /// Maximum number of concurrent workers for async batches.
    #[serde(default = "default_max_workers")]
    pub max_workers: u32,

    /// Maximum records held in the queue (0 = unlimited).
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,

    /// Queue size at which old terminal records are pruned (0 = disabled).
    #[serde(default = "default_auto_cleanup_threshold")]
    pub auto_cleanup_threshold: usize,

    /// Newest terminal records kept by auto-cleanup.
    #[serde(default = "default_keep_completed")]
    pub keep_completed: usize,
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_min_timeout_ms() -> u64 {
    1_000
}

fn default_max_workers() -> u32 {
    4
}

fn default_max_queue_size() -> usize {
    1_000
}

fn default_auto_cleanup_threshold() -> usize {
    500
}

fn default_keep_completed() -> usize {
    100
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: default_timeout_ms(),
            min_timeout_ms: default_min_timeout_ms(),
            max_workers: default_max_workers(),
            max_queue_size: default_max_queue_size(),
            auto_cleanup_threshold: default_auto_cleanup_threshold(),
            keep_completed: default_keep_completed(),
        }
    }
}
