//! Request payloads.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;

/// Queue management action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add,
    Execute,
    ExecuteAsync,
    List,
    Clear,
    Stats,
    Remove,
    Cancel,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::Add,
        Action::Execute,
        Action::ExecuteAsync,
        Action::List,
        Action::Clear,
        Action::Stats,
        Action::Remove,
        Action::Cancel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Execute => "execute",
            Self::ExecuteAsync => "execute_async",
            Self::List => "list",
            Self::Clear => "clear",
            Self::Stats => "stats",
            Self::Remove => "remove",
            Self::Cancel => "cancel",
        }
    }

    /// Names of every action, for error replies.
    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(|a| a.as_str().to_string()).collect()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == wanted)
            .ok_or(())
    }
}

/// Fields accepted by [`QueueService::handle`](crate::QueueService::handle).
///
/// Everything is optional here; each action checks what it needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionRequest {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(default)]
    pub parameters: Option<Value>,
    /// Values at or below zero fall back to the minimum timeout.
    #[serde(default)]
    pub timeout_ms: Option<i64>,
    #[serde(default)]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Values at or below zero mean no limit.
    #[serde(default)]
    pub limit: Option<i64>,
}

impl ActionRequest {
    pub fn timeout_ms(&self) -> Option<u64> {
        self.timeout_ms.map(|t| t.max(0) as u64)
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit.filter(|l| *l > 0).map(|l| l as usize)
    }
}

/// Fields accepted by [`QueueService::queue_batch`](crate::QueueService::queue_batch).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub operations: Option<Value>,
    #[serde(default)]
    pub execute_immediately: Option<bool>,
    #[serde(default)]
    pub use_async: Option<bool>,
    #[serde(default)]
    pub default_timeout_ms: Option<i64>,
}
