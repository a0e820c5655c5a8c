//! Tool registry for managing available tools.

use std::sync::Arc;

use opqueue_protocols::error::RegistryError;
use opqueue_protocols::tool::{Tool, ToolDefinition};

use super::base::{BaseRegistry, Registerable};

impl Registerable for dyn Tool {
    fn registry_id(&self) -> &str {
        &self.definition().id
    }
}

/// Registry for managing tools.
pub struct ToolRegistry {
    inner: BaseRegistry<dyn Tool>,
}

impl ToolRegistry {
    /// Create a new tool registry.
    pub fn new() -> Self {
        Self {
            inner: BaseRegistry::new(),
        }
    }

    /// Register a tool.
    pub fn register(&self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        self.inner.register(tool)
    }

    /// Get a tool by ID.
    pub fn get(&self, id: &str) -> Option<Arc<dyn Tool>> {
        self.inner.get(id)
    }

    /// Registered tool ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        self.inner.list_ids()
    }

    /// List all tool definitions, sorted by id.
    pub fn list(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> =
            self.inner.iter().map(|t| t.definition().clone()).collect();
        defs.sort_by(|a, b| a.id.cmp(&b.id));
        defs
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
