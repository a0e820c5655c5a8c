//! Built-in tools available to queued operations.

mod echo;
mod fail;
mod sleep;

use std::sync::Arc;

use opqueue_core::ToolRegistry;
use opqueue_protocols::error::RegistryError;

use echo::EchoTool;
use fail::FailTool;
use sleep::SleepTool;

/// Register every built-in tool.
pub(crate) fn register_builtin_tools(registry: &ToolRegistry) -> Result<(), RegistryError> {
    registry.register(Arc::new(EchoTool::new()))?;
    registry.register(Arc::new(SleepTool::new()))?;
    registry.register(Arc::new(FailTool::new()))?;
    Ok(())
}
