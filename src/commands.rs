//! Subcommand handlers.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde_json::{json, Value};
use tracing::{info, warn};

use opqueue_api::{ActionResponse, QueueService};
use opqueue_core::ToolRegistry;
use opqueue_workqueue::{QueueStats, SharedQueueManager};

/// How often `wait_idle` polls the queue.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Script action routed to the batch surface instead of `handle`.
const BATCH_ACTION: &str = "queue_batch";

fn read_json_array(path: &Path) -> anyhow::Result<Vec<Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} must contain a JSON array", path.display()))
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Dispatch one script step.
pub(crate) async fn dispatch(service: &QueueService, step: Value) -> ActionResponse {
    let is_batch = step
        .get("action")
        .and_then(Value::as_str)
        .is_some_and(|a| a.trim().eq_ignore_ascii_case(BATCH_ACTION));
    if is_batch {
        service.queue_batch(step).await
    } else {
        service.handle(step).await
    }
}

/// Wait until no record is `executing`, or until Ctrl-C.
pub(crate) async fn wait_idle(manager: &SharedQueueManager) -> QueueStats {
    loop {
        let stats = manager.stats().await;
        if stats.counts.executing == 0 {
            return stats;
        }
        tokio::select! {
            _ = tokio::time::sleep(POLL_INTERVAL) => {}
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted with {} operations still executing", stats.counts.executing);
                return manager.stats().await;
            }
        }
    }
}

/// `opqueue run <script.json>`
pub(crate) async fn run_script(service: &QueueService, script: &Path) -> anyhow::Result<()> {
    let steps = read_json_array(script)?;
    info!("Running {} script steps from {}", steps.len(), script.display());

    let mut failures = 0;
    for step in steps {
        let response = dispatch(service, step).await;
        if !response.success {
            failures += 1;
        }
        print_json(&response.to_value())?;
    }

    let stats = wait_idle(service.manager()).await;
    print_json(&json!({"final_stats": stats}))?;
    if failures > 0 {
        warn!("{} script steps failed", failures);
    }
    Ok(())
}

/// `opqueue batch <operations.json>`
pub(crate) async fn run_batch(
    service: &QueueService,
    operations: &Path,
    use_async: bool,
    no_execute: bool,
    default_timeout_ms: Option<u64>,
) -> anyhow::Result<()> {
    let operations = read_json_array(operations)?;
    let request = json!({
        "operations": operations,
        "execute_immediately": !no_execute,
        "use_async": use_async,
        "default_timeout_ms": default_timeout_ms,
    });

    let response = service.queue_batch(request).await;
    print_json(&response.to_value())?;
    if !response.success {
        anyhow::bail!(response.error.unwrap_or_else(|| "Batch failed".to_string()));
    }

    if use_async && !no_execute {
        wait_idle(service.manager()).await;
        let records = service.manager().list(None, None).await;
        print_json(&json!({"operations": records}))?;
    }
    Ok(())
}

/// `opqueue tools`
pub(crate) fn list_tools(registry: &ToolRegistry) -> anyhow::Result<()> {
    for definition in registry.list() {
        let mode = if definition.interruptible { "interruptible" } else { "-" };
        println!("{:<8} {:<14} {}", definition.id, mode, definition.description);
    }
    Ok(())
}
