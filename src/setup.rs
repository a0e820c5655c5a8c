//! Configuration loading and queue wiring.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use opqueue_api::QueueService;
use opqueue_config::{Config, ConfigError, ConfigLoader, ConfigValidator};
use opqueue_core::{RegistryExecutor, ToolRegistry};
use opqueue_workqueue::QueueManager;

use crate::tools::register_builtin_tools;

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ConfigSource {
    File(PathBuf),
    /// Defaults, with the explicitly requested path if it was missing.
    Defaults(Option<PathBuf>),
}

/// Get the `~/.opqueue` directory path.
pub(crate) fn opqueue_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".opqueue"))
        .unwrap_or_else(|| PathBuf::from(".opqueue"))
}

/// Config files tried when no path is given.
fn default_candidates() -> Vec<PathBuf> {
    vec![PathBuf::from("opqueue.toml"), opqueue_dir().join("config.toml")]
}

/// Load configuration from `path`, or from the first default location that
/// exists. A missing file falls back to defaults; a malformed one is an error.
pub(crate) fn load_config(path: Option<&Path>) -> Result<(Config, ConfigSource), ConfigError> {
    let candidate = match path {
        Some(path) => Some(path.to_path_buf()),
        None => default_candidates().into_iter().find(|p| p.exists()),
    };

    match candidate {
        Some(path) => match ConfigLoader::load(&path) {
            Ok(config) => Ok((config, ConfigSource::File(path))),
            Err(ConfigError::NotFound(_)) => Ok((Config::default(), ConfigSource::Defaults(Some(path)))),
            Err(e) => Err(e),
        },
        None => Ok((Config::default(), ConfigSource::Defaults(None))),
    }
}

/// Log where the configuration came from and run the validator.
pub(crate) fn check_config(config: &Config, source: &ConfigSource) -> anyhow::Result<()> {
    match source {
        ConfigSource::File(path) => info!("Loaded configuration from {}", path.display()),
        ConfigSource::Defaults(Some(path)) => {
            warn!("Config file {} not found, using defaults", path.display())
        }
        ConfigSource::Defaults(None) => info!("No config file found, using defaults"),
    }

    let result = ConfigValidator::validate(config);
    for warning in &result.warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    if !result.is_valid() {
        let messages: Vec<String> = result
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect();
        anyhow::bail!("Invalid configuration: {}", messages.join("; "));
    }
    Ok(())
}

/// Build the tool registry, executor, manager and service.
pub(crate) fn build_service(config: &Config) -> anyhow::Result<(QueueService, Arc<ToolRegistry>)> {
    let registry = Arc::new(ToolRegistry::new());
    register_builtin_tools(&registry)?;
    info!("Registered {} built-in tools", registry.ids().len());

    let executor = Arc::new(RegistryExecutor::new(registry.clone()));
    let manager = Arc::new(QueueManager::new(config.queue.clone(), executor));
    Ok((QueueService::new(manager), registry))
}
