//! Tracing setup.

use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use opqueue_config::{ConfigLoader, LoggingConfig};

/// Keeps the file writer flushing until the process exits.
static GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber: console output on stderr, plus a daily
/// rolling file when `logging.dir` is set. `RUST_LOG` overrides the level.
pub(crate) fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let console = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    let file = match &config.dir {
        Some(dir) => {
            let log_dir = PathBuf::from(ConfigLoader::expand_path(dir));
            std::fs::create_dir_all(&log_dir)
                .with_context(|| format!("creating log directory {}", log_dir.display()))?;

            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("opqueue")
                .filename_suffix("log")
                .max_log_files(30)
                .build(&log_dir)
                .context("building rolling file appender")?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = GUARD.set(guard);

            let layer = if config.json {
                fmt::layer().json().with_writer(writer).boxed()
            } else {
                fmt::layer().with_ansi(false).with_writer(writer).boxed()
            };
            Some(layer)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file)
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(())
}
