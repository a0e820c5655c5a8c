//! CLI definitions for OpQueue.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// OpQueue CLI.
#[derive(Parser)]
#[command(name = "opqueue")]
#[command(about = "Batched, timed and cancellable tool execution queue")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "OPQUEUE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run a JSON script of queue actions
    Run {
        /// Path to a JSON array of action objects
        script: PathBuf,
    },

    /// Queue a batch of operations
    Batch {
        /// Path to a JSON array of {tool, parameters, timeout_ms?} objects
        operations: PathBuf,

        /// Dispatch to the worker pool instead of running inline
        #[arg(long = "async")]
        use_async: bool,

        /// Only enqueue, do not execute
        #[arg(long)]
        no_execute: bool,

        /// Timeout for operations that do not set their own
        #[arg(long)]
        default_timeout_ms: Option<u64>,
    },

    /// List built-in tools
    Tools,
}
