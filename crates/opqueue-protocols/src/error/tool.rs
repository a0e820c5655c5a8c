//! Errors raised by tools.

use thiserror::Error;

/// A tool could not produce a result.
///
/// A tool that ran but wants to report a domain failure returns
/// `ToolResult::error` instead.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Parameters rejected: {0}")]
    ValidationFailed(String),

    #[error("Tool gave up after {0} ms")]
    Timeout(u64),

    #[error("Tool stopped on abort signal")]
    Cancelled,
}
