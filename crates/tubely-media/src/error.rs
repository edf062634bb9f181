//! Error types for media operations.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while running external media tools.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{tool} not found in PATH")]
    ToolNotFound { tool: String },

    #[error("Failed to start {tool}: {source}")]
    SpawnFailed {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} command failed: {message}")]
    ToolFailed {
        tool: String,
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("{tool} timed out after {limit:?}")]
    Timeout { tool: String, limit: Duration },

    #[error("Malformed ffprobe output: {0}")]
    ProbeParse(#[from] serde_json::Error),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a tool failure error.
    pub fn tool_failed(
        tool: impl Into<String>,
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Diagnostic output captured from the tool, if any.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            MediaError::ToolFailed { stderr, .. } => stderr.as_deref(),
            _ => None,
        }
    }

    /// True for errors caused by malformed tool output rather than tool execution.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, MediaError::ProbeParse(_))
    }
}
