use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures from the browser collaborator.
///
/// The two timeout variants are non-fatal: they carry whatever HTML had been
/// rendered when the wait gave up, and the pipeline continues with it.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("navigation timed out after {}s", .after.as_secs())]
    NavigationTimeout { after: Duration, partial: String },

    #[error("timed out waiting for selector {selector}")]
    SelectorWaitTimeout { selector: String, partial: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("browser API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("failed to read snapshot {}: {source}", .path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    /// Partial page for the non-fatal kinds, or the error itself otherwise.
    pub fn into_partial(self) -> Result<String, RenderError> {
        match self {
            RenderError::NavigationTimeout { partial, .. }
            | RenderError::SelectorWaitTimeout { partial, .. } => Ok(partial),
            other => Err(other),
        }
    }
}

impl From<reqwest::Error> for RenderError {
    fn from(err: reqwest::Error) -> Self {
        RenderError::Network(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum BlockError {
    #[error("block {index}: invalid JSON: {source}")]
    Parse {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}
