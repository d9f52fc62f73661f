use std::path::PathBuf;

use thiserror::Error;

/// Failures an engine can report, either from `create` or via
/// [`EngineEvent::Error`](super::EngineEvent::Error).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("track has no audio locator")]
    MissingLocator,

    #[error("unsupported locator: {0}")]
    UnsupportedLocator(String),

    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("audio output error: {0}")]
    Output(String),
}
