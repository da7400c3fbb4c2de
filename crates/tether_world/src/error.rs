use std::path::PathBuf;
use tether_engine::EngineError;
use thiserror::Error;

/// Errors surfaced by [`World`](crate::World) and settings loading.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
