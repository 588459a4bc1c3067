// File: crates/overlay-core/src/error.rs
// Summary: Error type for the fallible edges of the core (storage, config, decoding).

use std::path::PathBuf;

use crate::shape::ShapeId;

/// Errors raised by storage backends and loaders. The interactive API never
/// returns these; the store logs them and degrades to a safe default.
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {reason}")]
    Config { reason: String },

    #[error("invalid storage key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("duplicate shape id {0}")]
    DuplicateId(ShapeId),
}

pub type Result<T, E = OverlayError> = std::result::Result<T, E>;
