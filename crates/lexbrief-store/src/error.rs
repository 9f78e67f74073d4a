use lexbrief_core::EmbedError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{documents} documents but {metadata} metadata entries")]
    LengthMismatch { documents: usize, metadata: usize },

    #[error("index has dimension {found}, embedder produces {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error(transparent)]
    Embed(#[from] EmbedError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "lancedb")]
    #[error("lancedb error: {0}")]
    Lance(#[from] ::lancedb::Error),

    #[cfg(feature = "lancedb")]
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("{0}")]
    Other(String),
}
