//! Unified error type for corpus loading and index search.

use thiserror::Error;

/// Top-level error for api-index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// I/O or filesystem errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors outside of line-oriented readers.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A JSONL row failed strict deserialization.
    #[error("{file}: line {line}: {reason}")]
    Parse {
        file: String,
        line: usize,
        reason: String,
    },

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Index dimension differs from the embedding dimension. Fatal at startup.
    #[error("index '{index}' has dimension {index_dim}, embedder produces {embed_dim}")]
    DimensionMismatch {
        index: String,
        index_dim: usize,
        embed_dim: usize,
    },

    /// A vector or query of the wrong length was handed to an index.
    #[error("index '{index}': vector of length {got}, want {want}")]
    QueryDimension {
        index: String,
        got: usize,
        want: usize,
    },

    /// Two records share a `doc_id`.
    #[error("duplicate doc_id: {0}")]
    DuplicateDocId(String),

    /// A vector mapping points at a record that does not exist.
    #[error("vector {vector_id} in index '{index}' maps to unknown doc_id '{doc_id}'")]
    UnknownDocId {
        index: String,
        vector_id: u64,
        doc_id: String,
    },

    /// Qdrant client errors (wrapped).
    #[error("qdrant error: {0}")]
    Qdrant(String),
}
