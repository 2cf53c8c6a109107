//! Typed errors for the planner crate.

use std::time::Duration;

use ai_llm_service::AiLlmError;
use api_index::IndexError;
use thiserror::Error;

/// Failure of an external model call (embedding or completion).
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Errors from the underlying ai-llm-service crate.
    #[error("LLM service error: {0}")]
    Llm(#[from] AiLlmError),

    /// The call did not finish within its budget.
    #[error("call timed out after {0:?}")]
    Timeout(Duration),

    /// Service answered but the answer is unusable.
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

/// Candidate lookup failure for one action. Degrades only that step.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("embedding failed: {0}")]
    Embed(#[source] ServiceError),

    #[error("embedding has dimension {got}, indices expect {want}")]
    Dimension { got: usize, want: usize },

    #[error("index '{index}' failed: {source}")]
    Index {
        index: String,
        #[source]
        source: IndexError,
    },

    #[error("index '{index}' timed out after {after:?}")]
    IndexTimeout { index: String, after: Duration },
}

/// Plan-level errors. Everything here aborts the whole request.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("request is empty")]
    EmptyRequest,

    #[error("task decomposition failed: {0}")]
    Decomposition(#[source] ServiceError),

    /// Index and embedder disagree on vector size; detected at startup.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(#[source] IndexError),

    #[error("embedding probe failed: {0}")]
    Probe(#[source] ServiceError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("config error: {0}")]
    Config(String),
}
