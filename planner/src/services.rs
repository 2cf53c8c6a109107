//! Capability interfaces for the external model services.
//!
//! The pipeline depends on these traits only; production wires them to
//! [`LlmServiceProfiles`], tests wire them to in-memory stubs.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use ai_llm_service::LlmServiceProfiles;
use futures::future::{BoxFuture, FutureExt};
use tracing::debug;

use crate::error::ServiceError;

/// Text → vector.
pub trait Embedder: Send + Sync {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, ServiceError>>;
}

/// Prompt → text.
pub trait Completer: Send + Sync {
    fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, ServiceError>>;
}

/// Runs one model call under `limit`; elapsed becomes [`ServiceError::Timeout`].
///
/// Every embedding and completion call in the pipeline goes through here,
/// so adapters don't need their own deadline handling.
pub async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| ServiceError::Timeout(limit))?
}

/// [`Embedder`] over the shared embedding profile.
pub struct ProfileEmbedder {
    svc: Arc<LlmServiceProfiles>,
}

impl ProfileEmbedder {
    pub fn new(svc: Arc<LlmServiceProfiles>) -> Self {
        Self { svc }
    }
}

impl Embedder for ProfileEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, ServiceError>> {
        async move { Ok(self.svc.embed(text).await?) }.boxed()
    }
}

/// [`Completer`] over the shared completion profile.
pub struct ProfileCompleter {
    svc: Arc<LlmServiceProfiles>,
    system: Option<String>,
}

impl ProfileCompleter {
    pub fn new(svc: Arc<LlmServiceProfiles>) -> Self {
        Self { svc, system: None }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

impl Completer for ProfileCompleter {
    fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, ServiceError>> {
        async move { Ok(self.svc.generate(prompt, self.system.as_deref()).await?) }.boxed()
    }
}

const PROBE_TEXT: &str = "dimension probe";

/// Embeds a fixed string to learn the embedder's output dimension.
pub async fn probe_dimension(
    embedder: &dyn Embedder,
    timeout: Duration,
) -> Result<usize, ServiceError> {
    let v = bounded(timeout, embedder.embed(PROBE_TEXT)).await?;
    if v.is_empty() {
        return Err(ServiceError::Unavailable(
            "embedder returned an empty vector".into(),
        ));
    }
    debug!(dim = v.len(), "Embedding dimension probed");
    Ok(v.len())
}
