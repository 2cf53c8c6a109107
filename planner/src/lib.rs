//! Task → API plan resolver.
//!
//! Public API: [`Pipeline`]. A request is split into atomic actions by the
//! completion model, each action is matched against every facet index of
//! the documentation corpus, and one winner per action is picked by the
//! completion model. The result is an ordered [`Plan`].
//!
//! All collaborators are injected once at construction; nothing is global.

pub mod assemble;
pub mod bootstrap;
pub mod cfg;
pub mod decompose;
mod error;
pub mod plan;
mod progress;
pub mod prompt;
pub mod rerank;
pub mod retrieve;
pub mod sanitize;
pub mod services;

#[cfg(test)]
mod testkit;

use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use api_index::IndexCatalog;
use tracing::info;

pub use cfg::PipelineConfig;
pub use error::{LookupError, PlanError, ServiceError};
pub use plan::{ActionStep, Plan, ScoredCandidate, StepStatus};
pub use progress::{IndicatifProgress, NoopProgress, Progress};
pub use services::{Completer, Embedder, ProfileCompleter, ProfileEmbedder};

use assemble::PlanAssembler;
use decompose::TaskDecomposer;
use rerank::Reranker;
use retrieve::{CandidateRetriever, RetrievalParams};
use services::probe_dimension;

/// Immutable, shareable planning pipeline.
pub struct Pipeline {
    cfg: PipelineConfig,
    assembler: PlanAssembler,
}

impl Pipeline {
    /// Wires the pipeline and checks that embeddings fit the indices.
    ///
    /// # Errors
    /// [`PlanError::Config`] for invalid knobs, [`PlanError::Probe`] if the
    /// embedder cannot be reached, [`PlanError::DimensionMismatch`] if any
    /// index disagrees with the embedding dimension.
    pub async fn build(
        cfg: PipelineConfig,
        embedder: Arc<dyn Embedder>,
        completer: Arc<dyn Completer>,
        catalog: Arc<IndexCatalog>,
    ) -> Result<Self, PlanError> {
        cfg.validate()?;

        let dim = probe_dimension(embedder.as_ref(), cfg.call_timeout)
            .await
            .map_err(PlanError::Probe)?;
        catalog
            .check_dimension(dim)
            .map_err(PlanError::DimensionMismatch)?;
        info!(dim, indices = catalog.indices().len(), "Pipeline ready");

        let retriever = CandidateRetriever::new(
            embedder,
            Arc::clone(&catalog),
            RetrievalParams {
                per_index_top_k: cfg.per_index_top_k,
                top_k: cfg.top_k,
                threshold: cfg.sim_threshold,
                call_timeout: cfg.call_timeout,
            },
        );
        let assembler = PlanAssembler::new(
            TaskDecomposer::new(Arc::clone(&completer), cfg.call_timeout),
            retriever,
            Reranker::new(completer, cfg.call_timeout, cfg.max_prompt_chars),
            cfg.max_concurrency,
            cfg.pipeline_timeout,
        );

        Ok(Self { cfg, assembler })
    }

    /// Everything from the environment: knobs, catalog, and model adapters.
    pub async fn from_env(svc: Arc<LlmServiceProfiles>) -> Result<Self, PlanError> {
        let cfg = PipelineConfig::from_env()?;
        let source = bootstrap::CatalogSource::from_env()?;
        let catalog = Arc::new(bootstrap::load_catalog(&source).await?);
        Self::build(
            cfg,
            Arc::new(ProfileEmbedder::new(Arc::clone(&svc))),
            Arc::new(ProfileCompleter::new(svc).with_system(prompt::SYSTEM_PROMPT)),
            catalog,
        )
        .await
    }

    pub async fn plan(&self, request: &str) -> Result<Plan, PlanError> {
        self.assembler.assemble(request, &NoopProgress).await
    }

    pub async fn plan_with_progress(
        &self,
        request: &str,
        progress: &dyn Progress,
    ) -> Result<Plan, PlanError> {
        self.assembler.assemble(request, progress).await
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }
}
