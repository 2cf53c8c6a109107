//! Shared LLM service with two profiles: `completion` and `embedding`.
//!
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - HTTP clients are built eagerly, so a bad profile fails at startup.
//! - The two profiles may target different providers.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::LlmServiceProfiles;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = Arc::new(LlmServiceProfiles::from_env()?);
//! let steps = svc.generate("Split 'crop and scale' into steps.", None).await?;
//! let emb = svc.embed("crop image").await?;
//! println!("{steps} / dim={}", emb.len());
//! # Ok(()) }
//! ```

use tracing::info;

use crate::{
    config::{
        default_config::{config_completion, config_embedding},
        llm_model_config::LlmModelConfig,
        llm_provider::LlmProvider,
    },
    error_handler::AiLlmError,
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
};

enum Backend {
    Ollama(OllamaService),
    OpenAi(OpenAiService),
}

impl Backend {
    fn build(cfg: &LlmModelConfig) -> Result<Self, AiLlmError> {
        Ok(match cfg.provider {
            LlmProvider::Ollama => Backend::Ollama(OllamaService::new(cfg.clone())?),
            LlmProvider::OpenAI => Backend::OpenAi(OpenAiService::new(cfg.clone())?),
        })
    }
}

/// Completion and embedding clients behind one handle.
pub struct LlmServiceProfiles {
    completion: LlmModelConfig,
    embedding: LlmModelConfig,
    completion_backend: Backend,
    embedding_backend: Backend,
}

impl LlmServiceProfiles {
    /// Builds both backends from explicit configs.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if either config is invalid or a client cannot be built.
    pub fn new(completion: LlmModelConfig, embedding: LlmModelConfig) -> Result<Self, AiLlmError> {
        completion.validate()?;
        embedding.validate()?;

        let completion_backend = Backend::build(&completion)?;
        let embedding_backend = Backend::build(&embedding)?;

        info!(
            completion_model = %completion.model,
            embedding_model = %embedding.model,
            "LLM profiles ready"
        );

        Ok(Self {
            completion,
            embedding,
            completion_backend,
            embedding_backend,
        })
    }

    /// Builds both profiles from environment variables.
    ///
    /// See [`crate::config::default_config`] for the variables read.
    pub fn from_env() -> Result<Self, AiLlmError> {
        Self::new(config_completion()?, config_embedding()?)
    }

    /// Generates text with the **completion** profile.
    pub async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, AiLlmError> {
        match &self.completion_backend {
            Backend::Ollama(cli) => cli.generate(prompt, system).await,
            Backend::OpenAi(cli) => cli.generate(prompt, system).await,
        }
    }

    /// Computes one embedding vector with the **embedding** profile.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        match &self.embedding_backend {
            Backend::Ollama(cli) => cli.embeddings(input).await,
            Backend::OpenAi(cli) => cli.embeddings(input).await,
        }
    }

    /// Returns `(completion, embedding)` configs.
    pub fn profiles(&self) -> (&LlmModelConfig, &LlmModelConfig) {
        (&self.completion, &self.embedding)
    }
}
