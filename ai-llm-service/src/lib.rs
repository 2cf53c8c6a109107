//! Shared LLM service for the API planner.
//!
//! Two logical profiles are exposed through [`service_profiles::LlmServiceProfiles`]:
//! - `completion`: generative model used for task decomposition and re-ranking;
//! - `embedding`: embedding model used for similarity search.
//!
//! Each profile targets one provider (Ollama or OpenAI). Construct the service
//! once, wrap it in `Arc`, and pass clones to dependents.

pub mod config;
pub mod error_handler;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use config::llm_model_config::LlmModelConfig;
pub use config::llm_provider::LlmProvider;
pub use error_handler::{AiLlmError, ConfigError, ProviderError, ProviderErrorKind};
pub use service_profiles::LlmServiceProfiles;
