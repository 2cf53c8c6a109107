//! Profile configs loaded from environment variables.
//!
//! Two roles are supported:
//! - **Completion** → generative model (decomposition, re-ranking)
//! - **Embedding**  → embedding model (similarity search)
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND`          = `ollama` (default) | `openai`
//! - `COMPLETION_MODEL`  = generative model (mandatory)
//! - `EMBEDDING_MODEL`   = embedding model (mandatory)
//! - `LLM_MAX_TOKENS`    = optional generation cap (u32)
//! - `LLM_TIMEOUT_SECS`  = optional HTTP timeout (u64, default 120)
//!
//! Ollama:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (mandatory)
//!
//! OpenAI:
//! - `OPENAI_URL`     = endpoint (default `https://api.openai.com`)
//! - `OPENAI_API_KEY` = API key (mandatory)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ConfigError, env_opt_u32, env_opt_u64, must_env},
};

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Resolves the Ollama endpoint.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
fn ollama_endpoint() -> Result<String, AiLlmError> {
    if let Ok(url) = std::env::var("OLLAMA_URL") {
        if !url.trim().is_empty() {
            return Ok(url);
        }
    }
    if let Ok(port) = std::env::var("OLLAMA_PORT") {
        if !port.trim().is_empty() {
            let port = port
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidNumber {
                    var: "OLLAMA_PORT",
                    reason: "expected u16 (1..=65535)",
                })?;
            return Ok(format!("http://localhost:{port}"));
        }
    }
    Err(AiLlmError::Config(ConfigError::MissingVar(
        "OLLAMA_URL or OLLAMA_PORT",
    )))
}

/// Reads `LLM_KIND`, defaulting to Ollama.
pub fn provider_from_env() -> Result<LlmProvider, AiLlmError> {
    match std::env::var("LLM_KIND") {
        Ok(v) if !v.trim().is_empty() => Ok(v.parse::<LlmProvider>()?),
        _ => Ok(LlmProvider::Ollama),
    }
}

/// Endpoint and key for the given provider.
fn endpoint_and_key(provider: LlmProvider) -> Result<(String, Option<String>), AiLlmError> {
    match provider {
        LlmProvider::Ollama => Ok((ollama_endpoint()?, None)),
        LlmProvider::OpenAI => {
            let endpoint = std::env::var("OPENAI_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "https://api.openai.com".to_string());
            let key = must_env("OPENAI_API_KEY")?;
            Ok((endpoint, Some(key)))
        }
    }
}

/// Constructs the **completion** profile.
///
/// # Defaults
/// - `temperature = Some(0.1)`: decomposition and selection want stable output.
/// - `timeout_secs = LLM_TIMEOUT_SECS or 120`
pub fn config_completion() -> Result<LlmModelConfig, AiLlmError> {
    let provider = provider_from_env()?;
    let (endpoint, api_key) = endpoint_and_key(provider)?;
    let model = must_env("COMPLETION_MODEL")?;
    let max_tokens = env_opt_u32("LLM_MAX_TOKENS")?;
    let timeout_secs = env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);

    let cfg = LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens,
        temperature: Some(0.1),
        top_p: None,
        timeout_secs: Some(timeout_secs),
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Constructs the **embedding** profile.
///
/// # Defaults
/// - `temperature = Some(0.0)` (deterministic)
/// - `timeout_secs = LLM_TIMEOUT_SECS or 120`
pub fn config_embedding() -> Result<LlmModelConfig, AiLlmError> {
    let provider = provider_from_env()?;
    let (endpoint, api_key) = endpoint_and_key(provider)?;
    let model = must_env("EMBEDDING_MODEL")?;
    let timeout_secs = env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);

    let cfg = LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens: None,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: Some(timeout_secs),
    };
    cfg.validate()?;
    Ok(cfg)
}
