use crate::config::llm_provider::LlmProvider;
use crate::error_handler::{ConfigError, Result, validate_http_endpoint, validate_range_f32};

/// Configuration for one model profile.
///
/// # Fields
///
/// - `provider`: which backend serves the model.
/// - `model`: model identifier (e.g. `"mistral"`, `"embeddinggemma"`).
/// - `endpoint`: base URL of the backend.
/// - `api_key`: required for OpenAI, ignored by Ollama.
/// - `max_tokens`: generation cap (completion profiles only).
/// - `temperature`, `top_p`: sampling knobs.
/// - `timeout_secs`: HTTP client timeout.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    /// Checks the fields that every provider relies on.
    ///
    /// # Errors
    /// [`ConfigError::EmptyModel`], an invalid endpoint scheme, or sampling
    /// knobs outside their ranges.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }
        validate_http_endpoint("endpoint", &self.endpoint)?;
        if let Some(t) = self.temperature {
            validate_range_f32("temperature", t, 0.0, 2.0)?;
        }
        if let Some(p) = self.top_p {
            validate_range_f32("top_p", p, 0.0, 1.0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "mistral".into(),
            endpoint: "http://localhost:11434".into(),
            api_key: None,
            max_tokens: None,
            temperature: Some(0.2),
            top_p: None,
            timeout_secs: Some(30),
        }
    }

    #[test]
    fn accepts_valid_config() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn rejects_empty_model_and_bad_endpoint() {
        let mut cfg = base();
        cfg.model = "  ".into();
        assert!(cfg.validate().is_err());

        let mut cfg = base();
        cfg.endpoint = "localhost:11434".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_sampling() {
        let mut cfg = base();
        cfg.top_p = Some(1.5);
        assert!(cfg.validate().is_err());
    }
}
