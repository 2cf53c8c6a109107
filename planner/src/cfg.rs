//! Runtime configuration loaded from environment variables.

use std::time::Duration;

use crate::error::PlanError;

/// Pipeline knobs. All fields have defaults via [`PipelineConfig::from_env`].
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    /// Neighbors requested from each facet index.
    pub per_index_top_k: usize,
    /// Cap on candidates kept per step after dedup.
    pub top_k: usize,
    /// Minimum similarity, inclusive.
    pub sim_threshold: f32,
    /// Steps resolved concurrently.
    pub max_concurrency: usize,
    /// Budget of every single embed, search, or completion call.
    pub call_timeout: Duration,
    /// Optional deadline for the whole request.
    pub pipeline_timeout: Option<Duration>,
    /// Character budget of the re-ranking prompt.
    pub max_prompt_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            per_index_top_k: 5,
            top_k: 5,
            sim_threshold: 0.55,
            max_concurrency: 4,
            call_timeout: Duration::from_secs(60),
            pipeline_timeout: None,
            max_prompt_chars: 8000,
        }
    }
}

impl PipelineConfig {
    /// Build from environment variables with defaults, then validate.
    pub fn from_env() -> Result<Self, PlanError> {
        let d = Self::default();
        let cfg = Self {
            per_index_top_k: parse("PLAN_PER_INDEX_TOP_K", d.per_index_top_k),
            top_k: parse("PLAN_TOP_K", d.top_k),
            sim_threshold: parse("PLAN_SIM_THRESHOLD", d.sim_threshold),
            max_concurrency: parse("PLAN_MAX_CONCURRENCY", d.max_concurrency),
            call_timeout: Duration::from_secs(parse("PLAN_CALL_TIMEOUT_SECS", 60u64)),
            pipeline_timeout: std::env::var("PLAN_PIPELINE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|s| *s > 0)
                .map(Duration::from_secs),
            max_prompt_chars: parse("PLAN_MAX_PROMPT_CHARS", d.max_prompt_chars),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        if self.per_index_top_k == 0 || self.top_k == 0 {
            return Err(PlanError::Config("top-k values must be > 0".into()));
        }
        if self.max_concurrency == 0 {
            return Err(PlanError::Config("max_concurrency must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&self.sim_threshold) {
            return Err(PlanError::Config(format!(
                "sim_threshold {} is outside [0, 1]",
                self.sim_threshold
            )));
        }
        if self.call_timeout.is_zero() {
            return Err(PlanError::Config("call timeout must be > 0".into()));
        }
        Ok(())
    }
}

pub(crate) fn env(k: &str, dflt: &str) -> String {
    std::env::var(k)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| dflt.to_string())
}

pub(crate) fn parse<T: std::str::FromStr>(k: &str, dflt: T) -> T {
    std::env::var(k)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(dflt)
}
