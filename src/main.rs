use std::sync::Arc;

use ai_llm_service::{LlmServiceProfiles, telemetry};
use anyhow::{Context, Result};
use clap::Parser;
use planner::{IndicatifProgress, Pipeline};
use tracing::{Level, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Resolves a task description into an ordered plan of API calls.
///
/// With a request, plans it once and prints the plan as JSON. Without one,
/// serves the HTTP API.
#[derive(Debug, Parser)]
#[command(name = "api-planner", version)]
struct Cli {
    /// Task to plan, e.g. `crop and scale the selected image`
    request: Vec<String>,

    /// Listen address for the HTTP API
    #[arg(long, env = "API_ADDRESS", default_value = "127.0.0.1:8080")]
    addr: String,
}

impl Cli {
    fn request(&self) -> Option<String> {
        let joined = self.request.join(" ");
        let trimmed = joined.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; everything can come from the real environment.
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        return Err(anyhow::Error::new(e).context("failed to read .env"));
    }
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("info", Level::INFO))
        .with(telemetry::layer())
        .try_init()
        .context("failed to install tracing subscriber")?;

    let svc = Arc::new(LlmServiceProfiles::from_env().context("invalid LLM configuration")?);
    let pipeline = Pipeline::from_env(svc)
        .await
        .context("failed to initialize planning pipeline")?;
    let cfg = pipeline.config();
    info!(
        top_k = cfg.top_k,
        threshold = cfg.sim_threshold,
        concurrency = cfg.max_concurrency,
        "Planner configured"
    );

    if let Some(request) = cli.request() {
        let plan = pipeline
            .plan_with_progress(&request, &IndicatifProgress::for_terminal())
            .await?;
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    info!(addr = %cli.addr, "Starting HTTP API");
    api::start(Arc::new(api::AppState::new(pipeline)), &cli.addr).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn words_join_into_one_request() {
        let cli = Cli::try_parse_from(["api-planner", "crop", "and", "scale"]).unwrap();
        assert_eq!(cli.request().as_deref(), Some("crop and scale"));
    }

    #[test]
    fn no_words_means_serve() {
        let cli = Cli::try_parse_from(["api-planner", "--addr", "0.0.0.0:9000"]).unwrap();
        assert_eq!(cli.request(), None);
        assert_eq!(cli.addr, "0.0.0.0:9000");

        let blank = Cli::try_parse_from(["api-planner", "  "]).unwrap();
        assert_eq!(blank.request(), None);
    }
}
