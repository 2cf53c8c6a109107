//! HTTP surface of the planner: `POST /plan` and `GET /health`.

mod core;
mod error_handler;
mod middleware_layer;
mod routes;

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::signal;
use tracing::{info, warn};

pub use crate::core::app_state::AppState;
pub use crate::error_handler::AppError;

use crate::middleware_layer::json_extractor::json_error_mapper;
use crate::routes::{health::health_route, plan::plan_route::plan_route};

/// Route table with shared state attached.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/plan", post(plan_route))
        .route("/health", get(health_route))
        .layer(middleware::from_fn(json_error_mapper))
        .with_state(state)
}

/// Serves until Ctrl+C.
///
/// # Errors
/// [`AppError::Bind`] if `addr` cannot be bound, [`AppError::Server`] if the
/// server loop fails.
pub async fn start(state: Arc<AppState>, addr: &str) -> Result<(), AppError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| AppError::Bind {
            addr: addr.to_string(),
            source,
        })?;
    info!(addr, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C. If the handler cannot be installed the server keeps
/// running until killed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "Cannot listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
