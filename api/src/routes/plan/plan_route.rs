use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, error, info};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppError,
    routes::plan::plan_request::PlanRequest,
};

pub async fn plan_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(p): Json<PlanRequest>,
) -> Response {
    let request_id = headers
        .get("X-Request-Id")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-");

    debug!(
        request_id = %request_id,
        chars = p.request.chars().count(),
        "plan_route: start"
    );

    match state.pipeline.plan(&p.request).await {
        Ok(plan) => {
            info!(
                request_id = %request_id,
                steps = plan.steps.len(),
                resolved = plan.resolved_count(),
                "plan_route: success"
            );
            ApiResponse::success(plan).into_response_with_status(StatusCode::OK)
        }
        Err(err) => {
            error!(
                request_id = %request_id,
                error = %err,
                "plan_route: planning failed"
            );
            AppError::from(err).into_response()
        }
    }
}
