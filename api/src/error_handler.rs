use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use planner::PlanError;
use thiserror::Error;

use crate::core::http::response_envelope::{ApiErrorDetail, ApiResponse};

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- IO / network / server ---
    #[error("failed to bind listener on {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Pipeline ---
    #[error(transparent)]
    Plan(#[from] PlanError),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Plan(PlanError::EmptyRequest) => StatusCode::BAD_REQUEST,
            AppError::Plan(PlanError::Decomposition(_)) => StatusCode::BAD_GATEWAY,
            AppError::Plan(_) | AppError::Bind { .. } | AppError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Bind { .. } => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::Plan(PlanError::EmptyRequest) => "BAD_REQUEST",
            AppError::Plan(PlanError::Decomposition(_)) => "DECOMPOSITION_FAILED",
            AppError::Plan(_) => "PLAN_FAILED",
        }
    }

    fn details(&self) -> Vec<ApiErrorDetail> {
        match self {
            AppError::Plan(PlanError::EmptyRequest) => vec![ApiErrorDetail::at(
                "request",
                "Describe the task in plain words, e.g. \"crop and scale the selected image\".",
            )],
            _ => Vec::new(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        ApiResponse::<()>::error(self.error_code(), self.to_string(), self.details())
            .into_response_with_status(status)
    }
}
