use serde::Deserialize;

/// Request payload for `POST /plan`.
#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    /// Free-form task description.
    pub request: String,
}
