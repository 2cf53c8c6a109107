use std::sync::Arc;

use planner::Pipeline;

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Fully wired planning pipeline, built once at startup.
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}
