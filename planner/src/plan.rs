//! Plan data types returned to callers.

use std::sync::Arc;

use api_index::{ApiRecord, Facet};
use serde::Serialize;

/// One retrieval result after scoring.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub record: Arc<ApiRecord>,
    /// Facet whose index produced the winning hit.
    pub matched_facet: Facet,
    pub similarity: f32,
    pub raw_distance: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    Unresolved,
    Resolved,
    NoCandidates,
}

/// One atomic action of the plan.
#[derive(Clone, Debug, Serialize)]
pub struct ActionStep {
    pub position: usize,
    pub action: String,
    pub description: String,
    pub status: StepStatus,
    pub chosen: Option<Arc<ApiRecord>>,
    pub candidates: Vec<ScoredCandidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ActionStep {
    pub fn new(position: usize, action: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            position,
            action: action.into(),
            description: description.into(),
            status: StepStatus::Unresolved,
            chosen: None,
            candidates: Vec::new(),
            note: None,
        }
    }

    /// `Unresolved → Resolved`; `chosen` indexes into `candidates`.
    pub(crate) fn resolve(&mut self, candidates: Vec<ScoredCandidate>, chosen: usize) {
        self.chosen = candidates.get(chosen).map(|c| Arc::clone(&c.record));
        self.status = if self.chosen.is_some() {
            StepStatus::Resolved
        } else {
            StepStatus::NoCandidates
        };
        self.candidates = candidates;
    }

    /// `Unresolved → NoCandidates`.
    pub(crate) fn mark_no_candidates(&mut self, note: Option<String>) {
        self.status = StepStatus::NoCandidates;
        self.chosen = None;
        self.candidates.clear();
        self.note = note;
    }
}

/// Ordered steps for one request.
#[derive(Clone, Debug, Serialize)]
pub struct Plan {
    pub request: String,
    pub steps: Vec<ActionStep>,
}

impl Plan {
    pub fn resolved_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Resolved)
            .count()
    }
}
