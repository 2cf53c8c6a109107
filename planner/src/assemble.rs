//! Request → plan: decomposition, then per-step retrieval and re-ranking.
//!
//! Steps are resolved concurrently up to `max_concurrency`; each result
//! lands in the slot of its position, so the plan keeps decomposition order
//! regardless of completion order. A failed step never aborts its siblings.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::decompose::TaskDecomposer;
use crate::error::{PlanError, ServiceError};
use crate::plan::{Plan, ScoredCandidate};
use crate::progress::Progress;
use crate::rerank::Reranker;
use crate::retrieve::CandidateRetriever;

const DEADLINE_NOTE: &str = "pipeline deadline exceeded";

enum StepOutcome {
    Resolved {
        candidates: Vec<ScoredCandidate>,
        chosen: usize,
    },
    NoCandidates {
        note: Option<String>,
    },
}

pub struct PlanAssembler {
    decomposer: TaskDecomposer,
    retriever: CandidateRetriever,
    reranker: Reranker,
    max_concurrency: usize,
    pipeline_timeout: Option<Duration>,
}

impl PlanAssembler {
    pub fn new(
        decomposer: TaskDecomposer,
        retriever: CandidateRetriever,
        reranker: Reranker,
        max_concurrency: usize,
        pipeline_timeout: Option<Duration>,
    ) -> Self {
        Self {
            decomposer,
            retriever,
            reranker,
            max_concurrency: max_concurrency.max(1),
            pipeline_timeout,
        }
    }

    /// Builds the plan for `request`.
    ///
    /// # Errors
    /// [`PlanError::EmptyRequest`] for blank input, [`PlanError::Decomposition`]
    /// when the request cannot be split. Per-step failures are recorded on the
    /// step instead.
    pub async fn assemble(&self, request: &str, progress: &dyn Progress) -> Result<Plan, PlanError> {
        let request = request.trim();
        if request.is_empty() {
            return Err(PlanError::EmptyRequest);
        }
        let deadline = self.pipeline_timeout.map(|d| (Instant::now() + d, d));

        progress.phase("decomposing request");
        let mut steps = match deadline {
            Some((at, limit)) => tokio::time::timeout_at(at, self.decomposer.decompose(request))
                .await
                .map_err(|_| PlanError::Decomposition(ServiceError::Timeout(limit)))??,
            None => self.decomposer.decompose(request).await?,
        };
        progress.decomposed(steps.len());

        let actions: Vec<String> = steps.iter().map(|s| s.action.clone()).collect();
        let mut outcomes: Vec<Option<StepOutcome>> = (0..actions.len()).map(|_| None).collect();

        {
            // owned items: a borrowing stream here makes the plan future !Send
            let mut pending = stream::iter(actions.iter().cloned().enumerate())
                .map(|(pos, action)| async move {
                    let outcome = self.resolve_step(&action).await;
                    (pos, outcome)
                })
                .buffer_unordered(self.max_concurrency);

            loop {
                let next = match deadline {
                    Some((at, _)) => match tokio::time::timeout_at(at, pending.next()).await {
                        Ok(next) => next,
                        Err(_) => {
                            warn!("Pipeline deadline reached; remaining steps dropped");
                            break;
                        }
                    },
                    None => pending.next().await,
                };
                let Some((pos, outcome)) = next else { break };
                progress.step_settled(
                    &actions[pos],
                    matches!(outcome, StepOutcome::Resolved { .. }),
                );
                outcomes[pos] = Some(outcome);
            }
        }

        for (step, outcome) in steps.iter_mut().zip(outcomes) {
            match outcome {
                Some(StepOutcome::Resolved { candidates, chosen }) => step.resolve(candidates, chosen),
                Some(StepOutcome::NoCandidates { note }) => step.mark_no_candidates(note),
                None => step.mark_no_candidates(Some(DEADLINE_NOTE.to_string())),
            }
        }

        let plan = Plan {
            request: request.to_string(),
            steps,
        };
        info!(
            steps = plan.steps.len(),
            resolved = plan.resolved_count(),
            "Plan assembled"
        );
        progress.done(plan.resolved_count(), plan.steps.len());
        Ok(plan)
    }

    async fn resolve_step(&self, action: &str) -> StepOutcome {
        let candidates = match self.retriever.retrieve(action).await {
            Ok(c) => c,
            Err(e) => {
                warn!(action, error = %e, "Candidate lookup failed");
                return StepOutcome::NoCandidates {
                    note: Some(e.to_string()),
                };
            }
        };

        match self.reranker.select(action, &candidates).await {
            Some(sel) => {
                debug!(action, index = sel.index, reason = ?sel.reason, "Step resolved");
                StepOutcome::Resolved {
                    candidates,
                    chosen: sel.index,
                }
            }
            None => StepOutcome::NoCandidates { note: None },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::plan::StepStatus;
    use crate::progress::NoopProgress;
    use crate::rerank::Reranker;
    use crate::retrieve::RetrievalParams;
    use crate::testkit::{StubCompleter, StubEmbedder, image_catalog};

    const CALL: Duration = Duration::from_secs(5);

    const DECOMPOSED: &str = r#"[{"action":"crop image","description":"cut to the selection"},{"action":"scale image","description":"resize"}]"#;

    fn assembler(
        embedder: StubEmbedder,
        completer: Arc<StubCompleter>,
        call_timeout: Duration,
        pipeline_timeout: Option<Duration>,
    ) -> PlanAssembler {
        let t = call_timeout;
        let retriever = CandidateRetriever::new(
            Arc::new(embedder),
            image_catalog(),
            RetrievalParams {
                per_index_top_k: 5,
                top_k: 5,
                threshold: 0.55,
                call_timeout: t,
            },
        );
        PlanAssembler::new(
            TaskDecomposer::new(completer.clone(), t),
            retriever,
            Reranker::new(completer, t, 8000),
            4,
            pipeline_timeout,
        )
    }

    fn image_embedder() -> StubEmbedder {
        StubEmbedder::new(vec![9.0, 9.0])
            .with("crop image", vec![1.0, 0.0])
            .with("scale image", vec![0.0, 1.0])
    }

    fn image_completer() -> Arc<StubCompleter> {
        Arc::new(StubCompleter::new(|prompt| {
            if prompt.contains("Candidate APIs") {
                Ok("Image.crop".into())
            } else {
                Ok(DECOMPOSED.into())
            }
        }))
    }

    #[tokio::test]
    async fn crop_and_scale_yields_two_ordered_steps() {
        let completer = image_completer();
        let a = assembler(image_embedder(), completer.clone(), CALL, None);

        let plan = a
            .assemble("crop and scale the selected image", &NoopProgress)
            .await
            .unwrap();

        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[0].action, "crop image");
        assert_eq!(plan.steps[1].action, "scale image");
        for (i, s) in plan.steps.iter().enumerate() {
            assert_eq!(s.position, i);
            assert_eq!(s.status, StepStatus::Resolved);
            assert!(s.candidates.len() <= 5);
        }
        assert_eq!(plan.steps[0].chosen.as_ref().unwrap().doc_id, "crop");
        assert_eq!(plan.steps[1].chosen.as_ref().unwrap().doc_id, "scale");
        // decomposition + one re-rank; the scale step is a singleton
        assert_eq!(completer.calls(), 2);
    }

    #[tokio::test]
    async fn identical_inputs_give_identical_plans() {
        let a = assembler(image_embedder(), image_completer(), CALL, None);
        let first = a.assemble("crop and scale the selected image", &NoopProgress).await.unwrap();
        let second = a.assemble("crop and scale the selected image", &NoopProgress).await.unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn one_failing_step_does_not_abort_siblings() {
        let embedder = image_embedder().failing_on("scale image");
        let a = assembler(embedder, image_completer(), CALL, None);
        let plan = a.assemble("crop and scale", &NoopProgress).await.unwrap();

        assert_eq!(plan.steps[0].status, StepStatus::Resolved);
        assert_eq!(plan.steps[1].status, StepStatus::NoCandidates);
        assert!(plan.steps[1].note.as_deref().unwrap().contains("embedding failed"));
    }

    #[tokio::test]
    async fn unmatched_actions_have_no_candidates() {
        let completer = Arc::new(StubCompleter::new(|_| Ok("export the timeline".into())));
        let a = assembler(image_embedder(), completer, CALL, None);
        let plan = a.assemble("export", &NoopProgress).await.unwrap();
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].status, StepStatus::NoCandidates);
        assert!(plan.steps[0].note.is_none());
        assert!(plan.steps[0].chosen.is_none());
    }

    #[tokio::test]
    async fn deadline_marks_unfinished_steps() {
        let embedder = image_embedder().delayed_on("scale image", Duration::from_secs(10));
        let a = assembler(embedder, image_completer(), CALL, Some(Duration::from_millis(300)));
        let plan = a.assemble("crop and scale", &NoopProgress).await.unwrap();

        assert_eq!(plan.steps[0].status, StepStatus::Resolved);
        assert_eq!(plan.steps[1].status, StepStatus::NoCandidates);
        assert_eq!(plan.steps[1].note.as_deref(), Some(DEADLINE_NOTE));
    }

    #[tokio::test]
    async fn blank_request_and_failed_decomposition_are_errors() {
        let a = assembler(image_embedder(), image_completer(), CALL, None);
        assert!(matches!(
            a.assemble("   ", &NoopProgress).await,
            Err(PlanError::EmptyRequest)
        ));

        let down = Arc::new(StubCompleter::new(|_| {
            Err(ServiceError::Unavailable("connection refused".into()))
        }));
        let a = assembler(image_embedder(), down, CALL, None);
        assert!(matches!(
            a.assemble("crop", &NoopProgress).await,
            Err(PlanError::Decomposition(_))
        ));
    }

    #[tokio::test]
    async fn slow_embedding_times_out_only_its_step() {
        let embedder = image_embedder().delayed_on("scale image", Duration::from_secs(5));
        let a = assembler(embedder, image_completer(), Duration::from_millis(100), None);
        let plan = a.assemble("crop and scale", &NoopProgress).await.unwrap();

        assert_eq!(plan.steps[0].status, StepStatus::Resolved);
        assert_eq!(plan.steps[1].status, StepStatus::NoCandidates);
        let note = plan.steps[1].note.as_deref().unwrap();
        assert!(note.contains("timed out"), "{note}");
        assert_ne!(note, DEADLINE_NOTE);
    }

    #[derive(Default)]
    struct Recorder(std::sync::Mutex<Vec<String>>);

    impl Progress for Recorder {
        fn decomposed(&self, steps: usize) {
            self.0.lock().unwrap().push(format!("steps {steps}"));
        }
        fn step_settled(&self, action: &str, resolved: bool) {
            self.0.lock().unwrap().push(format!("{action} {resolved}"));
        }
        fn done(&self, resolved: usize, total: usize) {
            self.0.lock().unwrap().push(format!("done {resolved}/{total}"));
        }
    }

    #[tokio::test]
    async fn progress_sees_every_step_and_the_total() {
        let embedder = image_embedder().failing_on("scale image");
        let a = assembler(embedder, image_completer(), CALL, None);
        let rec = Recorder::default();
        a.assemble("crop and scale", &rec).await.unwrap();

        let mut events = rec.0.into_inner().unwrap();
        assert_eq!(events.first().map(String::as_str), Some("steps 2"));
        assert_eq!(events.last().map(String::as_str), Some("done 1/2"));
        events.sort();
        assert!(events.contains(&"crop image true".to_string()));
        assert!(events.contains(&"scale image false".to_string()));
    }
}
