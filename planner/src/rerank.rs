//! Picks one winner among a step's candidates.
//!
//! The completion model is asked for a signature; its answer is matched
//! back onto the candidate list. Anything that does not match exactly one
//! candidate falls back to the top-ranked candidate, so the winner is always
//! a member of the input.

use std::sync::Arc;
use std::time::Duration;

use api_index::naming::looks_like_api_name;
use serde::Serialize;
use tracing::{debug, warn};

use crate::plan::ScoredCandidate;
use crate::prompt::build_rerank_prompt;
use crate::sanitize::{first_line, normalize_signature, strip_wrappers};
use crate::services::{Completer, bounded};

/// Result of mapping model output onto candidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureMatch {
    Matched(usize),
    Unmatched,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionReason {
    /// Only one candidate; no model call was made.
    Singleton,
    /// The model named a candidate.
    ModelChoice,
    /// Model output unusable; top-ranked candidate taken.
    Fallback,
}

/// Winner as an index into the candidate slice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    pub reason: SelectionReason,
}

/// Maps one line of model output onto a candidate.
///
/// Tier 1: normalized output equals a normalized signature.
/// Tier 2: output looks like an API name and prefixes a normalized signature.
/// Each tier needs a unique hit.
pub fn match_signature(output: &str, candidates: &[ScoredCandidate]) -> SignatureMatch {
    let wanted = normalize_signature(output);
    if wanted.is_empty() {
        return SignatureMatch::Unmatched;
    }
    let sigs: Vec<String> = candidates
        .iter()
        .map(|c| normalize_signature(&c.record.full_signature))
        .collect();

    if let Some(i) = unique(&sigs, |s| *s == wanted) {
        return SignatureMatch::Matched(i);
    }
    if looks_like_api_name(output) {
        if let Some(i) = unique(&sigs, |s| !s.is_empty() && s.starts_with(&wanted)) {
            return SignatureMatch::Matched(i);
        }
    }
    SignatureMatch::Unmatched
}

fn unique(sigs: &[String], pred: impl Fn(&String) -> bool) -> Option<usize> {
    let mut hits = sigs.iter().enumerate().filter(|(_, s)| pred(s));
    match (hits.next(), hits.next()) {
        (Some((i, _)), None) => Some(i),
        _ => None,
    }
}

pub struct Reranker {
    completer: Arc<dyn Completer>,
    timeout: Duration,
    max_prompt_chars: usize,
}

impl Reranker {
    pub fn new(completer: Arc<dyn Completer>, timeout: Duration, max_prompt_chars: usize) -> Self {
        Self {
            completer,
            timeout,
            max_prompt_chars,
        }
    }

    /// `None` only for an empty candidate list.
    pub async fn select(&self, action: &str, candidates: &[ScoredCandidate]) -> Option<Selection> {
        match candidates.len() {
            0 => return None,
            1 => {
                return Some(Selection {
                    index: 0,
                    reason: SelectionReason::Singleton,
                });
            }
            _ => {}
        }

        let fallback = Selection {
            index: 0,
            reason: SelectionReason::Fallback,
        };

        let prompt = build_rerank_prompt(action, candidates, self.max_prompt_chars);
        let raw = match bounded(self.timeout, self.completer.complete(&prompt)).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(action, error = %e, "Re-rank call failed; taking top candidate");
                return Some(fallback);
            }
        };

        let cleaned = strip_wrappers(&raw);
        let Some(line) = first_line(&cleaned) else {
            debug!(action, "Re-rank answer was empty; taking top candidate");
            return Some(fallback);
        };

        match match_signature(&line, candidates) {
            SignatureMatch::Matched(index) => {
                debug!(
                    action,
                    choice = %candidates[index].record.qualified_name(),
                    index,
                    "Model selected candidate"
                );
                Some(Selection {
                    index,
                    reason: SelectionReason::ModelChoice,
                })
            }
            SignatureMatch::Unmatched => {
                debug!(action, answer = %line, "Re-rank answer matched no single candidate");
                Some(fallback)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::testkit::{StubCompleter, candidate_with_signature};
    use api_index::Facet;

    fn cands() -> Vec<ScoredCandidate> {
        vec![
            candidate_with_signature("a", "Sequence.clone(): boolean", 0.9),
            candidate_with_signature("b", "Sequence.close()", 0.8),
            candidate_with_signature("c", "Image.crop(x, y, w, h)", 0.7),
        ]
    }

    #[test]
    fn exact_match_ignores_case_and_spacing() {
        assert_eq!(
            match_signature("image.crop(x,y,w,h)", &cands()),
            SignatureMatch::Matched(2)
        );
    }

    #[test]
    fn prefix_match_requires_api_like_unique_prefix() {
        assert_eq!(match_signature("Sequence.clone", &cands()), SignatureMatch::Matched(0));
        // prefixes two signatures
        assert_eq!(match_signature("Sequence.clo", &cands()), SignatureMatch::Unmatched);
        // not API-like
        assert_eq!(match_signature("Image", &cands()), SignatureMatch::Unmatched);
        assert_eq!(match_signature("", &cands()), SignatureMatch::Unmatched);
    }

    #[tokio::test]
    async fn singleton_makes_no_model_call() {
        let completer = Arc::new(StubCompleter::new(|_| Ok("whatever".into())));
        let r = Reranker::new(completer.clone(), Duration::from_secs(1), 4000);
        let one = vec![crate::testkit::candidate("only", Facet::Details, 0.6)];

        let sel = r.select("crop image", &one).await.unwrap();
        assert_eq!(sel.index, 0);
        assert_eq!(sel.reason, SelectionReason::Singleton);
        assert_eq!(completer.calls(), 0);
        assert!(r.select("crop image", &[]).await.is_none());
    }

    #[tokio::test]
    async fn model_choice_is_honored() {
        let completer = Arc::new(StubCompleter::new(|_| {
            Ok("<think>crop fits</think>\n`Image.crop(x, y, w, h)`".into())
        }));
        let r = Reranker::new(completer.clone(), Duration::from_secs(1), 4000);
        let sel = r.select("crop image", &cands()).await.unwrap();
        assert_eq!(sel, Selection { index: 2, reason: SelectionReason::ModelChoice });
        assert_eq!(completer.calls(), 1);
    }

    #[tokio::test]
    async fn winner_is_always_a_member() {
        let answers = ["The best API is the crop one", "", "Sequence.clo", "Unknown.api()"];
        for answer in answers {
            let completer = Arc::new(StubCompleter::new(move |_| Ok(answer.to_string())));
            let r = Reranker::new(completer, Duration::from_secs(1), 4000);
            let sel = r.select("x", &cands()).await.unwrap();
            assert!(sel.index < 3);
            assert_eq!(sel.reason, SelectionReason::Fallback, "answer: {answer:?}");
        }

        let failing = Arc::new(StubCompleter::new(|_| Err(ServiceError::Timeout(Duration::from_secs(1)))));
        let r = Reranker::new(failing, Duration::from_secs(1), 4000);
        assert_eq!(
            r.select("x", &cands()).await,
            Some(Selection { index: 0, reason: SelectionReason::Fallback })
        );
    }

    #[tokio::test]
    async fn wrapped_answers_still_match() {
        let answers = [
            "Here is the answer: Image.crop(x, y, w, h)",
            "```Image.crop(x, y, w, h)```",
            "```text\nImage.crop(x, y, w, h)\n```",
        ];
        for answer in answers {
            let completer = Arc::new(StubCompleter::new(move |_| Ok(answer.to_string())));
            let r = Reranker::new(completer, Duration::from_secs(1), 4000);
            let sel = r.select("crop image", &cands()).await.unwrap();
            assert_eq!(
                sel,
                Selection { index: 2, reason: SelectionReason::ModelChoice },
                "answer: {answer:?}"
            );
        }
    }

    #[tokio::test]
    async fn slow_model_falls_back_within_the_call_limit() {
        let completer = Arc::new(
            StubCompleter::new(|_| Ok("Image.crop(x, y, w, h)".into())).delayed(Duration::from_secs(5)),
        );
        let r = Reranker::new(completer, Duration::from_millis(50), 4000);
        let started = tokio::time::Instant::now();
        let sel = r.select("crop image", &cands()).await;
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(sel, Some(Selection { index: 0, reason: SelectionReason::Fallback }));
    }
}
