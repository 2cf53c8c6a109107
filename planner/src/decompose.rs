//! Request → ordered atomic actions via the completion model.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::PlanError;
use crate::plan::ActionStep;
use crate::prompt::build_decompose_prompt;
use crate::sanitize::strip_wrappers;
use crate::services::{Completer, bounded};

/// One parsed step before it becomes an [`ActionStep`].
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct StepDraft {
    #[serde(alias = "name", alias = "tool")]
    pub action: String,
    #[serde(default, alias = "purpose")]
    pub description: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DraftItem {
    Object(StepDraft),
    Text(String),
}

/// Outcome of interpreting model output.
#[derive(Clone, Debug, PartialEq)]
pub enum Decomposition {
    /// Structured steps were found.
    Parsed(Vec<StepDraft>),
    /// Unstructured text; one step per non-empty line.
    Fallback(Vec<String>),
}

impl Decomposition {
    pub fn into_steps(self) -> Vec<ActionStep> {
        match self {
            Decomposition::Parsed(drafts) => drafts
                .into_iter()
                .enumerate()
                .map(|(i, d)| ActionStep::new(i, d.action.trim(), d.description.trim()))
                .collect(),
            Decomposition::Fallback(lines) => lines
                .into_iter()
                .enumerate()
                .map(|(i, l)| ActionStep::new(i, l, ""))
                .collect(),
        }
    }
}

/// Interprets cleaned model output. Never returns an empty decomposition.
pub fn parse_decomposition(raw: &str, request: &str) -> Decomposition {
    let cleaned = strip_wrappers(raw);

    if let Some(drafts) = parse_structured(&cleaned) {
        return Decomposition::Parsed(drafts);
    }

    let lines: Vec<String> = cleaned
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    if lines.is_empty() {
        Decomposition::Fallback(vec![request.trim().to_string()])
    } else {
        Decomposition::Fallback(lines)
    }
}

fn parse_structured(text: &str) -> Option<Vec<StepDraft>> {
    let value = serde_json::from_str::<Value>(text)
        .ok()
        .or_else(|| embedded_array(text))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("steps") {
            Some(Value::Array(items)) => items,
            _ => return None,
        },
        _ => return None,
    };

    let drafts: Vec<StepDraft> = items
        .into_iter()
        .filter_map(|v| serde_json::from_value::<DraftItem>(v).ok())
        .map(|item| match item {
            DraftItem::Object(d) => d,
            DraftItem::Text(action) => StepDraft {
                action,
                description: String::new(),
            },
        })
        .filter(|d| !d.action.trim().is_empty())
        .collect();

    (!drafts.is_empty()).then_some(drafts)
}

fn embedded_array(text: &str) -> Option<Value> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

/// Splits requests with one completion call.
pub struct TaskDecomposer {
    completer: Arc<dyn Completer>,
    timeout: Duration,
}

impl TaskDecomposer {
    pub fn new(completer: Arc<dyn Completer>, timeout: Duration) -> Self {
        Self { completer, timeout }
    }

    /// Ordered, non-empty steps, all `Unresolved`.
    ///
    /// # Errors
    /// [`PlanError::Decomposition`] when the completion call fails or times out.
    pub async fn decompose(&self, request: &str) -> Result<Vec<ActionStep>, PlanError> {
        let prompt = build_decompose_prompt(request);
        let raw = bounded(self.timeout, self.completer.complete(&prompt))
            .await
            .map_err(|e| {
                warn!(error = %e, "Decomposition call failed");
                PlanError::Decomposition(e)
            })?;
        debug!(raw_len = raw.len(), "Decomposition answer received");

        let parsed = parse_decomposition(&raw, request);
        match &parsed {
            Decomposition::Parsed(d) => info!(steps = d.len(), "Request decomposed"),
            Decomposition::Fallback(l) => {
                warn!(steps = l.len(), "Decomposition was not JSON; using line fallback")
            }
        }
        Ok(parsed.into_steps())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::plan::StepStatus;
    use crate::testkit::StubCompleter;

    #[test]
    fn parses_plain_array() {
        let raw = r#"[{"action":"crop image","description":"cut to selection"},{"action":"scale image"}]"#;
        let d = parse_decomposition(raw, "req");
        assert_eq!(
            d,
            Decomposition::Parsed(vec![
                StepDraft {
                    action: "crop image".into(),
                    description: "cut to selection".into()
                },
                StepDraft {
                    action: "scale image".into(),
                    description: String::new()
                },
            ])
        );
    }

    #[test]
    fn parses_steps_object_and_embedded_array() {
        let obj = r#"{"goal":"x","steps":[{"name":"crop image"}]}"#;
        assert!(matches!(parse_decomposition(obj, "r"), Decomposition::Parsed(v) if v.len() == 1));

        let prose = "The plan is [\"crop image\", \"scale image\"] and that is all.";
        match parse_decomposition(prose, "r") {
            Decomposition::Parsed(v) => {
                assert_eq!(v[1].action, "scale image");
                assert!(v[1].description.is_empty());
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn empty_actions_are_dropped() {
        let raw = r#"[{"action":"  "},{"action":"scale image"}]"#;
        assert!(matches!(parse_decomposition(raw, "r"), Decomposition::Parsed(v) if v.len() == 1));
    }

    #[test]
    fn three_lines_fall_back_to_three_steps() {
        let steps = parse_decomposition("crop image\n\nscale image\nexport image\n", "r").into_steps();
        assert_eq!(steps.len(), 3);
        for (i, s) in steps.iter().enumerate() {
            assert_eq!(s.position, i);
            assert_eq!(s.status, StepStatus::Unresolved);
            assert!(s.description.is_empty());
        }
        assert_eq!(steps[2].action, "export image");
    }

    #[test]
    fn blank_output_falls_back_to_request() {
        let d = parse_decomposition("<think>nothing</think>\n```\n```", " crop it ");
        assert_eq!(d, Decomposition::Fallback(vec!["crop it".into()]));
    }

    #[tokio::test]
    async fn completer_failure_is_fatal() {
        let completer = Arc::new(StubCompleter::new(|_| {
            Err(ServiceError::Unavailable("connection refused".into()))
        }));
        let dec = TaskDecomposer::new(completer, Duration::from_secs(1));
        assert!(matches!(
            dec.decompose("crop image").await,
            Err(PlanError::Decomposition(_))
        ));
    }

    #[tokio::test]
    async fn decomposes_with_one_call() {
        let completer = Arc::new(StubCompleter::new(|_| Ok("Sure, here you go:\ncrop image\nscale image".into())));
        let dec = TaskDecomposer::new(completer.clone(), Duration::from_secs(1));
        let steps = dec.decompose("crop and scale").await.unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(completer.calls(), 1);
    }

    #[tokio::test]
    async fn slow_completion_is_a_decomposition_timeout() {
        let completer = Arc::new(
            StubCompleter::new(|_| Ok("crop image".into())).delayed(Duration::from_secs(5)),
        );
        let dec = TaskDecomposer::new(completer, Duration::from_millis(50));
        assert!(matches!(
            dec.decompose("crop image").await,
            Err(PlanError::Decomposition(ServiceError::Timeout(_)))
        ));
    }

    #[test]
    fn single_line_fenced_json_is_parsed() {
        let raw = r#"```json [{"action":"crop image"},{"action":"scale image"}] ```"#;
        match parse_decomposition(raw, "r") {
            Decomposition::Parsed(v) => {
                assert_eq!(v.len(), 2);
                assert_eq!(v[1].action, "scale image");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn lines_that_start_like_a_preamble_are_kept() {
        let d = parse_decomposition("Okay button press\nscale image", "r");
        assert_eq!(
            d,
            Decomposition::Fallback(vec!["Okay button press".into(), "scale image".into()])
        );
    }
}
