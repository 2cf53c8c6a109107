//! Prompt builders for decomposition and re-ranking.

use api_index::Facet;

use crate::plan::ScoredCandidate;

/// System message sent with every completion call.
pub const SYSTEM_PROMPT: &str =
    "You are a precise assistant for API documentation. Answer with exactly the requested format and nothing else.";

/// Fixed instruction for splitting a request into atomic actions.
pub const DECOMPOSE_TEMPLATE: &str = r#"You are a planner for a scripting API.
Split the user request into the smallest ordered list of atomic actions, each of
which one API call could perform. Do NOT describe UI steps. Do NOT add actions
the user did not ask for.

Answer with JSON only, no prose:
[{"action": "<short imperative phrase>", "description": "<one sentence>"}]

User request:
"#;

pub fn build_decompose_prompt(request: &str) -> String {
    let mut out = String::with_capacity(DECOMPOSE_TEMPLATE.len() + request.len() + 1);
    out.push_str(DECOMPOSE_TEMPLATE);
    out.push_str(request.trim());
    out.push('\n');
    out
}

/// Build the selection prompt with a char budget.
///
/// Every candidate's signature is always listed; description and details
/// share what is left of the budget in ranking order.
pub fn build_rerank_prompt(action: &str, candidates: &[ScoredCandidate], max_chars: usize) -> String {
    let mut out = String::new();
    out.push_str("You are an expert API developer. The user wants to: \"");
    out.push_str(action.trim());
    out.push_str("\"\n\nCandidate APIs:\n");

    let tail = "\nChoose the single best API by returning ONLY its full_signature string, exactly as listed.\n";

    let headers: Vec<String> = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| format!("[{}] {}\n", i + 1, c.record.full_signature.trim()))
        .collect();
    let fixed = out.len() + tail.len() + headers.iter().map(String::len).sum::<usize>();
    let mut budget = max_chars.saturating_sub(fixed);

    for (c, header) in candidates.iter().zip(&headers) {
        out.push_str(header);
        for body in [Facet::Description, Facet::Details].map(|f| f.text(&c.record).trim()) {
            if body.is_empty() || budget <= 8 {
                continue;
            }
            let take = budget.saturating_sub(6);
            let text = safe_truncate(body, take);
            out.push_str("    ");
            out.push_str(text);
            out.push('\n');
            budget = budget.saturating_sub(text.len() + 5);
        }
    }

    out.push_str(tail);
    out
}

pub(crate) fn safe_truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        s
    } else {
        let mut end = max;
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        &s[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::candidate;

    #[test]
    fn decompose_prompt_ends_with_request() {
        let p = build_decompose_prompt("  crop and scale the selected image ");
        assert!(p.starts_with(DECOMPOSE_TEMPLATE));
        assert!(p.ends_with("crop and scale the selected image\n"));
    }

    #[test]
    fn rerank_prompt_lists_every_signature_under_tight_budget() {
        let cands: Vec<_> = (0..4)
            .map(|i| {
                let mut c = candidate(&format!("d{i}"), Facet::Description, 0.9);
                let rec = std::sync::Arc::make_mut(&mut c.record);
                rec.full_signature = format!("Image.op{i}()");
                rec.description = "x".repeat(1000);
                c
            })
            .collect();

        let p = build_rerank_prompt("crop image", &cands, 300);
        for i in 0..4 {
            assert!(p.contains(&format!("Image.op{i}()")));
        }
        assert!(p.contains("ONLY its full_signature"));
        assert!(!p.contains(&"x".repeat(1000)));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(safe_truncate("héllo", 2), "h");
        assert_eq!(safe_truncate("abc", 10), "abc");
    }
}
