//! Heuristic classifier: does a model-emitted token look like an API name?
//!
//! A token qualifies when it is a single trimmed token without interior
//! whitespace and at least one rule of [`RULES`] holds.

type Rule = (&'static str, fn(&str) -> bool);

/// Named rules, checked in order.
pub const RULES: &[Rule] = &[
    ("call_or_index_syntax", has_call_or_index),
    ("member_access", has_member_access),
    ("camel_case", has_camel_transition),
    ("lower_identifier", is_lower_identifier),
];

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn has_call_or_index(s: &str) -> bool {
    s.contains('(') || s.contains('[')
}

fn has_member_access(s: &str) -> bool {
    let chars: Vec<char> = s.chars().collect();
    let dot = chars.windows(3).any(|w| is_ident_char(w[0]) && w[1] == '.' && is_ident_char(w[2]));
    let path = chars
        .windows(4)
        .any(|w| is_ident_char(w[0]) && w[1] == ':' && w[2] == ':' && is_ident_char(w[3]));
    dot || path
}

fn has_camel_transition(s: &str) -> bool {
    s.chars()
        .zip(s.chars().skip(1))
        .any(|(a, b)| a.is_ascii_lowercase() && b.is_ascii_uppercase())
}

fn is_lower_identifier(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_lowercase()) && s.chars().all(is_ident_char)
}

/// Pure and total; trims before classifying.
pub fn looks_like_api_name(token: &str) -> bool {
    let t = token.trim();
    if t.is_empty() || t.chars().any(char::is_whitespace) {
        return false;
    }
    RULES.iter().any(|(_, rule)| rule(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_table() {
        let cases = [
            ("Sequence.clone", true),
            ("Sequence.clone()", true),
            ("app.project.activeSequence", true),
            ("std::fs::read", true),
            ("getSelection", true),
            ("items[0]", true),
            ("crop", true),
            ("  insertClip  ", true),
            ("Project", false),
            ("The best API", false),
            ("crop the image", false),
            ("", false),
            ("...", false),
            ("123", false),
        ];
        for (input, want) in cases {
            assert_eq!(looks_like_api_name(input), want, "input: {input:?}");
        }
    }

    #[test]
    fn idempotent_over_trim() {
        for s in ["Sequence.clone", " x ", "Hello there"] {
            assert_eq!(looks_like_api_name(s), looks_like_api_name(s.trim()));
        }
    }
}
