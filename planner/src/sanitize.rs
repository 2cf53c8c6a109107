//! Cleanup of raw model output before parsing.

const PREAMBLES: &[&str] = &[
    "here is",
    "here are",
    "here's",
    "sure",
    "certainly",
    "okay",
    "of course",
];

const FENCE: &str = "```";

/// Info strings recognized right after an opening fence.
const FENCE_LANGS: &[&str] = &[
    "json", "jsonc", "js", "javascript", "ts", "typescript", "jsx", "python", "py", "text",
    "txt", "plaintext", "markdown", "md",
];

/// Removes reasoning blocks, code-fence markers, and a leading preamble.
///
/// Only the markers go: content sharing a line with a fence survives, and a
/// preamble line keeps whatever follows its first colon.
pub fn strip_wrappers(raw: &str) -> String {
    let without_think = strip_think_blocks(raw);
    let mut lines: Vec<&str> = without_think.lines().map(strip_fence_markers).collect();

    while let Some(first) = lines.iter().position(|l| !l.is_empty()) {
        match strip_preamble(lines[first]) {
            Some("") => {
                lines.remove(first);
            }
            Some(rest) => {
                lines[first] = rest;
                break;
            }
            None => break,
        }
    }

    lines.join("\n").trim().to_string()
}

fn strip_fence_markers(line: &str) -> &str {
    let mut l = line.trim();
    if let Some(rest) = l.strip_prefix(FENCE) {
        let tag_len = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let tag = rest[..tag_len].to_ascii_lowercase();
        l = if FENCE_LANGS.contains(&tag.as_str()) {
            &rest[tag_len..]
        } else {
            rest
        };
    }
    if let Some(rest) = l.trim_end().strip_suffix(FENCE) {
        l = rest;
    }
    l.trim()
}

/// `None` when `line` is not boilerplate; otherwise the text left after it.
fn strip_preamble(line: &str) -> Option<&str> {
    if !is_preamble(line) {
        return None;
    }
    match line.split_once(':') {
        Some((_, rest)) => Some(rest.trim()),
        None if line.ends_with(['.', '!', ',']) => Some(""),
        None => None,
    }
}

fn strip_think_blocks(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find("<think>") {
        out.push_str(&rest[..start]);
        match rest[start..].find("</think>") {
            Some(end) => rest = &rest[start + end + "</think>".len()..],
            None => {
                // unterminated: everything after the tag is reasoning
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_preamble(line: &str) -> bool {
    let l = line.trim().to_ascii_lowercase();
    PREAMBLES.iter().any(|p| {
        l.strip_prefix(p)
            .is_some_and(|rest| !rest.starts_with(|c: char| c.is_ascii_alphanumeric()))
    })
}

/// Lowercase with every whitespace character removed.
pub fn normalize_signature(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// First non-empty line, unwrapped from bullets, quotes, and backticks.
pub fn first_line(text: &str) -> Option<String> {
    let line = text.lines().map(str::trim).find(|l| !l.is_empty())?;

    let line = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .unwrap_or(line);
    let line = strip_ordinal(line);

    let line = line.trim();
    let line = line.strip_suffix('.').unwrap_or(line);
    let line = line
        .trim_matches(|c| c == '`' || c == '"' || c == '\'')
        .trim();
    let line = line.strip_suffix('.').unwrap_or(line).trim();

    (!line.is_empty()).then(|| line.to_string())
}

fn strip_ordinal(line: &str) -> &str {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return line;
    }
    line[digits..]
        .strip_prefix(". ")
        .or_else(|| line[digits..].strip_prefix(") "))
        .unwrap_or(line)
}
