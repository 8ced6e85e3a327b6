//! Recovery of a structured reply from model text.
//!
//! The model is asked for JSON but is not trusted to return it cleanly: output
//! may be fenced, use typographic quotes, or be wrapped in prose.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::StructuredReply;

/// Recover a reply from model text, falling back to [`StructuredReply::fallback`].
///
/// The returned reply has not been through the safety gate yet.
pub fn extract_reply(raw: &str) -> StructuredReply {
    match recover_object(raw) {
        Some(object) => StructuredReply::from_object(&object),
        None => {
            warn!(chars = raw.chars().count(), "Model output not recoverable, using fallback reply");
            StructuredReply::fallback()
        }
    }
}

/// Find a JSON object in model text.
///
/// Tries the quote-normalized text first, then the text as sent in case the
/// typographic quotes were legitimately inside string values. For each, a
/// direct parse is attempted before the greedy `{ ... }` span.
pub fn recover_object(raw: &str) -> Option<Map<String, Value>> {
    let stripped = strip_code_fence(raw);
    let normalized = normalize_quotes(stripped);

    let mut candidates = vec![normalized.as_str()];
    if normalized != stripped {
        candidates.push(stripped);
    }

    for candidate in candidates {
        if let Some(object) = parse_object(candidate) {
            debug!(step = "direct", "Recovered reply object");
            return Some(object);
        }
        if let Some(object) = brace_span(candidate).and_then(parse_object) {
            debug!(step = "brace_span", "Recovered reply object");
            return Some(object);
        }
    }

    None
}

/// Remove a leading ```` ``` ```` or ```` ```json ```` marker and a trailing ```` ``` ````.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let rest = rest.trim_start_matches(|c: char| c == ' ' || c == '\t');
        let rest = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
        text = rest;
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

/// Replace curly quotes and primes with their ASCII counterparts.
pub fn normalize_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' | '\u{2036}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' | '\u{2035}' => '\'',
            other => other,
        })
        .collect()
}

/// The span from the first `{` to the last `}`, inclusive.
pub fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str(text) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}
