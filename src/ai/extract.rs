//! Recover a structured article payload from free-form model output.
//!
//! Model text is untrusted: it may be wrapped in markdown fences, preceded by
//! chatter, or followed by commentary. The pipeline is
//! fence strip → brace-region match → JSON parse → required-field check,
//! and every failure comes back as a [`PayloadError`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Characters of raw output kept in `NoJsonFound` diagnostics.
const SAMPLE_CHARS: usize = 200;
/// Characters kept on each side of a JSON syntax error.
const CONTEXT_CHARS: usize = 40;

// ── Contract ──────────────────────────────────────────

/// Which keys a payload must carry to be usable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadContract {
    /// selectedTitle, articleContent, metaDescription
    #[default]
    Standard,
    /// Standard plus non-empty competitiveAnalysis and eeatSignals objects.
    Strict,
}

impl PayloadContract {
    pub fn required_text_keys(&self) -> &'static [&'static str] {
        &["selectedTitle", "articleContent", "metaDescription"]
    }

    pub fn required_object_keys(&self) -> &'static [&'static str] {
        match self {
            PayloadContract::Standard => &[],
            PayloadContract::Strict => &["competitiveAnalysis", "eeatSignals"],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PayloadContract::Standard => "standard",
            PayloadContract::Strict => "strict",
        }
    }
}

// ── Types ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePayload {
    pub selected_title: String,
    /// HTML body.
    pub article_content: String,
    pub meta_description: String,
    pub tags: Vec<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    // Informational only, never required by the standard contract.
    pub title_options: Option<Value>,
    pub content_strategy: Option<Value>,
    pub competitive_analysis: Option<Value>,
    pub eeat_signals: Option<Value>,
    pub internal_link_suggestions: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PayloadError {
    #[error("no JSON object found in AI response")]
    NoJsonFound { sample: String },

    #[error("AI response contained malformed JSON at character {offset}: {message}")]
    MalformedJson {
        offset: usize,
        context: String,
        message: String,
    },

    #[error("AI response is missing required fields: {}", .missing.join(", "))]
    IncompletePayload { missing: Vec<String> },
}

// ── Pipeline ──────────────────────────────────────────

fn leading_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^```[A-Za-z0-9_+-]*[ \t]*\r?\n").expect("valid regex"))
}

fn trailing_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\r?\n?```\s*$").expect("valid regex"))
}

fn anchored_object() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{[\s\S]*\}\s*$").expect("valid regex"))
}

/// Full pipeline: extract, parse, then enforce `contract`.
pub fn parse_article_payload(
    raw: &str,
    contract: PayloadContract,
) -> Result<ArticlePayload, PayloadError> {
    let region = extract_json_region(raw)?;
    let value = parse_json(region)?;
    payload_from_value(&value, contract)
}

/// Remove a leading "```lang\n" fence and a trailing "```" fence.
/// Fences elsewhere in the text are left alone.
pub fn strip_fences(raw: &str) -> &str {
    let text = raw.trim();
    let text = match leading_fence().find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    };
    match trailing_fence().find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    }
}

/// Locate the JSON object inside model output.
///
/// The object anchored at the end of the text is preferred. When the model
/// kept talking after the object, the first balanced `{...}` region wins.
pub fn extract_json_region(raw: &str) -> Result<&str, PayloadError> {
    let cleaned = strip_fences(raw);

    if let Some(m) = anchored_object().find(cleaned) {
        return Ok(m.as_str().trim_end());
    }

    if let Some(region) = first_object(cleaned) {
        return Ok(region);
    }

    log::warn!(
        "[ai] No JSON object in AI response: {}",
        truncate_chars(raw, SAMPLE_CHARS)
    );
    Err(PayloadError::NoJsonFound {
        sample: truncate_chars(raw, SAMPLE_CHARS),
    })
}

/// First `{` through its matching `}`. Braces inside string literals are
/// ignored. An unterminated object falls back to the last `}` in the text so
/// the parse step can report where it breaks.
fn first_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + i]);
                }
            }
            _ => {}
        }
    }

    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse an extracted region, translating serde_json's line/column into a
/// character offset with surrounding context.
pub fn parse_json(region: &str) -> Result<Value, PayloadError> {
    serde_json::from_str::<Value>(region).map_err(|e| {
        let byte_offset = byte_offset_of(region, e.line(), e.column());
        let offset = region[..byte_offset].chars().count();
        let context = context_around(region, offset);
        log::warn!(
            "[ai] Malformed JSON in AI response at char {}: {} (near: {})",
            offset,
            e,
            context
        );
        PayloadError::MalformedJson {
            offset,
            context,
            message: e.to_string(),
        }
    })
}

/// serde_json reports a 1-based line and a 1-based byte column (0 at EOF).
fn byte_offset_of(text: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (n, l) in text.split_inclusive('\n').enumerate() {
        if n + 1 == line {
            offset += column.saturating_sub(1).min(l.len());
            break;
        }
        offset += l.len();
    }
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

fn context_around(text: &str, char_offset: usize) -> String {
    let from = char_offset.saturating_sub(CONTEXT_CHARS);
    text.chars().skip(from).take(CONTEXT_CHARS * 2).collect()
}

/// Check required keys and build the typed payload.
pub fn payload_from_value(
    value: &Value,
    contract: PayloadContract,
) -> Result<ArticlePayload, PayloadError> {
    let empty = Map::new();
    let obj = value.as_object().unwrap_or(&empty);

    let mut missing: Vec<String> = Vec::new();
    for key in contract.required_text_keys() {
        if text_field(obj, key).is_none() {
            missing.push(key.to_string());
        }
    }
    for key in contract.required_object_keys() {
        let present = obj
            .get(*key)
            .and_then(|v| v.as_object())
            .map(|o| !o.is_empty())
            .unwrap_or(false);
        if !present {
            missing.push(key.to_string());
        }
    }
    if !missing.is_empty() {
        log::warn!("[ai] AI payload missing fields: {}", missing.join(", "));
        return Err(PayloadError::IncompletePayload { missing });
    }

    Ok(ArticlePayload {
        selected_title: text_field(obj, "selectedTitle").unwrap_or_default(),
        article_content: text_field(obj, "articleContent").unwrap_or_default(),
        meta_description: text_field(obj, "metaDescription").unwrap_or_default(),
        tags: tags_field(obj.get("tags")),
        slug: text_field(obj, "slug"),
        excerpt: text_field(obj, "excerpt"),
        title_options: non_null(obj, "titleOptions"),
        content_strategy: non_null(obj, "contentStrategy"),
        competitive_analysis: non_null(obj, "competitiveAnalysis"),
        eeat_signals: non_null(obj, "eeatSignals"),
        internal_link_suggestions: non_null(obj, "internalLinkSuggestions"),
    })
}

/// A non-blank string value, trimmed.
fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn non_null(obj: &Map<String, Value>, key: &str) -> Option<Value> {
    obj.get(key).filter(|v| !v.is_null()).cloned()
}

/// Models return tags either as an array or as one comma-separated string.
fn tags_field(value: Option<&Value>) -> Vec<String> {
    let raw: Vec<String> = match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };
    let mut tags: Vec<String> = Vec::new();
    for tag in raw {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str =
        r#"{"selectedTitle":"A","articleContent":"B","metaDescription":"C"}"#;

    #[test]
    fn fenced_block_yields_inner_object() {
        let raw = format!("```json\n{}\n```", MINIMAL);
        assert_eq!(extract_json_region(&raw).unwrap(), MINIMAL);

        let payload = parse_article_payload(&raw, PayloadContract::Standard).unwrap();
        assert_eq!(payload.selected_title, "A");
        assert_eq!(payload.article_content, "B");
        assert_eq!(payload.meta_description, "C");
        assert!(payload.tags.is_empty());
    }

    #[test]
    fn bare_fence_without_language_tag() {
        let raw = format!("```\n{}\n```\n", MINIMAL);
        assert_eq!(extract_json_region(&raw).unwrap(), MINIMAL);
    }

    #[test]
    fn prose_on_both_sides_uses_fallback() {
        let raw = format!("Sure! Here you go: {} Hope that helps!", MINIMAL);
        assert_eq!(extract_json_region(&raw).unwrap(), MINIMAL);
        let payload = parse_article_payload(&raw, PayloadContract::Standard).unwrap();
        assert_eq!(payload.selected_title, "A");
        assert_eq!(payload.meta_description, "C");
    }

    #[test]
    fn anchored_match_spans_nested_objects() {
        let raw = r#"Here it is: {"selectedTitle":"T","articleContent":"<p>x</p>","metaDescription":"M","eeatSignals":{"experience":"yes"}}"#;
        let region = extract_json_region(raw).unwrap();
        assert!(region.starts_with("{\"selectedTitle\""));
        assert!(region.ends_with("}}"));
        let payload = parse_article_payload(raw, PayloadContract::Strict);
        assert_eq!(
            payload.unwrap_err(),
            PayloadError::IncompletePayload {
                missing: vec!["competitiveAnalysis".into()]
            }
        );
    }

    #[test]
    fn stray_fragment_before_trailing_object_is_malformed() {
        let raw = format!("Fill in the {{keyword}} placeholder below.\n{}", MINIMAL);
        let region = extract_json_region(&raw).unwrap();
        assert!(region.starts_with("{keyword}"));
        assert!(region.ends_with(MINIMAL));
        match parse_article_payload(&raw, PayloadContract::Standard).unwrap_err() {
            PayloadError::MalformedJson { offset, context, .. } => {
                assert!(offset <= 2, "offset {}", offset);
                assert!(context.starts_with("{keyword}"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn fallback_ignores_braces_inside_strings() {
        let raw = r#"{"selectedTitle":"Use {curly} braces","articleContent":"B","metaDescription":"C"} -- end"#;
        let payload = parse_article_payload(raw, PayloadContract::Standard).unwrap();
        assert_eq!(payload.selected_title, "Use {curly} braces");
    }

    #[test]
    fn no_braces_is_no_json_found() {
        let raw = "I'm sorry, I can't help with that request.";
        match extract_json_region(raw).unwrap_err() {
            PayloadError::NoJsonFound { sample } => assert_eq!(sample, raw),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn no_json_sample_is_truncated() {
        let raw = "x".repeat(1000);
        match extract_json_region(&raw).unwrap_err() {
            PayloadError::NoJsonFound { sample } => assert_eq!(sample.len(), SAMPLE_CHARS),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn trailing_comma_is_malformed_with_offset() {
        let raw = r#"{"selectedTitle":"A","articleContent":"B","metaDescription":"C",}"#;
        match parse_article_payload(raw, PayloadContract::Standard).unwrap_err() {
            PayloadError::MalformedJson {
                offset, context, ..
            } => {
                assert!(offset > 0 && offset <= raw.chars().count());
                assert!(context.contains("\"C\","));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn malformed_offset_on_later_line() {
        let raw = "{\n  \"selectedTitle\": \"A\",\n  \"articleContent\": oops\n}";
        match parse_json(raw).unwrap_err() {
            PayloadError::MalformedJson { offset, .. } => {
                let expected = raw.find("oops").unwrap();
                assert!(offset >= expected && offset <= expected + 1, "offset {}", offset);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn missing_article_content_is_named() {
        let raw = r#"{"selectedTitle":"A","metaDescription":"C","articleContent":"   "}"#;
        assert_eq!(
            parse_article_payload(raw, PayloadContract::Standard).unwrap_err(),
            PayloadError::IncompletePayload {
                missing: vec!["articleContent".into()]
            }
        );
    }

    #[test]
    fn non_object_payload_misses_everything() {
        let err = payload_from_value(&serde_json::json!(["a"]), PayloadContract::Standard)
            .unwrap_err();
        assert_eq!(
            err,
            PayloadError::IncompletePayload {
                missing: vec![
                    "selectedTitle".into(),
                    "articleContent".into(),
                    "metaDescription".into()
                ]
            }
        );
    }

    #[test]
    fn auxiliary_fields_and_tags_are_lenient() {
        let value = serde_json::json!({
            "selectedTitle": " Title ",
            "articleContent": "<h2>Intro</h2>",
            "metaDescription": "Meta",
            "tags": "eco, fashion , ,eco",
            "titleOptions": ["One", "Two"],
            "competitiveAnalysis": {"gaps": ["x"]},
            "eeatSignals": {"expertise": "y"},
            "contentStrategy": null
        });
        let payload = payload_from_value(&value, PayloadContract::Strict).unwrap();
        assert_eq!(payload.selected_title, "Title");
        assert_eq!(payload.tags, vec!["eco", "fashion"]);
        assert!(payload.title_options.is_some());
        assert!(payload.content_strategy.is_none());
        assert!(payload.slug.is_none());
    }
}
