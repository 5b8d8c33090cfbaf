//! Tolerant parsing of the model's free-text reply.
//!
//! Well-prompted models still wrap their JSON in prose, markdown fences, or
//! apologies. Rather than demand a clean reply, the parser scans for the
//! first *balanced* JSON object — tracking brace nesting and ignoring braces
//! inside quoted strings — and parses exactly that span, exactly once. The
//! first balanced span winning is the deterministic tie-break for replies
//! containing nested JSON-like text.
//!
//! When no such span exists or the span fails to parse, a fixed low-confidence
//! **fallback payload** is synthesized so the document still reaches a human
//! reviewer. A failed model *call* synthesizes the distinct zero-confidence
//! **error payload** instead; both satisfy the same schema and differ only in
//! their field values.

use crate::output::{ContentMetadata, ExtractedContent};
use serde_json::{Map, Value};
use tracing::warn;

/// Fallback payloads carry at most this many characters of source text.
const FALLBACK_TEXT_LIMIT: usize = 1000;

/// Fraud-risk marker prompting manual review of an unparseable analysis.
const MANUAL_REVIEW_FLAG: &str = "Analysis failed - manual review required";

/// The model's analysis, reduced to the three fields the orchestrator needs.
///
/// `extracted_content` stays a raw [`Value`]: fields outside the expected
/// schema pass through to the result unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub category: String,
    pub confidence: f64,
    pub extracted_content: Value,
}

/// Parse a raw model reply, synthesizing the fallback payload on failure.
///
/// `source_text` is whatever document text was sent to the model — extracted
/// PDF text, or empty for image inputs — and seeds the fallback payload's
/// `text` field so reviewers see what the model saw.
pub fn parse_reply(reply: &str, source_text: &str) -> Analysis {
    match first_json_object(reply) {
        Some(object) => from_object(object),
        None => {
            warn!("Model reply contained no parseable JSON object; using fallback payload");
            fallback(source_text)
        }
    }
}

/// Build the error payload for a failed model invocation.
pub fn invocation_failure(message: &str) -> Analysis {
    let content = ExtractedContent {
        metadata: ContentMetadata {
            document_type: "error".to_string(),
            fraud_risk_indicators: vec![format!("Processing error: {message}")],
            quality_score: 0.0,
            ..ContentMetadata::default()
        },
        ..ExtractedContent::default()
    };
    Analysis {
        category: "other".to_string(),
        confidence: 0.0,
        extracted_content: to_value(content),
    }
}

// ── Internals ────────────────────────────────────────────────────────────

/// Locate and parse the first balanced `{…}` span in the text.
///
/// Exactly one parse attempt is made: a balanced span that is not valid JSON
/// (or not an object) yields `None` rather than a scan for later candidates.
fn first_json_object(text: &str) -> Option<Map<String, Value>> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
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
                    let span = &text[start..start + offset + ch.len_utf8()];
                    return match serde_json::from_str::<Value>(span) {
                        Ok(Value::Object(map)) => Some(map),
                        _ => None,
                    };
                }
            }
            _ => {}
        }
    }
    None
}

fn from_object(mut object: Map<String, Value>) -> Analysis {
    let category = object
        .get("category")
        .and_then(Value::as_str)
        .unwrap_or("other")
        .to_string();
    let confidence = object
        .get("confidence")
        .map(coerce_confidence)
        .unwrap_or(0.0);
    // Pass the payload through unchanged when it is an object; anything else
    // cannot host the injected file_info and is replaced with an empty one.
    let extracted_content = match object.remove("extracted_content") {
        Some(v @ Value::Object(_)) => v,
        _ => Value::Object(Map::new()),
    };

    Analysis {
        category,
        confidence,
        extracted_content,
    }
}

/// Accept a JSON number or a numeric string, clamped into `[0.0, 1.0]`.
fn coerce_confidence(value: &Value) -> f64 {
    let raw = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if raw.is_finite() {
        raw.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn fallback(source_text: &str) -> Analysis {
    let content = ExtractedContent {
        text: source_text.chars().take(FALLBACK_TEXT_LIMIT).collect(),
        metadata: ContentMetadata {
            document_type: "unknown".to_string(),
            fraud_risk_indicators: vec![MANUAL_REVIEW_FLAG.to_string()],
            quality_score: 0.1,
            ..ContentMetadata::default()
        },
        ..ExtractedContent::default()
    };
    Analysis {
        category: "other".to_string(),
        confidence: 0.1,
        extracted_content: to_value(content),
    }
}

fn to_value(content: ExtractedContent) -> Value {
    // Serialization of a plain struct with string/vec/map fields cannot fail.
    serde_json::to_value(content).unwrap_or_else(|_| Value::Object(Map::new()))
}
