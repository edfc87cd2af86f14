//! Format-agnostic reply decoding
//!
//! Depending on version and streaming configuration the gateway may
//! reply with a single JSON object, newline-delimited JSON, multiple
//! JSON objects concatenated with no delimiter, or plain text. The
//! decoder runs an ordered list of pure strategies, first success
//! wins, and never fails for any input.

use serde_json::Value;

/// Ordered decode strategies; the raw-text fallback runs if all miss
const STRATEGIES: &[fn(&str) -> Option<String>] = &[whole_body, line_delimited, concatenated];

/// Decode a gateway reply body to a best-effort answer string
///
/// Total for any byte sequence: invalid UTF-8 is decoded lossily and
/// malformed JSON falls through to the next strategy.
#[must_use]
pub fn decode_bytes(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    decode_text(&text)
}

/// Decode an already-UTF-8 reply body
#[must_use]
pub fn decode_text(text: &str) -> String {
    for strategy in STRATEGIES {
        if let Some(answer) = strategy(text) {
            return answer;
        }
    }
    text.trim().to_string()
}

/// Strategy 1: the whole body is one JSON value
fn whole_body(text: &str) -> Option<String> {
    let value: Value = serde_json::from_str(text).ok()?;
    Some(extract(&value))
}

/// Strategy 2: newline-delimited JSON, one message per line
///
/// Unparseable lines are skipped silently; fragments join with no
/// separator. Succeeds only if some line produced content.
fn line_delimited(text: &str) -> Option<String> {
    let mut parts = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Ok(value) = serde_json::from_str::<Value>(line) {
            parts.push(extract(&value));
        }
    }

    let joined = parts.concat();
    let joined = joined.trim();
    if joined.is_empty() {
        None
    } else {
        Some(joined.to_string())
    }
}

/// Strategy 3: JSON values concatenated with no delimiter
///
/// Parses value after value until end-of-text or the first failure;
/// succeeds if at least one value decoded.
fn concatenated(text: &str) -> Option<String> {
    let mut parts = Vec::new();
    for value in serde_json::Deserializer::from_str(text).into_iter::<Value>() {
        match value {
            Ok(value) => parts.push(extract(&value)),
            Err(_) => break,
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.concat().trim().to_string())
    }
}

/// Extract an answer string from one decoded value
///
/// Field priority covers the reply shapes seen across gateway
/// versions; an object matching none of them is stringified whole so
/// the result is never lost.
fn extract(value: &Value) -> String {
    let Some(object) = value.as_object() else {
        return fragment(value);
    };

    if let Some(results) = object.get("results").and_then(Value::as_array) {
        return results
            .iter()
            .filter_map(|r| r.get("content").and_then(Value::as_str))
            .collect();
    }

    if let Some(output) = object.get("output") {
        return match output {
            Value::Array(items) => items.iter().map(fragment).collect(),
            other => fragment(other),
        };
    }

    if let Some(response) = object.get("response") {
        return fragment(response);
    }

    // Streaming chunks carry a bare content field
    if let Some(content) = object.get("content") {
        return fragment(content);
    }

    if let Some(text) = object.get("text") {
        return fragment(text);
    }

    if let Some(choices) = object.get("choices").and_then(Value::as_array) {
        return choices
            .iter()
            .filter_map(|c| c.get("text").and_then(Value::as_str))
            .collect();
    }

    value.to_string()
}

/// String content of a leaf value; non-strings are stringified
fn fragment(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
