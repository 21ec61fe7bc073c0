//! Decode provider replies into raw analysis items

use crate::error::AnalyzerError;
use serde_json::{Map, Value};

/// One undecoded reply item, paired positionally with a record by the merger
pub type RawAnalysis = Map<String, Value>;

/// Decode a reply into any JSON value.
///
/// Tries the trimmed text directly; if that fails and the text opens with a
/// code fence, the fence lines are removed and decoding is attempted once more.
pub fn decode_reply(response: &str) -> Result<Value, AnalyzerError> {
    let trimmed = response.trim();

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => Ok(value),
        Err(first) => match strip_code_fence(trimmed) {
            Some(inner) => serde_json::from_str::<Value>(inner)
                .map_err(|e| AnalyzerError::Decode(format!("JSON parse error: {}", e))),
            None => Err(AnalyzerError::Decode(format!("JSON parse error: {}", first))),
        },
    }
}

/// Decode a reply into an ordered list of analysis objects
pub fn parse_response(response: &str) -> Result<Vec<RawAnalysis>, AnalyzerError> {
    let value = decode_reply(response)?;

    let Value::Array(items) = value else {
        return Err(AnalyzerError::Decode(format!(
            "Expected JSON array, got {}",
            kind(&value)
        )));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Object(map) => Ok(map),
            other => Err(AnalyzerError::Decode(format!(
                "Item {} is {}, expected an object",
                idx,
                kind(&other)
            ))),
        })
        .collect()
}

/// Remove a leading fence line and, if present, a trailing fence line.
///
/// Returns `None` when the text does not open with a fence.
pub fn strip_code_fence(text: &str) -> Option<&str> {
    if !text.starts_with("```") {
        return None;
    }

    let body = match text.find('\n') {
        Some(pos) => &text[pos + 1..],
        None => "",
    };

    let body = body.trim_end();
    let body = match body.rfind('\n') {
        Some(pos) if body[pos + 1..].trim() == "```" => &body[..pos],
        None if body.trim() == "```" => "",
        _ => body,
    };

    Some(body)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
