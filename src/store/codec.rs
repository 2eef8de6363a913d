//! Collection encoding
//!
//! Stored collections are JSON arrays. Reads are forgiving: empty, unparsable
//! or non-array content yields an empty collection, and the discarded content
//! is reported through the logger. The contents API transports files as
//! base64 with embedded line breaks.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

use super::error::{StoreError, StoreResult};
use crate::logger;

/// Parse stored text into records, degrading to empty on bad content
pub fn parse_records(text: &str, source: &str) -> Vec<Value> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(records)) => records,
        Ok(other) => {
            logger::log_discarded_collection(source, &format!("expected array, found {}", kind(&other)));
            Vec::new()
        }
        Err(e) => {
            logger::log_discarded_collection(source, &e.to_string());
            Vec::new()
        }
    }
}

/// Pretty-printed form written to storage
pub fn render_records(records: &[Value]) -> StoreResult<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Decode base64 file content from the contents API into records
pub fn decode_content(encoded: &str, source: &str) -> StoreResult<Vec<Value>> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD.decode(compact).map_err(|e| StoreError::Decode {
        path: source.to_string(),
        message: e.to_string(),
    })?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(parse_records(&text, source))
}

/// Encode records as base64 of their pretty-printed JSON
pub fn encode_content(records: &[Value]) -> StoreResult<String> {
    Ok(STANDARD.encode(render_records(records)?))
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
