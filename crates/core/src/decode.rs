// ABOUTME: Decoders turning located raw strings into typed field values.
// ABOUTME: Each returns DecodeError on malformed input; absence is handled before decoding.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::DecodeError;
use crate::text::{decode_entities, normalize_whitespace};

/// Whitespace-normalized text.
pub fn text(raw: String) -> Result<String, DecodeError> {
    Ok(normalize_whitespace(&raw))
}

/// Text with HTML entities decoded.
pub fn entity_text(raw: String) -> Result<String, DecodeError> {
    Ok(normalize_whitespace(&decode_entities(&raw)))
}

pub fn float(raw: String) -> Result<f32, DecodeError> {
    raw.trim()
        .replace(',', ".")
        .parse::<f32>()
        .map_err(|_| DecodeError::Number(raw))
}

pub fn integer(raw: String) -> Result<i64, DecodeError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| DecodeError::Number(raw))
}

pub fn json(raw: String) -> Result<Value, DecodeError> {
    serde_json::from_str(&raw).map_err(|e| DecodeError::Json(e.to_string()))
}

/// JSON deserialized straight into a DTO.
pub fn typed<T: DeserializeOwned>(raw: String) -> Result<T, DecodeError> {
    serde_json::from_str(&raw).map_err(|e| DecodeError::Json(e.to_string()))
}

/// A JSON array of strings, a single JSON string, or a comma-separated list.
pub fn string_list(raw: String) -> Result<Vec<String>, DecodeError> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        let value = json(trimmed.to_string())?;
        let items = value.as_array().ok_or(DecodeError::Type {
            expected: "array",
            found: trimmed.to_string(),
        })?;
        return Ok(items
            .iter()
            .filter_map(|v| v.as_str())
            .map(normalize_whitespace)
            .filter(|s| !s.is_empty())
            .collect());
    }
    Ok(trimmed
        .split(',')
        .map(normalize_whitespace)
        .filter(|s| !s.is_empty())
        .collect())
}
