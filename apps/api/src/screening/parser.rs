//! Resilient JSON extraction from model output.
//!
//! Direct parse first; if that fails, parse the span between the first `{`
//! and the last `}`. Anything else is a [`ProfileParseError`].

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileParseError {
    #[error("AI response contains no JSON object")]
    NoJsonObject,

    #[error("AI response JSON is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Parses the model's raw text into a JSON object.
///
/// A direct parse that yields something other than an object (an array, a
/// bare string) falls through to the brace-substring attempt.
pub fn parse_json_object(raw: &str) -> Result<Value, ProfileParseError> {
    let raw = raw.trim();

    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(raw) {
        return Ok(value);
    }

    let start = raw.find('{').ok_or(ProfileParseError::NoJsonObject)?;
    let end = raw.rfind('}').ok_or(ProfileParseError::NoJsonObject)?;
    if end < start {
        return Err(ProfileParseError::NoJsonObject);
    }

    match serde_json::from_str::<Value>(&raw[start..=end])? {
        value @ Value::Object(_) => Ok(value),
        _ => Err(ProfileParseError::NoJsonObject),
    }
}
