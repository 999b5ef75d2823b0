use crate::{Error, Result};
use schemars::{JsonSchema, schema_for};
use serde::de::DeserializeOwned;

/// Renders the JSON schema of `T` into prompt text so the model knows the
/// exact shape its reply must take.
pub fn format_instructions<T: JsonSchema>() -> Result<String> {
    let schema = schema_for!(T);
    let schema = serde_json::to_string_pretty(&serde_json::to_value(&schema.schema)?)?;

    Ok(format!(
        "Respond with a single JSON object matching this schema (every field is required, do not add extra fields):\n```json\n{}\n```",
        schema
    ))
}

/// Decodes a typed value out of raw model text. Failure keeps the raw text
/// so the caller can show what the model actually produced.
pub fn parse<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let payload = extract_payload(raw).ok_or_else(|| Error::DecodeError {
        reason: "no JSON object found in model output".to_string(),
        raw: raw.to_string(),
    })?;

    serde_json::from_str(payload).map_err(|err| Error::DecodeError {
        reason: err.to_string(),
        raw: raw.to_string(),
    })
}

/// The payload must be self-delimiting: a fenced ```json block if present,
/// otherwise the span from the first `{` to the last `}`.
fn extract_payload(raw: &str) -> Option<&str> {
    if let Some(start) = raw.find("```json") {
        let rest = &raw[start + "```json".len()..];
        if let Some(end) = rest.find("```") {
            return Some(rest[..end].trim());
        }
    }

    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start <= end).then(|| &raw[start..=end])
}
