//! Embedded JSON documents carried inside string values.
//!
//! Storage rows hold strings, so structured settings such as a device pin are
//! persisted as JSON text. Decoding parses the text and validates the result
//! against the inner rule; encoding validates first and then serialises, so a
//! caller can never produce an invalid stored string.
//!
//! For every `value` accepted by the inner rule,
//! `decode(encode(value)) == value`.

use crate::error::{type_name, FieldPath, Result, ValidationError};
use crate::rule::Rule;
use serde_json::Value;

/// Decodes an embedded document.
///
/// A string is parsed as JSON and validated against `inner`. A value that is
/// not a string but already satisfies `inner` (a live, already-decoded
/// document) is accepted as-is.
///
/// # Errors
///
/// - [`ValidationError::JsonDecode`] if the string is not valid JSON
/// - the inner rule's error if the parsed document has the wrong shape
/// - [`ValidationError::Structure`] for a non-string the inner rule rejects
pub(crate) fn decode(inner: &Rule, raw: &Value, path: &FieldPath) -> Result<Value> {
    match raw {
        Value::String(text) => {
            let parsed: Value = serde_json::from_str(text)
                .map_err(|err| ValidationError::json_decode(path, &err))?;
            inner.decode_at(&parsed, path)
        }
        other => inner.decode_at(other, path).map_err(|_| {
            ValidationError::structure(
                path,
                format!("expected JSON document string, got {}", type_name(other)),
            )
        }),
    }
}

/// Validates `value` against `inner` and serialises it to JSON text.
pub(crate) fn encode(inner: &Rule, value: &Value, path: &FieldPath) -> Result<Value> {
    let checked = inner.encode_at(value, path)?;
    // Value's Display is compact JSON.
    Ok(Value::String(checked.to_string()))
}
