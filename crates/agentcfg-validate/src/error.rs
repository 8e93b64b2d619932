//! Error types for value validation.
//!
//! Every failure carries the [`FieldPath`] of the value that was rejected so
//! callers can point at the offending field inside a structured document.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Result type alias for validation operations.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Dotted location of a value inside a (possibly nested) document.
///
/// The root path is empty and displays as `$`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// The path of the top-level value.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path one field deeper.
    pub fn child(&self, field: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(field.to_string());
        Self(segments)
    }

    /// Returns true for the top-level path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Field names from the outermost to the innermost.
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "$")
        } else {
            write!(f, "{}", self.0.join("."))
        }
    }
}

/// The canonical type a permissive coercer was trying to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expected {
    /// A finite number, or a string holding one.
    Number,
    /// A boolean, or the exact strings `"true"` / `"false"`.
    Boolean,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Number => write!(f, "number"),
            Expected::Boolean => write!(f, "boolean"),
        }
    }
}

/// Errors produced while decoding or encoding a value against a rule.
///
/// # Variants
///
/// - `Coercion`: a permissive coercer could not normalise the raw value
/// - `Structure`: a strict type, structure or union check failed
/// - `JsonDecode`: an embedded document string is not valid JSON
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Raw value is not coercible to the expected primitive.
    #[error("cannot coerce {raw} to {expected} at {path}")]
    Coercion {
        /// Location of the rejected value.
        path: FieldPath,
        /// Type the coercer was producing.
        expected: Expected,
        /// The rejected raw value.
        raw: Value,
    },

    /// A field is missing or has the wrong shape.
    #[error("invalid value at {path}: {reason}")]
    Structure {
        /// Location of the failing field.
        path: FieldPath,
        /// Human-readable description of the mismatch.
        reason: String,
    },

    /// Embedded document text failed to parse.
    #[error("malformed JSON document at {path} (line {line}, column {column}): {message}")]
    JsonDecode {
        /// Location of the document string.
        path: FieldPath,
        /// Parser message.
        message: String,
        /// One-based line of the parse failure.
        line: usize,
        /// One-based column of the parse failure.
        column: usize,
    },
}

impl ValidationError {
    pub(crate) fn coercion(path: &FieldPath, expected: Expected, raw: &Value) -> Self {
        Self::Coercion {
            path: path.clone(),
            expected,
            raw: raw.clone(),
        }
    }

    pub(crate) fn structure(path: &FieldPath, reason: impl Into<String>) -> Self {
        Self::Structure {
            path: path.clone(),
            reason: reason.into(),
        }
    }

    pub(crate) fn json_decode(path: &FieldPath, err: &serde_json::Error) -> Self {
        Self::JsonDecode {
            path: path.clone(),
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }

    /// Location of the value that failed.
    pub fn path(&self) -> &FieldPath {
        match self {
            Self::Coercion { path, .. }
            | Self::Structure { path, .. }
            | Self::JsonDecode { path, .. } => path,
        }
    }

    /// Returns true if a permissive coercer rejected the value.
    pub fn is_coercion(&self) -> bool {
        matches!(self, Self::Coercion { .. })
    }

    /// Returns true if a strict type or shape check failed.
    pub fn is_structure(&self) -> bool {
        matches!(self, Self::Structure { .. })
    }

    /// Returns true if embedded document text was malformed.
    pub fn is_json_decode(&self) -> bool {
        matches!(self, Self::JsonDecode { .. })
    }
}

/// Short JSON type name used in error messages.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_path_display() {
        let root = FieldPath::root();
        assert_eq!(root.to_string(), "$");
        assert!(root.is_root());

        let nested = root.child("fetchOptions").child("deltaVersion");
        assert_eq!(nested.to_string(), "fetchOptions.deltaVersion");
        assert_eq!(nested.segments().len(), 2);
    }

    #[test]
    fn test_coercion_message_names_raw_value() {
        let err = ValidationError::coercion(&FieldPath::root(), Expected::Number, &json!("4x2"));
        assert_eq!(err.to_string(), r#"cannot coerce "4x2" to number at $"#);
        assert!(err.is_coercion());
    }

    #[test]
    fn test_json_decode_keeps_position() {
        let parse_err = serde_json::from_str::<Value>("{not json").unwrap_err();
        let err = ValidationError::json_decode(&FieldPath::root(), &parse_err);
        match err {
            ValidationError::JsonDecode { line, column, .. } => {
                assert_eq!(line, 1);
                assert!(column > 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
