//! # Composable Validation Rules
//!
//! A [`Validator`] describes the legal values of one configuration value and
//! how loose raw input is normalised. Validators compose: unions try their
//! members in declared order, structures validate each declared field, and
//! embedded documents wrap an inner rule behind a JSON string.
//!
//! Validators are shared through [`Rule`], a cheap reference-counted handle.
//! Two keys (or a key and a field inside a composite bundle) that hold clones
//! of the same `Rule` are guaranteed to coerce identically; [`Rule::same`]
//! checks that identity.
//!
//! ## Error Mapping
//!
//! | Failure | Error |
//! |---------|-------|
//! | permissive coercer rejects the input | [`ValidationError::Coercion`] |
//! | strict primitive, null, object or union mismatch | [`ValidationError::Structure`] |
//! | required structure field missing | [`ValidationError::Structure`] |
//! | embedded document text is not JSON | [`ValidationError::JsonDecode`] |

use crate::coerce;
use crate::document;
use crate::error::{type_name, FieldPath, Result, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Strict primitive JSON types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    /// A JSON string.
    String,
    /// A JSON number.
    Number,
    /// A JSON boolean.
    Boolean,
}

impl Primitive {
    fn matches(self, raw: &Value) -> bool {
        match self {
            Primitive::String => raw.is_string(),
            Primitive::Number => raw.is_number(),
            Primitive::Boolean => raw.is_boolean(),
        }
    }

    /// Lowercase type name.
    pub fn as_str(self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
        }
    }
}

/// A declared field of a [`Validator::Structure`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name in the JSON object.
    pub name: String,
    /// Rule the field value must satisfy.
    pub rule: Rule,
}

/// A type-check and coercion rule.
///
/// Validators are pure: decoding the same raw value always yields the same
/// result, and nothing is retained between calls.
#[derive(Debug, Clone, PartialEq)]
pub enum Validator {
    /// Exact JSON type, no coercion.
    Primitive(Primitive),
    /// Only `null`. Used inside unions to make a rule nullable.
    Null,
    /// Number or numeric string, normalised to a number.
    PermissiveNumber,
    /// Boolean or exactly `"true"` / `"false"`, normalised to a boolean.
    PermissiveBoolean,
    /// First member (in declared order) that accepts the value wins.
    Union(Vec<Rule>),
    /// Object whose declared fields all validate. Unknown fields pass through.
    Structure(Vec<Field>),
    /// JSON document carried inside a string.
    EmbeddedDocument(Rule),
}

impl Validator {
    pub(crate) fn decode_at(&self, raw: &Value, path: &FieldPath) -> Result<Value> {
        match self {
            Validator::Primitive(kind) => {
                if kind.matches(raw) {
                    Ok(raw.clone())
                } else {
                    Err(ValidationError::structure(
                        path,
                        format!("expected {}, got {}", kind.as_str(), type_name(raw)),
                    ))
                }
            }
            Validator::Null => {
                if raw.is_null() {
                    Ok(Value::Null)
                } else {
                    Err(ValidationError::structure(
                        path,
                        format!("expected null, got {}", type_name(raw)),
                    ))
                }
            }
            Validator::PermissiveNumber => coerce::permissive_number(raw, path),
            Validator::PermissiveBoolean => coerce::permissive_boolean(raw, path),
            Validator::Union(members) => {
                let mut last = None;
                for member in members {
                    match member.decode_at(raw, path) {
                        Ok(value) => return Ok(value),
                        Err(err) => last = Some(err),
                    }
                }
                Err(union_failure(self, members, raw, path, last))
            }
            Validator::Structure(fields) => structure_at(fields, raw, path, Validator::decode_at),
            Validator::EmbeddedDocument(inner) => document::decode(inner, raw, path),
        }
    }

    pub(crate) fn encode_at(&self, value: &Value, path: &FieldPath) -> Result<Value> {
        match self {
            Validator::Union(members) => {
                let mut last = None;
                for member in members {
                    match member.encode_at(value, path) {
                        Ok(encoded) => return Ok(encoded),
                        Err(err) => last = Some(err),
                    }
                }
                Err(union_failure(self, members, value, path, last))
            }
            Validator::Structure(fields) => structure_at(fields, value, path, Validator::encode_at),
            Validator::EmbeddedDocument(inner) => document::encode(inner, value, path),
            _ => self.decode_at(value, path),
        }
    }

    /// Short type expression, e.g. `{app: number, commit: string}`.
    pub fn describe(&self) -> String {
        match self {
            Validator::Primitive(kind) => kind.as_str().to_string(),
            Validator::Null => "null".to_string(),
            Validator::PermissiveNumber => "permissive-number".to_string(),
            Validator::PermissiveBoolean => "permissive-boolean".to_string(),
            Validator::Union(members) => members
                .iter()
                .map(|member| member.describe())
                .collect::<Vec<_>>()
                .join(" | "),
            Validator::Structure(fields) => {
                let body = fields
                    .iter()
                    .map(|field| format!("{}: {}", field.name, field.rule.describe()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{{{}}}", body)
            }
            Validator::EmbeddedDocument(inner) => format!("json<{}>", inner.describe()),
        }
    }

    /// Returns true if `null` is a legal value.
    pub fn accepts_null(&self) -> bool {
        self.decode_at(&Value::Null, &FieldPath::root()).is_ok()
    }
}

fn as_object<'a>(raw: &'a Value, path: &FieldPath) -> Result<&'a Map<String, Value>> {
    raw.as_object().ok_or_else(|| {
        ValidationError::structure(path, format!("expected object, got {}", type_name(raw)))
    })
}

type Step = fn(&Validator, &Value, &FieldPath) -> Result<Value>;

/// Applies `step` to every declared field. Undeclared fields are copied
/// unchanged and missing fields stay missing, so the output has exactly the
/// input's keys.
fn structure_at(fields: &[Field], raw: &Value, path: &FieldPath, step: Step) -> Result<Value> {
    let object = as_object(raw, path)?;
    let mut out = object.clone();
    for field in fields {
        let child = path.child(&field.name);
        match object.get(&field.name) {
            Some(value) => {
                let checked = step(field.rule.validator(), value, &child)?;
                out.insert(field.name.clone(), checked);
            }
            None => missing_field(&field.rule, &child)?,
        }
    }
    Ok(Value::Object(out))
}

/// A missing field is legal only when its rule accepts `null`.
fn missing_field(rule: &Rule, path: &FieldPath) -> Result<()> {
    rule.decode_at(&Value::Null, path)
        .map(|_| ())
        .map_err(|_| ValidationError::structure(path, "missing required field"))
}

fn union_failure(
    union: &Validator,
    members: &[Rule],
    raw: &Value,
    path: &FieldPath,
    last: Option<ValidationError>,
) -> ValidationError {
    match (members.len(), last) {
        (1, Some(only)) => only,
        (0, _) => ValidationError::structure(path, "empty union accepts no value"),
        _ => ValidationError::structure(
            path,
            format!("{} matches none of {}", type_name(raw), union.describe()),
        ),
    }
}

/// Shared, immutable handle to a [`Validator`].
///
/// Cloning a `Rule` shares the validator; it does not copy it.
///
/// # Example
///
/// ```rust
/// use agentcfg_validate::Rule;
/// use serde_json::json;
///
/// let pin = Rule::embedded(Rule::structure([
///     ("app", Rule::number()),
///     ("commit", Rule::string()),
/// ]));
///
/// let stored = pin.encode(&json!({"app": 1, "commit": "abc"})).unwrap();
/// assert_eq!(stored, json!(r#"{"app":1,"commit":"abc"}"#));
/// assert_eq!(pin.decode(&stored).unwrap(), json!({"app": 1, "commit": "abc"}));
/// ```
#[derive(Clone, PartialEq)]
pub struct Rule(Arc<Validator>);

impl Rule {
    /// Wraps a validator.
    pub fn new(validator: Validator) -> Self {
        Self(Arc::new(validator))
    }

    /// Strict string.
    pub fn string() -> Self {
        Self::new(Validator::Primitive(Primitive::String))
    }

    /// Strict number.
    pub fn number() -> Self {
        Self::new(Validator::Primitive(Primitive::Number))
    }

    /// Strict boolean.
    pub fn boolean() -> Self {
        Self::new(Validator::Primitive(Primitive::Boolean))
    }

    /// Only `null`.
    pub fn null() -> Self {
        Self::new(Validator::Null)
    }

    /// Number or numeric string.
    pub fn permissive_number() -> Self {
        Self::new(Validator::PermissiveNumber)
    }

    /// Boolean or `"true"` / `"false"`.
    pub fn permissive_boolean() -> Self {
        Self::new(Validator::PermissiveBoolean)
    }

    /// Ordered union; the first accepting member wins.
    pub fn union<I>(members: I) -> Self
    where
        I: IntoIterator<Item = Rule>,
    {
        Self::new(Validator::Union(members.into_iter().collect()))
    }

    /// `inner | null`, sharing `inner`.
    pub fn nullable(inner: &Rule) -> Self {
        Self::union([inner.clone(), Self::null()])
    }

    /// Object with the given fields, in declaration order.
    pub fn structure<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, Rule)>,
        S: Into<String>,
    {
        Self::new(Validator::Structure(
            fields
                .into_iter()
                .map(|(name, rule)| Field {
                    name: name.into(),
                    rule,
                })
                .collect(),
        ))
    }

    /// JSON document carried as a string, validated against `inner`.
    pub fn embedded(inner: Rule) -> Self {
        Self::new(Validator::EmbeddedDocument(inner))
    }

    /// The wrapped validator.
    pub fn validator(&self) -> &Validator {
        &self.0
    }

    /// Returns true if both handles point at the same validator object.
    pub fn same(a: &Rule, b: &Rule) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Validates and normalises a raw value.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, located by field path.
    pub fn decode(&self, raw: &Value) -> Result<Value> {
        self.0.decode_at(raw, &FieldPath::root())
    }

    /// Validates a decoded value and produces its external representation.
    ///
    /// Embedded documents become JSON strings; everything else is returned
    /// in canonical decoded form.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if `value` does not satisfy the rule.
    pub fn encode(&self, value: &Value) -> Result<Value> {
        self.0.encode_at(value, &FieldPath::root())
    }

    /// Returns true if `raw` decodes successfully.
    pub fn is_valid(&self, raw: &Value) -> bool {
        self.decode(raw).is_ok()
    }
}

impl Deref for Rule {
    type Target = Validator;

    fn deref(&self) -> &Validator {
        &self.0
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl From<Validator> for Rule {
    fn from(validator: Validator) -> Self {
        Self::new(validator)
    }
}
