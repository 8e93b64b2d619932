//! Key descriptors: one registry entry per configuration key.

use agentcfg_validate::{Primitive, Rule, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// What happens when a key is resolved without a raw value.
///
/// A closed enumeration: the "no default" and "computed only" cases are
/// never represented as special values inside the data channel.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultPolicy {
    /// Resolve to this value.
    Static(Value),
    /// Absence is legal; resolve to null.
    NoDefault,
    /// The value only ever arrives from a live computation.
    ComputedOnly,
}

impl DefaultPolicy {
    /// The policy's tag.
    pub fn kind(&self) -> PolicyKind {
        match self {
            DefaultPolicy::Static(_) => PolicyKind::Static,
            DefaultPolicy::NoDefault => PolicyKind::NoDefault,
            DefaultPolicy::ComputedOnly => PolicyKind::ComputedOnly,
        }
    }
}

/// Tag of a [`DefaultPolicy`], without the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    /// Has a static default.
    Static,
    /// Nullable, no default.
    NoDefault,
    /// Computed-only, never defaulted.
    ComputedOnly,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PolicyKind::Static => "static",
            PolicyKind::NoDefault => "no-default",
            PolicyKind::ComputedOnly => "computed-only",
        };
        f.write_str(name)
    }
}

/// Where a key's raw value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeySource {
    /// Device config file and environment settings.
    Environment,
    /// Persisted rows in the agent database.
    Database,
    /// Computed live by agent logic.
    Function,
}

impl KeySource {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            KeySource::Environment => "environment",
            KeySource::Database => "database",
            KeySource::Function => "function",
        }
    }
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value-kind tag derived from a key's rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Text.
    String,
    /// Number (strict or permissive).
    Number,
    /// Boolean (strict or permissive).
    Boolean,
    /// Only null.
    Null,
    /// JSON document carried in a string.
    Document,
    /// Object with declared fields.
    Structure,
    /// One non-null kind, or null.
    Nullable,
    /// Union of several non-null kinds.
    Mixed,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Boolean => "boolean",
            ValueKind::Null => "null",
            ValueKind::Document => "document",
            ValueKind::Structure => "structure",
            ValueKind::Nullable => "nullable",
            ValueKind::Mixed => "mixed",
        };
        f.write_str(name)
    }
}

impl ValueKind {
    /// Derives the tag for a rule.
    pub fn of(rule: &Rule) -> Self {
        match rule.validator() {
            Validator::Primitive(Primitive::String) => ValueKind::String,
            Validator::Primitive(Primitive::Number) | Validator::PermissiveNumber => {
                ValueKind::Number
            }
            Validator::Primitive(Primitive::Boolean) | Validator::PermissiveBoolean => {
                ValueKind::Boolean
            }
            Validator::Null => ValueKind::Null,
            Validator::Structure(_) => ValueKind::Structure,
            Validator::EmbeddedDocument(_) => ValueKind::Document,
            Validator::Union(members) => {
                let non_null = members
                    .iter()
                    .filter(|member| !matches!(member.validator(), Validator::Null))
                    .count();
                match (non_null, members.len() - non_null) {
                    (1, 0) => members
                        .first()
                        .map(ValueKind::of)
                        .unwrap_or(ValueKind::Mixed),
                    (1, _) => ValueKind::Nullable,
                    (0, _) => ValueKind::Null,
                    _ => ValueKind::Mixed,
                }
            }
        }
    }
}

/// Registry entry for one configuration key.
///
/// # Example
///
/// ```rust
/// use agentcfg_schema::{DefaultPolicy, KeyDescriptor, KeySource, ValueKind};
/// use agentcfg_validate::Rule;
/// use serde_json::json;
///
/// let port = KeyDescriptor::new(
///     "listenPort",
///     Rule::permissive_number(),
///     DefaultPolicy::Static(json!(48484)),
///     KeySource::Environment,
/// );
/// assert_eq!(port.kind(), ValueKind::Number);
/// assert!(!port.is_computed());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct KeyDescriptor {
    name: String,
    rule: Rule,
    default: DefaultPolicy,
    source: KeySource,
    kind: ValueKind,
}

impl KeyDescriptor {
    /// Creates a descriptor; the value kind is derived from `rule`.
    pub fn new(
        name: impl Into<String>,
        rule: Rule,
        default: DefaultPolicy,
        source: KeySource,
    ) -> Self {
        let kind = ValueKind::of(&rule);
        Self {
            name: name.into(),
            rule,
            default,
            source,
            kind,
        }
    }

    /// Key name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Validator for raw values.
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// Default policy.
    pub fn default_policy(&self) -> &DefaultPolicy {
        &self.default
    }

    /// Origin of raw values.
    pub fn source(&self) -> KeySource {
        self.source
    }

    /// Value-kind tag.
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Returns true for computed-only keys.
    pub fn is_computed(&self) -> bool {
        matches!(self.default, DefaultPolicy::ComputedOnly)
    }

    pub(crate) fn set_default(&mut self, default: DefaultPolicy) {
        self.default = default;
    }

    /// Serializable view for listings and diagnostics.
    pub fn summary(&self) -> DescriptorSummary {
        let default = match &self.default {
            DefaultPolicy::Static(value) => Some(value.clone()),
            DefaultPolicy::NoDefault | DefaultPolicy::ComputedOnly => None,
        };
        DescriptorSummary {
            name: self.name.clone(),
            source: self.source,
            kind: self.kind,
            validator: self.rule.describe(),
            policy: self.default.kind(),
            default,
        }
    }
}

/// Flat, serializable description of a [`KeyDescriptor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorSummary {
    /// Key name.
    pub name: String,
    /// Origin of raw values.
    pub source: KeySource,
    /// Value-kind tag.
    pub kind: ValueKind,
    /// Validator type expression.
    pub validator: String,
    /// Default policy tag.
    pub policy: PolicyKind,
    /// Static default, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}
