//! # Default Resolution Engine
//!
//! Turns one raw (possibly absent) value into a validated value or an error,
//! following the key's descriptor.
//!
//! ## Resolution Order
//!
//! 1. Look up the descriptor (unknown key → [`ConfigError::UnknownKey`])
//! 2. Raw value present → the validator's output, or its error unchanged.
//!    A malformed present value never falls back to the default.
//! 3. Raw value absent → the default policy:
//!
//! | Policy | Result |
//! |--------|--------|
//! | `Static(v)` | `v`, origin [`Origin::Default`] |
//! | `NoDefault` | `null`, origin [`Origin::Absent`] |
//! | `ComputedOnly` | [`ConfigError::ComputedOnlyWithoutValue`] |
//!
//! A present `null` for a `NoDefault` key is treated as absent. For every
//! other policy `null` is validated like any other value.

use crate::descriptor::{DefaultPolicy, KeyDescriptor};
use crate::error::{ConfigError, Result};
use crate::registry::ConfigSchema;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// The caller's raw value, after validation.
    Supplied,
    /// The key's static default.
    Default,
    /// No value and no default; the value is null.
    Absent,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Origin::Supplied => "supplied",
            Origin::Default => "default",
            Origin::Absent => "absent",
        };
        f.write_str(name)
    }
}

/// The validated result of resolving one key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedValue {
    /// Key that was resolved.
    pub key: String,
    /// Canonical decoded value.
    pub value: Value,
    /// Where the value came from.
    pub origin: Origin,
}

impl ResolvedValue {
    fn new(key: &str, value: Value, origin: Origin) -> Self {
        Self {
            key: key.to_string(),
            value,
            origin,
        }
    }

    /// Returns true if the value is null.
    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }
}

impl KeyDescriptor {
    /// Resolves a raw value against this descriptor.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Invalid`] if a present value is rejected
    /// - [`ConfigError::ComputedOnlyWithoutValue`] for a computed-only key
    ///   without a value
    pub fn resolve(&self, raw: Option<&Value>) -> Result<ResolvedValue> {
        let policy = self.default_policy();
        let raw = match (raw, policy) {
            (Some(Value::Null), DefaultPolicy::NoDefault) => None,
            (raw, _) => raw,
        };

        if let Some(raw) = raw {
            return match self.rule().decode(raw) {
                Ok(value) => {
                    debug!("Resolved '{}' from supplied value", self.name());
                    Ok(ResolvedValue::new(self.name(), value, Origin::Supplied))
                }
                Err(source) => {
                    let err = ConfigError::invalid(self.name(), source);
                    warn!("Rejected value for '{}': {}", self.name(), err.kind());
                    Err(err)
                }
            };
        }

        match policy {
            DefaultPolicy::Static(value) => {
                debug!("Resolved '{}' from default", self.name());
                Ok(ResolvedValue::new(self.name(), value.clone(), Origin::Default))
            }
            DefaultPolicy::NoDefault => {
                debug!("'{}' has no value and no default", self.name());
                Ok(ResolvedValue::new(self.name(), Value::Null, Origin::Absent))
            }
            DefaultPolicy::ComputedOnly => {
                warn!("Computed-only key '{}' resolved without a value", self.name());
                Err(ConfigError::ComputedOnlyWithoutValue(self.name().to_string()))
            }
        }
    }
}

impl ConfigSchema {
    /// Resolves `key` against an optional raw value.
    ///
    /// # Errors
    ///
    /// See [`KeyDescriptor::resolve`]; additionally
    /// [`ConfigError::UnknownKey`] for unregistered keys.
    ///
    /// # Example
    ///
    /// ```rust
    /// use agentcfg_schema::{schema, ErrorKind, Origin};
    /// use serde_json::json;
    ///
    /// let registry = schema();
    ///
    /// let port = registry.resolve("listenPort", Some(&json!("48484"))).unwrap();
    /// assert_eq!(port.value, json!(48484));
    /// assert_eq!(port.origin, Origin::Supplied);
    ///
    /// let fallback = registry.resolve("listenPort", None).unwrap();
    /// assert_eq!(fallback.value, json!(48484));
    /// assert_eq!(fallback.origin, Origin::Default);
    ///
    /// let err = registry.resolve("lockOverride", Some(&json!("yes"))).unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::Coercion);
    /// ```
    pub fn resolve(&self, key: &str, raw: Option<&Value>) -> Result<ResolvedValue> {
        self.lookup(key)?.resolve(raw)
    }

    /// Resolves each entry independently and keeps every result.
    pub fn resolve_many<'a, I>(&self, entries: I) -> Vec<Result<ResolvedValue>>
    where
        I: IntoIterator<Item = (&'a str, Option<&'a Value>)>,
    {
        entries
            .into_iter()
            .map(|(key, raw)| self.resolve(key, raw))
            .collect()
    }

    /// Resolves entries in order, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first entry's [`ConfigError`].
    pub fn try_resolve_many<'a, I>(&self, entries: I) -> Result<Vec<ResolvedValue>>
    where
        I: IntoIterator<Item = (&'a str, Option<&'a Value>)>,
    {
        entries
            .into_iter()
            .map(|(key, raw)| self.resolve(key, raw))
            .collect()
    }

    /// Validates a present raw value and returns its decoded form.
    ///
    /// # Errors
    ///
    /// Same as [`ConfigSchema::resolve`] with a present value.
    pub fn decode(&self, key: &str, raw: &Value) -> Result<Value> {
        self.resolve(key, Some(raw)).map(|resolved| resolved.value)
    }

    /// The value `key` resolves to when no raw value exists.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ComputedOnlyWithoutValue`] for computed-only keys.
    pub fn default_for(&self, key: &str) -> Result<Value> {
        self.resolve(key, None).map(|resolved| resolved.value)
    }

    /// Validates a decoded value and returns its stored representation.
    ///
    /// Embedded documents are serialised to JSON strings. `null` for a key
    /// without a default encodes to `null`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::UnknownKey`] for unregistered keys
    /// - [`ConfigError::NotPersistable`] for computed-only keys
    /// - [`ConfigError::Invalid`] if the value fails validation
    pub fn encode(&self, key: &str, value: &Value) -> Result<Value> {
        let descriptor = self.lookup(key)?;
        match descriptor.default_policy() {
            DefaultPolicy::ComputedOnly => Err(ConfigError::NotPersistable(key.to_string())),
            DefaultPolicy::NoDefault if value.is_null() => Ok(Value::Null),
            _ => descriptor
                .rule()
                .encode(value)
                .map_err(|source| ConfigError::invalid(key, source)),
        }
    }
}
