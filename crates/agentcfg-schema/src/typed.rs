//! # Typed Key Access
//!
//! Every built-in key has a zero-sized marker type in [`crate::keys`] that
//! implements [`SchemaKey`]. The marker fixes, at compile time, the Rust type
//! a key resolves to and its default policy:
//!
//! | Policy marker | Resolves to | Typed entry point |
//! |---------------|-------------|-------------------|
//! | [`Static`] | `T` | [`ConfigSchema::get`] (raw value optional) |
//! | [`Nullable`] | `Option<T>` | [`ConfigSchema::get`] (raw value optional) |
//! | [`Computed`] | the computed result type | [`ConfigSchema::computed`] (live value required) |
//!
//! Only `Static` and `Nullable` implement [`Defaultable`], so asking for the
//! default of a computed key does not compile:
//!
//! ```compile_fail
//! use agentcfg_schema::{keys, schema};
//!
//! let version = schema().get::<keys::Version>(None);
//! ```
//!
//! Requesting the wrong shape is a type error as well:
//!
//! ```compile_fail
//! use agentcfg_schema::{keys, schema};
//!
//! let port: String = schema().get::<keys::ListenPort>(None).unwrap();
//! ```

use crate::descriptor::PolicyKind;
use crate::error::{ConfigError, Result, SchemaError};
use crate::keys;
use crate::registry::ConfigSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

mod sealed {
    pub trait Sealed {}
}

/// Type-level default policy.
pub trait Policy: sealed::Sealed + Sized {
    /// The matching runtime tag.
    const KIND: PolicyKind;

    /// Typed value of `K` without a raw input, or `None` for computed keys.
    #[doc(hidden)]
    fn typed_default<K>(registry: &ConfigSchema) -> Option<Result<K::Value>>
    where
        K: SchemaKey<Policy = Self>;
}

/// Policies that can produce a value without a raw input.
pub trait Defaultable: Policy {}

/// Key with a static default.
#[derive(Debug)]
pub enum Static {}

/// Key with no default; resolves to `None` when absent.
#[derive(Debug)]
pub enum Nullable {}

/// Key supplied only by a live computation.
#[derive(Debug)]
pub enum Computed {}

impl sealed::Sealed for Static {}
impl sealed::Sealed for Nullable {}
impl sealed::Sealed for Computed {}

impl Policy for Static {
    const KIND: PolicyKind = PolicyKind::Static;

    fn typed_default<K>(registry: &ConfigSchema) -> Option<Result<K::Value>>
    where
        K: SchemaKey<Policy = Self>,
    {
        Some(registry.get::<K>(None))
    }
}

impl Policy for Nullable {
    const KIND: PolicyKind = PolicyKind::NoDefault;

    fn typed_default<K>(registry: &ConfigSchema) -> Option<Result<K::Value>>
    where
        K: SchemaKey<Policy = Self>,
    {
        Some(registry.get::<K>(None))
    }
}

impl Policy for Computed {
    const KIND: PolicyKind = PolicyKind::ComputedOnly;

    fn typed_default<K>(_registry: &ConfigSchema) -> Option<Result<K::Value>>
    where
        K: SchemaKey<Policy = Self>,
    {
        None
    }
}

impl Defaultable for Static {}
impl Defaultable for Nullable {}

/// A configuration key known at compile time.
pub trait SchemaKey {
    /// Registry name.
    const NAME: &'static str;

    /// Rust type the key resolves to.
    type Value: Serialize + DeserializeOwned;

    /// Default policy marker.
    type Policy: Policy;
}

fn convert<K: SchemaKey>(value: Value) -> Result<K::Value> {
    serde_json::from_value(value).map_err(|err| ConfigError::Conversion {
        key: K::NAME.to_string(),
        message: err.to_string(),
    })
}

impl ConfigSchema {
    /// Resolves a defaultable key to its Rust type.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Invalid`] if a present raw value is rejected
    /// - [`ConfigError::Conversion`] if the validated value does not fit
    ///   `K::Value`
    /// - [`ConfigError::UnknownKey`] if `K` is not in this registry
    ///
    /// # Example
    ///
    /// ```rust
    /// use agentcfg_schema::{keys, schema};
    /// use serde_json::json;
    ///
    /// let port: u16 = schema().get::<keys::ListenPort>(Some(&json!("48484"))).unwrap();
    /// assert_eq!(port, 48484);
    ///
    /// let uuid: Option<String> = schema().get::<keys::Uuid>(None).unwrap();
    /// assert_eq!(uuid, None);
    /// ```
    pub fn get<K>(&self, raw: Option<&Value>) -> Result<K::Value>
    where
        K: SchemaKey,
        K::Policy: Defaultable,
    {
        let resolved = self.resolve(K::NAME, raw)?;
        convert::<K>(resolved.value)
    }

    /// Validates the live value of a computed key.
    ///
    /// # Errors
    ///
    /// Same as [`ConfigSchema::get`].
    pub fn computed<K>(&self, live: &Value) -> Result<K::Value>
    where
        K: SchemaKey<Policy = Computed>,
    {
        let resolved = self.resolve(K::NAME, Some(live))?;
        convert::<K>(resolved.value)
    }

    /// Encodes a typed value into its stored representation.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Conversion`] if the value does not serialize
    /// - [`ConfigError::Invalid`] if the validator rejects it
    pub fn put<K>(&self, value: &K::Value) -> Result<Value>
    where
        K: SchemaKey,
        K::Policy: Defaultable,
    {
        let json = serde_json::to_value(value).map_err(|err| ConfigError::Conversion {
            key: K::NAME.to_string(),
            message: err.to_string(),
        })?;
        self.encode(K::NAME, &json)
    }

    /// Checks every typed key against this registry.
    ///
    /// Policies are compared first; then the default of every static and
    /// nullable key is resolved through its marker, so a default that does
    /// not fit the key's Rust type fails here rather than at a later `get`.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::MissingTypedKey`] if a typed key is not registered
    /// - [`SchemaError::PolicyMismatch`] if the policies disagree
    /// - [`SchemaError::DefaultTypeMismatch`] if a default does not convert
    pub fn check_typed_keys(&self) -> std::result::Result<(), SchemaError> {
        for &(name, declared) in keys::ALL {
            let descriptor = self
                .lookup(name)
                .map_err(|_| SchemaError::MissingTypedKey(name.to_string()))?;
            let registered = descriptor.default_policy().kind();
            if registered != declared {
                return Err(SchemaError::PolicyMismatch {
                    key: name.to_string(),
                    declared,
                    registered,
                });
            }
        }
        keys::check_defaults(self)
    }
}
