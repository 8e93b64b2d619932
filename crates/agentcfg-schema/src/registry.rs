//! # Schema Registry
//!
//! The key → descriptor table. A registry is assembled once through
//! [`SchemaBuilder`] and is immutable afterwards; [`schema`] exposes the
//! process-wide built-in table, initialised on first use.
//!
//! ## Build-Time Checks
//!
//! | Check | Error |
//! |-------|-------|
//! | key names are unique | [`SchemaError::DuplicateKey`] |
//! | static defaults satisfy their own validator | [`SchemaError::InvalidDefault`] |
//! | every typed key is registered with the same policy (built-in only) | [`SchemaError::MissingTypedKey`], [`SchemaError::PolicyMismatch`] |
//! | every typed default converts into its Rust type (built-in only) | [`SchemaError::DefaultTypeMismatch`] |

use crate::builtin;
use crate::descriptor::{DefaultPolicy, KeyDescriptor, KeySource};
use crate::error::{ConfigError, Result, SchemaError};
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::OnceLock;
use tracing::debug;

static SCHEMA: OnceLock<ConfigSchema> = OnceLock::new();

/// The process-wide built-in registry.
///
/// Built on first call and shared for the rest of the process lifetime.
///
/// # Panics
///
/// Panics if the built-in table is inconsistent, which the crate's own
/// tests rule out.
pub fn schema() -> &'static ConfigSchema {
    SCHEMA.get_or_init(|| {
        ConfigSchema::builtin().expect("built-in configuration table is consistent")
    })
}

/// Immutable table of configuration keys.
///
/// # Thread Safety
///
/// `ConfigSchema` holds no interior mutability. Any number of threads may
/// look up and resolve keys concurrently without locking.
///
/// # Example
///
/// ```rust
/// use agentcfg_schema::{schema, KeySource};
///
/// let registry = schema();
/// assert!(registry.all_keys().contains("listenPort"));
/// assert_eq!(registry.lookup("listenPort").unwrap().source(), KeySource::Environment);
/// assert!(registry.lookup("noSuchKey").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigSchema {
    keys: BTreeMap<String, KeyDescriptor>,
}

impl ConfigSchema {
    /// Starts an empty registry.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Builds a registry from a list of descriptors.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] encountered.
    pub fn from_descriptors<I>(descriptors: I) -> std::result::Result<Self, SchemaError>
    where
        I: IntoIterator<Item = KeyDescriptor>,
    {
        let mut builder = Self::builder();
        for descriptor in descriptors {
            builder.register(descriptor)?;
        }
        Ok(builder.build())
    }

    /// Builds the device agent's full configuration table.
    ///
    /// Prefer [`schema`], which builds it once per process.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the table is inconsistent.
    pub fn builtin() -> std::result::Result<Self, SchemaError> {
        let registry = Self::from_descriptors(builtin::descriptors())?;
        registry.check_typed_keys()?;
        debug!("Built configuration registry with {} keys", registry.len());
        Ok(registry)
    }

    /// Returns the descriptor for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKey`] if `key` is not registered.
    pub fn lookup(&self, key: &str) -> Result<&KeyDescriptor> {
        self.keys
            .get(key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))
    }

    /// Returns true if `key` is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    /// Every registered key name.
    pub fn all_keys(&self) -> BTreeSet<&str> {
        self.keys.keys().map(String::as_str).collect()
    }

    /// Key names whose raw values come from `source`, in name order.
    pub fn keys_from(&self, source: KeySource) -> impl Iterator<Item = &str> + '_ {
        self.keys
            .values()
            .filter(move |descriptor| descriptor.source() == source)
            .map(KeyDescriptor::name)
    }

    /// All descriptors in name order.
    pub fn descriptors(&self) -> impl Iterator<Item = &KeyDescriptor> + '_ {
        self.keys.values()
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if no keys are registered.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Incremental registry construction.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    keys: BTreeMap<String, KeyDescriptor>,
}

impl SchemaBuilder {
    /// Adds one descriptor.
    ///
    /// A static default is run through the key's validator and stored in
    /// canonical form.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::DuplicateKey`] if the name is taken
    /// - [`SchemaError::InvalidDefault`] if the static default is rejected
    pub fn register(
        &mut self,
        mut descriptor: KeyDescriptor,
    ) -> std::result::Result<&mut Self, SchemaError> {
        if self.keys.contains_key(descriptor.name()) {
            return Err(SchemaError::DuplicateKey(descriptor.name().to_string()));
        }

        if let DefaultPolicy::Static(value) = descriptor.default_policy() {
            let canonical =
                descriptor
                    .rule()
                    .decode(value)
                    .map_err(|source| SchemaError::InvalidDefault {
                        key: descriptor.name().to_string(),
                        source,
                    })?;
            descriptor.set_default(DefaultPolicy::Static(canonical));
        }

        self.keys.insert(descriptor.name().to_string(), descriptor);
        Ok(self)
    }

    /// Finishes the registry.
    pub fn build(self) -> ConfigSchema {
        ConfigSchema { keys: self.keys }
    }
}
