//! Error types for the configuration registry.

use crate::descriptor::PolicyKind;
use agentcfg_validate::ValidationError;
use std::fmt;
use thiserror::Error;

/// Result type alias for resolution operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while resolving or encoding a single key.
///
/// Every variant names the key involved. Errors never aggregate: a batch
/// caller decides whether to stop at the first failure or collect them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The key is not registered. A programming error; do not retry.
    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    /// A value was present but rejected by the key's validator.
    ///
    /// The default is never substituted for a malformed present value.
    #[error("invalid value for '{key}': {source}")]
    Invalid {
        /// Key being resolved.
        key: String,
        /// The validator's failure, unchanged.
        source: ValidationError,
    },

    /// A computed-only key was resolved without its live value.
    ///
    /// Indicates a caller bug, not an environment condition.
    #[error("computed-only key '{0}' has no stored value or default; supply the computed value")]
    ComputedOnlyWithoutValue(String),

    /// A computed-only key was handed to the storage encoder.
    #[error("computed-only key '{0}' is never persisted")]
    NotPersistable(String),

    /// A validated value does not fit the key's Rust type (e.g. a negative port).
    #[error("value for '{key}' does not fit its typed representation: {message}")]
    Conversion {
        /// Key being converted.
        key: String,
        /// Deserializer message.
        message: String,
    },
}

/// Coarse classification of a [`ConfigError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Key is not registered.
    UnknownKey,
    /// Raw value not coercible to the expected primitive.
    Coercion,
    /// Missing or mismatched field, or strict type mismatch.
    StructuralValidation,
    /// Embedded document text is not JSON.
    JsonDecode,
    /// Computed-only key resolved without a value.
    ComputedOnlyWithoutValue,
    /// Computed-only key handed to the encoder.
    NotPersistable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::UnknownKey => "unknown-key",
            ErrorKind::Coercion => "coercion",
            ErrorKind::StructuralValidation => "structural-validation",
            ErrorKind::JsonDecode => "json-decode",
            ErrorKind::ComputedOnlyWithoutValue => "computed-only-without-value",
            ErrorKind::NotPersistable => "not-persistable",
        };
        f.write_str(name)
    }
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, source: ValidationError) -> Self {
        Self::Invalid {
            key: key.to_string(),
            source,
        }
    }

    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::UnknownKey(_) => ErrorKind::UnknownKey,
            ConfigError::Invalid { source, .. } => match source {
                ValidationError::Coercion { .. } => ErrorKind::Coercion,
                ValidationError::Structure { .. } => ErrorKind::StructuralValidation,
                ValidationError::JsonDecode { .. } => ErrorKind::JsonDecode,
            },
            ConfigError::ComputedOnlyWithoutValue(_) => ErrorKind::ComputedOnlyWithoutValue,
            ConfigError::NotPersistable(_) => ErrorKind::NotPersistable,
            ConfigError::Conversion { .. } => ErrorKind::Coercion,
        }
    }

    /// The key the error is about.
    pub fn key(&self) -> &str {
        match self {
            ConfigError::UnknownKey(key)
            | ConfigError::ComputedOnlyWithoutValue(key)
            | ConfigError::NotPersistable(key)
            | ConfigError::Invalid { key, .. }
            | ConfigError::Conversion { key, .. } => key,
        }
    }
}

/// Errors raised while building a registry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// Two descriptors share a name.
    #[error("duplicate configuration key '{0}'")]
    DuplicateKey(String),

    /// A static default does not satisfy its own validator.
    #[error("default for '{key}' is rejected by its validator: {source}")]
    InvalidDefault {
        /// Key whose default is wrong.
        key: String,
        /// Validator failure.
        source: ValidationError,
    },

    /// A typed key has no registry entry.
    #[error("typed key '{0}' is not registered")]
    MissingTypedKey(String),

    /// A typed key's policy disagrees with its registry entry.
    #[error("typed key '{key}' declares {declared:?} but is registered as {registered:?}")]
    PolicyMismatch {
        /// Key in question.
        key: String,
        /// Policy of the typed marker.
        declared: PolicyKind,
        /// Policy of the registry entry.
        registered: PolicyKind,
    },

    /// A registered default does not convert into the typed key's value.
    #[error("default for typed key '{key}' does not fit its Rust type: {source}")]
    DefaultTypeMismatch {
        /// Key in question.
        key: String,
        /// Resolution or conversion failure.
        source: ConfigError,
    },
}
