//! # agentcfg Schema - Typed Configuration Registry
//!
//! The single source of truth for the device agent's configuration keys:
//! for each key, which raw values are legal, how they are coerced, and what
//! the key resolves to when no value is stored.
//!
//! ## Components
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`KeyDescriptor`] | Name, rule, default policy, source and value kind of one key |
//! | [`ConfigSchema`] | Immutable key → descriptor table, built once per process |
//! | Resolution | [`ConfigSchema::resolve`]: raw value or default → validated value |
//! | [`keys`] | One marker type per key, fixing its Rust type at compile time |
//!
//! ## Architecture
//!
//! ```text
//!   caller (env reader, database layer, computed-value producers)
//!        │  key + raw value (or none)
//!        ▼
//!  ┌──────────────┐  lookup   ┌──────────────────┐
//!  │ ConfigSchema │──────────▶│  KeyDescriptor   │
//!  │  (OnceLock)  │           │ rule │ default   │
//!  └──────┬───────┘           └──┬───────┬───────┘
//!         │                      │       │
//!         │      raw present ────┘       └──── raw absent
//!         │      Rule::decode                Static / NoDefault / ComputedOnly
//!         ▼
//!   ResolvedValue { value, origin }  ──▶  SchemaKey::Value (typed)
//! ```
//!
//! ## Default Policies
//!
//! | Policy | Missing value resolves to | Typed value |
//! |--------|---------------------------|-------------|
//! | `Static(v)` | `v` | `T` |
//! | `NoDefault` | `null` | `Option<T>` |
//! | `ComputedOnly` | error: caller must supply the live value | `T`, live value required |
//!
//! ## Usage
//!
//! ```rust
//! use agentcfg_schema::{keys, schema, ErrorKind};
//! use serde_json::json;
//!
//! let registry = schema();
//!
//! // Untyped: any key by name.
//! let resolved = registry.resolve("deltaRetryCount", Some(&json!("12"))).unwrap();
//! assert_eq!(resolved.value, json!(12));
//!
//! // Typed: the marker decides the Rust type.
//! let logging: bool = registry.get::<keys::LoggingEnabled>(None).unwrap();
//! assert!(logging);
//!
//! // Computed keys cannot be defaulted.
//! let err = registry.resolve("provisioned", None).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::ComputedOnlyWithoutValue);
//! ```
//!
//! ## Notes
//!
//! - No I/O happens here. Reading the stored raw value is the caller's job.
//! - The registry is never mutated after construction; resolution is safe
//!   from any number of threads.

mod builtin;
mod descriptor;
mod error;
pub mod keys;
mod registry;
mod resolve;
mod typed;
pub mod values;

pub use builtin::{DEFAULT_DELTA_ENDPOINT, DEFAULT_MIXPANEL_TOKEN};
pub use descriptor::{
    DefaultPolicy, DescriptorSummary, KeyDescriptor, KeySource, PolicyKind, ValueKind,
};
pub use error::{ConfigError, ErrorKind, Result, SchemaError};
pub use registry::{schema, ConfigSchema, SchemaBuilder};
pub use resolve::{Origin, ResolvedValue};
pub use typed::{Computed, Defaultable, Nullable, Policy, SchemaKey, Static};
