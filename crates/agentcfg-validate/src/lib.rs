//! # agentcfg Validate - Configuration Value Rules
//!
//! Runtime validators for device-agent configuration values. Raw values reach
//! the agent as strings (environment variables, database rows) or as native
//! JSON values (live computations). The rules in this crate decide which raw
//! values are legal and normalise them to one canonical JSON representation.
//!
//! ## Components
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`coerce`] | Permissive number and boolean coercers |
//! | [`Rule`] / [`Validator`] | Composable rules: primitives, unions, structures |
//! | Embedded documents | JSON documents round-tripped through a string field |
//! | [`ValidationError`] | Located failures (coercion, structure, JSON decode) |
//!
//! ## Architecture
//!
//! ```text
//!   raw value (string / number / bool / null / object)
//!        │
//!        ▼
//!  ┌───────────┐   Union ──▶ members in declared order, first success wins
//!  │   Rule    │   Structure ──▶ every declared field, unknown fields dropped
//!  │ (Arc'd)   │   EmbeddedDocument ──▶ parse JSON text, then inner rule
//!  └─────┬─────┘
//!        │  PermissiveNumber / PermissiveBoolean / Primitive / Null
//!        ▼
//!   canonical JSON value  ──encode──▶  stored representation
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use agentcfg_validate::{Rule, ValidationError};
//! use serde_json::json;
//!
//! let port = Rule::permissive_number();
//! assert_eq!(port.decode(&json!("48484")).unwrap(), json!(48484));
//!
//! let flag = Rule::permissive_boolean();
//! assert!(matches!(
//!     flag.decode(&json!("yes")),
//!     Err(ValidationError::Coercion { .. })
//! ));
//! ```
//!
//! ## Notes
//!
//! - Rules are immutable and `Send + Sync`; share them freely across threads.
//! - Decoding never performs I/O.

pub mod coerce;
mod document;
mod error;
mod rule;

pub use error::{Expected, FieldPath, Result, ValidationError};
pub use rule::{Field, Primitive, Rule, Validator};
