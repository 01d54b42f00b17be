//! # gcr-schema: Schema Registry & Validation
//!
//! Loads the registry's schema documents, parses registry documents from
//! disk, and checks them against named schemas.
//!
//! ## Modules
//!
//! - [`registry`]: [`SchemaRegistry`], holding every `*.schema.json` (or YAML)
//!   file under the schema directory, indexed by name, file name and `$id`,
//!   with cross-schema `$ref`s resolved locally. Never touches the network.
//! - [`loader`]: YAML/JSON documents into `serde_json::Value` trees. Parse
//!   failures are recorded and the caller moves on.
//! - [`validate`]: [`SchemaValidator`], running full structural validation, then
//!   the [`ToleranceTable`] filter, then one error per remaining violation.
//! - [`tolerance`]: the declarative table of known-safe violations.
//!
//! ## Crate Policy
//!
//! - Depends only on `gcr-core` internally.
//! - A missing schema degrades to a warning unless the caller opts into
//!   [`MissingSchemaPolicy::Error`].
//! - Tolerance is applied after validation, never by skipping it.

pub mod loader;
pub mod registry;
pub mod tolerance;
pub mod validate;

pub use loader::{load_document, load_into, LoadError};
pub use registry::{SchemaDocument, SchemaError, SchemaLoadFailure, SchemaRegistry};
pub use tolerance::{Acceptance, SchemaSelector, ToleranceRule, ToleranceTable, Violation, ViolationKind};
pub use validate::{MissingSchemaPolicy, SchemaPolicy, SchemaValidator};
