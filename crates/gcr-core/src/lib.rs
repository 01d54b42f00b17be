#![deny(missing_docs)]

//! # gcr-core: Foundational Types for the Game Config Registry
//!
//! This crate defines the types every other crate in the workspace shares.
//! It has no internal crate dependencies, only `serde`, `serde_json`,
//! `serde_yaml` and `thiserror` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **One typed struct per document kind.** Registry documents are read
//!    into [`ManifestDocument`], [`EntryDocument`], [`PluginDocument`] and
//!    friends after schema validation. [`DocumentKind`] maps every kind to
//!    the schema it is checked against, so there is exactly one schema-check
//!    path for all of them.
//!
//! 2. **[`ValidationResult`] is the sole authority on pass/fail.** Every
//!    component appends findings to it; nothing else decides exit status.
//!
//! 3. **Layout is configuration, not code.** File and directory names live
//!    in [`RegistryLayout`] and can be overridden from YAML or environment.

pub mod document;
pub mod error;
pub mod layout;
pub mod result;
pub mod version;

pub use document::{
    AdapterDocument, ConfigFileDescriptor, ConfigFileSchema, ConfigFormat, ConfigSpecIndex,
    Document, DocumentKind, EntryDocument, EntryReference, FrameworkDescriptor,
    FrameworkDocument, FrameworksSpec, IndexDocument, ManifestDocument, OwnedDocument,
    PluginDocument, PluginSchemaFile, RegistryExtensions,
};
pub use error::{LayoutError, VersionError};
pub use layout::RegistryLayout;
pub use result::{Category, Finding, ValidationResult};
pub use version::VersionContract;
