//! # Error Types
//!
//! Structured errors for the foundational types, built with `thiserror`.
//! Validation findings are never errors in this sense: they are appended to
//! a [`ValidationResult`](crate::ValidationResult). These types cover the
//! operations that can genuinely fail before validation starts.

use std::path::PathBuf;

use thiserror::Error;

/// A version contract string could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid version contract {input:?}: {reason}")]
pub struct VersionError {
    /// The rejected input.
    pub input: String,
    /// Why it was rejected.
    pub reason: &'static str,
}

/// A layout configuration file could not be loaded.
#[derive(Error, Debug)]
pub enum LayoutError {
    /// The file could not be read.
    #[error("cannot read layout config {path}: {source}")]
    Read {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid layout YAML.
    #[error("invalid layout config {path}: {source}")]
    Parse {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying parser error.
        source: serde_yaml::Error,
    },
}
