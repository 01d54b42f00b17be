//! # Validation Result
//!
//! The aggregator threaded through every validation step. It holds two
//! ordered sequences, errors and warnings, and is the only place that
//! decides whether a run passed: the exit status is non-zero if and only if
//! at least one error was recorded. Warnings never affect it.
//!
//! Findings carry paths relative to the registry root when the result was
//! created with [`ValidationResult::for_root`], so reports are stable no
//! matter where the registry is checked out.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

/// What kind of defect a finding describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Malformed structured text, or an unreadable file.
    Parse,
    /// A document violates its declared schema.
    Schema,
    /// A reference does not resolve or does not match its expected value.
    Reference,
    /// Cosmetic drift or a missing optional companion.
    Advisory,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Parse => "parse",
            Category::Schema => "schema",
            Category::Reference => "reference",
            Category::Advisory => "advisory",
        })
    }
}

/// One error or warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Defect category.
    pub category: Category,
    /// Offending file or directory.
    pub path: PathBuf,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.as_os_str().is_empty() {
            write!(f, "(registry): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path.display(), self.message)
        }
    }
}

/// Accumulated outcome of a validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    #[serde(skip)]
    root: PathBuf,
    errors: Vec<Finding>,
    warnings: Vec<Finding>,
}

impl ValidationResult {
    /// An empty result whose finding paths are kept as given.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty result that reports paths relative to `root`.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Record a fatal finding.
    pub fn error(&mut self, category: Category, path: &Path, message: impl Into<String>) {
        let finding = self.finding(category, path, message.into());
        self.errors.push(finding);
    }

    /// Record an advisory finding.
    pub fn warning(&mut self, category: Category, path: &Path, message: impl Into<String>) {
        let finding = self.finding(category, path, message.into());
        self.warnings.push(finding);
    }

    fn finding(&self, category: Category, path: &Path, message: String) -> Finding {
        let path = if self.root.as_os_str().is_empty() {
            path
        } else {
            path.strip_prefix(&self.root).unwrap_or(path)
        };
        Finding {
            category,
            path: path.to_path_buf(),
            message,
        }
    }

    /// Recorded errors, in detection order.
    pub fn errors(&self) -> &[Finding] {
        &self.errors
    }

    /// Recorded warnings, in detection order.
    pub fn warnings(&self) -> &[Finding] {
        &self.warnings
    }

    /// True when no error has been recorded.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Process exit status: 0 when there are no errors, 1 otherwise.
    pub fn exit_status(&self) -> u8 {
        if self.errors.is_empty() {
            0
        } else {
            1
        }
    }

    /// The final pass/fail line.
    pub fn summary_line(&self) -> String {
        let verdict = if self.is_success() { "PASS" } else { "FAIL" };
        format!(
            "{verdict}: registry validation {} with {} error(s) and {} warning(s)",
            if self.is_success() { "succeeded" } else { "failed" },
            self.errors.len(),
            self.warnings.len()
        )
    }

    /// Write the human-readable report: warnings, then errors, then the
    /// summary line.
    pub fn report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if !self.warnings.is_empty() {
            writeln!(out, "Warnings ({}):", self.warnings.len())?;
            for w in &self.warnings {
                writeln!(out, "  WARN  {w}")?;
            }
            writeln!(out)?;
        }
        if !self.errors.is_empty() {
            writeln!(out, "Errors ({}):", self.errors.len())?;
            for e in &self.errors {
                writeln!(out, "  ERROR {e}")?;
            }
            writeln!(out)?;
        }
        writeln!(out, "{}", self.summary_line())
    }
}
