//! # Tolerance Table
//!
//! Some schema violations are known extension points rather than defects.
//! They are listed here as data: each [`ToleranceRule`] names a schema, an
//! instance path, a violation kind and an acceptance condition. The table
//! is consulted only after the full violation set has been computed, so
//! removing a row immediately turns the suppressed violations back into
//! errors without touching the checker.
//!
//! The standard table suppresses:
//!
//! | Schema | Path | Kind | When |
//! |---|---|---|---|
//! | any | root | additional property `registryExtensions` | always |
//! | `manifest` | `/specVersion` | pattern | value is a short-form contract (`"1"`) |
//! | `index` | `/specVersion` | pattern | value is a short-form contract |
//!
//! Only the named field is allowed at root. Other unexpected top-level
//! fields stay errors.

use std::fmt;

use gcr_core::VersionContract;
use serde_json::Value;

/// Classification of a single schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// A required property is missing.
    Required,
    /// Wrong JSON type.
    Type,
    /// Value not in the enum.
    Enum,
    /// String does not match the pattern.
    Pattern,
    /// An object carries a property the schema does not allow.
    AdditionalProperty(String),
    /// Anything else.
    Other,
}

/// One schema violation.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// JSON Pointer to the violating value; empty for the root.
    pub instance_path: String,
    /// Classification.
    pub kind: ViolationKind,
    /// Human-readable message.
    pub message: String,
    /// The violating value.
    pub instance: Value,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Which schemas a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSelector {
    /// Every schema.
    Any,
    /// One schema, by registry name.
    Named(String),
}

impl SchemaSelector {
    fn matches(&self, schema_name: &str) -> bool {
        match self {
            SchemaSelector::Any => true,
            SchemaSelector::Named(name) => name == schema_name,
        }
    }
}

/// Extra condition on the violating value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// No condition.
    Always,
    /// The value is a string holding a short-form version contract.
    VersionShortForm,
}

impl Acceptance {
    fn accepts(self, instance: &Value) -> bool {
        match self {
            Acceptance::Always => true,
            Acceptance::VersionShortForm => instance
                .as_str()
                .is_some_and(VersionContract::is_short_form),
        }
    }
}

/// A single suppression row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToleranceRule {
    /// Schemas this row applies to.
    pub schema: SchemaSelector,
    /// Exact instance path (`""` for the document root).
    pub instance_path: String,
    /// Violation kind, including the field name for additional properties.
    pub kind: ViolationKind,
    /// Condition on the violating value.
    pub accept: Acceptance,
}

impl ToleranceRule {
    /// True if this row suppresses `violation` reported against `schema_name`.
    pub fn suppresses(&self, schema_name: &str, violation: &Violation) -> bool {
        self.schema.matches(schema_name)
            && self.instance_path == violation.instance_path
            && self.kind == violation.kind
            && self.accept.accepts(&violation.instance)
    }
}

/// The set of suppression rows applied to every validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToleranceTable {
    rules: Vec<ToleranceRule>,
}

impl Default for ToleranceTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ToleranceTable {
    /// The standard table (see module docs).
    pub fn standard() -> Self {
        let short_version = |schema: &str| ToleranceRule {
            schema: SchemaSelector::Named(schema.to_string()),
            instance_path: "/specVersion".to_string(),
            kind: ViolationKind::Pattern,
            accept: Acceptance::VersionShortForm,
        };
        Self {
            rules: vec![
                ToleranceRule {
                    schema: SchemaSelector::Any,
                    instance_path: String::new(),
                    kind: ViolationKind::AdditionalProperty("registryExtensions".to_string()),
                    accept: Acceptance::Always,
                },
                short_version("manifest"),
                short_version("index"),
            ],
        }
    }

    /// An empty table: every violation is reported.
    pub fn none() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a row.
    pub fn with_rule(mut self, rule: ToleranceRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// The rows, in order.
    pub fn rules(&self) -> &[ToleranceRule] {
        &self.rules
    }

    /// Split `violations` into those that remain and the number suppressed.
    pub fn filter(&self, schema_name: &str, violations: Vec<Violation>) -> (Vec<Violation>, usize) {
        let before = violations.len();
        let kept: Vec<Violation> = violations
            .into_iter()
            .filter(|v| !self.rules.iter().any(|r| r.suppresses(schema_name, v)))
            .collect();
        let suppressed = before - kept.len();
        (kept, suppressed)
    }
}
