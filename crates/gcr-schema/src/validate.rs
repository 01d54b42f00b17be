//! # Schema Validation
//!
//! Checks a parsed document against a named schema from the
//! [`SchemaRegistry`].
//!
//! The check always computes the full violation set first (every
//! violation, not just the first), then applies the [`ToleranceTable`],
//! then records one `Schema` error per remaining violation. An
//! `additionalProperties` failure naming several fields is split into one
//! violation per field so the table can allow fields individually.
//!
//! A schema missing from the registry yields a warning by default and the
//! document is treated as valid. [`MissingSchemaPolicy::Error`] makes it an
//! error.

use std::path::Path;

use gcr_core::{Category, ValidationResult};
use jsonschema::error::ValidationErrorKind;
use serde_json::Value;

use crate::registry::{SchemaError, SchemaRegistry};
use crate::tolerance::{ToleranceTable, Violation, ViolationKind};

/// What to do when a document names a schema the registry lacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingSchemaPolicy {
    /// Record a warning and treat the document as valid.
    #[default]
    Warn,
    /// Record an error.
    Error,
}

/// Policy knobs for a validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaPolicy {
    /// Missing-schema handling.
    pub missing_schema: MissingSchemaPolicy,
    /// Known-safe violations to suppress.
    pub tolerances: ToleranceTable,
}

/// Validates documents against the registry under a [`SchemaPolicy`].
#[derive(Debug)]
pub struct SchemaValidator {
    registry: SchemaRegistry,
    policy: SchemaPolicy,
}

impl SchemaValidator {
    /// Create a validator over a loaded registry.
    pub fn new(registry: SchemaRegistry, policy: SchemaPolicy) -> Self {
        Self { registry, policy }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// The active policy.
    pub fn policy(&self) -> &SchemaPolicy {
        &self.policy
    }

    /// Every violation of `schema_name` by `value`, before tolerance.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the schema is unknown or does not compile.
    pub fn violations(&self, value: &Value, schema_name: &str) -> Result<Vec<Violation>, SchemaError> {
        let validator = self.registry.compile(schema_name)?;
        Ok(validator.iter_errors(value).flat_map(classify).collect())
    }

    /// Validate `value`, read from `path`, against `schema_name`.
    ///
    /// Returns `true` when no error was recorded.
    pub fn validate(
        &self,
        value: &Value,
        schema_name: &str,
        path: &Path,
        result: &mut ValidationResult,
    ) -> bool {
        let violations = match self.violations(value, schema_name) {
            Ok(v) => v,
            Err(SchemaError::NotFound(_)) => return self.missing_schema(schema_name, path, result),
            Err(e) => {
                result.error(Category::Schema, path, e.to_string());
                return false;
            }
        };

        let (remaining, suppressed) = self.policy.tolerances.filter(schema_name, violations);
        if suppressed > 0 {
            tracing::debug!(
                path = %path.display(),
                schema = schema_name,
                suppressed,
                "tolerated schema violations"
            );
        }

        for violation in &remaining {
            result.error(
                Category::Schema,
                path,
                format!("schema '{schema_name}' violation at {violation}"),
            );
        }
        remaining.is_empty()
    }

    fn missing_schema(&self, schema_name: &str, path: &Path, result: &mut ValidationResult) -> bool {
        let message = format!("schema '{schema_name}' not found, skipping");
        match self.policy.missing_schema {
            MissingSchemaPolicy::Warn => {
                result.warning(Category::Schema, path, message);
                true
            }
            MissingSchemaPolicy::Error => {
                result.error(Category::Schema, path, message);
                false
            }
        }
    }
}

/// Turn one `jsonschema` error into one or more [`Violation`]s.
fn classify(err: jsonschema::ValidationError<'_>) -> Vec<Violation> {
    let instance_path = err.instance_path.to_string();
    let kind = match &err.kind {
        ValidationErrorKind::AdditionalProperties { unexpected } => {
            return unexpected
                .iter()
                .map(|field| Violation {
                    instance_path: instance_path.clone(),
                    kind: ViolationKind::AdditionalProperty(field.clone()),
                    message: format!("additional property {field:?} is not allowed"),
                    instance: err.instance.clone().into_owned(),
                })
                .collect();
        }
        ValidationErrorKind::Required { .. } => ViolationKind::Required,
        ValidationErrorKind::Type { .. } => ViolationKind::Type,
        ValidationErrorKind::Enum { .. } => ViolationKind::Enum,
        ValidationErrorKind::Pattern { .. } => ViolationKind::Pattern,
        _ => ViolationKind::Other,
    };
    vec![Violation {
        instance_path,
        kind,
        message: err.to_string(),
        instance: err.instance.into_owned(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn registry_with(schemas: &[(&str, Value)]) -> (tempfile::TempDir, SchemaRegistry) {
        let dir = tempfile::tempdir().unwrap();
        for (name, schema) in schemas {
            std::fs::write(
                dir.path().join(format!("{name}.schema.json")),
                schema.to_string(),
            )
            .unwrap();
        }
        let registry = SchemaRegistry::load(dir.path()).unwrap();
        (dir, registry)
    }

    fn manifest_schema() -> Value {
        json!({
            "type": "object",
            "required": ["specVersion", "minConsumerVersion"],
            "additionalProperties": false,
            "properties": {
                "specVersion": {"type": "string", "pattern": "^[0-9]+\\.[0-9]+$"},
                "minConsumerVersion": {"type": "string", "pattern": "^[0-9]+\\.[0-9]+$"},
                "name": {"type": "string"}
            }
        })
    }

    fn path() -> PathBuf {
        PathBuf::from("manifest.yml")
    }

    #[test]
    fn valid_document_records_nothing() {
        let (_dir, registry) = registry_with(&[("manifest", manifest_schema())]);
        let validator = SchemaValidator::new(registry, SchemaPolicy::default());
        let mut result = ValidationResult::new();
        let doc = json!({"specVersion": "1.0", "minConsumerVersion": "1.0"});
        assert!(validator.validate(&doc, "manifest", &path(), &mut result));
        assert!(result.errors().is_empty());
        assert!(result.warnings().is_empty());
    }

    #[test]
    fn all_violations_are_reported() {
        let (_dir, registry) = registry_with(&[("manifest", manifest_schema())]);
        let validator = SchemaValidator::new(registry, SchemaPolicy::default());
        let mut result = ValidationResult::new();
        let doc = json!({"specVersion": 1, "name": 7});
        assert!(!validator.validate(&doc, "manifest", &path(), &mut result));
        // missing minConsumerVersion, specVersion type, name type
        assert_eq!(result.errors().len(), 3);
        assert!(result.errors().iter().all(|e| e.category == Category::Schema));
    }

    #[test]
    fn missing_schema_warns_and_passes() {
        let validator = SchemaValidator::new(SchemaRegistry::empty("schemas"), SchemaPolicy::default());
        let mut result = ValidationResult::new();
        assert!(validator.validate(&json!({}), "adapter", &path(), &mut result));
        assert!(result.errors().is_empty());
        assert_eq!(result.warnings().len(), 1);
        assert!(result.warnings()[0].message.contains("schema 'adapter' not found"));
    }

    #[test]
    fn missing_schema_is_error_under_strict_policy() {
        let policy = SchemaPolicy {
            missing_schema: MissingSchemaPolicy::Error,
            ..SchemaPolicy::default()
        };
        let validator = SchemaValidator::new(SchemaRegistry::empty("schemas"), policy);
        let mut result = ValidationResult::new();
        assert!(!validator.validate(&json!({}), "adapter", &path(), &mut result));
        assert_eq!(result.errors().len(), 1);
        assert!(result.warnings().is_empty());
    }

    #[test]
    fn registry_extensions_field_is_tolerated_but_others_are_not() {
        let (_dir, registry) = registry_with(&[("manifest", manifest_schema())]);
        let validator = SchemaValidator::new(registry, SchemaPolicy::default());
        let mut result = ValidationResult::new();
        let doc = json!({
            "specVersion": "1.0",
            "minConsumerVersion": "1.0",
            "registryExtensions": {},
            "surprise": true
        });
        assert!(!validator.validate(&doc, "manifest", &path(), &mut result));
        assert_eq!(result.errors().len(), 1);
        assert!(result.errors()[0].message.contains("\"surprise\""));
    }

    #[test]
    fn tolerance_runs_after_full_check() {
        let (_dir, registry) = registry_with(&[("manifest", manifest_schema())]);
        let validator = SchemaValidator::new(registry, SchemaPolicy::default());
        let doc = json!({"specVersion": "1", "minConsumerVersion": "1.0", "registryExtensions": {}});

        // The raw check still sees both violations.
        let raw = validator.violations(&doc, "manifest").unwrap();
        assert_eq!(raw.len(), 2);
        assert!(raw.iter().any(|v| v.kind == ViolationKind::Pattern));
        assert!(raw
            .iter()
            .any(|v| v.kind == ViolationKind::AdditionalProperty("registryExtensions".into())));

        let mut result = ValidationResult::new();
        assert!(validator.validate(&doc, "manifest", &path(), &mut result));
        assert!(result.errors().is_empty());
    }

    #[test]
    fn no_tolerance_reports_extension_points() {
        let (_dir, registry) = registry_with(&[("manifest", manifest_schema())]);
        let policy = SchemaPolicy {
            tolerances: ToleranceTable::none(),
            ..SchemaPolicy::default()
        };
        let validator = SchemaValidator::new(registry, policy);
        let mut result = ValidationResult::new();
        let doc = json!({"specVersion": "1", "minConsumerVersion": "1.0", "registryExtensions": {}});
        assert!(!validator.validate(&doc, "manifest", &path(), &mut result));
        assert_eq!(result.errors().len(), 2);
    }

    #[test]
    fn multiple_additional_properties_split_per_field() {
        let (_dir, registry) = registry_with(&[("manifest", manifest_schema())]);
        let validator = SchemaValidator::new(registry, SchemaPolicy::default());
        let doc = json!({"specVersion": "1.0", "minConsumerVersion": "1.0", "a": 1, "b": 2});
        let raw = validator.violations(&doc, "manifest").unwrap();
        let fields: Vec<_> = raw
            .iter()
            .filter_map(|v| match &v.kind {
                ViolationKind::AdditionalProperty(f) => Some(f.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(fields.len(), 2);
        assert!(fields.contains(&"a") && fields.contains(&"b"));
    }

    #[test]
    fn compile_failure_is_a_schema_error() {
        let (_dir, registry) = registry_with(&[(
            "plugin",
            json!({"properties": {"id": {"$ref": "nowhere.schema.json"}}}),
        )]);
        let validator = SchemaValidator::new(registry, SchemaPolicy::default());
        let mut result = ValidationResult::new();
        assert!(!validator.validate(&json!({"id": "x"}), "plugin", &path(), &mut result));
        assert_eq!(result.errors().len(), 1);
        assert!(result.errors()[0].message.contains("failed to compile schema plugin"));
    }

    #[test]
    fn violation_messages_carry_instance_path() {
        let (_dir, registry) = registry_with(&[("manifest", manifest_schema())]);
        let validator = SchemaValidator::new(registry, SchemaPolicy::default());
        let mut result = ValidationResult::new();
        let doc = json!({"specVersion": "one", "minConsumerVersion": "1.0"});
        validator.validate(&doc, "manifest", &path(), &mut result);
        assert_eq!(result.errors().len(), 1);
        assert!(result.errors()[0].message.contains("/specVersion"));
    }
}
