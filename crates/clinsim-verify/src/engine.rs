//! Schema-based verifier for parsed completion objects.
//!
//! `SchemaVerifier` implements the `CaseVerifier` trait from `clinsim-core`.
//! Verification runs in two phases:
//!
//! 1. **Structural**: the payload is validated against
//!    `OutputSchema::json_schema` with the `jsonschema` crate.
//! 2. **Field rules**: each `VerificationRule` in `OutputSchema::rules` is
//!    evaluated in order. All failures are collected before returning so the
//!    caller (and any correction prompt) sees the full set in one pass.
//!
//! Custom rules delegate to named functions registered via `register_rule`.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use clinsim_contracts::{
    error::{ClinsimError, ClinsimResult},
    verify::{OutputSchema, VerificationFailure, VerificationReport, VerificationRuleType},
};
use clinsim_core::traits::CaseVerifier;

/// A caller-supplied verification function.
///
/// Receives the whole payload. Returns `Some(message)` when the check fails,
/// or `None` on success.
pub type CustomVerifierFn = Box<dyn Fn(&Value) -> Option<String> + Send + Sync>;

/// Combines JSON Schema structural validation with field-level rules.
pub struct SchemaVerifier {
    custom_rules: HashMap<String, CustomVerifierFn>,
}

impl SchemaVerifier {
    /// Create a verifier with no custom rules registered.
    pub fn new() -> Self {
        Self {
            custom_rules: HashMap::new(),
        }
    }

    /// Register a custom verification function under `name`.
    ///
    /// The name must match the `function_name` of a
    /// `VerificationRuleType::Custom` rule. Registering the same name twice
    /// replaces the previous function.
    pub fn register_rule(&mut self, name: impl Into<String>, f: CustomVerifierFn) {
        self.custom_rules.insert(name.into(), f);
    }

    /// Resolve a dot-notation field path (e.g. `"patient.age"`). Returns
    /// `None` when any segment is missing or the value is JSON `null`.
    fn resolve_path<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
        let mut current = value;
        for segment in path.split('.') {
            match current.get(segment) {
                Some(v) if !v.is_null() => current = v,
                _ => return None,
            }
        }
        Some(current)
    }

    fn is_empty(value: &Value) -> bool {
        match value {
            Value::String(s) => s.trim().is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            Value::Null => true,
            Value::Bool(_) | Value::Number(_) => false,
        }
    }

    fn render_allowed(allowed: &[Value]) -> String {
        allowed
            .iter()
            .map(|v| match v.as_str() {
                Some(s) => s.to_string(),
                None => v.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn check_rule(&self, payload: &Value, rule_type: &VerificationRuleType) -> Option<String> {
        match rule_type {
            // Present, non-null and non-empty.
            VerificationRuleType::RequiredField { field_path } => {
                match Self::resolve_path(payload, field_path) {
                    None => Some(format!("Missing required field: {field_path}")),
                    Some(v) if Self::is_empty(v) => Some(format!("Empty field: {field_path}")),
                    Some(_) => None,
                }
            }

            // Absent fields are left to their RequiredField rule.
            VerificationRuleType::AllowedValues { field_path, allowed } => {
                match Self::resolve_path(payload, field_path) {
                    Some(actual) if !allowed.contains(actual) => Some(format!(
                        "Invalid {field_path}: {actual}. Must be one of: {}",
                        Self::render_allowed(allowed)
                    )),
                    _ => None,
                }
            }

            VerificationRuleType::MinLength { field_path, min_chars } => {
                match Self::resolve_path(payload, field_path) {
                    None => None,
                    Some(Value::String(s)) if s.trim().chars().count() < *min_chars => Some(format!(
                        "{field_path} is too short (minimum {min_chars} characters)"
                    )),
                    Some(Value::String(_)) => None,
                    Some(_) => Some(format!("{field_path} must be a string")),
                }
            }

            VerificationRuleType::MinItems { field_path, min_items } => {
                let plural = if *min_items == 1 { "item" } else { "items" };
                match Self::resolve_path(payload, field_path) {
                    None => None,
                    Some(Value::Array(items)) if items.len() >= *min_items => None,
                    Some(_) => Some(format!(
                        "{field_path} must be a list with at least {min_items} {plural}"
                    )),
                }
            }

            // An unregistered name is itself a failure so misconfigured
            // schemas surface immediately.
            VerificationRuleType::Custom { function_name } => {
                match self.custom_rules.get(function_name.as_str()) {
                    Some(f) => f(payload),
                    None => Some(format!(
                        "no custom rule registered for function name '{function_name}'"
                    )),
                }
            }
        }
    }
}

impl Default for SchemaVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl CaseVerifier for SchemaVerifier {
    /// Verify `payload` against `schema`.
    ///
    /// Returns `ClinsimError::SchemaValidation` only when the JSON Schema
    /// document itself does not compile; every payload problem is a failure
    /// inside the report.
    fn verify(&self, payload: &Value, schema: &OutputSchema) -> ClinsimResult<VerificationReport> {
        let mut failures: Vec<VerificationFailure> = Vec::new();

        // ── Phase 1: JSON Schema structural validation ────────────────────────
        //
        // A null json_schema means "no structural constraint".
        if !schema.json_schema.is_null() {
            let validator = jsonschema::validator_for(&schema.json_schema).map_err(|e| {
                ClinsimError::SchemaValidation {
                    reason: format!("schema '{}' does not compile: {}", schema.schema_id, e),
                }
            })?;

            // The instance value is left out of the message; it may carry the
            // diagnosis.
            for error in validator.iter_errors(payload) {
                let message = format!(
                    "JSON Schema violation at {} (schema {})",
                    error.instance_path, error.schema_path
                );
                warn!(schema_id = %schema.schema_id, %message, "structural validation failure");
                failures.push(VerificationFailure {
                    rule_id: "json-schema".to_string(),
                    message,
                });
            }
        }

        // ── Phase 2: Field rules ──────────────────────────────────────────────
        for rule in &schema.rules {
            debug!(
                rule_id = %rule.rule_id,
                description = %rule.description,
                "evaluating verification rule"
            );

            if let Some(message) = self.check_rule(payload, &rule.rule_type) {
                warn!(rule_id = %rule.rule_id, %message, "verification rule failed");
                failures.push(VerificationFailure {
                    rule_id: rule.rule_id.clone(),
                    message,
                });
            }
        }

        let passed = failures.is_empty();
        debug!(
            schema_id = %schema.schema_id,
            passed,
            failure_count = failures.len(),
            "verification complete"
        );

        Ok(VerificationReport { passed, failures })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use clinsim_contracts::{
        error::ClinsimError,
        verify::{OutputSchema, VerificationRule, VerificationRuleType},
    };
    use clinsim_core::traits::CaseVerifier;

    use super::SchemaVerifier;

    // ── Builder helpers ───────────────────────────────────────────────────────

    fn make_schema(json_schema: Value, rules: Vec<VerificationRule>) -> OutputSchema {
        OutputSchema {
            schema_id: "test-schema-v1".to_string(),
            json_schema,
            rules,
        }
    }

    fn rule(id: &str, rule_type: VerificationRuleType) -> VerificationRule {
        VerificationRule {
            rule_id: id.to_string(),
            description: format!("test rule {id}"),
            rule_type,
        }
    }

    fn required(path: &str) -> VerificationRuleType {
        VerificationRuleType::RequiredField {
            field_path: path.to_string(),
        }
    }

    // ── JSON Schema ───────────────────────────────────────────────────────────

    #[test]
    fn structural_type_mismatch_fails() {
        let verifier = SchemaVerifier::new();
        let json_schema = json!({
            "type": "object",
            "properties": { "diagnosis": { "type": "string" } }
        });

        let report = verifier
            .verify(&json!({ "diagnosis": 42 }), &make_schema(json_schema, vec![]))
            .unwrap();

        assert!(!report.passed);
        assert_eq!(report.failures[0].rule_id, "json-schema");
        assert!(report.failures[0].message.contains("/diagnosis"), "got: {}", report.failures[0].message);
    }

    #[test]
    fn structural_failure_omits_instance_value() {
        let verifier = SchemaVerifier::new();
        let json_schema = json!({
            "type": "object",
            "properties": { "diagnosis": { "type": "string" } }
        });

        let report = verifier
            .verify(
                &json!({ "diagnosis": ["Myocardial infarction"] }),
                &make_schema(json_schema, vec![]),
            )
            .unwrap();

        let message = &report.failures[0].message;
        assert!(message.contains("/diagnosis"), "got: {message}");
        assert!(message.contains("/properties/diagnosis/type"), "got: {message}");
        assert!(!message.to_lowercase().contains("myocardial"), "got: {message}");
    }

    #[test]
    fn uncompilable_schema_is_error() {
        let verifier = SchemaVerifier::new();
        let schema = make_schema(json!({ "type": "no-such-type" }), vec![]);

        let err = verifier.verify(&json!({}), &schema).unwrap_err();
        assert!(matches!(err, ClinsimError::SchemaValidation { .. }), "got: {err:?}");
    }

    // ── RequiredField ─────────────────────────────────────────────────────────

    #[test]
    fn required_field_missing_and_empty() {
        let verifier = SchemaVerifier::new();
        let schema = make_schema(
            Value::Null,
            vec![
                rule("req-diagnosis", required("diagnosis")),
                rule("req-notes", required("clinical_notes")),
                rule("req-objectives", required("learning_objectives")),
            ],
        );

        let report = verifier
            .verify(&json!({ "clinical_notes": "   ", "learning_objectives": [] }), &schema)
            .unwrap();

        assert_eq!(
            report.messages(),
            vec![
                "Missing required field: diagnosis".to_string(),
                "Empty field: clinical_notes".to_string(),
                "Empty field: learning_objectives".to_string(),
            ]
        );
    }

    #[test]
    fn required_field_resolves_dot_paths() {
        let verifier = SchemaVerifier::new();
        let schema = make_schema(Value::Null, vec![rule("req-age", required("patient.age"))]);

        assert!(verifier.verify(&json!({ "patient": { "age": 0 } }), &schema).unwrap().passed);
        assert!(!verifier.verify(&json!({ "patient": null }), &schema).unwrap().passed);
    }

    // ── AllowedValues ─────────────────────────────────────────────────────────

    #[test]
    fn allowed_values_lists_options() {
        let verifier = SchemaVerifier::new();
        let schema = make_schema(
            Value::Null,
            vec![rule(
                "allowed-difficulty",
                VerificationRuleType::AllowedValues {
                    field_path: "difficulty_level".to_string(),
                    allowed: vec![json!("beginner"), json!("advanced")],
                },
            )],
        );

        let report = verifier.verify(&json!({ "difficulty_level": "expert" }), &schema).unwrap();
        assert_eq!(
            report.messages(),
            vec!["Invalid difficulty_level: \"expert\". Must be one of: beginner, advanced".to_string()]
        );

        // Absent field is left to RequiredField.
        assert!(verifier.verify(&json!({}), &schema).unwrap().passed);
    }

    // ── MinLength / MinItems ──────────────────────────────────────────────────

    #[test]
    fn min_length_counts_trimmed_chars() {
        let verifier = SchemaVerifier::new();
        let schema = make_schema(
            Value::Null,
            vec![rule(
                "len-diagnosis",
                VerificationRuleType::MinLength {
                    field_path: "diagnosis".to_string(),
                    min_chars: 3,
                },
            )],
        );

        assert!(!verifier.verify(&json!({ "diagnosis": "  MI  " }), &schema).unwrap().passed);
        assert!(verifier.verify(&json!({ "diagnosis": "GERD" }), &schema).unwrap().passed);
        assert!(!verifier.verify(&json!({ "diagnosis": ["GERD"] }), &schema).unwrap().passed);
    }

    #[test]
    fn min_items_requires_array() {
        let verifier = SchemaVerifier::new();
        let schema = make_schema(
            Value::Null,
            vec![rule(
                "items-differentials",
                VerificationRuleType::MinItems {
                    field_path: "differential_diagnoses".to_string(),
                    min_items: 2,
                },
            )],
        );

        let report = verifier
            .verify(&json!({ "differential_diagnoses": ["Angina"] }), &schema)
            .unwrap();
        assert_eq!(
            report.messages(),
            vec!["differential_diagnoses must be a list with at least 2 items".to_string()]
        );

        let report = verifier
            .verify(&json!({ "differential_diagnoses": "Angina, GERD" }), &schema)
            .unwrap();
        assert!(!report.passed, "a string is not a list");
    }

    // ── Custom rules ──────────────────────────────────────────────────────────

    #[test]
    fn custom_rule_failure_carries_message() {
        let mut verifier = SchemaVerifier::new();
        verifier.register_rule(
            "no-placeholder",
            Box::new(|payload| {
                let text = payload.get("diagnosis")?.as_str()?;
                text.contains("TODO").then(|| "diagnosis is a placeholder".to_string())
            }),
        );
        let schema = make_schema(
            Value::Null,
            vec![rule(
                "custom-placeholder",
                VerificationRuleType::Custom {
                    function_name: "no-placeholder".to_string(),
                },
            )],
        );

        let report = verifier.verify(&json!({ "diagnosis": "TODO" }), &schema).unwrap();
        assert_eq!(report.failures[0].rule_id, "custom-placeholder");
        assert_eq!(report.failures[0].message, "diagnosis is a placeholder");

        assert!(verifier.verify(&json!({ "diagnosis": "Asthma" }), &schema).unwrap().passed);
    }

    #[test]
    fn unregistered_custom_rule_fails() {
        let verifier = SchemaVerifier::new();
        let schema = make_schema(
            Value::Null,
            vec![rule(
                "phantom-check",
                VerificationRuleType::Custom {
                    function_name: "does-not-exist".to_string(),
                },
            )],
        );

        let report = verifier.verify(&json!({}), &schema).unwrap();
        assert!(!report.passed);
        assert!(report.failures[0].message.contains("does-not-exist"));
    }
}
