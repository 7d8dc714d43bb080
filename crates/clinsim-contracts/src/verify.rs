//! Verification schema and report types for generated case objects.
//!
//! The object parsed from a completion response is checked against an
//! `OutputSchema` before it may become a `GeneratedCase`. Only a passing
//! `VerificationReport` lets the pipeline assemble the case.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What the verifier checks a parsed case object against.
///
/// Combines a JSON Schema document for structure with field-level rules that
/// JSON Schema cannot express as readable messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSchema {
    /// Unique identifier for this schema (e.g. "generated-case-v1").
    pub schema_id: String,
    /// A JSON Schema document used for structural validation. `Null` skips
    /// the structural phase.
    pub json_schema: Value,
    /// Field rules evaluated after structural validation.
    pub rules: Vec<VerificationRule>,
}

/// A single verification rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRule {
    /// Identifier referenced in failure reports.
    pub rule_id: String,
    pub description: String,
    pub rule_type: VerificationRuleType,
}

/// The kinds of field checks the verifier supports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VerificationRuleType {
    /// The field must be present, non-null and non-empty (empty strings,
    /// arrays and objects count as empty).
    RequiredField { field_path: String },

    /// The field must equal one of `allowed`.
    AllowedValues {
        field_path: String,
        allowed: Vec<Value>,
    },

    /// The string field must hold at least `min_chars` characters after
    /// trimming.
    MinLength { field_path: String, min_chars: usize },

    /// The field must be an array with at least `min_items` entries.
    MinItems { field_path: String, min_items: usize },

    /// Delegate to a function registered with the verifier by name.
    Custom { function_name: String },
}

/// The result of running an `OutputSchema` against a parsed object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// True only if every rule passed.
    pub passed: bool,
    pub failures: Vec<VerificationFailure>,
}

impl VerificationReport {
    /// The failure messages in report order.
    pub fn messages(&self) -> Vec<String> {
        self.failures.iter().map(|f| f.message.clone()).collect()
    }
}

/// A single rule failure within a `VerificationReport`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationFailure {
    /// The `rule_id` of the rule that failed.
    pub rule_id: String,
    pub message: String,
}
