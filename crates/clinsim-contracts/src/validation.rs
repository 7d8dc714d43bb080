//! Validation verdict types.
//!
//! Each individual check returns a `CheckOutcome`; the aggregate of a full
//! validation run is a `ValidationResult`. Errors block case generation,
//! warnings and recommendations never do.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The result of one validation check.
///
/// `is_valid()` is derived from `errors` alone, so a check can never report
/// success while carrying an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl CheckOutcome {
    /// An outcome with no errors and no warnings.
    pub fn pass() -> Self {
        Self::default()
    }

    /// An outcome carrying a single error.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            warnings: Vec::new(),
        }
    }

    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn push_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Move every error and warning of `other` into `self`.
    pub fn absorb(&mut self, other: CheckOutcome) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// True when the check produced no errors.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Every message, errors first.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .map(String::as_str)
    }
}

/// The aggregate verdict of `comprehensive_validation`.
///
/// Fields are private: a result is built once through [`ValidationResult::new`]
/// and only read afterwards. Deserializing recomputes `is_valid` from
/// `errors`, whatever the document says.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ValidationRecord")]
pub struct ValidationResult {
    is_valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
    recommendations: Vec<String>,
    timestamp: DateTime<Utc>,
}

impl ValidationResult {
    /// Build a result. `is_valid` is true iff `errors` is empty.
    pub fn new(errors: Vec<String>, warnings: Vec<String>, recommendations: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            recommendations,
            timestamp: Utc::now(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Wire form of [`ValidationResult`]; a serialized `is_valid` is ignored.
#[derive(Deserialize)]
struct ValidationRecord {
    #[serde(default)]
    errors: Vec<String>,
    #[serde(default)]
    warnings: Vec<String>,
    #[serde(default)]
    recommendations: Vec<String>,
    timestamp: DateTime<Utc>,
}

impl From<ValidationRecord> for ValidationResult {
    fn from(record: ValidationRecord) -> Self {
        Self {
            is_valid: record.errors.is_empty(),
            errors: record.errors,
            warnings: record.warnings,
            recommendations: record.recommendations,
            timestamp: record.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn deserialized_validity_follows_errors() {
        let result: ValidationResult = serde_json::from_value(json!({
            "is_valid": true,
            "errors": ["Invalid specialty: podiatry"],
            "timestamp": "2026-01-05T09:30:00Z"
        }))
        .unwrap();
        assert!(!result.is_valid());
        assert_eq!(result.errors(), ["Invalid specialty: podiatry".to_string()]);

        let result: ValidationResult = serde_json::from_value(json!({
            "is_valid": false,
            "errors": [],
            "warnings": ["Symptom 'rash' is unusual"],
            "timestamp": "2026-01-05T09:30:00Z"
        }))
        .unwrap();
        assert!(result.is_valid());
    }

    #[test]
    fn serialized_result_reads_back_unchanged() {
        let result = ValidationResult::new(vec![], vec!["w".to_string()], vec!["r".to_string()]);
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(serde_json::from_str::<ValidationResult>(&json).unwrap(), result);
    }

    #[test]
    fn check_outcome_validity() {
        let mut outcome = CheckOutcome::pass();
        outcome.push_warning("unusual");
        assert!(outcome.is_valid());
        outcome.absorb(CheckOutcome::error("bad"));
        assert!(!outcome.is_valid());
        assert_eq!(outcome.messages().collect::<Vec<_>>(), ["bad", "unusual"]);
    }
}
