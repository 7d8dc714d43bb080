//! # clinsim-validate
//!
//! Medical-coherence validation of case requests.
//!
//! ## Overview
//!
//! Two [`CaseValidator`](clinsim_core::traits::CaseValidator) strategies:
//!
//! - [`ValidationEngine`] reads the rule tables of a loaded `KnowledgeBase`.
//! - [`LegacyValidator`] uses fixed built-in tables and needs no document.
//!
//! [`build_validator`] picks one from the configured `ValidatorKind`.
//!
//! ## Verdicts
//!
//! A request is valid iff no check produced an error. Warnings and
//! recommendations are advisory and never block generation.

use std::sync::Arc;

use clinsim_core::{traits::CaseValidator, ValidatorKind};
use clinsim_knowledge::KnowledgeBase;

pub mod engine;
pub mod legacy;

pub use engine::ValidationEngine;
pub use legacy::LegacyValidator;

/// Build the validator selected by `kind`.
pub fn build_validator(kind: ValidatorKind, kb: Arc<KnowledgeBase>) -> Box<dyn CaseValidator> {
    match kind {
        ValidatorKind::Knowledge => Box::new(ValidationEngine::new(kb)),
        ValidatorKind::Legacy => Box::new(LegacyValidator::new()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use clinsim_contracts::case::{CaseRequest, Demographics, Difficulty};
    use clinsim_core::{traits::CaseValidator, ValidatorKind};
    use clinsim_knowledge::KnowledgeBase;

    use crate::{build_validator, LegacyValidator, ValidationEngine};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn engine() -> ValidationEngine {
        ValidationEngine::new(Arc::new(KnowledgeBase::bundled().unwrap()))
    }

    fn keys(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn request(specialty: &str, symptoms: &[&str], age: i32, severity: &str) -> CaseRequest {
        CaseRequest {
            specialty: specialty.to_string(),
            symptoms: keys(symptoms),
            demographics: Demographics {
                age,
                gender: "Female".to_string(),
                occupation: "Nurse".to_string(),
                medical_history: None,
            },
            severity: severity.to_string(),
            difficulty: Difficulty::Intermediate,
        }
    }

    // ── validate_specialty ────────────────────────────────────────────────────

    #[test]
    fn empty_specialty_is_error() {
        let outcome = engine().validate_specialty("  ");
        assert_eq!(outcome.errors, vec!["Specialty cannot be empty".to_string()]);
    }

    #[test]
    fn unknown_specialty_lists_known_keys() {
        let outcome = engine().validate_specialty("podiatry");
        assert_eq!(outcome.errors.len(), 2);
        assert_eq!(outcome.errors[0], "Unknown specialty: podiatry");
        assert!(outcome.errors[1].starts_with("Available specialties: cardiology"));
        assert!(outcome.errors[1].contains("respiratory"));
    }

    // ── validate_symptoms ─────────────────────────────────────────────────────

    #[test]
    fn empty_symptom_set_is_error() {
        let outcome = engine().validate_symptoms(&[]);
        assert!(!outcome.is_valid());
        assert_eq!(outcome.errors, vec!["At least one symptom must be provided".to_string()]);
    }

    #[test]
    fn unknown_symptoms_are_listed_with_first_ten_known() {
        let outcome = engine().validate_symptoms(&keys(&["chest_pain", "bunion", "hiccups"]));
        assert_eq!(outcome.errors[0], "Unknown symptoms: bunion, hiccups");

        let listed = outcome.errors[1]
            .trim_start_matches("Available symptoms (first 10): ")
            .trim_end_matches("...");
        assert_eq!(listed.split(", ").count(), 10);
    }

    // ── validate_combination ──────────────────────────────────────────────────

    #[test]
    fn contraindicated_only_set_fails() {
        let outcome = engine().validate_combination("cardiology", &keys(&["rash"]));

        assert!(!outcome.is_valid());
        assert!(outcome
            .errors
            .iter()
            .any(|e| e == "Contraindicated symptoms for cardiology: rash"));
        assert!(outcome
            .errors
            .iter()
            .any(|e| e.starts_with("No typical symptoms found for cardiology")));
        assert!(outcome.warnings.is_empty(), "contraindicated symptoms are not also unusual");
    }

    #[test]
    fn unusual_symptom_is_warning_only() {
        let outcome = engine().validate_combination("cardiology", &keys(&["chest_pain", "cough"]));

        assert!(outcome.is_valid(), "unexpected errors: {:?}", outcome.errors);
        assert_eq!(outcome.warnings, vec!["Unusual symptoms for cardiology: cough".to_string()]);
    }

    #[test]
    fn too_many_symptoms_is_error() {
        let symptoms = keys(&[
            "chest_pain",
            "shortness_breath",
            "palpitations",
            "dizziness",
            "fatigue",
            "swelling_legs",
            "irregular_heartbeat",
        ]);
        let outcome = engine().validate_combination("cardiology", &symptoms);
        assert!(outcome
            .errors
            .iter()
            .any(|e| e == "Too many symptoms for cardiology. Maximum: 6, provided: 7"));
    }

    #[test]
    fn combination_reports_key_errors_first() {
        let outcome = engine().validate_combination("podiatry", &[]);
        assert_eq!(outcome.errors[0], "Unknown specialty: podiatry");
        assert!(outcome.errors.contains(&"At least one symptom must be provided".to_string()));
    }

    #[test]
    fn missing_combination_rule_falls_back_to_associations() {
        let doc = json!({
            "medical_specialties": {
                "toxicology": {
                    "name": "Toxicology",
                    "description": "Poisoning and overdose",
                    "common_conditions": ["Paracetamol overdose"]
                }
            },
            "symptoms": {
                "nausea": { "name": "Nausea", "associated_specialties": ["toxicology"] },
                "rash": { "name": "Rash", "associated_specialties": [] }
            },
            "validation_rules": {},
            "severity_descriptions": {
                "mild": { "description": "Mild", "pain_scale": "1-3/10", "functional_impact": "minimal" }
            }
        });
        let kb = KnowledgeBase::from_json_str(&doc.to_string()).unwrap();
        let engine = ValidationEngine::new(Arc::new(kb));

        let ok = engine.validate_combination("toxicology", &keys(&["nausea"]));
        assert!(ok.is_valid(), "unexpected errors: {:?}", ok.errors);
        assert_eq!(
            ok.warnings,
            vec!["No specific validation rules found for specialty: toxicology".to_string()]
        );

        let bad = engine.validate_combination("toxicology", &keys(&["rash"]));
        assert!(!bad.is_valid());
    }

    // ── check_contradictions ──────────────────────────────────────────────────

    #[test]
    fn contradiction_pair_is_error_naming_reason() {
        let outcome = engine().check_contradictions(&keys(&["abdominal_pain", "diarrhea", "constipation"]));

        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(
            outcome.errors[0],
            "Diarrhea and constipation cannot be the simultaneous primary bowel complaint: diarrhea, constipation"
        );
    }

    #[test]
    fn single_contradiction_member_is_fine() {
        let outcome = engine().check_contradictions(&keys(&["abdominal_pain", "diarrhea"]));
        assert!(outcome.is_valid());
        assert!(outcome.warnings.is_empty());
    }

    // ── validate_age ──────────────────────────────────────────────────────────

    #[test]
    fn out_of_range_age_is_single_error() {
        for age in [-1, 121] {
            let outcome = engine().validate_age("cardiology", age, "severe");
            assert_eq!(
                outcome.errors,
                vec![format!("Invalid age: {age}. Must be between 0 and 120.")]
            );
            assert!(outcome.warnings.is_empty());
        }
    }

    #[test]
    fn age_plausibility_only_warns() {
        let outcome = engine().validate_age("cardiology", 8, "severe");

        assert!(outcome.is_valid());
        assert_eq!(
            outcome.warnings,
            vec![
                "cardiology is less common in pediatric patients (age 8)".to_string(),
                "Severe symptoms in pediatric patients require careful consideration".to_string(),
            ]
        );
    }

    #[test]
    fn elderly_mild_warns_about_masking() {
        let outcome = engine().validate_age("cardiology", 85, "mild");
        assert_eq!(
            outcome.warnings,
            vec!["Mild symptoms in elderly patients may mask serious conditions".to_string()]
        );
    }

    #[test]
    fn specialty_missing_from_common_list_warns() {
        // Elderly common list omits dermatology, which is listed as less common.
        let outcome = engine().validate_age("dermatology", 70, "moderate");
        assert_eq!(
            outcome.warnings,
            vec!["dermatology is less common in elderly patients (age 70)".to_string()]
        );

        let outcome = engine().validate_age("podiatry", 30, "moderate");
        assert_eq!(
            outcome.warnings,
            vec!["podiatry is not typically common in young_adult patients (age 30)".to_string()]
        );
    }

    // ── validate_severity_compatibility ───────────────────────────────────────

    #[test]
    fn unknown_severity_lists_valid_keys() {
        let outcome = engine().validate_severity_compatibility("critical", &keys(&["chest_pain"]));
        assert_eq!(
            outcome.errors,
            vec!["Invalid severity level: critical. Valid options: mild, moderate, severe".to_string()]
        );
    }

    #[test]
    fn incompatible_symptom_warns() {
        let outcome = engine().validate_severity_compatibility("mild", &keys(&["seizure"]));
        assert!(outcome.is_valid());
        assert_eq!(
            outcome.warnings,
            vec!["Symptom 'seizure' is not typically compatible with mild severity".to_string()]
        );
    }

    #[test]
    fn symptom_without_severity_impact_warns() {
        let doc = json!({
            "medical_specialties": {
                "toxicology": {
                    "name": "Toxicology",
                    "description": "Poisoning and overdose",
                    "common_conditions": ["Paracetamol overdose"]
                }
            },
            "symptoms": {
                "nausea": {
                    "name": "Nausea",
                    "associated_specialties": ["toxicology"],
                    "severity_impact": { "mild": "Queasy after meals" }
                },
                "rash": { "name": "Rash", "associated_specialties": ["toxicology"] }
            },
            "validation_rules": {
                "severity_symptom_compatibility": {
                    "mild": { "compatible_symptoms": ["nausea"], "incompatible_symptoms": [] }
                }
            },
            "severity_descriptions": {
                "mild": { "description": "Mild", "pain_scale": "1-3/10", "functional_impact": "minimal" }
            }
        });
        let kb = KnowledgeBase::from_json_str(&doc.to_string()).unwrap();
        let engine = ValidationEngine::new(Arc::new(kb));

        let outcome = engine.validate_severity_compatibility("mild", &keys(&["nausea", "rash", "bunion"]));
        assert!(outcome.is_valid());
        assert_eq!(
            outcome.warnings,
            vec!["Symptom 'rash' may not be well-defined for mild severity".to_string()]
        );
    }

    // ── comprehensive_validation ──────────────────────────────────────────────

    #[test]
    fn typical_cardiology_request_is_valid() {
        let result = engine().comprehensive_validation(&request(
            "cardiology",
            &["chest_pain", "shortness_breath"],
            55,
            "moderate",
        ));

        assert!(result.is_valid(), "unexpected errors: {:?}", result.errors());
        assert!(result.errors().is_empty());
        assert!(result.warnings().is_empty(), "unexpected warnings: {:?}", result.warnings());
        assert!(result.recommendations().is_empty());
    }

    #[test]
    fn invalid_keys_skip_combination_check() {
        let result = engine().comprehensive_validation(&request("podiatry", &["chest_pain"], 40, "moderate"));

        assert!(!result.is_valid());
        assert!(!result.errors().iter().any(|e| e.contains("Contraindicated")));
        assert_eq!(
            result.recommendations()[0],
            "Please address all errors before proceeding with case generation"
        );
    }

    #[test]
    fn contradictions_make_request_invalid() {
        let result = engine().comprehensive_validation(&request(
            "gastroenterology",
            &["abdominal_pain", "diarrhea", "constipation"],
            45,
            "moderate",
        ));
        assert!(!result.is_valid());
        assert!(result.errors()[0].contains("Diarrhea and constipation"));
    }

    #[test]
    fn recommendations_are_capped_at_three() {
        // Errors, missing required symptom, pediatric, severe with one symptom.
        let result = engine().comprehensive_validation(&request("cardiology", &["rash"], 10, "severe"));

        assert_eq!(result.recommendations().len(), 3);
        assert_eq!(
            result.recommendations()[1],
            "Consider adding typical cardiology symptoms: chest_pain"
        );
    }

    #[test]
    fn warnings_are_deduplicated() {
        let kb = Arc::new(KnowledgeBase::bundled().unwrap());
        let engine = ValidationEngine::new(kb);
        let req = request("cardiology", &["chest_pain", "chest_pain"], 55, "moderate");

        let result = engine.comprehensive_validation(&req);
        let mut seen = std::collections::HashSet::new();
        assert!(result.warnings().iter().all(|w| seen.insert(w.clone())));
    }

    #[test]
    fn validation_is_deterministic() {
        let engine = engine();
        let req = request("neurology", &["headache", "rash"], 30, "mild");

        let a = engine.comprehensive_validation(&req);
        let b = engine.comprehensive_validation(&req);
        assert_eq!(a.errors(), b.errors());
        assert_eq!(a.warnings(), b.warnings());
        assert_eq!(a.recommendations(), b.recommendations());
    }

    // ── LegacyValidator ───────────────────────────────────────────────────────

    #[test]
    fn legacy_accepts_typical_request() {
        let result = LegacyValidator::new().comprehensive_validation(&request(
            "cardiology",
            &["chest_pain", "shortness_breath"],
            55,
            "moderate",
        ));
        assert!(result.is_valid(), "unexpected errors: {:?}", result.errors());
        assert!(result.warnings().is_empty());
    }

    #[test]
    fn legacy_warns_on_unusual_and_unknown_symptoms() {
        let outcome = LegacyValidator::new()
            .validate_combination("cardiology", &keys(&["chest_pain", "rash", "bunion"]));

        assert!(outcome.is_valid());
        assert_eq!(
            outcome.warnings,
            vec![
                "Symptom 'rash' is unusual for cardiology".to_string(),
                "Unknown symptom: bunion".to_string(),
            ]
        );
    }

    #[test]
    fn legacy_rejects_unsuitable_sets() {
        let legacy = LegacyValidator::new();

        let outcome = legacy.validate_combination("cardiology", &keys(&["rash"]));
        assert!(outcome
            .errors
            .contains(&"No symptoms are appropriate for the selected specialty".to_string()));
    }

    #[test]
    fn legacy_contradictions_only_warn() {
        let legacy = LegacyValidator::new();

        let outcome = legacy.check_contradictions(&keys(&["high_blood_pressure", "low_blood_pressure"]));
        assert!(outcome.is_valid());
        assert_eq!(
            outcome.warnings,
            vec!["Contradictory symptoms: high_blood_pressure and low_blood_pressure".to_string()]
        );

        let result = legacy.comprehensive_validation(&request(
            "cardiology",
            &["high_blood_pressure", "low_blood_pressure"],
            55,
            "moderate",
        ));
        assert!(result.is_valid());
        assert!(result
            .warnings()
            .contains(&"Contradictory symptoms: high_blood_pressure and low_blood_pressure".to_string()));
        assert!(result.recommendations().is_empty());
    }

    #[test]
    fn legacy_age_checks() {
        let legacy = LegacyValidator::new();
        assert!(!legacy.validate_demographics("cardiology", 130).is_valid());

        let outcome = legacy.validate_demographics("cardiology", 10);
        assert!(outcome.is_valid());
        assert_eq!(
            outcome.warnings,
            vec!["Age 10 is atypical for cardiology cases (consider age-appropriate conditions)".to_string()]
        );
    }

    #[test]
    fn legacy_unknown_specialty_and_severity_are_errors() {
        let result = LegacyValidator::new().comprehensive_validation(&request(
            "podiatry",
            &["chest_pain"],
            40,
            "extreme",
        ));
        assert!(result.errors().contains(&"Invalid specialty: podiatry".to_string()));
        assert!(result
            .errors()
            .iter()
            .any(|e| e.starts_with("Invalid severity level: extreme")));
    }

    // ── build_validator ───────────────────────────────────────────────────────

    #[test]
    fn build_validator_honours_kind() {
        let kb = Arc::new(KnowledgeBase::bundled().unwrap());
        assert_eq!(build_validator(ValidatorKind::Knowledge, Arc::clone(&kb)).name(), "knowledge");
        assert_eq!(build_validator(ValidatorKind::Legacy, kb).name(), "legacy");
    }
}
