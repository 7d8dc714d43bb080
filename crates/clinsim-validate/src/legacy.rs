//! Validation against the fixed, built-in specialty tables.
//!
//! `LegacyValidator` needs no knowledge document. Its tables cover seven
//! specialties, a symptom → specialty mapping, two contradiction pairs and
//! three severity tiers. It is coarser than `ValidationEngine`: there are no
//! required or contraindicated symptoms, only "appropriate or unusual".

use tracing::{debug, info};

use clinsim_contracts::{
    case::CaseRequest,
    validation::{CheckOutcome, ValidationResult},
};
use clinsim_core::traits::CaseValidator;

/// Specialty key and its typical `[min, max]` patient ages.
static SPECIALTIES: [(&str, [(i32, i32); 3]); 7] = [
    ("cardiology", [(18, 40), (40, 65), (65, 100)]),
    ("neurology", [(18, 50), (35, 70), (60, 100)]),
    ("orthopedics", [(16, 45), (30, 70), (50, 100)]),
    ("gastroenterology", [(18, 45), (35, 70), (60, 100)]),
    ("respiratory", [(18, 50), (40, 70), (60, 100)]),
    ("dermatology", [(16, 40), (30, 65), (50, 100)]),
    ("emergency", [(16, 50), (35, 70), (60, 100)]),
];

static SYMPTOM_SPECIALTIES: [(&str, &[&str]); 43] = [
    ("chest_pain", &["cardiology", "emergency"]),
    ("shortness_breath", &["cardiology", "respiratory", "emergency"]),
    ("palpitations", &["cardiology"]),
    ("dizziness", &["cardiology", "neurology"]),
    ("fatigue", &["cardiology", "respiratory", "gastroenterology"]),
    ("swelling_legs", &["cardiology"]),
    ("irregular_heartbeat", &["cardiology"]),
    ("headache", &["neurology", "emergency"]),
    ("seizure", &["neurology", "emergency"]),
    ("memory_loss", &["neurology"]),
    ("confusion", &["neurology", "emergency"]),
    ("weakness", &["neurology", "orthopedics"]),
    ("numbness", &["neurology", "orthopedics"]),
    ("speech_difficulty", &["neurology", "emergency"]),
    ("vision_changes", &["neurology"]),
    ("joint_pain", &["orthopedics"]),
    ("back_pain", &["orthopedics"]),
    ("limited_mobility", &["orthopedics"]),
    ("muscle_pain", &["orthopedics"]),
    ("bone_pain", &["orthopedics"]),
    ("stiffness", &["orthopedics"]),
    ("abdominal_pain", &["gastroenterology", "emergency"]),
    ("nausea", &["gastroenterology", "neurology"]),
    ("vomiting", &["gastroenterology", "neurology", "emergency"]),
    ("diarrhea", &["gastroenterology"]),
    ("constipation", &["gastroenterology"]),
    ("bloating", &["gastroenterology"]),
    ("loss_appetite", &["gastroenterology"]),
    ("cough", &["respiratory"]),
    ("wheezing", &["respiratory"]),
    ("chest_tightness", &["respiratory", "cardiology"]),
    ("sputum_production", &["respiratory"]),
    ("difficulty_breathing", &["respiratory", "cardiology", "emergency"]),
    ("rash", &["dermatology"]),
    ("itching", &["dermatology"]),
    ("skin_lesion", &["dermatology"]),
    ("dry_skin", &["dermatology"]),
    ("skin_discoloration", &["dermatology"]),
    ("fever", &["emergency", "respiratory", "gastroenterology"]),
    ("severe_pain", &["emergency", "orthopedics"]),
    ("rapid_heart_rate", &["cardiology", "emergency"]),
    ("low_blood_pressure", &["cardiology", "emergency"]),
    ("high_blood_pressure", &["cardiology"]),
];

const CONTRADICTORY_PAIRS: [(&str, &str); 2] = [
    ("diarrhea", "constipation"),
    ("high_blood_pressure", "low_blood_pressure"),
];

const SEVERITY_TIERS: [&str; 3] = ["mild", "moderate", "severe"];

/// A `CaseValidator` over the built-in tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyValidator;

impl LegacyValidator {
    pub fn new() -> Self {
        Self
    }

    fn typical_ages(specialty: &str) -> Option<&'static [(i32, i32); 3]> {
        SPECIALTIES
            .iter()
            .find(|(key, _)| *key == specialty)
            .map(|(_, ages)| ages)
    }

    fn specialties_for(symptom: &str) -> Option<&'static [&'static str]> {
        SYMPTOM_SPECIALTIES
            .iter()
            .find(|(key, _)| *key == symptom)
            .map(|(_, specialties)| *specialties)
    }

    /// Unknown specialty and empty or wholly unsuitable symptom sets are
    /// errors; unusual and unknown symptoms are warnings.
    pub fn validate_combination(&self, specialty: &str, symptoms: &[String]) -> CheckOutcome {
        if Self::typical_ages(specialty).is_none() {
            return CheckOutcome::error(format!("Invalid specialty: {specialty}"));
        }
        if symptoms.is_empty() {
            return CheckOutcome::error("At least one symptom must be selected");
        }

        let mut outcome = CheckOutcome::pass();
        let mut appropriate = 0usize;

        for symptom in symptoms {
            match Self::specialties_for(symptom) {
                Some(specialties) if specialties.contains(&specialty) => appropriate += 1,
                Some(_) => {
                    outcome.push_warning(format!("Symptom '{symptom}' is unusual for {specialty}"))
                }
                None => outcome.push_warning(format!("Unknown symptom: {symptom}")),
            }
        }

        if appropriate == 0 {
            outcome.push_error("No symptoms are appropriate for the selected specialty");
        }

        outcome
    }

    /// Each contradictory pair present in full is a warning; the legacy
    /// tables are too coarse to block generation on it.
    pub fn check_contradictions(&self, symptoms: &[String]) -> CheckOutcome {
        let mut outcome = CheckOutcome::pass();
        for (a, b) in CONTRADICTORY_PAIRS {
            let has = |key: &str| symptoms.iter().any(|s| s == key);
            if has(a) && has(b) {
                outcome.push_warning(format!("Contradictory symptoms: {a} and {b}"));
            }
        }
        outcome
    }

    /// Out-of-range age is an error; an age outside every typical range for
    /// the specialty is a warning.
    pub fn validate_demographics(&self, specialty: &str, age: i32) -> CheckOutcome {
        if !(0..=120).contains(&age) {
            return CheckOutcome::error(format!("Invalid age: {age}. Must be between 0 and 120."));
        }

        let mut outcome = CheckOutcome::pass();
        if let Some(ranges) = Self::typical_ages(specialty) {
            let typical = ranges.iter().any(|(min, max)| (*min..=*max).contains(&age));
            if !typical {
                outcome.push_warning(format!(
                    "Age {age} is atypical for {specialty} cases (consider age-appropriate conditions)"
                ));
            }
        }
        outcome
    }

    pub fn validate_severity(&self, severity: &str) -> CheckOutcome {
        if SEVERITY_TIERS.contains(&severity) {
            CheckOutcome::pass()
        } else {
            CheckOutcome::error(format!(
                "Invalid severity level: {severity}. Valid options: {}",
                SEVERITY_TIERS.join(", ")
            ))
        }
    }
}

impl CaseValidator for LegacyValidator {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn comprehensive_validation(&self, request: &CaseRequest) -> ValidationResult {
        let mut outcome = self.validate_combination(&request.specialty, &request.symptoms);
        outcome.absorb(self.check_contradictions(&request.symptoms));
        outcome.absorb(self.validate_demographics(&request.specialty, request.demographics.age));
        outcome.absorb(self.validate_severity(&request.severity));

        debug!(
            specialty = %request.specialty,
            errors = outcome.errors.len(),
            warnings = outcome.warnings.len(),
            "legacy checks completed"
        );

        let recommendations = if outcome.is_valid() {
            Vec::new()
        } else {
            vec!["Please address all errors before proceeding with case generation".to_string()]
        };

        let result = ValidationResult::new(outcome.errors, outcome.warnings, recommendations);
        info!(is_valid = result.is_valid(), "legacy validation completed");
        result
    }
}
