//! Data-driven validation against a loaded `KnowledgeBase`.
//!
//! Each check is a pure function of its arguments and the rule tables and
//! returns a `CheckOutcome`. `comprehensive_validation` runs them in order:
//!
//! 1. Specialty and symptom keys individually.
//! 2. Symptom/specialty combination, only if both keys passed.
//! 3. Contradiction rules, only if the symptom keys passed.
//! 4. Age plausibility and severity compatibility, always.
//!
//! Errors and warnings are aggregated (warnings de-duplicated in order), and
//! up to three recommendations are derived from the same tables.

use std::sync::Arc;

use tracing::{debug, info};

use clinsim_contracts::{
    case::CaseRequest,
    validation::{CheckOutcome, ValidationResult},
};
use clinsim_core::traits::CaseValidator;
use clinsim_knowledge::{AgeGroup, KnowledgeBase};

const MAX_RECOMMENDATIONS: usize = 3;
const MAX_LISTED_SYMPTOMS: usize = 10;
const MIN_AGE: i32 = 0;
const MAX_AGE: i32 = 120;

/// A `CaseValidator` backed by the knowledge document's rule tables.
#[derive(Debug, Clone)]
pub struct ValidationEngine {
    kb: Arc<KnowledgeBase>,
}

impl ValidationEngine {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self { kb }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// The specialty key must be non-empty and known.
    pub fn validate_specialty(&self, specialty: &str) -> CheckOutcome {
        if specialty.trim().is_empty() {
            return CheckOutcome::error("Specialty cannot be empty");
        }

        if self.kb.specialty(specialty).is_none() {
            let available = self
                .kb
                .all_specialties()
                .map(|(key, _)| key)
                .collect::<Vec<_>>()
                .join(", ");
            let mut outcome = CheckOutcome::error(format!("Unknown specialty: {specialty}"));
            outcome.push_error(format!("Available specialties: {available}"));
            debug!(specialty = %specialty, "unknown specialty");
            return outcome;
        }

        CheckOutcome::pass()
    }

    /// At least one symptom, and every key known.
    pub fn validate_symptoms(&self, symptoms: &[String]) -> CheckOutcome {
        if symptoms.is_empty() {
            return CheckOutcome::error("At least one symptom must be provided");
        }

        let unknown: Vec<&str> = symptoms
            .iter()
            .map(String::as_str)
            .filter(|s| self.kb.symptom(s).is_none())
            .collect();

        if unknown.is_empty() {
            return CheckOutcome::pass();
        }

        let available = self
            .kb
            .all_symptoms()
            .take(MAX_LISTED_SYMPTOMS)
            .map(|(key, _)| key)
            .collect::<Vec<_>>()
            .join(", ");

        debug!(unknown = unknown.len(), "unknown symptom keys");
        let mut outcome = CheckOutcome::error(format!("Unknown symptoms: {}", unknown.join(", ")));
        outcome.push_error(format!(
            "Available symptoms (first {MAX_LISTED_SYMPTOMS}): {available}..."
        ));
        outcome
    }

    /// Check that the symptom set suits the specialty.
    ///
    /// Contraindicated symptoms, a set with no appropriate symptom, and a
    /// count outside the specialty's bounds are errors. Symptoms that are
    /// neither appropriate nor contraindicated are warnings.
    pub fn validate_combination(&self, specialty: &str, symptoms: &[String]) -> CheckOutcome {
        let mut outcome = self.validate_specialty(specialty);
        outcome.absorb(self.validate_symptoms(symptoms));
        if !outcome.is_valid() {
            return outcome;
        }

        let rules = self.kb.rules_for(specialty);

        let (appropriate, contraindicated): (Vec<String>, Vec<String>) = match rules.combination {
            Some(rule) => (
                rule.required_symptoms
                    .iter()
                    .chain(&rule.optional_symptoms)
                    .cloned()
                    .collect(),
                rule.contraindicated_symptoms.clone(),
            ),
            None => {
                outcome.push_warning(format!(
                    "No specific validation rules found for specialty: {specialty}"
                ));
                let associated = self
                    .kb
                    .all_symptoms()
                    .filter(|(_, s)| s.associated_specialties.iter().any(|a| a == specialty))
                    .map(|(key, _)| key.to_string())
                    .collect();
                (associated, Vec::new())
            }
        };

        let contraindicated_found: Vec<&str> = symptoms
            .iter()
            .map(String::as_str)
            .filter(|s| contraindicated.iter().any(|c| c.as_str() == *s))
            .collect();
        if !contraindicated_found.is_empty() {
            outcome.push_error(format!(
                "Contraindicated symptoms for {specialty}: {}",
                contraindicated_found.join(", ")
            ));
        }

        let has_appropriate = symptoms.iter().any(|s| appropriate.contains(s));
        if !has_appropriate {
            if appropriate.is_empty() {
                outcome.push_error(format!("No typical symptoms found for {specialty}"));
            } else {
                let suggestions = appropriate
                    .iter()
                    .take(5)
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                outcome.push_error(format!(
                    "No typical symptoms found for {specialty}. Consider symptoms from: {suggestions}"
                ));
            }
        }

        let unusual: Vec<&str> = symptoms
            .iter()
            .map(String::as_str)
            .filter(|s| !appropriate.iter().any(|a| a.as_str() == *s))
            .filter(|s| !contraindicated_found.contains(s))
            .collect();
        if !unusual.is_empty() {
            outcome.push_warning(format!(
                "Unusual symptoms for {specialty}: {}",
                unusual.join(", ")
            ));
        }

        if let Some(bounds) = rules.bounds {
            let count = symptoms.len();
            if count < bounds.min {
                outcome.push_error(format!(
                    "Too few symptoms for {specialty}. Minimum: {}, provided: {count}",
                    bounds.min
                ));
            } else if count > bounds.max {
                outcome.push_error(format!(
                    "Too many symptoms for {specialty}. Maximum: {}, provided: {count}",
                    bounds.max
                ));
            }
        }

        debug!(
            specialty = %specialty,
            errors = outcome.errors.len(),
            warnings = outcome.warnings.len(),
            "symptom-specialty combination checked"
        );
        outcome
    }

    /// Each contradiction rule with more than one of its symptoms present
    /// produces one error naming the rule's reason.
    pub fn check_contradictions(&self, symptoms: &[String]) -> CheckOutcome {
        let mut outcome = CheckOutcome::pass();

        for rule in self.kb.contradiction_rules() {
            let found: Vec<&str> = symptoms
                .iter()
                .map(String::as_str)
                .filter(|s| rule.symptoms.iter().any(|r| r.as_str() == *s))
                .collect();
            if found.len() > 1 {
                outcome.push_error(format!("{}: {}", rule.reason, found.join(", ")));
            }
        }

        debug!(contradictions = outcome.errors.len(), "contradiction rules checked");
        outcome
    }

    /// Age must lie in `[0, 120]`; plausibility concerns are warnings only.
    pub fn validate_age(&self, specialty: &str, age: i32, severity: &str) -> CheckOutcome {
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return CheckOutcome::error(format!(
                "Invalid age: {age}. Must be between {MIN_AGE} and {MAX_AGE}."
            ));
        }

        let mut outcome = CheckOutcome::pass();
        let group = AgeGroup::from_age(age);

        if let Some(rule) = self.kb.age_rule(group) {
            if rule.less_common_specialties.iter().any(|s| s == specialty) {
                outcome.push_warning(format!(
                    "{specialty} is less common in {group} patients (age {age})"
                ));
            } else if !rule.common_specialties.is_empty()
                && !rule.common_specialties.iter().any(|s| s == specialty)
            {
                outcome.push_warning(format!(
                    "{specialty} is not typically common in {group} patients (age {age})"
                ));
            }
        }

        if age < 18 && severity == "severe" {
            outcome.push_warning("Severe symptoms in pediatric patients require careful consideration");
        } else if age > 80 && severity == "mild" {
            outcome.push_warning("Mild symptoms in elderly patients may mask serious conditions");
        }

        debug!(age, group = %group, warnings = outcome.warnings.len(), "age plausibility checked");
        outcome
    }

    /// The severity key must be known. Symptoms the severity rule marks as
    /// incompatible, or that have no description at that severity, are
    /// warnings.
    pub fn validate_severity_compatibility(&self, severity: &str, symptoms: &[String]) -> CheckOutcome {
        if self.kb.severity(severity).is_none() {
            let valid = self.kb.severity_keys().collect::<Vec<_>>().join(", ");
            return CheckOutcome::error(format!(
                "Invalid severity level: {severity}. Valid options: {valid}"
            ));
        }

        let mut outcome = CheckOutcome::pass();
        let Some(rule) = self.kb.severity_rule(severity) else {
            return outcome;
        };

        for key in symptoms {
            // Unknown keys are reported by `validate_symptoms`.
            let Some(symptom) = self.kb.symptom(key) else {
                continue;
            };
            if rule.incompatible_symptoms.iter().any(|s| s == key) {
                outcome.push_warning(format!(
                    "Symptom '{key}' is not typically compatible with {severity} severity"
                ));
            } else if !symptom.severity_impact.contains_key(severity) {
                outcome.push_warning(format!(
                    "Symptom '{key}' may not be well-defined for {severity} severity"
                ));
            }
        }

        debug!(severity = %severity, warnings = outcome.warnings.len(), "severity compatibility checked");
        outcome
    }

    /// Run every applicable check and aggregate the verdict.
    ///
    /// `gender` is accepted for parity with the request shape; no rule table
    /// keys on it yet.
    pub fn validate_parameters(
        &self,
        specialty: &str,
        symptoms: &[String],
        age: i32,
        _gender: &str,
        severity: &str,
    ) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        // ── 1. Keys ──────────────────────────────────────────────────────────
        let specialty_check = self.validate_specialty(specialty);
        let symptoms_check = self.validate_symptoms(symptoms);
        let keys_valid = specialty_check.is_valid() && symptoms_check.is_valid();
        let symptoms_valid = symptoms_check.is_valid();
        collect(&mut errors, &mut warnings, specialty_check);
        collect(&mut errors, &mut warnings, symptoms_check);

        // ── 2. Combination ───────────────────────────────────────────────────
        if keys_valid {
            collect(&mut errors, &mut warnings, self.validate_combination(specialty, symptoms));
        }

        // ── 3. Contradictions ────────────────────────────────────────────────
        if symptoms_valid {
            collect(&mut errors, &mut warnings, self.check_contradictions(symptoms));
        }

        // ── 4. Age and severity ──────────────────────────────────────────────
        collect(&mut errors, &mut warnings, self.validate_age(specialty, age, severity));
        collect(
            &mut errors,
            &mut warnings,
            self.validate_severity_compatibility(severity, symptoms),
        );

        let recommendations = self.recommendations(specialty, symptoms, age, severity, !errors.is_empty());

        let result = ValidationResult::new(errors, warnings, recommendations);
        info!(
            specialty = %specialty,
            is_valid = result.is_valid(),
            errors = result.errors().len(),
            warnings = result.warnings().len(),
            "comprehensive validation completed"
        );
        result
    }

    fn recommendations(
        &self,
        specialty: &str,
        symptoms: &[String],
        age: i32,
        severity: &str,
        has_errors: bool,
    ) -> Vec<String> {
        let mut recommendations = Vec::new();

        if has_errors {
            recommendations
                .push("Please address all errors before proceeding with case generation".to_string());
        }

        if let Some(rule) = self.kb.rules_for(specialty).combination {
            let missing: Vec<&str> = rule
                .required_symptoms
                .iter()
                .filter(|s| !symptoms.contains(s))
                .take(3)
                .map(String::as_str)
                .collect();
            if !missing.is_empty() {
                recommendations.push(format!(
                    "Consider adding typical {specialty} symptoms: {}",
                    missing.join(", ")
                ));
            }
        }

        match AgeGroup::from_age(age) {
            AgeGroup::Elderly if severity == "mild" => recommendations
                .push("Consider that elderly patients may present with atypical symptoms".to_string()),
            AgeGroup::Pediatric => recommendations
                .push("Ensure symptoms are age-appropriate for pediatric presentation".to_string()),
            _ => {}
        }

        if severity == "severe" && symptoms.len() < 3 {
            recommendations.push("Severe cases typically present with multiple symptoms".to_string());
        }

        recommendations.truncate(MAX_RECOMMENDATIONS);
        recommendations
    }
}

/// Move a check's messages into the aggregate, skipping repeated warnings.
fn collect(errors: &mut Vec<String>, warnings: &mut Vec<String>, outcome: CheckOutcome) {
    errors.extend(outcome.errors);
    for warning in outcome.warnings {
        if !warnings.contains(&warning) {
            warnings.push(warning);
        }
    }
}

impl CaseValidator for ValidationEngine {
    fn name(&self) -> &'static str {
        "knowledge"
    }

    fn comprehensive_validation(&self, request: &CaseRequest) -> ValidationResult {
        self.validate_parameters(
            &request.specialty,
            &request.symptoms,
            request.demographics.age,
            &request.demographics.gender,
            &request.severity,
        )
    }
}
