//! Knowledge document schema.
//!
//! These types mirror the JSON knowledge document one-to-one. The four
//! top-level sections are mandatory; the rule sub-tables inside
//! `validation_rules` default to empty so a document may omit rules it
//! does not need.
//!
//! Example:
//! ```json
//! {
//!   "medical_specialties": { "cardiology": { "name": "Cardiology", ... } },
//!   "symptoms": { "chest_pain": { "name": "Chest pain", "associated_specialties": ["cardiology"] } },
//!   "validation_rules": { "contradictory_symptoms": [] },
//!   "severity_descriptions": { "mild": { "description": "...", "pain_scale": "1-3/10", "functional_impact": "minimal" } }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A medical domain and the vocabulary of conditions it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specialty {
    pub name: String,
    pub description: String,
    /// Ordered; the prompt builder lists them in this order.
    pub common_conditions: Vec<String>,
    /// Age-profile label → `[min, max]` typical ages.
    #[serde(default)]
    pub typical_age_ranges: BTreeMap<String, [u32; 2]>,
}

/// An atomic presenting complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symptom {
    pub name: String,
    #[serde(default)]
    pub associated_specialties: Vec<String>,
    /// Severity key → how the symptom presents at that severity.
    #[serde(default)]
    pub severity_impact: BTreeMap<String, String>,
}

/// Descriptive text for one severity tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityDescription {
    pub description: String,
    pub pain_scale: String,
    pub functional_impact: String,
}

/// Which symptoms suit, or rule out, a specialty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinationRule {
    #[serde(default)]
    pub required_symptoms: Vec<String>,
    #[serde(default)]
    pub optional_symptoms: Vec<String>,
    #[serde(default)]
    pub contraindicated_symptoms: Vec<String>,
}

impl CombinationRule {
    /// `required ∪ optional`.
    pub fn is_appropriate(&self, symptom: &str) -> bool {
        self.required_symptoms.iter().any(|s| s == symptom)
            || self.optional_symptoms.iter().any(|s| s == symptom)
    }

    pub fn is_contraindicated(&self, symptom: &str) -> bool {
        self.contraindicated_symptoms.iter().any(|s| s == symptom)
    }
}

/// A group of symptoms that cannot co-occur in a coherent case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContradictionRule {
    pub symptoms: Vec<String>,
    #[serde(default = "default_contradiction_reason")]
    pub reason: String,
}

fn default_contradiction_reason() -> String {
    "Symptoms are contradictory".to_string()
}

/// Inclusive bounds on the number of symptoms for a specialty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomBounds {
    #[serde(default = "default_min_symptoms")]
    pub min: usize,
    #[serde(default = "default_max_symptoms")]
    pub max: usize,
}

fn default_min_symptoms() -> usize {
    1
}

fn default_max_symptoms() -> usize {
    10
}

/// Patient age bands used by the age-plausibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    Pediatric,
    YoungAdult,
    MiddleAged,
    Elderly,
}

impl AgeGroup {
    /// Classify an age: `<18`, `18–39`, `40–64`, `>=65`.
    pub fn from_age(age: i32) -> Self {
        match age {
            a if a < 18 => AgeGroup::Pediatric,
            a if a < 40 => AgeGroup::YoungAdult,
            a if a < 65 => AgeGroup::MiddleAged,
            _ => AgeGroup::Elderly,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeGroup::Pediatric => "pediatric",
            AgeGroup::YoungAdult => "young_adult",
            AgeGroup::MiddleAged => "middle_aged",
            AgeGroup::Elderly => "elderly",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How common each specialty is within one age group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRule {
    #[serde(default)]
    pub common_specialties: Vec<String>,
    #[serde(default)]
    pub less_common_specialties: Vec<String>,
}

/// Which symptoms fit a severity tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityRule {
    #[serde(default)]
    pub compatible_symptoms: Vec<String>,
    #[serde(default)]
    pub incompatible_symptoms: Vec<String>,
}

/// The `validation_rules` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRules {
    #[serde(default)]
    pub symptom_specialty_combinations: BTreeMap<String, CombinationRule>,
    #[serde(default)]
    pub contradictory_symptoms: Vec<ContradictionRule>,
    #[serde(default)]
    pub age_appropriate_conditions: BTreeMap<AgeGroup, AgeRule>,
    #[serde(default)]
    pub minimum_maximum_symptoms: BTreeMap<String, SymptomBounds>,
    #[serde(default)]
    pub severity_symptom_compatibility: BTreeMap<String, SeverityRule>,
}

/// The whole knowledge document. Every section is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    #[serde(alias = "specialties")]
    pub medical_specialties: BTreeMap<String, Specialty>,
    pub symptoms: BTreeMap<String, Symptom>,
    pub validation_rules: ValidationRules,
    pub severity_descriptions: BTreeMap<String, SeverityDescription>,
}
