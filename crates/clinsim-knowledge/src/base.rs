//! JSON-backed knowledge base.
//!
//! `KnowledgeBase` parses a `KnowledgeDocument`, checks it for structural
//! problems, and exposes read-only accessors. It is loaded once and shared
//! (typically behind an `Arc`) by the validator and the prompt builder.
//!
//! Load-time checks:
//!
//! 1. The four top-level sections must be present (enforced by serde).
//! 2. Every specialty has a name, a description and at least one common
//!    condition; every severity has a description.
//! 3. Symptom bounds satisfy `min <= max`; contradiction rules list at least
//!    two symptoms.
//! 4. Dangling references (a symptom associated with an unknown specialty, a
//!    rule keyed by an unknown specialty or symptom) are logged, not fatal.

use std::path::Path;

use tracing::{info, warn};

use clinsim_contracts::error::{ClinsimError, ClinsimResult};

use crate::tables::{
    AgeGroup, AgeRule, CombinationRule, ContradictionRule, KnowledgeDocument, SeverityDescription,
    SeverityRule, Specialty, Symptom, SymptomBounds,
};

const BUNDLED_KNOWLEDGE: &str = include_str!("../data/medical_knowledge.json");

/// The per-specialty rule tables, gathered for one lookup.
#[derive(Debug, Clone, Copy)]
pub struct SpecialtyRules<'a> {
    pub combination: Option<&'a CombinationRule>,
    pub bounds: Option<&'a SymptomBounds>,
}

/// Symptoms grouped by how they relate to one specialty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialtySymptoms {
    pub required: Vec<String>,
    pub optional: Vec<String>,
    pub contraindicated: Vec<String>,
}

/// Read-only specialty, symptom and rule tables.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    doc: KnowledgeDocument,
}

impl KnowledgeBase {
    /// Parse `s` as a knowledge document.
    ///
    /// Returns `ClinsimError::KnowledgeLoad` if the JSON is malformed, a
    /// required section is missing, or a structural check fails.
    pub fn from_json_str(s: &str) -> ClinsimResult<Self> {
        let doc: KnowledgeDocument =
            serde_json::from_str(s).map_err(|e| ClinsimError::KnowledgeLoad {
                reason: format!("failed to parse knowledge document: {}", e),
            })?;
        Self::from_document(doc)
    }

    /// Read the file at `path` and parse it as a knowledge document.
    pub fn from_file(path: &Path) -> ClinsimResult<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ClinsimError::KnowledgeLoad {
                reason: format!("failed to read knowledge file '{}': {}", path.display(), e),
            })?;
        let kb = Self::from_json_str(&contents)?;
        info!(path = %path.display(), "knowledge file loaded");
        Ok(kb)
    }

    /// The reference knowledge document compiled into this crate.
    pub fn bundled() -> ClinsimResult<Self> {
        Self::from_json_str(BUNDLED_KNOWLEDGE)
    }

    /// Check an already-deserialized document and wrap it.
    pub fn from_document(doc: KnowledgeDocument) -> ClinsimResult<Self> {
        check_structure(&doc)?;
        warn_dangling_references(&doc);

        info!(
            specialties = doc.medical_specialties.len(),
            symptoms = doc.symptoms.len(),
            contradiction_rules = doc.validation_rules.contradictory_symptoms.len(),
            "knowledge base loaded"
        );

        Ok(Self { doc })
    }

    pub fn specialty(&self, key: &str) -> Option<&Specialty> {
        self.doc.medical_specialties.get(key)
    }

    pub fn symptom(&self, key: &str) -> Option<&Symptom> {
        self.doc.symptoms.get(key)
    }

    pub fn severity(&self, key: &str) -> Option<&SeverityDescription> {
        self.doc.severity_descriptions.get(key)
    }

    /// All specialties, sorted by key.
    pub fn all_specialties(&self) -> impl Iterator<Item = (&str, &Specialty)> {
        self.doc
            .medical_specialties
            .iter()
            .map(|(k, v)| (k.as_str(), v))
    }

    /// All symptoms, sorted by key.
    pub fn all_symptoms(&self) -> impl Iterator<Item = (&str, &Symptom)> {
        self.doc.symptoms.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Known severity keys, sorted.
    pub fn severity_keys(&self) -> impl Iterator<Item = &str> {
        self.doc.severity_descriptions.keys().map(String::as_str)
    }

    pub fn rules_for(&self, specialty: &str) -> SpecialtyRules<'_> {
        let rules = &self.doc.validation_rules;
        SpecialtyRules {
            combination: rules.symptom_specialty_combinations.get(specialty),
            bounds: rules.minimum_maximum_symptoms.get(specialty),
        }
    }

    pub fn contradiction_rules(&self) -> &[ContradictionRule] {
        &self.doc.validation_rules.contradictory_symptoms
    }

    pub fn age_rule(&self, group: AgeGroup) -> Option<&AgeRule> {
        self.doc.validation_rules.age_appropriate_conditions.get(&group)
    }

    pub fn severity_rule(&self, severity: &str) -> Option<&SeverityRule> {
        self.doc
            .validation_rules
            .severity_symptom_compatibility
            .get(severity)
    }

    /// Symptoms categorized by their appropriateness for `specialty`.
    ///
    /// Empty lists when the specialty has no combination rule.
    pub fn symptoms_for_specialty(&self, specialty: &str) -> SpecialtySymptoms {
        match self.rules_for(specialty).combination {
            Some(rule) => SpecialtySymptoms {
                required: rule.required_symptoms.clone(),
                optional: rule.optional_symptoms.clone(),
                contraindicated: rule.contraindicated_symptoms.clone(),
            },
            None => SpecialtySymptoms::default(),
        }
    }

    /// The raw document, e.g. for re-serialization.
    pub fn document(&self) -> &KnowledgeDocument {
        &self.doc
    }
}

fn load_error(reason: String) -> ClinsimError {
    ClinsimError::KnowledgeLoad { reason }
}

fn check_structure(doc: &KnowledgeDocument) -> ClinsimResult<()> {
    if doc.medical_specialties.is_empty() {
        return Err(load_error("section 'medical_specialties' is empty".to_string()));
    }
    if doc.symptoms.is_empty() {
        return Err(load_error("section 'symptoms' is empty".to_string()));
    }
    if doc.severity_descriptions.is_empty() {
        return Err(load_error("section 'severity_descriptions' is empty".to_string()));
    }

    for (key, specialty) in &doc.medical_specialties {
        if specialty.name.trim().is_empty() {
            return Err(load_error(format!("specialty '{key}' is missing required field: name")));
        }
        if specialty.description.trim().is_empty() {
            return Err(load_error(format!(
                "specialty '{key}' is missing required field: description"
            )));
        }
        if specialty.common_conditions.is_empty() {
            return Err(load_error(format!(
                "specialty '{key}' is missing required field: common_conditions"
            )));
        }
    }

    for (key, severity) in &doc.severity_descriptions {
        if severity.description.trim().is_empty() {
            return Err(load_error(format!("severity '{key}' has an empty description")));
        }
    }

    for (key, bounds) in &doc.validation_rules.minimum_maximum_symptoms {
        if bounds.min > bounds.max {
            return Err(load_error(format!(
                "symptom bounds for '{key}' are inverted: min {} > max {}",
                bounds.min, bounds.max
            )));
        }
    }

    for (idx, rule) in doc.validation_rules.contradictory_symptoms.iter().enumerate() {
        if rule.symptoms.len() < 2 {
            return Err(load_error(format!(
                "contradiction rule #{idx} lists fewer than two symptoms"
            )));
        }
    }

    Ok(())
}

fn warn_dangling_references(doc: &KnowledgeDocument) {
    let rules = &doc.validation_rules;

    for (key, symptom) in &doc.symptoms {
        for specialty in &symptom.associated_specialties {
            if !doc.medical_specialties.contains_key(specialty) {
                warn!(symptom = %key, specialty = %specialty, "symptom references unknown specialty");
            }
        }
    }

    for (specialty, rule) in &rules.symptom_specialty_combinations {
        if !doc.medical_specialties.contains_key(specialty) {
            warn!(specialty = %specialty, "combination rule keyed by unknown specialty");
        }
        let listed = rule
            .required_symptoms
            .iter()
            .chain(&rule.optional_symptoms)
            .chain(&rule.contraindicated_symptoms);
        for symptom in listed {
            if !doc.symptoms.contains_key(symptom) {
                warn!(specialty = %specialty, symptom = %symptom, "combination rule references unknown symptom");
            }
        }
    }

    for specialty in rules.minimum_maximum_symptoms.keys() {
        if !doc.medical_specialties.contains_key(specialty) {
            warn!(specialty = %specialty, "symptom bounds keyed by unknown specialty");
        }
    }

    for severity in rules.severity_symptom_compatibility.keys() {
        if !doc.severity_descriptions.contains_key(severity) {
            warn!(severity = %severity, "severity rule keyed by unknown severity");
        }
    }
}
