//! The generated-case schema.
//!
//! A completion object must carry the nine case fields, each non-empty, with
//! a recognised difficulty, at least one learning objective, at least two
//! differential diagnoses, a diagnosis of three or more characters, and a
//! patient presentation of twenty or more characters that does not name the
//! diagnosis.

use serde_json::{json, Value};

use clinsim_contracts::{
    case::Difficulty,
    verify::{OutputSchema, VerificationRule, VerificationRuleType},
};
use clinsim_evaluate::{contains_run, tokenize};

use crate::engine::SchemaVerifier;

pub const GENERATED_CASE_SCHEMA_ID: &str = "generated-case-v1";

/// Name of the custom rule that keeps the diagnosis out of the presentation.
pub const PRESENTATION_WITHHOLDS_DIAGNOSIS: &str = "presentation-withholds-diagnosis";

const REQUIRED_FIELDS: [&str; 9] = [
    "diagnosis",
    "additional_symptoms",
    "medical_history",
    "recent_exposure",
    "patient_presentation",
    "clinical_notes",
    "difficulty_level",
    "learning_objectives",
    "differential_diagnoses",
];

const MIN_DIAGNOSIS_CHARS: usize = 3;
const MIN_PRESENTATION_CHARS: usize = 20;

fn rule(rule_id: &str, description: &str, rule_type: VerificationRuleType) -> VerificationRule {
    VerificationRule {
        rule_id: rule_id.to_string(),
        description: description.to_string(),
        rule_type,
    }
}

fn structural_schema() -> Value {
    let text_or_list = json!({
        "type": ["string", "array"],
        "items": { "type": "string" }
    });
    json!({
        "type": "object",
        "properties": {
            "diagnosis": { "type": "string" },
            "additional_symptoms": text_or_list,
            "medical_history": text_or_list,
            "recent_exposure": text_or_list,
            "patient_presentation": { "type": "string" },
            "clinical_notes": text_or_list,
            "difficulty_level": { "type": "string" },
            "learning_objectives": { "type": "array", "items": { "type": "string" } },
            "differential_diagnoses": { "type": "array", "items": { "type": "string" } }
        }
    })
}

/// The `OutputSchema` every generated case is verified against.
pub fn generated_case_schema() -> OutputSchema {
    let mut rules: Vec<VerificationRule> = REQUIRED_FIELDS
        .iter()
        .map(|field| {
            rule(
                &format!("required-{field}"),
                &format!("{field} must be present and non-empty"),
                VerificationRuleType::RequiredField {
                    field_path: field.to_string(),
                },
            )
        })
        .collect();

    rules.push(rule(
        "allowed-difficulty",
        "difficulty_level must be a known tier",
        VerificationRuleType::AllowedValues {
            field_path: "difficulty_level".to_string(),
            allowed: Difficulty::ALL.iter().map(|d| json!(d.as_str())).collect(),
        },
    ));
    rules.push(rule(
        "min-learning-objectives",
        "at least one learning objective",
        VerificationRuleType::MinItems {
            field_path: "learning_objectives".to_string(),
            min_items: 1,
        },
    ));
    rules.push(rule(
        "min-differential-diagnoses",
        "at least two differential diagnoses",
        VerificationRuleType::MinItems {
            field_path: "differential_diagnoses".to_string(),
            min_items: 2,
        },
    ));
    rules.push(rule(
        "min-diagnosis-length",
        "diagnosis must be specific",
        VerificationRuleType::MinLength {
            field_path: "diagnosis".to_string(),
            min_chars: MIN_DIAGNOSIS_CHARS,
        },
    ));
    rules.push(rule(
        "min-presentation-length",
        "patient_presentation must be a detailed description",
        VerificationRuleType::MinLength {
            field_path: "patient_presentation".to_string(),
            min_chars: MIN_PRESENTATION_CHARS,
        },
    ));
    rules.push(rule(
        "presentation-withholds-diagnosis",
        "patient_presentation must not name the diagnosis",
        VerificationRuleType::Custom {
            function_name: PRESENTATION_WITHHOLDS_DIAGNOSIS.to_string(),
        },
    ));

    OutputSchema {
        schema_id: GENERATED_CASE_SCHEMA_ID.to_string(),
        json_schema: structural_schema(),
        rules,
    }
}

/// Fails when the presentation contains the diagnosis as a run of whole
/// words, ignoring case and punctuation ("flu" does not match "fluid").
/// Missing or non-string fields pass; other rules report them.
pub fn presentation_withholds_diagnosis(payload: &Value) -> Option<String> {
    let diagnosis = payload.get("diagnosis")?.as_str()?;
    let presentation = payload.get("patient_presentation")?.as_str()?;

    if diagnosis.trim().chars().count() >= MIN_DIAGNOSIS_CHARS
        && contains_run(&tokenize(presentation), &tokenize(diagnosis))
    {
        Some("patient_presentation must not name the diagnosis".to_string())
    } else {
        None
    }
}

/// A `SchemaVerifier` with the generated-case custom rules registered.
pub fn case_verifier() -> SchemaVerifier {
    let mut verifier = SchemaVerifier::new();
    verifier.register_rule(
        PRESENTATION_WITHHOLDS_DIAGNOSIS,
        Box::new(presentation_withholds_diagnosis),
    );
    verifier
}
