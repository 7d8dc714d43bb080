//! Scripted completion collaborator and fictional case responses.
//!
//! Nothing here contacts an external model. `ScriptedCompletion` replays
//! queued responses in order so demos and tests are reproducible.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use clinsim_contracts::error::{ClinsimError, ClinsimResult};
use clinsim_core::traits::CompletionClient;

// ── Scripted completion client ───────────────────────────────────────────────

/// One queued reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedReply {
    Text(String),
    Failure(String),
    Timeout { elapsed_ms: u64 },
}

/// A `CompletionClient` that answers from a queue.
///
/// `calls` and `prompts` are shared handles: clone them before boxing the
/// client into an engine to inspect what the engine sent.
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<ScriptedReply>>,
    pub calls: Arc<Mutex<u32>>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedCompletion {
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Arc::new(Mutex::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue plain text replies.
    pub fn with_texts<S: Into<String>>(texts: impl IntoIterator<Item = S>) -> Self {
        Self::new(texts.into_iter().map(|t| ScriptedReply::Text(t.into())))
    }

    pub fn call_count(&self) -> u32 {
        self.calls.lock().map(|c| *c).unwrap_or_default()
    }
}

impl CompletionClient for ScriptedCompletion {
    fn complete(&self, _system_instruction: &str, user_prompt: &str) -> ClinsimResult<String> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls += 1;
        }
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(user_prompt.to_string());
        }

        let next = self
            .replies
            .lock()
            .map_err(|e| ClinsimError::Completion {
                reason: format!("scripted reply queue poisoned: {e}"),
            })?
            .pop_front();

        match next {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Failure(reason)) => Err(ClinsimError::Completion { reason }),
            Some(ScriptedReply::Timeout { elapsed_ms }) => Err(ClinsimError::Timeout { elapsed_ms }),
            None => Err(ClinsimError::Completion {
                reason: "no scripted reply left".to_string(),
            }),
        }
    }
}

// ── Fictional case payloads ──────────────────────────────────────────────────

/// A complete, verifiable case object for `specialty`.
///
/// Cardiology, respiratory and neurology have their own case; any other
/// specialty gets a gastroenterology case.
pub fn sample_case(specialty: &str) -> Value {
    match specialty {
        "cardiology" => json!({
            "diagnosis": "Myocardial infarction",
            "additional_symptoms": ["Diaphoresis", "Nausea", "Pain radiating to the left arm"],
            "medical_history": "Hypertension for 10 years, type 2 diabetes, 30 pack-year smoker",
            "recent_exposure": "Shovelling snow an hour before the pain began",
            "patient_presentation": "It feels like an elephant is sitting on my chest and I can't catch my breath.",
            "clinical_notes": "BP 158/94, HR 104, SpO2 94%. ECG: ST elevation in II, III, aVF.",
            "difficulty_level": "intermediate",
            "learning_objectives": [
                "Recognise an acute coronary syndrome from history",
                "Interpret inferior ST elevation"
            ],
            "differential_diagnoses": ["Aortic dissection", "Pulmonary embolism", "Pericarditis"]
        }),
        "respiratory" => json!({
            "diagnosis": "Community-acquired pneumonia",
            "additional_symptoms": ["Pleuritic chest pain", "Rigors"],
            "medical_history": "Asthma as a child, otherwise well",
            "recent_exposure": "Colleague off work with a chest infection last week",
            "patient_presentation": "I've had this cough for four days and now I'm bringing up green phlegm.",
            "clinical_notes": "T 38.9, RR 24, crackles at the right base, CXR right lower lobe consolidation.",
            "difficulty_level": "beginner",
            "learning_objectives": ["Apply the CURB-65 score"],
            "differential_diagnoses": ["Acute bronchitis", "Pulmonary embolism"]
        }),
        "neurology" => json!({
            "diagnosis": "Migraine with aura",
            "additional_symptoms": "Photophobia and nausea",
            "medical_history": "Similar but milder episodes since her teens",
            "recent_exposure": "Several nights of poor sleep before exams",
            "patient_presentation": "I saw zigzag lights for twenty minutes and then this pounding pain started on one side.",
            "clinical_notes": "Neurological examination normal between attacks. Fundi normal.",
            "difficulty_level": "intermediate",
            "learning_objectives": ["Distinguish primary from secondary headache"],
            "differential_diagnoses": ["Transient ischemic attack", "Subarachnoid hemorrhage"]
        }),
        _ => json!({
            "diagnosis": "Acute appendicitis",
            "additional_symptoms": ["Anorexia", "Low-grade fever"],
            "medical_history": "No previous surgery",
            "recent_exposure": "None reported",
            "patient_presentation": "The pain started around my belly button last night and has moved down to the right.",
            "clinical_notes": "Tender at McBurney's point, rebound tenderness, WCC 14.2.",
            "difficulty_level": "beginner",
            "learning_objectives": ["Recognise migratory right iliac fossa pain"],
            "differential_diagnoses": ["Mesenteric adenitis", "Ectopic pregnancy", "Ureteric colic"]
        }),
    }
}

/// `sample_case` wrapped in prose the way a chat model tends to answer.
pub fn sample_response(specialty: &str) -> String {
    format!(
        "Here is the case you asked for:\n```json\n{}\n```\nLet me know if you want changes.",
        sample_case(specialty)
    )
}

/// A response whose case object is missing its differential diagnoses.
pub fn incomplete_response(specialty: &str) -> String {
    let mut case = sample_case(specialty);
    if let Some(fields) = case.as_object_mut() {
        fields.remove("differential_diagnoses");
    }
    case.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replies_in_order_then_runs_dry() {
        let client = ScriptedCompletion::new([
            ScriptedReply::Text("first".to_string()),
            ScriptedReply::Timeout { elapsed_ms: 50 },
        ]);

        assert_eq!(client.complete("sys", "p1").unwrap(), "first");
        assert!(matches!(
            client.complete("sys", "p2"),
            Err(ClinsimError::Timeout { elapsed_ms: 50 })
        ));
        assert!(matches!(
            client.complete("sys", "p3"),
            Err(ClinsimError::Completion { .. })
        ));
        assert_eq!(client.call_count(), 3);
        assert_eq!(*client.prompts.lock().unwrap(), vec!["p1", "p2", "p3"]);
    }

    #[test]
    fn sample_cases_carry_all_nine_fields() {
        for specialty in ["cardiology", "respiratory", "neurology", "gastroenterology"] {
            let case = sample_case(specialty);
            assert_eq!(case.as_object().unwrap().len(), 9, "{specialty}");
        }
        assert!(incomplete_response("cardiology").contains("diagnosis"));
        assert!(!incomplete_response("cardiology").contains("differential_diagnoses"));
    }
}
