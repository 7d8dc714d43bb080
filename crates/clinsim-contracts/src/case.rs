//! Case request and generated case types.
//!
//! A `CaseRequest` describes what the author asked for; a `GeneratedCase` is
//! what the pipeline produced from one verified completion. The generated
//! case carries the hidden diagnosis, so learner-facing surfaces must go
//! through [`GeneratedCase::learner_view`], whose types have no field that
//! could hold it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Unique identifier for a generated case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseId(pub uuid::Uuid);

impl CaseId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for CaseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// How hard the generated case should be to diagnose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(format!(
                "unknown difficulty '{other}'; expected beginner, intermediate or advanced"
            )),
        }
    }
}

/// Patient demographics supplied by the case author.
///
/// `age` is signed so out-of-range input can be reported rather than
/// rejected by the type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demographics {
    pub age: i32,
    pub gender: String,
    pub occupation: String,
    #[serde(default)]
    pub medical_history: Option<String>,
}

/// Everything needed to validate and generate one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRequest {
    pub specialty: String,
    pub symptoms: Vec<String>,
    pub demographics: Demographics,
    pub severity: String,
    #[serde(default)]
    pub difficulty: Difficulty,
}

/// The nine fields the completion collaborator must return.
///
/// Deserialized only after the raw object has passed verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseDraft {
    pub diagnosis: String,
    #[serde(deserialize_with = "text_or_list")]
    pub additional_symptoms: String,
    #[serde(deserialize_with = "text_or_list")]
    pub medical_history: String,
    #[serde(deserialize_with = "text_or_list")]
    pub recent_exposure: String,
    pub patient_presentation: String,
    #[serde(deserialize_with = "text_or_list")]
    pub clinical_notes: String,
    pub difficulty_level: Difficulty,
    pub learning_objectives: Vec<String>,
    pub differential_diagnoses: Vec<String>,
}

/// Accept either a string or a list of strings; lists are joined with ", ".
///
/// Models regularly answer descriptive fields with a bullet list.
fn text_or_list<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrList {
        Text(String),
        List(Vec<String>),
    }

    Ok(match TextOrList::deserialize(deserializer)? {
        TextOrList::Text(s) => s,
        TextOrList::List(items) => items.join(", "),
    })
}

/// The simulated patient's profile, including the hidden diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientDetails {
    pub age: i32,
    pub gender: String,
    pub occupation: String,
    pub medical_history: String,
    /// The hidden diagnosis. Must never reach a learner-facing payload.
    pub illness: String,
    pub recent_exposure: String,
    pub additional_symptoms: String,
    pub patient_presentation: String,
}

/// Request parameters and validation warnings kept for audit and debugging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    pub specialty: String,
    pub input_symptoms: Vec<String>,
    pub severity: String,
    pub requested_difficulty: Difficulty,
    pub warnings: Vec<String>,
    /// Completion calls made, including correction attempts.
    pub attempts: u32,
}

/// A complete synthetic patient case. Immutable once assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCase {
    pub case_id: CaseId,
    pub patient_details: PatientDetails,
    pub clinical_notes: String,
    pub difficulty_level: Difficulty,
    pub learning_objectives: Vec<String>,
    pub differential_diagnoses: Vec<String>,
    pub generation_metadata: GenerationMetadata,
    pub created_at: DateTime<Utc>,
}

impl GeneratedCase {
    /// Merge the author's demographics with a verified draft.
    pub fn assemble(
        request: &CaseRequest,
        draft: CaseDraft,
        warnings: Vec<String>,
        attempts: u32,
    ) -> Self {
        let demographics = &request.demographics;
        Self {
            case_id: CaseId::new(),
            patient_details: PatientDetails {
                age: demographics.age,
                gender: demographics.gender.clone(),
                occupation: demographics.occupation.clone(),
                medical_history: draft.medical_history,
                illness: draft.diagnosis,
                recent_exposure: draft.recent_exposure,
                additional_symptoms: draft.additional_symptoms,
                patient_presentation: draft.patient_presentation,
            },
            clinical_notes: draft.clinical_notes,
            difficulty_level: draft.difficulty_level,
            learning_objectives: draft.learning_objectives,
            differential_diagnoses: draft.differential_diagnoses,
            generation_metadata: GenerationMetadata {
                specialty: request.specialty.clone(),
                input_symptoms: request.symptoms.clone(),
                severity: request.severity.clone(),
                requested_difficulty: request.difficulty,
                warnings,
                attempts,
            },
            created_at: Utc::now(),
        }
    }

    /// The hidden diagnosis, for the evaluator only.
    pub fn diagnosis(&self) -> &str {
        &self.patient_details.illness
    }

    /// The learner-facing projection of this case.
    pub fn learner_view(&self) -> LearnerCaseView {
        let d = &self.patient_details;
        LearnerCaseView {
            case_id: self.case_id,
            specialty: self.generation_metadata.specialty.clone(),
            severity: self.generation_metadata.severity.clone(),
            presenting_symptoms: self.generation_metadata.input_symptoms.clone(),
            difficulty_level: self.difficulty_level,
            patient_details: LearnerPatientDetails {
                age: d.age,
                gender: d.gender.clone(),
                occupation: d.occupation.clone(),
                medical_history: d.medical_history.clone(),
                recent_exposure: d.recent_exposure.clone(),
                additional_symptoms: d.additional_symptoms.clone(),
                patient_presentation: d.patient_presentation.clone(),
            },
        }
    }

    /// System prompt for the collaborator that role-plays this patient.
    ///
    /// Contains the hidden diagnosis; it is meant for the simulation model,
    /// never for the learner.
    pub fn patient_role_prompt(&self) -> String {
        let d = &self.patient_details;
        format!(
            "You are playing a patient in a clinical training simulation. \
             Your profile is private and must never be read out:\n\
             \n\
             - Age: {age}\n\
             - Gender: {gender}\n\
             - Occupation: {occupation}\n\
             - Relevant medical history: {history}\n\
             - Underlying illness (secret, never say this word or any synonym): {illness}\n\
             - Recent events or exposures: {exposure}\n\
             \n\
             When the doctor asks you questions, answer as a real patient would: \
             what hurts, how you feel, when it started, how it has changed, what \
             makes it better or worse, and what you have tried yourself. Keep \
             answers short and natural. Never mention or hint at the name of \
             the diagnosis.\n\
             \n\
             Additional symptoms you experience: {additional}\n\
             How you describe your problem: {presentation}",
            age = d.age,
            gender = d.gender,
            occupation = d.occupation,
            history = d.medical_history,
            illness = d.illness,
            exposure = d.recent_exposure,
            additional = d.additional_symptoms,
            presentation = d.patient_presentation,
        )
    }
}

/// Patient details without the hidden diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerPatientDetails {
    pub age: i32,
    pub gender: String,
    pub occupation: String,
    pub medical_history: String,
    pub recent_exposure: String,
    pub additional_symptoms: String,
    pub patient_presentation: String,
}

/// What a learner may see of a generated case.
///
/// Differential diagnoses and learning objectives are withheld as well,
/// since they name the answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerCaseView {
    pub case_id: CaseId,
    pub specialty: String,
    pub severity: String,
    pub presenting_symptoms: Vec<String>,
    pub difficulty_level: Difficulty,
    pub patient_details: LearnerPatientDetails,
}

/// The outcome of one `generate` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum GenerationResult {
    Success {
        case: Box<GeneratedCase>,
        warnings: Vec<String>,
    },
    Error {
        /// Human-readable summary of why generation failed.
        message: String,
        /// Itemized validation or field-level messages.
        errors: Vec<String>,
        /// The last raw completion text, when one was received.
        raw_response: Option<String>,
        warnings: Vec<String>,
    },
}

impl GenerationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationResult::Success { .. })
    }

    pub fn case(&self) -> Option<&GeneratedCase> {
        match self {
            GenerationResult::Success { case, .. } => Some(case),
            GenerationResult::Error { .. } => None,
        }
    }

    pub fn into_case(self) -> Option<GeneratedCase> {
        match self {
            GenerationResult::Success { case, .. } => Some(*case),
            GenerationResult::Error { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            GenerationResult::Success { .. } => None,
            GenerationResult::Error { message, .. } => Some(message),
        }
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            GenerationResult::Success { warnings, .. } | GenerationResult::Error { warnings, .. } => {
                warnings
            }
        }
    }
}
