//! Completion prompts for case generation.
//!
//! The prompt is assembled from the knowledge base so that the collaborator
//! sees the same vocabulary the validator enforced: the specialty's
//! description and common conditions, the literal requested symptoms, and the
//! severity tier's descriptors.

use clinsim_contracts::case::{CaseRequest, Difficulty};
use clinsim_knowledge::{AgeGroup, KnowledgeBase};

/// Sent as the system instruction when the configuration does not override it.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are an expert medical case generator. \
     Always respond with valid JSON in the exact format requested.";

/// The nine fields a completion must return, in prompt order.
pub const CASE_FIELDS: [&str; 9] = [
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

const OUTPUT_FORMAT: &str = r#"{
    "diagnosis": "Specific medical diagnosis (hidden from the student)",
    "additional_symptoms": "Symptoms the patient exhibits beyond the presenting ones",
    "medical_history": "Relevant past medical history supporting the diagnosis",
    "recent_exposure": "Recent events, activities or exposures that triggered or contributed to the condition",
    "patient_presentation": "How the patient describes the problem in their own words, without naming the diagnosis",
    "clinical_notes": "Examination findings and other clinical detail",
    "difficulty_level": "beginner|intermediate|advanced",
    "learning_objectives": ["Primary learning objective", "Secondary learning objective"],
    "differential_diagnoses": ["Alternative diagnosis 1", "Alternative diagnosis 2", "Alternative diagnosis 3"]
}"#;

/// Build the case-generation prompt for a validated request.
///
/// Keys the knowledge base does not know (possible with the legacy
/// validator) are rendered verbatim.
pub fn build_case_prompt(kb: &KnowledgeBase, request: &CaseRequest) -> String {
    let demographics = &request.demographics;

    let (specialty_name, specialty_description, conditions) = match kb.specialty(&request.specialty)
    {
        Some(s) => (
            s.name.as_str(),
            s.description.as_str(),
            s.common_conditions.join(", "),
        ),
        None => (request.specialty.as_str(), "", String::new()),
    };

    let symptoms = request
        .symptoms
        .iter()
        .map(|key| match kb.symptom(key) {
            Some(symptom) => format!("{} ({})", symptom.name, key),
            None => key.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ");

    let (severity_description, pain_scale, functional_impact) = match kb.severity(&request.severity)
    {
        Some(s) => (
            s.description.as_str(),
            s.pain_scale.as_str(),
            s.functional_impact.as_str(),
        ),
        None => ("", "N/A", "N/A"),
    };

    let history = demographics
        .medical_history
        .as_deref()
        .filter(|h| !h.trim().is_empty())
        .unwrap_or("To be determined");

    let mut prompt = String::with_capacity(3072);
    prompt.push_str(&format!(
        "Create a realistic medical case for {specialty_name} with the following parameters:\n\n"
    ));

    prompt.push_str("PATIENT DEMOGRAPHICS:\n");
    prompt.push_str(&format!("- Age: {} years old\n", demographics.age));
    prompt.push_str(&format!("- Gender: {}\n", demographics.gender));
    prompt.push_str(&format!("- Occupation: {}\n", demographics.occupation));
    prompt.push_str(&format!("- Medical History: {history}\n"));
    prompt.push_str(&format!(
        "- Age group guidance: {}\n\n",
        age_group_guidance(AgeGroup::from_age(demographics.age))
    ));

    prompt.push_str("PRESENTING SYMPTOMS:\n");
    prompt.push_str(&format!("- Primary symptoms: {symptoms}\n"));
    prompt.push_str(&format!(
        "- Severity level: {} ({severity_description})\n",
        request.severity
    ));
    prompt.push_str(&format!("- Pain scale: {pain_scale}\n"));
    prompt.push_str(&format!("- Functional impact: {functional_impact}\n\n"));

    prompt.push_str("SPECIALTY CONTEXT:\n");
    prompt.push_str(&format!(
        "- Medical specialty: {specialty_name} - {specialty_description}\n"
    ));
    prompt.push_str(&format!("- Common conditions in this specialty: {conditions}\n\n"));

    prompt.push_str("DIFFICULTY:\n");
    prompt.push_str(&format!(
        "- Requested difficulty: {}\n- {}\n\n",
        request.difficulty,
        difficulty_guidance(request.difficulty)
    ));

    prompt.push_str(
        "INSTRUCTIONS:\n\
         1. Choose one specific, realistic diagnosis that explains every presenting symptom\n\
         2. Keep the diagnosis appropriate for the patient's age and demographic profile\n\
         3. Add supporting symptoms consistent with the diagnosis\n\
         4. Write a plausible medical history that supports the case\n\
         5. Include recent events or exposures that could have triggered the condition\n\
         6. Make the case medically coherent and educationally valuable\n\n",
    );

    prompt.push_str(&format!(
        "OUTPUT FORMAT:\nReturn ONLY a JSON object with exactly these {} fields and no other text:\n",
        CASE_FIELDS.len()
    ));
    prompt.push_str(OUTPUT_FORMAT);
    prompt.push_str(
        "\n\nThe diagnosis is hidden from the student, who only sees the symptoms and \
         demographics. The patient_presentation must not name it.",
    );

    prompt
}

/// Build the follow-up prompt sent after a rejected completion.
///
/// Repeats the original prompt, lists why the previous response was rejected,
/// and quotes that response back.
pub fn correction_prompt(original: &str, reasons: &[String], previous_response: &str) -> String {
    let mut prompt = String::with_capacity(original.len() + previous_response.len() + 512);
    prompt.push_str(original);
    prompt.push_str("\n\nYOUR PREVIOUS RESPONSE WAS REJECTED:\n");
    for reason in reasons {
        prompt.push_str(&format!("- {reason}\n"));
    }
    prompt.push_str("\nPREVIOUS RESPONSE:\n");
    prompt.push_str(previous_response);
    prompt.push_str(&format!(
        "\n\nReturn a corrected JSON object with exactly the {} fields listed above and nothing else.",
        CASE_FIELDS.len()
    ));
    prompt
}

fn age_group_guidance(group: AgeGroup) -> &'static str {
    match group {
        AgeGroup::Pediatric => {
            "pediatric patient; use age-appropriate conditions and describe symptoms as a child or caregiver would"
        }
        AgeGroup::YoungAdult => {
            "young adult; favour conditions typical of an active, generally healthy population"
        }
        AgeGroup::MiddleAged => {
            "middle-aged patient; lifestyle and early chronic risk factors are relevant"
        }
        AgeGroup::Elderly => {
            "elderly patient; consider comorbidities, polypharmacy and atypical presentations"
        }
    }
}

fn difficulty_guidance(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Beginner => {
            "Use a classic textbook presentation with clear, consistent findings and a common diagnosis"
        }
        Difficulty::Intermediate => {
            "Use a typical presentation with one or two findings that require clinical reasoning to interpret"
        }
        Difficulty::Advanced => {
            "Use a subtle or atypical presentation with confounding findings and close differential diagnoses"
        }
    }
}
