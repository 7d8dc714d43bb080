//! Case authoring: validate a request, reject an incoherent one, then
//! generate a case through one correction round.
//!
//!   1. A typical cardiology request is validated
//!   2. A request made only of contraindicated symptoms is rejected before
//!      any completion call
//!   3. The scripted model first omits the differential diagnoses; the
//!      pipeline sends a correction prompt and the second reply is accepted
//!   4. The learner-facing view is printed without the diagnosis

use clinsim_contracts::{
    case::{Demographics, Difficulty, GenerationResult},
    error::ClinsimResult,
    validation::ValidationResult,
};
use clinsim_core::EngineConfig;

use crate::{
    engine::ClinsimEngine,
    mock_data::{incomplete_response, sample_response, ScriptedCompletion},
};

fn demographics(age: i32) -> Demographics {
    Demographics {
        age,
        gender: "male".to_string(),
        occupation: "postal worker".to_string(),
        medical_history: Some("Hypertension, type 2 diabetes".to_string()),
    }
}

fn print_validation(result: &ValidationResult) {
    println!("  valid: {}", result.is_valid());
    for error in result.errors() {
        println!("  error:          {error}");
    }
    for warning in result.warnings() {
        println!("  warning:        {warning}");
    }
    for recommendation in result.recommendations() {
        println!("  recommendation: {recommendation}");
    }
}

/// Run the authoring walk-through with `config`. At least one correction
/// attempt is always enabled so step 3 can recover.
pub fn run_scenario(config: &EngineConfig) -> ClinsimResult<()> {
    println!("=== Scenario 1: Case Authoring ===");
    println!();

    let mut config = config.clone();
    config.generation.correction_attempts = config.generation.correction_attempts.max(1);

    let client = ScriptedCompletion::with_texts([
        incomplete_response("cardiology"),
        sample_response("cardiology"),
    ]);
    let calls = client.calls.clone();
    let engine = ClinsimEngine::from_config(&config, Box::new(client))?;

    // ── Step 1: validate ─────────────────────────────────────────────────────
    let request = engine.request(
        "cardiology",
        &["chest_pain", "shortness_breath"],
        demographics(58),
        "moderate",
        Some(Difficulty::Intermediate),
    );
    println!("[1] Validate cardiology: chest_pain + shortness_breath, age 58, moderate");
    print_validation(&engine.validate(&request));
    println!();

    // ── Step 2: rejected request ─────────────────────────────────────────────
    let rejected = engine.request("cardiology", &["rash", "dry_skin"], demographics(58), "mild", None);
    println!("[2] Generate cardiology: rash + dry_skin");
    let before = calls.lock().map(|c| *c).unwrap_or_default();
    let outcome = engine.generate(&rejected);
    let after = calls.lock().map(|c| *c).unwrap_or_default();
    if let Some(message) = outcome.message() {
        println!("  rejected: {message}");
    }
    println!("  completion calls made: {}", after - before);
    println!();

    // ── Step 3: generate with correction ─────────────────────────────────────
    println!("[3] Generate the valid request (first reply is incomplete)");
    match engine.generate(&request) {
        GenerationResult::Success { case, warnings } => {
            println!("  status:   success");
            println!("  case_id:  {}", case.case_id);
            println!("  attempts: {}", case.generation_metadata.attempts);
            println!("  warnings: {}", warnings.len());
            println!();

            // ── Step 4: learner view ─────────────────────────────────────────
            let view = case.learner_view();
            println!("[4] Learner view");
            println!(
                "  {} year old {}, {}",
                view.patient_details.age, view.patient_details.gender, view.patient_details.occupation
            );
            println!("  presents with: {}", view.presenting_symptoms.join(", "));
            println!("  \"{}\"", view.patient_details.patient_presentation);
            println!("  difficulty: {}", view.difficulty_level);
        }
        GenerationResult::Error { message, errors, .. } => {
            println!("  status:  error");
            println!("  message: {message}");
            for error in errors {
                println!("  - {error}");
            }
        }
    }

    println!();
    Ok(())
}
