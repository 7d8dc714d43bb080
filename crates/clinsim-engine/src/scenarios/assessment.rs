//! Diagnosis assessment: a learner makes several guesses at a generated
//! case; each is scored, fed back and appended to a hash-chained history
//! that is sealed and verified at the end.

use clinsim_contracts::{
    case::{Demographics, GenerationResult},
    error::{ClinsimError, ClinsimResult},
};
use clinsim_core::{traits::AttemptRecorder, EngineConfig};
use clinsim_history::InMemoryAttemptHistory;

use crate::{
    engine::ClinsimEngine,
    mock_data::{sample_response, ScriptedCompletion},
};

const GUESSES: [&str; 4] = [
    "asthma exacerbation",
    "acute bronchitis",
    "pneumonia?",
    "chest infection",
];

pub fn run_scenario(config: &EngineConfig) -> ClinsimResult<()> {
    println!("=== Scenario 2: Diagnosis Assessment ===");
    println!();

    let client = ScriptedCompletion::with_texts([sample_response("respiratory")]);
    let engine = ClinsimEngine::from_config(config, Box::new(client))?;

    let request = engine.request(
        "respiratory",
        &["cough", "fever", "sputum_production"],
        Demographics {
            age: 34,
            gender: "female".to_string(),
            occupation: "teacher".to_string(),
            medical_history: None,
        },
        "moderate",
        None,
    );

    let case = match engine.generate(&request) {
        GenerationResult::Success { case, .. } => case,
        GenerationResult::Error { message, .. } => {
            return Err(ClinsimError::CaseVerification { reason: message });
        }
    };
    println!("Case {} generated; the learner interviews the patient.", case.case_id);
    println!();

    let history = InMemoryAttemptHistory::new(case.case_id.to_string());
    for (n, guess) in GUESSES.iter().enumerate() {
        let result = engine.submit_diagnosis(&history, &case, guess)?;
        println!("[{}] \"{guess}\"", n + 1);
        println!(
            "  score {:.2} (sequence {:.2}, keyword {:.2}, synonym {:.2})",
            result.similarity_score,
            result.sequence_similarity,
            result.keyword_similarity,
            result.synonym_similarity
        );
        println!("  {}", result.feedback);
        if result.is_correct {
            break;
        }
    }
    println!();

    history.seal()?;
    let log = history.export_log();
    println!("Attempt history");
    println!("  attempts:       {}", log.events.len());
    println!("  solved:         {}", log.solved());
    println!("  best score:     {:.2}", log.best_score().unwrap_or_default());
    println!("  chain intact:   {}", history.verify_integrity());
    println!("  terminal hash:  {}", log.terminal_hash);
    println!("  diagnosis:      {}", case.diagnosis());
    println!();
    Ok(())
}
