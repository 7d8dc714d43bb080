//! The case-generation pipeline.
//!
//! The pipeline enforces the generation order on every call:
//!
//!   Validate → Prompt → [CompletionClient::complete] → Extract → Verify → Assemble
//!
//! `CompletionClient::complete()` is never called for a request the validator
//! rejected. This is structural: the only call site sits after the validity
//! check returns.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use clinsim_contracts::{
    case::{CaseDraft, CaseRequest, GeneratedCase, GenerationResult},
    error::ClinsimError,
    validation::ValidationResult,
    verify::OutputSchema,
};
use clinsim_knowledge::KnowledgeBase;

use crate::config::GenerationConfig;
use crate::extract::extract_json;
use crate::prompt::{build_case_prompt, correction_prompt};
use crate::traits::{CaseValidator, CaseVerifier, CompletionClient};

/// Why a completion response could not become a case.
struct Rejection {
    message: String,
    errors: Vec<String>,
    /// False when another completion call cannot help (e.g. the schema itself
    /// failed to compile).
    retryable: bool,
}

impl Rejection {
    fn from_error(err: ClinsimError, retryable: bool) -> Self {
        Self {
            message: format!("Case generation failed: {err}"),
            errors: vec![err.to_string()],
            retryable,
        }
    }
}

/// Drives one validator, completion client and verifier.
///
/// The pipeline owns its collaborators and holds no per-call state, so a
/// single instance can serve every request.
pub struct CaseGenerationPipeline {
    knowledge: Arc<KnowledgeBase>,
    validator: Box<dyn CaseValidator>,
    client: Box<dyn CompletionClient>,
    verifier: Box<dyn CaseVerifier>,
    schema: OutputSchema,
    settings: GenerationConfig,
}

impl CaseGenerationPipeline {
    pub fn new(
        knowledge: Arc<KnowledgeBase>,
        validator: Box<dyn CaseValidator>,
        client: Box<dyn CompletionClient>,
        verifier: Box<dyn CaseVerifier>,
        schema: OutputSchema,
        settings: GenerationConfig,
    ) -> Self {
        Self {
            knowledge,
            validator,
            client,
            verifier,
            schema,
            settings,
        }
    }

    /// Run the configured validator without generating anything.
    pub fn validate(&self, request: &CaseRequest) -> ValidationResult {
        self.validator.comprehensive_validation(request)
    }

    pub fn settings(&self) -> &GenerationConfig {
        &self.settings
    }

    /// Generate one case for `request`.
    ///
    /// # Pipeline
    ///
    /// 1. Validate the request; invalid → `Error` without calling the client
    /// 2. Build the prompt from the knowledge base
    /// 3. Call `client.complete()`; a client error → `Error`
    /// 4. Extract the JSON object from the response
    /// 5. Verify it against the generated-case schema
    /// 6. Assemble the `GeneratedCase`
    ///
    /// When `correction_attempts > 0`, a failure in step 4 or 5 sends a
    /// corrective prompt and repeats steps 3–5, up to that many extra calls.
    /// Client errors are never retried.
    ///
    /// Never returns `Err`: every failure is reported as
    /// `GenerationResult::Error`.
    pub fn generate(&self, request: &CaseRequest) -> GenerationResult {
        debug!(
            validator = self.validator.name(),
            specialty = %request.specialty,
            symptoms = request.symptoms.len(),
            severity = %request.severity,
            "case generation starting"
        );

        // ── Step 1: Medical-coherence gate ───────────────────────────────────
        let validation = self.validator.comprehensive_validation(request);
        let warnings = validation.warnings().to_vec();

        if !validation.is_valid() {
            let errors = validation.errors().to_vec();
            warn!(
                specialty = %request.specialty,
                errors = errors.len(),
                "case request rejected by validator"
            );
            return GenerationResult::Error {
                message: format!("Invalid input combination: {}", errors.join("; ")),
                errors,
                raw_response: None,
                warnings,
            };
        }

        // ── Step 2: Prompt ───────────────────────────────────────────────────
        let prompt = build_case_prompt(&self.knowledge, request);
        let system_instruction = self.settings.system_instruction();
        let max_calls = self.settings.correction_attempts.saturating_add(1);

        let mut user_prompt = prompt.clone();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;

            // ── Step 3: Completion call ──────────────────────────────────────
            //
            // Only reachable once the request passed validation.
            let raw = match self.client.complete(system_instruction, &user_prompt) {
                Ok(raw) => raw,
                Err(err) => {
                    warn!(attempt = attempts, error = %err, "completion call failed");
                    return GenerationResult::Error {
                        message: format!("Case generation failed: {err}"),
                        errors: vec![err.to_string()],
                        raw_response: None,
                        warnings,
                    };
                }
            };

            // ── Steps 4 & 5: Extract and verify ──────────────────────────────
            match self.accept(&raw) {
                Ok(draft) => {
                    // ── Step 6: Assemble ─────────────────────────────────────
                    let case = GeneratedCase::assemble(request, draft, warnings.clone(), attempts);
                    info!(
                        case_id = %case.case_id,
                        specialty = %request.specialty,
                        difficulty = %case.difficulty_level,
                        attempts,
                        "case generated"
                    );
                    return GenerationResult::Success {
                        case: Box::new(case),
                        warnings,
                    };
                }
                Err(rejection) => {
                    warn!(
                        attempt = attempts,
                        max_calls,
                        errors = rejection.errors.len(),
                        "completion response rejected"
                    );
                    if !rejection.retryable || attempts >= max_calls {
                        return GenerationResult::Error {
                            message: rejection.message,
                            errors: rejection.errors,
                            raw_response: Some(raw),
                            warnings,
                        };
                    }
                    user_prompt = correction_prompt(&prompt, &rejection.errors, &raw);
                }
            }
        }
    }

    /// Turn a raw completion into a verified draft.
    fn accept(&self, raw: &str) -> Result<CaseDraft, Rejection> {
        let payload: Value = extract_json(raw).map_err(|e| Rejection::from_error(e, true))?;

        let report = self
            .verifier
            .verify(&payload, &self.schema)
            .map_err(|e| Rejection::from_error(e, false))?;

        if !report.passed {
            let errors = report.messages();
            let summary = report
                .failures
                .iter()
                .map(|f| format!("[{}] {}", f.rule_id, f.message))
                .collect::<Vec<_>>()
                .join("; ");
            let err = ClinsimError::CaseVerification { reason: summary };
            return Err(Rejection {
                message: format!("Case generation failed: {err}"),
                errors,
                retryable: true,
            });
        }

        serde_json::from_value(payload).map_err(|e| {
            Rejection::from_error(
                ClinsimError::ResponseParse {
                    reason: format!("case object has unexpected shape: {}", e),
                },
                true,
            )
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
