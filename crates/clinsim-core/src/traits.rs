//! Trait definitions for the clinsim case pipeline.
//!
//! These four traits are the seams of the engine:
//!
//! - `CaseValidator`:    medical-coherence gate (runs before any completion call)
//! - `CompletionClient`: untrusted text generator (typically an LLM)
//! - `CaseVerifier`:     checks the parsed completion before it becomes a case
//! - `AttemptRecorder`:  append-only sink for learner diagnosis attempts
//!
//! The pipeline wires the first three together in that order. A
//! `CompletionClient` is never called for a request the validator rejected.

use serde_json::Value;

use clinsim_contracts::{
    case::CaseRequest,
    error::ClinsimResult,
    evaluation::DiagnosisAttempt,
    validation::ValidationResult,
    verify::{OutputSchema, VerificationReport},
};

/// A validation strategy for case requests.
///
/// Implementations must be pure: the same request against the same rule
/// tables yields the same verdict. Domain problems are reported inside the
/// `ValidationResult`, never as a panic.
pub trait CaseValidator: Send + Sync {
    /// Short identifier used in logs (e.g. "knowledge", "legacy").
    fn name(&self) -> &'static str;

    /// Run every check that applies to `request` and aggregate the verdict.
    fn comprehensive_validation(&self, request: &CaseRequest) -> ValidationResult;
}

/// The external text-completion collaborator.
///
/// Implementations are **untrusted**: whatever they return is parsed and
/// verified before it can become a case. Timeouts are the implementation's
/// responsibility and surface as `ClinsimError::Timeout`.
pub trait CompletionClient: Send + Sync {
    /// Complete `user_prompt` under `system_instruction` and return the raw
    /// response text.
    fn complete(&self, system_instruction: &str, user_prompt: &str) -> ClinsimResult<String>;
}

/// Checks a parsed case object against a declarative `OutputSchema`.
pub trait CaseVerifier: Send + Sync {
    /// Verify `payload` against `schema`.
    ///
    /// Return a report with `passed = true` if every rule passes, or
    /// `passed = false` with populated `failures`. `Err` is reserved for a
    /// schema that cannot be applied at all.
    fn verify(&self, payload: &Value, schema: &OutputSchema) -> ClinsimResult<VerificationReport>;
}

/// Append-only history of diagnosis attempts for one session.
pub trait AttemptRecorder: Send + Sync {
    /// Append one attempt. Recorded attempts are never modified.
    fn record(&self, attempt: &DiagnosisAttempt) -> ClinsimResult<()>;

    /// Close the history; later `record` calls fail.
    fn seal(&self) -> ClinsimResult<()>;
}
