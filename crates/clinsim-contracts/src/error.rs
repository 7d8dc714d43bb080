//! Engine error types.
//!
//! Domain input problems (unknown specialty, contradictory symptoms, ...) are
//! never errors: they are reported inside a `ValidationResult`. The variants
//! below cover the failures that are not part of the domain answer.

use thiserror::Error;

/// The unified error type for the clinsim crates.
#[derive(Debug, Error)]
pub enum ClinsimError {
    /// The knowledge document is missing, unparsable, or structurally invalid.
    ///
    /// This happens once at startup; an engine without rule tables cannot run.
    #[error("knowledge load failed: {reason}")]
    KnowledgeLoad { reason: String },

    /// A configuration value is missing or malformed.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// The text-completion collaborator returned an error.
    #[error("completion call failed: {reason}")]
    Completion { reason: String },

    /// The text-completion collaborator exceeded the caller's deadline.
    #[error("completion call timed out after {elapsed_ms} ms")]
    Timeout { elapsed_ms: u64 },

    /// The completion text did not contain a parsable JSON object.
    #[error("failed to parse completion response: {reason}")]
    ResponseParse { reason: String },

    /// The parsed case object failed field-level verification.
    #[error("generated case failed verification: {reason}")]
    CaseVerification { reason: String },

    /// A JSON Schema document could not be compiled or applied.
    #[error("schema validation error: {reason}")]
    SchemaValidation { reason: String },

    /// Diagnosis scoring could not be carried out.
    #[error("evaluation failed: {reason}")]
    Evaluation { reason: String },

    /// The attempt history rejected an append (sealed, or its lock poisoned).
    #[error("attempt history error: {reason}")]
    History { reason: String },
}

/// Convenience alias used throughout the clinsim crates.
pub type ClinsimResult<T> = Result<T, ClinsimError>;
