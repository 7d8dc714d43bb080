//! Diagnosis evaluation records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The scored comparison of a learner's diagnosis against the hidden one.
///
/// The three component signals are reported alongside the combined score so
/// a UI or grader can explain why a guess was accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub is_correct: bool,
    pub is_close: bool,
    /// Combined score in `[0, 1]`.
    pub similarity_score: f64,
    pub feedback: String,
    pub sequence_similarity: f64,
    pub keyword_similarity: f64,
    pub synonym_similarity: f64,
}

/// One learner attempt, stamped at creation and never modified afterwards.
///
/// Attempts are owned by the calling conversation; the engine only creates
/// them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisAttempt {
    pub user_diagnosis: String,
    pub correct_diagnosis: String,
    pub similarity_score: f64,
    pub is_correct: bool,
    pub is_close: bool,
    pub feedback: String,
    pub timestamp: DateTime<Utc>,
}

impl DiagnosisAttempt {
    /// Record `result` as an attempt made now.
    pub fn new(
        user_diagnosis: impl Into<String>,
        correct_diagnosis: impl Into<String>,
        result: &EvaluationResult,
    ) -> Self {
        Self {
            user_diagnosis: user_diagnosis.into(),
            correct_diagnosis: correct_diagnosis.into(),
            similarity_score: result.similarity_score,
            is_correct: result.is_correct,
            is_close: result.is_close,
            feedback: result.feedback.clone(),
            timestamp: Utc::now(),
        }
    }
}
