use std::collections::BTreeSet;

use tracing::{debug, warn};

use clinsim_contracts::{
    error::{ClinsimError, ClinsimResult},
    evaluation::{DiagnosisAttempt, EvaluationResult},
};

use crate::{normalize::normalize, sequence::gestalt_ratio, synonyms::SynonymTable};

/// Combined score at or above which a diagnosis is accepted.
pub const CORRECT_THRESHOLD: f64 = 0.85;

/// Combined score at or above which a rejected diagnosis counts as close.
pub const CLOSE_THRESHOLD: f64 = 0.60;

const SEQUENCE_WEIGHT: f64 = 0.4;
const KEYWORD_WEIGHT: f64 = 0.3;
const SYNONYM_WEIGHT: f64 = 0.3;

const FEEDBACK_CORRECT: &str = "Excellent! Your diagnosis is correct.";
const FEEDBACK_VERY_CLOSE: &str =
    "Very close! Check the specificity or spelling of your diagnosis.";
const FEEDBACK_RIGHT_DIRECTION: &str =
    "You're heading in the right direction, but the diagnosis isn't quite right yet.";
const FEEDBACK_SOME_ELEMENTS: &str =
    "Your diagnosis has some relevant elements. Review the presenting pattern again.";
const FEEDBACK_TOUCHES: &str =
    "Your diagnosis touches on relevant areas. Consider alternative diagnoses.";
const FEEDBACK_NO_MATCH: &str =
    "That doesn't match this case. Review the symptoms and the patient's history.";
const FEEDBACK_UNAVAILABLE: &str = "Unable to evaluate this diagnosis. Please try again.";

/// Scores a learner's free-text diagnosis against the hidden one.
///
/// Holds only the read-only synonym table; every call is a pure function of
/// its two arguments.
#[derive(Debug, Clone, Default)]
pub struct DiagnosisEvaluator {
    synonyms: SynonymTable,
}

impl DiagnosisEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_synonyms(synonyms: SynonymTable) -> Self {
        Self { synonyms }
    }

    pub fn synonyms(&self) -> &SynonymTable {
        &self.synonyms
    }

    /// Score `user` against `correct`. Never fails: anything that prevents
    /// scoring yields a zero-score result with generic feedback.
    pub fn evaluate(&self, user: &str, correct: &str) -> EvaluationResult {
        match self.try_evaluate(user, correct) {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "diagnosis could not be evaluated");
                zero_result(FEEDBACK_UNAVAILABLE)
            }
        }
    }

    /// [`Self::evaluate`] with the failure reported instead of recovered.
    ///
    /// Text with no words to compare is not a failure: it scores zero with
    /// the no-match feedback.
    pub fn try_evaluate(&self, user: &str, correct: &str) -> ClinsimResult<EvaluationResult> {
        let user_tokens = normalize(user);
        let correct_tokens = normalize(correct);
        if user_tokens.is_empty() || correct_tokens.is_empty() {
            debug!("diagnosis text has no words to compare");
            return Ok(zero_result(FEEDBACK_NO_MATCH));
        }

        let sequence = gestalt_ratio(&user_tokens.join(" "), &correct_tokens.join(" "));
        let keyword = keyword_similarity(&user_tokens, &correct_tokens);
        let synonym = self.synonyms.similarity(user, correct);

        let weighted = SEQUENCE_WEIGHT * sequence + KEYWORD_WEIGHT * keyword + SYNONYM_WEIGHT * synonym;
        let combined = weighted.max(sequence).max(synonym);
        if !combined.is_finite() {
            return Err(ClinsimError::Evaluation {
                reason: format!("similarity score is not finite: {combined}"),
            });
        }
        let combined = combined.clamp(0.0, 1.0);

        let is_correct = combined >= CORRECT_THRESHOLD;
        let is_close = !is_correct && combined >= CLOSE_THRESHOLD;

        debug!(
            sequence,
            keyword,
            synonym,
            combined,
            is_correct,
            is_close,
            "diagnosis scored"
        );

        Ok(EvaluationResult {
            is_correct,
            is_close,
            similarity_score: combined,
            feedback: feedback(is_correct, is_close, combined).to_string(),
            sequence_similarity: sequence,
            keyword_similarity: keyword,
            synonym_similarity: synonym,
        })
    }

    /// Evaluate and stamp the result as a [`DiagnosisAttempt`].
    pub fn attempt(&self, user: &str, correct: &str) -> DiagnosisAttempt {
        let result = self.evaluate(user, correct);
        DiagnosisAttempt::new(user, correct, &result)
    }
}

fn zero_result(feedback: &str) -> EvaluationResult {
    EvaluationResult {
        is_correct: false,
        is_close: false,
        similarity_score: 0.0,
        feedback: feedback.to_string(),
        sequence_similarity: 0.0,
        keyword_similarity: 0.0,
        synonym_similarity: 0.0,
    }
}

/// The larger of the Jaccard index and the share of `correct`'s words the
/// user named.
pub(crate) fn keyword_similarity(user: &[String], correct: &[String]) -> f64 {
    let user: BTreeSet<&str> = user.iter().map(String::as_str).collect();
    let correct: BTreeSet<&str> = correct.iter().map(String::as_str).collect();
    if user.is_empty() || correct.is_empty() {
        return 0.0;
    }

    let shared = user.intersection(&correct).count() as f64;
    let union = user.union(&correct).count() as f64;
    let jaccard = shared / union;
    let coverage = shared / correct.len() as f64;
    jaccard.max(coverage)
}

fn feedback(is_correct: bool, is_close: bool, combined: f64) -> &'static str {
    if is_correct {
        FEEDBACK_CORRECT
    } else if is_close && combined > 0.75 {
        FEEDBACK_VERY_CLOSE
    } else if is_close {
        FEEDBACK_RIGHT_DIRECTION
    } else if combined > 0.4 {
        FEEDBACK_SOME_ELEMENTS
    } else if combined > 0.2 {
        FEEDBACK_TOUCHES
    } else {
        FEEDBACK_NO_MATCH
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::tokenize;

    fn evaluator() -> DiagnosisEvaluator {
        DiagnosisEvaluator::new()
    }

    // ── Scoring ───────────────────────────────────────────────────────────

    #[test]
    fn synonym_counts_as_correct() {
        let result = evaluator().evaluate("heart attack", "myocardial infarction");
        assert_eq!(result.synonym_similarity, 0.9);
        assert!(result.similarity_score >= CORRECT_THRESHOLD);
        assert!(result.is_correct);
        assert!(!result.is_close);
        assert_eq!(result.feedback, FEEDBACK_CORRECT);
    }

    #[test]
    fn identical_diagnoses_score_one() {
        let result = evaluator().evaluate("myocardial infarction", "myocardial infarction");
        assert_eq!(result.sequence_similarity, 1.0);
        assert_eq!(result.keyword_similarity, 1.0);
        assert_eq!(result.similarity_score, 1.0);
        assert!(result.is_correct);
    }

    #[test]
    fn qualifiers_and_case_do_not_matter() {
        let result = evaluator().evaluate("ACUTE appendicitis!", "Appendicitis");
        assert_eq!(result.sequence_similarity, 1.0);
        assert!(result.is_correct);
    }

    #[test]
    fn unrelated_diagnosis_scores_near_zero() {
        let result = evaluator().evaluate("the flu", "appendicitis");
        assert!(result.similarity_score < 0.2, "score was {}", result.similarity_score);
        assert_eq!(result.keyword_similarity, 0.0);
        assert_eq!(result.synonym_similarity, 0.0);
        assert!(!result.is_correct);
        assert!(!result.is_close);
        assert_eq!(result.feedback, FEEDBACK_NO_MATCH);
    }

    #[test]
    fn misspelling_still_scores_high() {
        // "pnemonia" vs "pneumonia": 2*8/17
        let result = evaluator().evaluate("pnemonia", "pneumonia");
        assert!(result.similarity_score > 0.9, "score was {}", result.similarity_score);
        assert!(result.is_correct);

        // partial name: "heart" vs "congestive heart failure"
        let partial = evaluator().evaluate("heart", "congestive heart failure");
        assert!(!partial.is_correct);
        assert!(partial.similarity_score > 0.2, "score was {}", partial.similarity_score);
    }

    #[test]
    fn same_organ_different_process_is_very_close() {
        // gestalt 2*16/38; no keyword coverage beyond "ulcerative", no synonym
        let result = evaluator().evaluate("ulcerative colitis", "ulcerative proctitis");
        assert_eq!(result.synonym_similarity, 0.0);
        assert_eq!(result.keyword_similarity, 0.5);
        assert!(result.similarity_score > 0.75 && result.similarity_score < CORRECT_THRESHOLD);
        assert!(!result.is_correct);
        assert!(result.is_close);
        assert_eq!(result.feedback, FEEDBACK_VERY_CLOSE);
    }

    #[test]
    fn shared_headword_is_right_direction() {
        // " headache" plus "te": 2*11/32
        let result = evaluator().evaluate("tension headache", "cluster headache");
        assert!((result.similarity_score - 22.0 / 32.0).abs() < 1e-9, "score was {}", result.similarity_score);
        assert!(!result.is_correct);
        assert!(result.is_close);
        assert_eq!(result.feedback, FEEDBACK_RIGHT_DIRECTION);

        let result = evaluator().evaluate("pericarditis", "myocarditis");
        assert!(result.similarity_score >= CLOSE_THRESHOLD && result.similarity_score <= 0.75);
        assert!(result.is_close);
        assert_eq!(result.feedback, FEEDBACK_RIGHT_DIRECTION);
    }

    #[test]
    fn scoring_is_deterministic() {
        let e = evaluator();
        let first = e.evaluate("tension headache", "migraine");
        for _ in 0..5 {
            assert_eq!(e.evaluate("tension headache", "migraine"), first);
        }
    }

    // ── Keywords ──────────────────────────────────────────────────────────

    #[test]
    fn keyword_uses_best_of_jaccard_and_coverage() {
        let user = tokenize("right lower lobe pneumonia");
        let correct = tokenize("pneumonia");
        // jaccard 1/4, coverage 1/1
        assert_eq!(keyword_similarity(&user, &correct), 1.0);

        let user = tokenize("viral pneumonia");
        let correct = tokenize("bacterial pneumonia");
        // jaccard 1/3, coverage 1/2
        assert_eq!(keyword_similarity(&user, &correct), 0.5);

        assert_eq!(keyword_similarity(&[], &correct), 0.0);
    }

    // ── Feedback tiers ────────────────────────────────────────────────────

    #[test]
    fn feedback_tiers_follow_boundaries() {
        assert_eq!(feedback(true, false, 0.9), FEEDBACK_CORRECT);
        assert_eq!(feedback(false, true, 0.80), FEEDBACK_VERY_CLOSE);
        assert_eq!(feedback(false, true, 0.75), FEEDBACK_RIGHT_DIRECTION);
        assert_eq!(feedback(false, false, 0.5), FEEDBACK_SOME_ELEMENTS);
        assert_eq!(feedback(false, false, 0.4), FEEDBACK_TOUCHES);
        assert_eq!(feedback(false, false, 0.2), FEEDBACK_NO_MATCH);
    }

    // ── Failure handling ──────────────────────────────────────────────────

    #[test]
    fn blank_input_scores_zero_as_no_match() {
        let result = evaluator().evaluate("   ", "asthma");
        assert_eq!(result.similarity_score, 0.0);
        assert!(!result.is_correct);
        assert!(!result.is_close);
        assert_eq!(result.feedback, FEEDBACK_NO_MATCH);

        let result = evaluator().try_evaluate("asthma", "...").unwrap();
        assert_eq!(result.similarity_score, 0.0);
        assert_eq!(result.feedback, FEEDBACK_NO_MATCH);
    }

    #[test]
    fn recovered_failure_uses_generic_feedback() {
        let result = zero_result(FEEDBACK_UNAVAILABLE);
        assert_eq!(result.similarity_score, 0.0);
        assert_eq!(result.feedback, "Unable to evaluate this diagnosis. Please try again.");
    }

    // ── Attempts ──────────────────────────────────────────────────────────

    #[test]
    fn attempt_copies_the_result() {
        let attempt = evaluator().attempt("the flu", "influenza");
        assert_eq!(attempt.user_diagnosis, "the flu");
        assert_eq!(attempt.correct_diagnosis, "influenza");
        assert!(attempt.is_correct);
        assert_eq!(attempt.feedback, FEEDBACK_CORRECT);
    }

    #[test]
    fn custom_synonyms_are_used() {
        let table = SynonymTable::from_groups([("gout", ["podagra"])]);
        let e = DiagnosisEvaluator::with_synonyms(table);
        assert!(e.evaluate("podagra", "gout").is_correct);
        assert!(!e.evaluate("heart attack", "myocardial infarction").is_correct);
    }
}
