//! # clinsim-evaluate
//!
//! Scores a learner's free-text diagnosis against a case's hidden diagnosis.
//!
//! Three signals are computed over normalized text and combined:
//!
//! - **sequence**: Ratcliff/Obershelp ratio of the normalized strings;
//! - **keyword**: best of Jaccard overlap and coverage of the correct words;
//! - **synonym**: membership of both diagnoses in one [`SynonymTable`] group.
//!
//! ```rust,ignore
//! use clinsim_evaluate::DiagnosisEvaluator;
//!
//! let result = DiagnosisEvaluator::new().evaluate("heart attack", "myocardial infarction");
//! assert!(result.is_correct);
//! ```

pub mod evaluator;
pub mod normalize;
pub mod sequence;
pub mod synonyms;

pub use evaluator::{DiagnosisEvaluator, CLOSE_THRESHOLD, CORRECT_THRESHOLD};
pub use normalize::{contains_run, normalize, tokenize, STOPWORDS};
pub use sequence::gestalt_ratio;
pub use synonyms::SynonymTable;
