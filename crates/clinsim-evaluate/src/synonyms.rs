//! Medical synonym groups.
//!
//! A group maps one canonical diagnosis name to the other names learners use
//! for it. Terms match on whole tokens, so "stroke" matches "ischemic
//! stroke" but "mi" does not match "migraine".

use crate::normalize::{contains_run, tokenize};

/// Score when both diagnoses name a term of the same group.
pub const GROUP_MATCH: f64 = 0.9;

/// Score when one side names a group term and the other contains the
/// canonical name as plain text.
pub const CANONICAL_MENTION: f64 = 0.7;

#[derive(Debug, Clone)]
struct SynonymGroup {
    canonical: String,
    /// Tokenized terms, the canonical name first.
    terms: Vec<Vec<String>>,
}

impl SynonymGroup {
    fn matches(&self, tokens: &[String]) -> bool {
        self.terms.iter().any(|term| contains_run(tokens, term))
    }
}

/// A lookup table of synonym groups.
#[derive(Debug, Clone)]
pub struct SynonymTable {
    groups: Vec<SynonymGroup>,
}

const BUILTIN: &[(&str, &[&str])] = &[
    (
        "myocardial infarction",
        &["heart attack", "mi", "stemi", "nstemi", "acute coronary syndrome"],
    ),
    ("influenza", &["flu", "grippe"]),
    ("cerebrovascular accident", &["stroke", "cva", "brain attack"]),
    ("hypertension", &["high blood pressure", "htn"]),
    ("hypotension", &["low blood pressure"]),
    ("diabetes mellitus", &["diabetes", "dm", "t2dm", "t1dm"]),
    (
        "gastroesophageal reflux disease",
        &["gerd", "acid reflux", "reflux", "heartburn"],
    ),
    (
        "chronic obstructive pulmonary disease",
        &["copd", "emphysema", "chronic bronchitis"],
    ),
    ("pneumonia", &["lung infection", "chest infection"]),
    ("urinary tract infection", &["uti", "bladder infection", "cystitis"]),
    ("deep vein thrombosis", &["dvt", "leg clot"]),
    ("pulmonary embolism", &["pe", "lung clot"]),
    ("migraine", &["migraine headache", "sick headache"]),
    ("appendicitis", &["inflamed appendix"]),
    ("cholecystitis", &["gallbladder inflammation", "gallbladder attack"]),
    ("atrial fibrillation", &["afib", "af", "a fib"]),
    (
        "congestive heart failure",
        &["heart failure", "chf", "cardiac failure"],
    ),
    ("asthma", &["reactive airway disease", "bronchial asthma"]),
    ("transient ischemic attack", &["tia", "mini stroke", "ministroke"]),
    ("subarachnoid hemorrhage", &["sah", "brain bleed"]),
    ("peptic ulcer disease", &["stomach ulcer", "gastric ulcer", "pud"]),
];

impl SynonymTable {
    /// The default table of common diagnoses.
    pub fn builtin() -> Self {
        Self::from_groups(
            BUILTIN
                .iter()
                .map(|(canonical, synonyms)| (*canonical, synonyms.iter().copied())),
        )
    }

    /// Build a table from `(canonical, synonyms)` pairs. Terms that tokenize
    /// to nothing are ignored.
    pub fn from_groups<C, I, S>(groups: impl IntoIterator<Item = (C, I)>) -> Self
    where
        C: AsRef<str>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let groups = groups
            .into_iter()
            .map(|(canonical, synonyms)| {
                let canonical = canonical.as_ref().trim().to_lowercase();
                let terms = std::iter::once(tokenize(&canonical))
                    .chain(synonyms.into_iter().map(|s| tokenize(s.as_ref())))
                    .filter(|t| !t.is_empty())
                    .collect();
                SynonymGroup { canonical, terms }
            })
            .filter(|g| !g.canonical.is_empty())
            .collect();
        Self { groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Canonical name of the first group `text` names a term of.
    pub fn canonical_for(&self, text: &str) -> Option<&str> {
        let tokens = tokenize(text);
        self.groups
            .iter()
            .find(|g| g.matches(&tokens))
            .map(|g| g.canonical.as_str())
    }

    /// The best group score between the two diagnoses, `0.0` when no group
    /// relates them.
    pub fn similarity(&self, user: &str, correct: &str) -> f64 {
        let user_tokens = tokenize(user);
        let correct_tokens = tokenize(correct);
        let user_raw = user.to_lowercase();
        let correct_raw = correct.to_lowercase();

        self.groups
            .iter()
            .map(|group| {
                let in_user = group.matches(&user_tokens);
                let in_correct = group.matches(&correct_tokens);
                if in_user && in_correct {
                    GROUP_MATCH
                } else if (in_user && correct_raw.contains(&group.canonical))
                    || (in_correct && user_raw.contains(&group.canonical))
                {
                    CANONICAL_MENTION
                } else {
                    0.0
                }
            })
            .fold(0.0, f64::max)
    }
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::builtin()
    }
}
