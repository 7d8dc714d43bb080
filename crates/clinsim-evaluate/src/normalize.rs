//! Text normalization shared by the three similarity signals.

/// Qualifiers that describe a diagnosis without changing what it is.
pub const STOPWORDS: [&str; 13] = [
    "acute",
    "chronic",
    "mild",
    "moderate",
    "severe",
    "primary",
    "secondary",
    "syndrome",
    "disease",
    "disorder",
    "condition",
    "episode",
    "attack",
];

/// Lowercase, strip punctuation and split on whitespace. No words are
/// dropped; "Crohn's" stays one word.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// [`tokenize`] with [`STOPWORDS`] removed.
///
/// A text made only of stopwords ("acute attack") keeps its tokens, so it
/// still compares as something rather than as the empty string.
pub fn normalize(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    let filtered: Vec<String> = tokens
        .iter()
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
        .cloned()
        .collect();

    if filtered.is_empty() {
        tokens
    } else {
        filtered
    }
}

/// Whether `needle` occurs as a contiguous run inside `haystack`.
pub fn contains_run(haystack: &[String], needle: &[String]) -> bool {
    !needle.is_empty()
        && needle.len() <= haystack.len()
        && haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_qualifiers() {
        assert_eq!(normalize("Acute Migraine Headache"), vec!["migraine", "headache"]);
    }

    #[test]
    fn punctuation_is_stripped() {
        assert_eq!(tokenize("Crohn's disease."), vec!["crohns", "disease"]);
        assert_eq!(normalize("A-fib (paroxysmal)"), vec!["afib", "paroxysmal"]);
        assert_eq!(tokenize("Pneumonia,\tright  lobe"), vec!["pneumonia", "right", "lobe"]);
    }

    #[test]
    fn only_stopwords_keeps_tokens() {
        assert_eq!(normalize("Severe attack"), vec!["severe", "attack"]);
    }

    #[test]
    fn blank_text_is_empty() {
        assert!(normalize("   ").is_empty());
        assert!(normalize("?!").is_empty());
    }

    #[test]
    fn runs_must_be_contiguous() {
        let hay = tokenize("congestive heart failure");
        assert!(contains_run(&hay, &tokenize("heart failure")));
        assert!(!contains_run(&hay, &tokenize("congestive failure")));
        assert!(!contains_run(&hay, &[]));
    }
}
