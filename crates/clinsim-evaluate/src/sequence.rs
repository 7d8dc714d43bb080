//! Ratcliff/Obershelp ("gestalt") string similarity.
//!
//! The longest common block is found first, then the same search runs on
//! the text to its left and to its right. The ratio is `2M / T` where `M` is
//! the total matched length and `T` the combined length of both inputs.

/// Similarity of `a` and `b` in `[0, 1]`. Two empty strings are identical.
pub fn gestalt_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    2.0 * matched_chars(&a, &b) as f64 / total as f64
}

fn matched_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }

    matched
}

/// Longest block `a[i..i+k] == b[j..j+k]` inside the given windows.
///
/// Among equally long blocks the one starting earliest in `a` wins, then
/// earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    // run[j + 1] = length of the common run ending at a[i], b[j]
    let mut prev = vec![0usize; bhi + 1];
    let mut run = vec![0usize; bhi + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            run[j + 1] = if a[i] == b[j] { prev[j] + 1 } else { 0 };
            if run[j + 1] > best_k {
                best_k = run[j + 1];
                best_i = i + 1 - best_k;
                best_j = j + 1 - best_k;
            }
        }
        std::mem::swap(&mut prev, &mut run);
    }

    (best_i, best_j, best_k)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn identical_and_empty() {
        assert_eq!(gestalt_ratio("migraine", "migraine"), 1.0);
        assert_eq!(gestalt_ratio("", ""), 1.0);
        assert_eq!(gestalt_ratio("migraine", ""), 0.0);
    }

    #[test]
    fn disjoint_is_zero() {
        assert_eq!(gestalt_ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn known_ratios() {
        // "abcd" vs "bcde": block "bcd", 2*3/8
        assert!(close(gestalt_ratio("abcd", "bcde"), 0.75));
        // "the flu" vs "appendicitis": one 't', 2*1/19
        assert!(close(gestalt_ratio("the flu", "appendicitis"), 2.0 / 19.0));
    }

    #[test]
    fn recurses_on_both_sides() {
        // blocks "pne", "umonia": everything except the inserted 'x'
        assert!(close(gestalt_ratio("pneumonia", "pnexumonia"), 18.0 / 19.0));
    }

    #[test]
    fn symmetric_for_simple_inputs() {
        let ab = gestalt_ratio("asthma", "bronchial asthma");
        let ba = gestalt_ratio("bronchial asthma", "asthma");
        assert!(close(ab, ba));
        assert!(close(ab, 12.0 / 22.0));
    }
}
