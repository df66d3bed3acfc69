//! String similarity primitives used to compare imprints.
//!
//! Lengths and character sets are measured in `char`s so that multi-byte
//! imprints (e.g. `"½"`) count as a single character.

use std::collections::HashSet;

/// Convert a character count to f64 for ratio calculations
#[inline]
fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Levenshtein edit distance between two strings.
///
/// Minimum number of single-character insertions, deletions, or
/// substitutions needed to turn `a` into `b`. Uses a two-row table so memory
/// is O(len(b)).
#[must_use]
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0usize; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Twice the number of distinct characters shared by `a` and `b`.
///
/// Repeated characters count once: `"AAB"` and `"AB"` share `{A, B}`, giving 4.
#[must_use]
pub fn shared_char_count(a: &str, b: &str) -> usize {
    let a_set: HashSet<char> = a.chars().collect();
    let b_set: HashSet<char> = b.chars().collect();
    2 * a_set.intersection(&b_set).count()
}

/// Combined character length of both strings
#[must_use]
pub fn combined_len(a: &str, b: &str) -> usize {
    a.chars().count() + b.chars().count()
}

/// Edit-distance similarity: `1 - d / (len(a) + len(b))`.
///
/// Two empty strings are a perfect match (1.0). The result is not clamped at
/// zero.
#[must_use]
pub fn edit_similarity(a: &str, b: &str) -> f64 {
    let total = combined_len(a, b);
    let distance = levenshtein(a, b);
    ratio_or_vacuous(total, distance, |d, l| 1.0 - d / l)
}

/// Overlap similarity: `2 * |distinct(a) ∩ distinct(b)| / (len(a) + len(b))`.
///
/// Two empty strings are a perfect match (1.0).
#[must_use]
pub fn overlap_similarity(a: &str, b: &str) -> f64 {
    let total = combined_len(a, b);
    let overlap = shared_char_count(a, b);
    ratio_or_vacuous(total, overlap, |o, l| o / l)
}

/// Apply the shared degenerate-case policy for both similarities.
///
/// `total == 0 && measure == 0` is the vacuous empty/empty match. A zero total
/// with a non-zero measure cannot happen for real strings and maps to 0.0.
fn ratio_or_vacuous(total: usize, measure: usize, ratio: impl Fn(f64, f64) -> f64) -> f64 {
    if total == 0 && measure == 0 {
        1.0
    } else if total != 0 {
        ratio(count_to_f64(measure), count_to_f64(total))
    } else {
        0.0
    }
}
