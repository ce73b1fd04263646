//! Normalized string similarity used by fuzzy matching.
//!
//! The ratio is `(|a| + |b| - d) / (|a| + |b|)` where `d` is the edit
//! distance with insertions and deletions costing 1 and substitutions 2.
//! Identical strings score 1.0 and strings with no characters in common
//! score 0.0.

/// Insertion/deletion edit distance (substitution counts as delete + insert).
fn indel_distance(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + if ca == cb { 0 } else { 2 };
            let deletion = prev[j + 1] + 1;
            let insertion = curr[j] + 1;
            curr[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Similarity ratio in `[0.0, 1.0]`, comparing the strings as given.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let distance = indel_distance(&a, &b);
    (total - distance) as f64 / total as f64
}

/// Case-folded similarity ratio.
#[must_use]
pub fn folded_ratio(a: &str, b: &str) -> f64 {
    ratio(&a.to_lowercase(), &b.to_lowercase())
}
