//! String similarity and nearest-word lookup.

use std::cmp::Ordering;

use strsim::normalized_levenshtein;

use crate::script::char_len;

/// Similarity in `[0, 1]`, 1.0 for identical strings.
#[inline]
pub fn ratio(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b)
}

/// Up to `n` candidates scoring at least `cutoff` against `word`, best first.
///
/// Ties are broken lexicographically so results do not depend on the
/// iteration order of the candidate source.
pub fn close_matches<'a, I>(word: &str, candidates: I, n: usize, cutoff: f64) -> Vec<(&'a str, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    if n == 0 {
        return Vec::new();
    }
    let len = char_len(word);
    let mut scored: Vec<(&'a str, f64)> = candidates
        .into_iter()
        .filter(|cand| length_can_reach(len, char_len(cand), cutoff))
        .filter_map(|cand| {
            let score = ratio(word, cand);
            (score >= cutoff).then_some((cand, score))
        })
        .collect();
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    scored.truncate(n);
    scored
}

/// Convenience wrapper returning only the matched words.
pub fn close_words<'a, I>(word: &str, candidates: I, n: usize, cutoff: f64) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    close_matches(word, candidates, n, cutoff)
        .into_iter()
        .map(|(w, _)| w.to_string())
        .collect()
}

// The edit distance is at least the length difference, so a candidate whose
// length alone pushes the ratio under the cutoff can be skipped.
fn length_can_reach(a: usize, b: usize, cutoff: f64) -> bool {
    let longest = a.max(b);
    if longest == 0 {
        return true;
    }
    let best = 1.0 - a.abs_diff(b) as f64 / longest as f64;
    best + 1e-9 >= cutoff
}
