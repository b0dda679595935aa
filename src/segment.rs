//! Viterbi word-boundary inference.
//!
//! `best[i]` holds the cheapest way to cover the first `i` characters and the
//! length of the last token on that path. Every position can always advance
//! by one character (the skip edge), so the table is fully reachable and the
//! backtrack emits a gap-free cover of the input.

use crate::lexicon::Lexicon;
use crate::script::{is_bare_consonant, is_khmer, is_khmer_or_symbol, LEXICALIZED_SINGLE};

/// Longest dictionary candidate considered, in characters.
pub const MAX_WORD_LEN: usize = 25;

/// Cost of leaving a Khmer character unsegmented.
const UNKNOWN_KHMER_COST: f64 = 3.0;

/// Extra cost on single-character dictionary words.
const SINGLE_CHAR_PENALTY: f64 = 5.0;

const BASE_WORD_COST: f64 = 6.0;
const MIN_FREQ: f64 = 0.01;

fn word_cost(lexicon: &Lexicon, word: &str, char_len: usize) -> f64 {
    let cost = BASE_WORD_COST - lexicon.freq(word).max(MIN_FREQ).log10();
    if char_len == 1 {
        cost + SINGLE_CHAR_PENALTY
    } else {
        cost
    }
}

fn skip_cost(c: char) -> f64 {
    if is_khmer_or_symbol(c) {
        UNKNOWN_KHMER_COST
    } else {
        0.0
    }
}

/// Split normalized text into a sequence of substrings covering it exactly.
pub fn viterbi_segment<'t>(text: &'t str, lexicon: &Lexicon) -> Vec<&'t str> {
    // bounds[i] is the byte offset of character i; bounds[n] == text.len().
    let mut bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    bounds.push(text.len());
    let chars: Vec<char> = text.chars().collect();
    let n = chars.len();

    let mut best: Vec<(f64, usize)> = vec![(f64::INFINITY, 0); n + 1];
    best[0] = (0.0, 0);

    for i in 0..n {
        let (base, _) = best[i];
        if !base.is_finite() {
            continue;
        }

        let skip = base + skip_cost(chars[i]);
        if skip < best[i + 1].0 {
            best[i + 1] = (skip, 1);
        }

        if !is_khmer(chars[i]) {
            continue;
        }
        for j in (i + 1)..=(i + MAX_WORD_LEN).min(n) {
            let candidate = &text[bounds[i]..bounds[j]];
            if !lexicon.contains(candidate) {
                continue;
            }
            let len = j - i;
            if len == 1 && is_bare_consonant(candidate) && candidate != LEXICALIZED_SINGLE {
                continue;
            }
            let total = base + word_cost(lexicon, candidate, len);
            if total < best[j].0 {
                best[j] = (total, len);
            }
        }
    }

    let mut tokens = Vec::new();
    let mut end = n;
    while end > 0 {
        // A zero length cannot be stored on a reachable path; step one char if it ever is.
        let len = best[end].1.clamp(1, end);
        let start = end - len;
        tokens.push(&text[bounds[start]..bounds[end]]);
        end = start;
    }
    tokens.reverse();
    tokens
}
