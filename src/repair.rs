//! Token repair passes run between segmentation and tagging.
//!
//! The segmenter breaks misspelled words into dictionary fragments plus
//! stray characters. These passes glue such fragments back together so the
//! diagnosis engine sees one unit per intended word.

use tracing::debug;

use crate::script::{char_len, is_dependent, is_digit_run, is_letter_sequence, COENG};
use crate::similarity::close_matches;
use crate::tables::{is_typo, STOPWORDS};
use crate::validity::Validator;

const WINDOW_SIZES: [usize; 3] = [4, 3, 2];

const MERGE_CUTOFF: f64 = 0.85;
const SHORT_MERGE_CUTOFF: f64 = 0.70;
/// Concatenations up to this many characters use the relaxed cutoff.
const SHORT_CONCAT_CHARS: usize = 5;
const MAX_LEN_DIFF: usize = 2;

/// Run all repair passes in order.
pub fn repair_tokens<S: AsRef<str>>(tokens: &[S], validator: &Validator<'_>) -> Vec<String> {
    let glued = glue_fragments(tokens, validator);
    let merged = merge_near_words(&glued, validator);
    merge_digit_runs(&merged)
}

/// Pass 1: glue unknown fragments, dependent-mark continuations and
/// dangling subscript joiners onto the previous token.
pub fn glue_fragments<S: AsRef<str>>(tokens: &[S], validator: &Validator<'_>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tokens.len());
    for token in tokens {
        let token = token.as_ref();
        if let Some(prev) = out.last_mut() {
            if should_glue(prev, token, validator) {
                prev.push_str(token);
                continue;
            }
        }
        out.push(token.to_string());
    }
    out
}

fn should_glue(prev: &str, cur: &str, validator: &Validator<'_>) -> bool {
    if !is_letter_sequence(prev) || !is_letter_sequence(cur) {
        return false;
    }
    let both_unknown = !is_typo(prev)
        && !is_typo(cur)
        && !validator.is_known(prev)
        && !validator.is_known(cur);
    let dependent_start = cur.chars().next().is_some_and(is_dependent);
    both_unknown || dependent_start || prev.ends_with(COENG)
}

/// Pass 2: merge windows of 4 down to 2 tokens whose concatenation is a
/// listed typo or close to a dictionary word.
pub fn merge_near_words(tokens: &[String], validator: &Validator<'_>) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    'outer: while i < tokens.len() {
        for size in WINDOW_SIZES {
            let Some(window) = tokens.get(i..i + size) else {
                continue;
            };
            if window_merges(window, validator) {
                out.push(window.concat());
                i += size;
                continue 'outer;
            }
        }
        out.push(tokens[i].clone());
        i += 1;
    }
    out
}

fn window_merges(window: &[String], validator: &Validator<'_>) -> bool {
    let concat = window.concat();
    if is_typo(&concat) {
        debug!(%concat, "merging window into known typo");
        return true;
    }
    if window.iter().any(|t| is_typo(t)) {
        return false;
    }
    if window.iter().all(|t| validator.is_known(t)) {
        return false;
    }
    if !window.iter().all(|t| is_letter_sequence(t)) {
        return false;
    }

    let Some(first) = concat.chars().next() else {
        return false;
    };
    let concat_len = char_len(&concat);
    let cutoff = if concat_len <= SHORT_CONCAT_CHARS {
        SHORT_MERGE_CUTOFF
    } else {
        MERGE_CUTOFF
    };
    let bucket = validator.lexicon().words_starting_with(first);
    let Some(&(matched, _)) = close_matches(&concat, bucket.iter().map(String::as_str), 1, cutoff).first()
    else {
        return false;
    };

    // Matching one of the members while the rest are fine is a no-op merge.
    if let Some(pos) = window.iter().position(|t| t == matched) {
        let rest_known = window
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != pos)
            .all(|(_, t)| validator.is_known(t));
        if rest_known {
            return false;
        }
    }

    let exact = matched == concat;
    if !exact {
        if window.iter().any(|t| STOPWORDS.contains(t.as_str())) {
            return false;
        }
        if window.iter().any(|t| char_len(t) > 2 && validator.is_known(t)) {
            return false;
        }
    }

    let accepted = char_len(matched).abs_diff(concat_len) <= MAX_LEN_DIFF;
    if accepted {
        debug!(%concat, matched, "merging split fragments");
    }
    accepted
}

/// Pass 3: join adjacent digit runs.
pub fn merge_digit_runs(tokens: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let Some(prev) = out.last_mut() {
            if is_digit_run(prev) && is_digit_run(token) {
                prev.push_str(token);
                continue;
            }
        }
        out.push(token.clone());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::{Lexicon, LexiconBundle};
    use crate::validity::WordCache;

    fn lexicon() -> Lexicon {
        let mut b = LexiconBundle::default();
        b.add_word("លោក", &["នាម"], 900.0)
            .add_word("ទៅ", &["កិរិយាសព្ទ"], 4000.0)
            .add_word("សាលា", &["នាម"], 200.0)
            .add_word("លក", &[], 5.0)
            .add_word("ស្រុក", &["នាម"], 300.0);
        Lexicon::from_bundle(b)
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_glue_unknown_fragments() {
        let lex = lexicon();
        let cache = WordCache::default();
        let v = Validator::new(&lex, &cache);
        let out = glue_fragments(&["ឃ", "ញ", "ឈ", " ", "ទៅ"], &v);
        assert_eq!(out, strings(&["ឃញឈ", " ", "ទៅ"]));
    }

    #[test]
    fn test_glue_dependent_and_coeng() {
        let lex = lexicon();
        let cache = WordCache::default();
        let v = Validator::new(&lex, &cache);
        assert_eq!(glue_fragments(&["ទៅ", "ា"], &v), strings(&["ទៅា"]));
        assert_eq!(glue_fragments(&["ស្", "រុក"], &v), strings(&["ស្រុក"]));
    }

    #[test]
    fn test_glue_never_crosses_punctuation() {
        let lex = lexicon();
        let cache = WordCache::default();
        let v = Validator::new(&lex, &cache);
        assert_eq!(glue_fragments(&["ឃ", "។", "ញ"], &v), strings(&["ឃ", "។", "ញ"]));
    }

    #[test]
    fn test_fuzzy_window_merge() {
        let lex = lexicon();
        let cache = WordCache::default();
        let v = Validator::new(&lex, &cache);
        // "លោ" is unknown; "លោ" + "លក" is one edit from "លោក".
        let out = merge_near_words(&strings(&["លោ", "លក", " ", "ទៅ"]), &v);
        assert_eq!(out, strings(&["លោលក", " ", "ទៅ"]));
    }

    #[test]
    fn test_typo_window_merge() {
        let lex = lexicon();
        let cache = WordCache::default();
        let v = Validator::new(&lex, &cache);
        let out = merge_near_words(&strings(&["អោ", "យ"]), &v);
        assert_eq!(out, strings(&["អោយ"]));
    }

    #[test]
    fn test_known_windows_untouched() {
        let lex = lexicon();
        let cache = WordCache::default();
        let v = Validator::new(&lex, &cache);
        let tokens = strings(&["លោក", "ទៅ", "សាលា"]);
        assert_eq!(merge_near_words(&tokens, &v), tokens);
    }

    #[test]
    fn test_digit_runs() {
        let out = merge_digit_runs(&strings(&["១", "២", " ", "3", "4", "ក"]));
        assert_eq!(out, strings(&["១២", " ", "34", "ក"]));
    }
}
