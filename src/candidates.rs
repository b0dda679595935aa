//! Correction candidates for unknown tokens and their contextual ranking.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use crate::lexicon::Lexicon;
use crate::similarity::close_matches;
use crate::tables::{typo_fix, BANNED_WORDS};
use crate::tagger::{normalize_pos, PosTag, Token};

pub const DEFAULT_MAX_CANDIDATES: usize = 8;
pub const DEFAULT_CUTOFF: f64 = 0.6;
pub const DEFAULT_CONCAT_CUTOFF: f64 = 0.8;

/// Similarity assigned to the word left after dropping a stray final character.
const TRAILING_DROP_SCORE: f64 = 0.99;

/// Score of a candidate taken from the typo map, above any blended score.
pub const TYPO_OVERRIDE_SCORE: f64 = 2.0;

const ALPHA: f64 = 0.5;
const BETA: f64 = 0.15;
const GAMMA: f64 = 0.35;

/// Neutral POS score when the left context sets no expectation.
const NO_EXPECTATION: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub word: String,
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub word: String,
    pub score: f64,
}

/// Typo-map correction, fuzzy matches and a trailing-character drop.
pub fn generate_candidates(word: &str, lexicon: &Lexicon, max_candidates: usize, cutoff: f64) -> Vec<Candidate> {
    let mut out = Vec::new();
    if let Some(fix) = typo_fix(word) {
        push_unique(&mut out, fix, 1.0);
    }
    for (w, score) in close_matches(word, lexicon.words(), max_candidates, cutoff) {
        push_unique(&mut out, w, score);
    }
    let mut chars = word.chars();
    if chars.next_back().is_some() {
        let shorter = chars.as_str();
        if !shorter.is_empty() && lexicon.contains(shorter) {
            push_unique(&mut out, shorter, TRAILING_DROP_SCORE);
        }
    }
    out.retain(|c| is_suggestible(&c.word));
    out
}

/// Fuzzy matches for two adjacent unknown tokens read as one word.
pub fn generate_concat_candidates(
    left: &str,
    right: &str,
    lexicon: &Lexicon,
    max_candidates: usize,
    cutoff: f64,
) -> Vec<Candidate> {
    let concat = format!("{left}{right}");
    close_matches(&concat, lexicon.words(), max_candidates, cutoff)
        .into_iter()
        .filter(|(w, _)| is_suggestible(w))
        .map(|(w, similarity)| Candidate {
            word: w.to_string(),
            similarity,
        })
        .collect()
}

fn push_unique(out: &mut Vec<Candidate>, word: &str, similarity: f64) {
    match out.iter_mut().find(|c| c.word == word) {
        Some(existing) => existing.similarity = existing.similarity.max(similarity),
        None => out.push(Candidate {
            word: word.to_string(),
            similarity,
        }),
    }
}

fn is_suggestible(word: &str) -> bool {
    !word.contains([' ', '\u{200B}', '\u{00A0}']) && !BANNED_WORDS.contains(word)
}

/// Tags expected at `idx` given the nearest non-space token on its left.
pub fn infer_expected_pos(tokens: &[Token], idx: usize) -> BTreeSet<PosTag> {
    let left = tokens[..idx.min(tokens.len())]
        .iter()
        .rev()
        .find(|t| !t.text.trim().is_empty());
    let mut expected = BTreeSet::new();
    let Some(left) = left else {
        return expected;
    };
    use PosTag::*;
    for (tag, follows) in [
        (Pron, &[Verb, Adv][..]),
        (Prep, &[Noun, Pron][..]),
        (Noun, &[Adj, Verb, Prep][..]),
        (Verb, &[Noun, Pron, Adv, Verb, Prep][..]),
        (Adj, &[Adv][..]),
        (Adv, &[Verb, Adj][..]),
    ] {
        if left.has_pos(tag) {
            expected.extend(follows.iter().copied());
        }
    }
    expected
}

fn pos_score(word: &str, expected: &BTreeSet<PosTag>, lexicon: &Lexicon) -> f64 {
    if expected.is_empty() {
        return NO_EXPECTATION;
    }
    let tags = normalize_pos(lexicon.raw_pos(word));
    if tags.is_disjoint(expected) { 0.0 } else { 1.0 }
}

fn freq_score(word: &str, lexicon: &Lexicon) -> f64 {
    if lexicon.max_ipm() <= 0.0 {
        return 0.0;
    }
    (lexicon.freq(word) / lexicon.max_ipm()).min(1.0)
}

/// Blend similarity, POS fit and frequency, best first.
pub fn rerank_candidates(candidates: &[Candidate], tokens: &[Token], idx: usize, lexicon: &Lexicon) -> Vec<RankedCandidate> {
    let expected = infer_expected_pos(tokens, idx);
    let typo_target = tokens.get(idx).and_then(|t| typo_fix(&t.text));
    let mut ranked: Vec<RankedCandidate> = candidates
        .iter()
        .map(|c| {
            let score = if typo_target == Some(c.word.as_str()) {
                TYPO_OVERRIDE_SCORE
            } else {
                (ALPHA * c.similarity
                    + BETA * pos_score(&c.word, &expected, lexicon)
                    + GAMMA * freq_score(&c.word, lexicon))
                    / (ALPHA + BETA + GAMMA)
            };
            RankedCandidate {
                word: c.word.clone(),
                score,
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked
}

/// Bounded memo of [`generate_candidates`] keyed by token text.
#[derive(Debug)]
pub struct CandidateCache {
    inner: Mutex<LruCache<String, Vec<Candidate>>>,
}

impl CandidateCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(cap)),
        }
    }

    pub fn get_or_generate(&self, word: &str, lexicon: &Lexicon, max_candidates: usize, cutoff: f64) -> Vec<Candidate> {
        let mut cache = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(hit) = cache.get(word) {
            return hit.clone();
        }
        let generated = generate_candidates(word, lexicon, max_candidates, cutoff);
        cache.put(word.to_string(), generated.clone());
        generated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_lexicon, tagged};

    #[test]
    fn test_typo_and_trailing_drop() {
        let lex = sample_lexicon();
        let cands = generate_candidates("អោយ", &lex, 8, 0.6);
        assert_eq!(cands[0].word, "ឱ្យ");

        let cands = generate_candidates("បាយក", &lex, 8, 0.6);
        let drop = cands.iter().find(|c| c.word == "បាយ").map(|c| c.similarity);
        assert_eq!(drop, Some(0.99));
    }

    #[test]
    fn test_no_spaces_or_banned() {
        let lex = sample_lexicon();
        for c in generate_candidates("អាឆ្កួ", &lex, 8, 0.3) {
            assert!(!c.word.contains(' '));
            assert!(!BANNED_WORDS.contains(c.word.as_str()));
        }
    }

    #[test]
    fn test_expected_pos_skips_spaces() {
        let lex = sample_lexicon();
        let tokens = tagged(&lex, &["ខ្ញុំ", " ", "ញុំា"]);
        let expected = infer_expected_pos(&tokens, 2);
        assert!(expected.contains(&PosTag::Verb));
        assert!(infer_expected_pos(&tokens, 0).is_empty());
    }

    #[test]
    fn test_rerank_prefers_typo_map_then_context() {
        let lex = sample_lexicon();
        let tokens = tagged(&lex, &["ខ្ញុំ", " ", "ញុំា"]);
        let cands = vec![
            Candidate { word: "ញ៉ាំ".into(), similarity: 0.5 },
            Candidate { word: "បាយ".into(), similarity: 0.9 },
        ];
        let ranked = rerank_candidates(&cands, &tokens, 2, &lex);
        assert_eq!(ranked[0].word, "ញ៉ាំ");
        assert_eq!(ranked[0].score, TYPO_OVERRIDE_SCORE);
        assert!(ranked[1].score <= 1.0);
    }

    #[test]
    fn test_concat_candidates() {
        let lex = sample_lexicon();
        let cands = generate_concat_candidates("សាលា", "រៀ", &lex, 8, 0.8);
        assert!(cands.iter().any(|c| c.word == "សាលារៀន"));
    }

    #[test]
    fn test_cache_returns_same_result() {
        let lex = sample_lexicon();
        let cache = CandidateCache::new(4);
        let first = cache.get_or_generate("បាយក", &lex, 8, 0.6);
        assert_eq!(cache.get_or_generate("បាយក", &lex, 8, 0.6), first);
    }
}
