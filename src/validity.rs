//! Word validity: strict dictionary words, known words and compounds.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

use lru::LruCache;

use crate::lexicon::Lexicon;
use crate::script::{clean_token, is_bare_consonant, is_bare_dependent, LEXICALIZED_SINGLE};
use crate::similarity::close_matches;
use crate::tables::{is_typo, BANNED_WORDS, SAFE_PREFIXES};

/// Dictionary entries that are segmentation debris rather than words.
const DISALLOWED: [&str; 4] = ["ន៏", "ហ៏", "គម", "រ"];

/// Words at least this long accept any two-way split without a fuzzy check.
const LONG_COMPOUND_CHARS: usize = 9;

/// A split whose whole is this close to a real word is treated as a typo of it.
const COMPOUND_TYPO_CUTOFF: f64 = 0.85;

/// Bounded memo tables for the validity predicates.
#[derive(Debug)]
pub struct WordCache {
    strict: Mutex<LruCache<String, bool>>,
    known: Mutex<LruCache<String, bool>>,
}

impl WordCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            strict: Mutex::new(LruCache::new(cap)),
            known: Mutex::new(LruCache::new(cap)),
        }
    }

    pub fn clear(&self) {
        lock(&self.strict).clear();
        lock(&self.known).clear();
    }
}

impl Default for WordCache {
    fn default() -> Self {
        Self::new(4096)
    }
}

// Cached values are pure functions of the key, so a poisoned lock is still usable.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn memoized(cache: &Mutex<LruCache<String, bool>>, key: &str, compute: impl FnOnce() -> bool) -> bool {
    if let Some(hit) = lock(cache).get(key) {
        return *hit;
    }
    let value = compute();
    lock(cache).put(key.to_string(), value);
    value
}

/// Validity predicates over one lexicon.
#[derive(Clone, Copy)]
pub struct Validator<'a> {
    lexicon: &'a Lexicon,
    cache: &'a WordCache,
}

impl<'a> Validator<'a> {
    pub fn new(lexicon: &'a Lexicon, cache: &'a WordCache) -> Self {
        Self { lexicon, cache }
    }

    pub fn lexicon(&self) -> &'a Lexicon {
        self.lexicon
    }

    /// In the word set and not a junk form: bare consonant, bare mark,
    /// listed debris or banned word.
    pub fn is_strict_word(&self, token: &str) -> bool {
        memoized(&self.cache.strict, token, || strict_word(self.lexicon, token))
    }

    /// A strict word or a valid compound. Listed typos are never known.
    pub fn is_known(&self, token: &str) -> bool {
        if is_typo(token) {
            return false;
        }
        memoized(&self.cache.known, token, || {
            self.is_strict_word(token) || self.is_valid_compound(token)
        })
    }

    /// Strict word, or two strict halves.
    fn splits_into_words(&self, text: &str) -> bool {
        self.is_strict_word(text) || self.first_split(text).is_some()
    }

    /// First char boundary splitting `text` into two strict words.
    fn first_split(&self, text: &str) -> Option<usize> {
        text.char_indices()
            .skip(1)
            .map(|(i, _)| i)
            .find(|&i| self.is_strict_word(&text[..i]) && self.is_strict_word(&text[i..]))
    }

    /// Decomposable into known pieces, directly or after a grammatical prefix.
    pub fn is_valid_compound(&self, word: &str) -> bool {
        for prefix in SAFE_PREFIXES.iter() {
            if let Some(stem) = word.strip_prefix(prefix) {
                if !stem.is_empty() && self.splits_into_words(stem) {
                    return true;
                }
            }
        }
        if self.first_split(word).is_none() {
            return false;
        }
        if word.chars().count() >= LONG_COMPOUND_CHARS {
            return true;
        }
        close_matches(word, self.lexicon.words(), 1, COMPOUND_TYPO_CUTOFF).is_empty()
    }
}

fn strict_word(lexicon: &Lexicon, token: &str) -> bool {
    let token = clean_token(token);
    if token == "ៗ" {
        return true;
    }
    if !lexicon.contains(&token) {
        return false;
    }
    if (is_bare_consonant(&token) && token != LEXICALIZED_SINGLE) || is_bare_dependent(&token) {
        return false;
    }
    !DISALLOWED.contains(&token.as_str()) && !BANNED_WORDS.contains(token.as_str())
}
