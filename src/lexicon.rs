//! Lexicon store: word membership, part of speech, frequency and bigrams.
//!
//! The statistical tables come from a bincode bundle built offline. Loading
//! merges the curated override tables on top, after which the lexicon is
//! immutable and shared by reference between checks.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, SpellError};
use crate::script::coeng_variants;
use crate::tables::{
    BANNED_WORDS, COMMON_NAMES, COMMON_TYPOS, FREQ_BOOSTS, HONORIFICS, MANUAL_BIGRAMS,
    PATCH_WORDS, PRONOUNS, SUSPICIOUS_BIGRAMS, TECHNICAL_TERMS, WHITELIST,
};

/// Global lexicon instance (loaded once, reused)
static LEXICON: OnceLock<Arc<Lexicon>> = OnceLock::new();

/// Segmentation artifact that leaks out of the frequency table.
const GARBAGE_ENTRY: &str = "ដលោក";

/// Score given to phrases listed as always-legitimate splits.
pub const MANUAL_BIGRAM_SCORE: u64 = 1000;

/// On-disk form of the lexicon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LexiconBundle {
    pub word_set: HashSet<String>,
    /// Raw dictionary part-of-speech labels.
    pub word_to_pos: HashMap<String, Vec<String>>,
    /// Instances per million.
    pub word_freq_ipm: HashMap<String, f64>,
    pub max_ipm: f64,
    /// `"w1 w2"` to co-occurrence count.
    pub bigrams: HashMap<String, u64>,
    pub bigram_context_fwd: HashMap<String, Vec<(String, u64)>>,
    pub bigram_context_bwd: HashMap<String, Vec<(String, u64)>>,
}

impl LexiconBundle {
    /// Read a bundle, telling a missing file apart from a corrupt one.
    pub fn read_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SpellError::BundleNotFound(path.to_path_buf()));
        }
        let reader = BufReader::new(File::open(path)?);
        bincode::deserialize_from(reader).map_err(|source| SpellError::BundleCorrupt {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the bundle next to its destination, then rename into place.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let staging = path.with_extension("partial");
        {
            let writer = BufWriter::new(File::create(&staging)?);
            bincode::serialize_into(writer, self).map_err(|source| SpellError::BundleCorrupt {
                path: staging.clone(),
                source,
            })?;
        }
        fs::rename(&staging, path)?;
        Ok(())
    }

    /// Insert or overwrite a word entry.
    pub fn add_word(&mut self, word: &str, pos: &[&str], ipm: f64) -> &mut Self {
        self.word_set.insert(word.to_string());
        if !pos.is_empty() {
            self.word_to_pos
                .insert(word.to_string(), pos.iter().map(|p| p.to_string()).collect());
        }
        self.word_freq_ipm.insert(word.to_string(), ipm);
        if ipm > self.max_ipm {
            self.max_ipm = ipm;
        }
        self
    }

    /// Record a bigram and keep both continuation lists sorted by count.
    pub fn add_bigram(&mut self, first: &str, second: &str, count: u64) -> &mut Self {
        self.bigrams.insert(format!("{first} {second}"), count);
        push_context(&mut self.bigram_context_fwd, first, second, count);
        push_context(&mut self.bigram_context_bwd, second, first, count);
        self
    }
}

fn push_context(table: &mut HashMap<String, Vec<(String, u64)>>, key: &str, neighbor: &str, count: u64) {
    let list = table.entry(key.to_string()).or_default();
    list.retain(|(w, _)| w != neighbor);
    list.push((neighbor.to_string(), count));
    list.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
}

/// Read-only lexicon shared by every check.
#[derive(Debug)]
pub struct Lexicon {
    words: HashSet<String>,
    pos: HashMap<String, Vec<String>>,
    freq: HashMap<String, f64>,
    max_ipm: f64,
    bigrams: HashMap<String, u64>,
    fwd: HashMap<String, Vec<(String, u64)>>,
    bwd: HashMap<String, Vec<(String, u64)>>,
    by_start: HashMap<char, Vec<String>>,
    sorted: Vec<String>,
}

impl Lexicon {
    /// Load and finalize a bundle from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let bundle = LexiconBundle::read_from(path)?;
        let lexicon = Self::from_bundle(bundle);
        info!(path = %path.display(), "{}", lexicon.stats());
        Ok(lexicon)
    }

    /// Merge the override tables into a bundle and build the lookup indexes.
    pub fn from_bundle(bundle: LexiconBundle) -> Self {
        let LexiconBundle {
            word_set: mut words,
            word_to_pos: pos,
            word_freq_ipm: mut freq,
            max_ipm,
            bigrams,
            bigram_context_fwd: fwd,
            bigram_context_bwd: bwd,
        } = bundle;

        for table in [&*COMMON_NAMES, &*PRONOUNS, &*HONORIFICS, &*TECHNICAL_TERMS, &*WHITELIST] {
            words.extend(table.iter().map(|w| w.to_string()));
        }
        words.remove(GARBAGE_ENTRY);
        for typo in COMMON_TYPOS.keys() {
            if !WHITELIST.contains(typo) {
                words.remove(*typo);
            }
        }
        for (word, ipm) in PATCH_WORDS.iter() {
            words.insert(word.to_string());
            let entry = freq.entry(word.to_string()).or_insert(0.0);
            *entry = entry.max(*ipm);
        }
        // Boosts pin the frequency, even below the corpus figure.
        for (word, ipm) in FREQ_BOOSTS.iter() {
            freq.insert(word.to_string(), *ipm);
        }

        let variants: Vec<(String, String)> = words
            .iter()
            .flat_map(|w| coeng_variants(w).into_iter().map(move |v| (w.clone(), v)))
            .collect();
        for (word, variant) in variants {
            if let Some(ipm) = freq.get(&word).copied() {
                freq.entry(variant.clone()).or_insert(ipm);
            }
            words.insert(variant);
        }

        for banned in BANNED_WORDS.iter() {
            words.remove(*banned);
        }

        let max_ipm = freq.values().copied().fold(max_ipm, f64::max);

        let mut sorted: Vec<String> = words.iter().cloned().collect();
        sorted.sort();
        let mut by_start: HashMap<char, Vec<String>> = HashMap::new();
        for word in &sorted {
            if let Some(first) = word.chars().next() {
                by_start.entry(first).or_default().push(word.clone());
            }
        }
        debug!(words = sorted.len(), starts = by_start.len(), "lexicon indexes built");

        Self {
            words,
            pos,
            freq,
            max_ipm,
            bigrams,
            fwd,
            bwd,
            by_start,
            sorted,
        }
    }

    #[inline]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Frequency in instances per million, 0.0 when unknown.
    pub fn freq(&self, word: &str) -> f64 {
        self.freq.get(word).copied().unwrap_or(0.0)
    }

    pub fn max_ipm(&self) -> f64 {
        self.max_ipm
    }

    /// Raw dictionary labels for a word.
    pub fn raw_pos(&self, word: &str) -> &[String] {
        self.pos.get(word).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn bigram_count(&self, first: &str, second: &str) -> u64 {
        self.bigrams
            .get(&format!("{first} {second}"))
            .copied()
            .unwrap_or(0)
    }

    /// Bigram evidence with the curated overrides applied: always-legitimate
    /// pairs score high, always-wrong pairs score zero.
    pub fn bigram_score(&self, first: &str, second: &str) -> u64 {
        let phrase = format!("{first} {second}");
        if MANUAL_BIGRAMS.contains(phrase.as_str()) {
            return MANUAL_BIGRAM_SCORE;
        }
        if SUSPICIOUS_BIGRAMS.contains_key(phrase.as_str()) {
            return 0;
        }
        self.bigrams.get(&phrase).copied().unwrap_or(0)
    }

    /// Words seen after `word`, most frequent first.
    pub fn continuations(&self, word: &str) -> &[(String, u64)] {
        self.fwd.get(word).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Words seen before `word`, most frequent first.
    pub fn predecessors(&self, word: &str) -> &[(String, u64)] {
        self.bwd.get(word).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All words, sorted.
    pub fn words(&self) -> impl Iterator<Item = &str> + '_ {
        self.sorted.iter().map(String::as_str)
    }

    pub fn words_starting_with(&self, first: char) -> &[String] {
        self.by_start.get(&first).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn stats(&self) -> String {
        format!(
            "Lexicon loaded: words={}, tagged={}, bigrams={}, max_ipm={:.1}",
            self.words.len(),
            self.pos.len(),
            self.bigrams.len(),
            self.max_ipm
        )
    }
}

/// Load the process-wide lexicon. Later calls return the first instance.
pub fn init_global_lexicon(path: &Path) -> Result<Arc<Lexicon>> {
    if let Some(existing) = LEXICON.get() {
        debug!("lexicon already initialized");
        return Ok(Arc::clone(existing));
    }
    let lexicon = Arc::new(Lexicon::load(path)?);
    match LEXICON.set(Arc::clone(&lexicon)) {
        Ok(()) => Ok(lexicon),
        // Another thread won the race; use its copy.
        Err(_) => LEXICON.get().cloned().ok_or(SpellError::LexiconNotInitialized),
    }
}

pub fn global_lexicon() -> Option<Arc<Lexicon>> {
    LEXICON.get().cloned()
}

pub fn lexicon_loaded() -> bool {
    LEXICON.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle() -> LexiconBundle {
        let mut b = LexiconBundle::default();
        b.add_word("ស្ដេច", &["នាម"], 40.0)
            .add_word("បាយ", &["នាម"], 300.0)
            .add_word("អោយ", &["កិរិយាសព្ទ"], 90.0)
            .add_word("ដលោក", &[], 5.0)
            .add_word("សាលារៀន", &["នាម"], 3.0)
            .add_word("អាឆ្កួត", &[], 1.0)
            .add_bigram("ញ៉ាំ", "បាយ", 50)
            .add_bigram("ស៊ី", "បាយ", 20);
        b
    }

    #[test]
    fn test_init_mutations() {
        let lex = Lexicon::from_bundle(bundle());
        assert!(lex.contains("ស្ដេច"));
        assert!(lex.contains("ស្តេច"), "coeng variant added");
        assert_eq!(lex.freq("ស្តេច"), 40.0);
        assert!(!lex.contains("អោយ"), "typo removed");
        assert!(!lex.contains("ដលោក"));
        assert!(!lex.contains("អាឆ្កួត"), "banned removed");
        assert!(lex.contains("ភ្នំពេញ"), "whitelist merged");
        assert!(lex.contains("ខ្ញុំ"), "pronouns merged");
        assert_eq!(lex.freq("សាលារៀន"), 500.0, "boosted");
        assert!(lex.freq("ញ៉ាំ") > 0.0, "patch word has frequency");
    }

    #[test]
    fn test_indexes() {
        let lex = Lexicon::from_bundle(bundle());
        assert!(lex.words_starting_with('ប').iter().any(|w| w == "បាយ"));
        let words: Vec<&str> = lex.words().collect();
        assert!(words.windows(2).all(|w| w[0] <= w[1]));
        assert!(lex.max_ipm() >= 500.0);
        assert!(lex.words().all(|w| lex.freq(w) <= lex.max_ipm()));
    }

    #[test]
    fn test_boost_pins_frequency() {
        let mut b = LexiconBundle::default();
        b.add_word("សាលារៀន", &["នាម"], 900.0);
        let lex = Lexicon::from_bundle(b);
        assert_eq!(lex.freq("សាលារៀន"), 500.0);
    }

    #[test]
    fn test_mixed_coeng_word_gets_both_spellings() {
        let mixed = "ក\u{17D2}\u{178A}ា\u{17D2}\u{178F}";
        let mut b = LexiconBundle::default();
        b.add_word(mixed, &[], 3.0);
        let lex = Lexicon::from_bundle(b);
        assert!(lex.contains("ក\u{17D2}\u{178F}ា\u{17D2}\u{178F}"), "all-Ta spelling");
        assert!(lex.contains("ក\u{17D2}\u{178A}ា\u{17D2}\u{178A}"), "all-Da spelling");
        assert_eq!(lex.freq("ក\u{17D2}\u{178A}ា\u{17D2}\u{178A}"), 3.0);
    }

    #[test]
    fn test_bigrams_and_overrides() {
        let lex = Lexicon::from_bundle(bundle());
        assert_eq!(lex.bigram_count("ញ៉ាំ", "បាយ"), 50);
        assert_eq!(lex.bigram_score("ទៅ", "ផ្សារ"), MANUAL_BIGRAM_SCORE);
        assert_eq!(lex.bigram_score("សា", "លា"), 0);
        assert_eq!(lex.predecessors("បាយ")[0].0, "ញ៉ាំ");
        assert_eq!(lex.continuations("ស៊ី"), &[("បាយ".to_string(), 20)]);
    }

    #[test]
    fn test_missing_bundle_is_distinct_error() {
        let err = Lexicon::load(Path::new("no/such/bundle.bin")).unwrap_err();
        assert!(matches!(err, SpellError::BundleNotFound(_)));
    }
}
