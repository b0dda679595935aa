//! Per-token spelling checks and the orthography rules.

use std::collections::HashMap;

use lazy_static::lazy_static;
use tracing::debug;

use super::{Context, ErrorMap, ErrorRecord, Stage};
use crate::candidates::TYPO_OVERRIDE_SCORE;
use crate::error::Result;
use crate::script::{char_len, clean_token, is_consonant, is_series_a, is_series_b, BANTOC, MUUSIKATOAN, TRIISAP};
use crate::similarity::{close_matches, close_words};
use crate::tables::{typo_fix, HONORIFICS, WHITELIST};

/// Confidence of an unranked out-of-vocabulary record.
pub const OOV_CONFIDENCE: f64 = 0.8;
const OOV_SEEDS: usize = 3;
const OOV_SEED_CUTOFF: f64 = 0.70;

const TRUNCATED_CONFIDENCE: f64 = 0.95;

const RARE_FREQ: f64 = 1.0;
const RARE_NEIGHBOURS: usize = 5;
const RARE_CUTOFF: f64 = 0.75;
const RARE_MAX_LEN_DIFF: usize = 2;
const COMMON_FREQ: f64 = 50.0;
const COMMON_RATIO: f64 = 50.0;

const TRAILING_RA_RATIO: f64 = 10.0;

const MARK_CONFIDENCE: f64 = 0.99;
const BANTOC_CONFIDENCE: f64 = 0.70;

lazy_static! {
    /// Words typed without their last syllable part.
    static ref TRUNCATED: HashMap<&'static str, &'static str> = [
        ("ការងា", "ការងារ"),
        ("ជីវភា", "ជីវភាព"),
        ("សកម្មភា", "សកម្មភាព"),
        ("សុខុមាលភា", "សុខុមាលភាព"),
        ("មោទនភា", "មោទនភាព"),
        ("ឯករាជ្យភា", "ឯករាជ្យភាព"),
        ("សេរីភា", "សេរីភាព"),
        ("សមភា", "សមភាព"),
        ("តម្លាភា", "តម្លាភាព"),
        ("គណនេយ្យភា", "គណនេយ្យភាព"),
        ("វិបុលភា", "វិបុលភាព"),
        ("ស្ថិរភា", "ស្ថិរភាព"),
        ("បរិស្ថា", "បរិស្ថាន"),
        ("ជនពិកា", "ជនពិការ"),
        ("កិច្ចសន្យ", "កិច្ចសន្យា"),
        ("សក្ខីកម", "សក្ខីកម្ម"),
        ("ឧស្សាហកម", "ឧស្សាហកម្ម"),
        ("ងា", "ងារ"),
        ("ពិកា", "ពិការ"),
    ]
    .into_iter()
    .collect();
}

/// Token indices the ranking pass still has to fill in.
#[derive(Debug, Default)]
pub(crate) struct Slots {
    pub rare: Vec<usize>,
    pub oov: Vec<usize>,
}

enum Rare {
    Fix(ErrorRecord),
    Pending,
}

pub(crate) fn check(ctx: &Context<'_>, errors: &mut ErrorMap) -> Result<Slots> {
    let lexicon = ctx.lexicon();
    let mut slots = Slots::default();

    for (i, tok) in ctx.tokens.iter().enumerate() {
        if !tok.is_word() {
            continue;
        }
        let word = clean_token(&tok.text);
        if word.is_empty() {
            continue;
        }

        if let Some(fix) = typo_fix(&word) {
            errors.insert(i, ErrorRecord::spelling(&tok.text, [fix], TYPO_OVERRIDE_SCORE).locked());
            continue;
        }
        if WHITELIST.contains(word.as_str()) {
            continue;
        }
        if let Some(full) = TRUNCATED.get(word.as_str()) {
            errors.insert(i, ErrorRecord::spelling(&tok.text, [*full], TRUNCATED_CONFIDENCE));
            continue;
        }

        if tok.in_dict {
            // Compounds carry no frequency of their own.
            if !lexicon.contains(&tok.text) {
                continue;
            }
            match rare_confusion(ctx, &word) {
                Some(Rare::Fix(record)) => {
                    errors.insert(i, record);
                    continue;
                }
                Some(Rare::Pending) => {
                    debug!(word = %word, "rare word shadowed by a common neighbour");
                    slots.rare.push(i);
                    continue;
                }
                None => {}
            }
        }

        if let Some(stem) = trailing_ra(ctx, &word) {
            errors.insert(i, ErrorRecord::spelling(&tok.text, [stem], 0.85));
            continue;
        }

        if word.contains("ជីរ") {
            let corrected = word.replace("ជីរ", "ចីរ");
            if lexicon.contains(&corrected) {
                errors.insert(i, ErrorRecord::spelling(&tok.text, [corrected], 0.90));
            }
            continue;
        }

        // A title two tokens back usually introduces a personal name.
        let after_title = (1..=2).any(|back| i >= back && HONORIFICS.contains(ctx.text(i - back)));
        if after_title || tok.in_dict {
            continue;
        }

        let seeds = close_words(&word, lexicon.words(), OOV_SEEDS, OOV_SEED_CUTOFF);
        if errors.insert(i, ErrorRecord::spelling(&tok.text, seeds, OOV_CONFIDENCE)) {
            slots.oov.push(i);
        }
    }
    Ok(slots)
}

/// A rare dictionary word that looks like a much more frequent one.
fn rare_confusion(ctx: &Context<'_>, word: &str) -> Option<Rare> {
    let lexicon = ctx.lexicon();
    let freq = lexicon.freq(word);
    if freq >= RARE_FREQ {
        return None;
    }
    let len = char_len(word);
    let floor = freq.max(0.01);
    let shadowed = close_matches(word, lexicon.words(), RARE_NEIGHBOURS, RARE_CUTOFF)
        .into_iter()
        .filter(|(m, _)| *m != word && char_len(m).abs_diff(len) <= RARE_MAX_LEN_DIFF)
        .any(|(m, _)| {
            let common = lexicon.freq(m);
            common > COMMON_FREQ && common / floor > COMMON_RATIO
        });
    if !shadowed {
        return None;
    }

    // Two fused words whose second half lost a mark.
    if word.contains("ដ៏") && !word.contains("ដល់") {
        return Some(Rare::Fix(ErrorRecord::spelling(word, [word.replace("ដ៏", "ដល់")], 0.85)));
    }
    if word.ends_with("ណាស") {
        return Some(Rare::Fix(ErrorRecord::spelling(word, [word.replace("ណាស", "ណាស់")], 0.90)));
    }
    Some(Rare::Pending)
}

/// The word minus a stray final `រ`, when that stem is far more common.
fn trailing_ra(ctx: &Context<'_>, word: &str) -> Option<String> {
    if char_len(word) <= 2 {
        return None;
    }
    let stem = word.strip_suffix('រ')?;
    let lexicon = ctx.lexicon();
    (lexicon.contains(stem) && lexicon.freq(stem) > lexicon.freq(word) * TRAILING_RA_RATIO).then(|| stem.to_string())
}

/// Register-shifter marks on the wrong consonant series, and a bantoc in
/// the middle of an unknown word.
pub(crate) fn orthography(ctx: &Context<'_>, stage: &mut Stage<'_>) -> Result<()> {
    for (i, tok) in ctx.tokens.iter().enumerate() {
        if !tok.is_content() {
            continue;
        }
        let word = tok.text.as_str();
        if char_len(word) > 1 {
            if let Some(fixed) = misplaced_shifter(word) {
                stage.insert(i, ErrorRecord::spelling(word, [fixed], MARK_CONFIDENCE));
            }
        }
        if !tok.in_dict && bantoc_before_consonant(word) {
            stage.insert(i, ErrorRecord::spelling(word, Vec::<String>::new(), BANTOC_CONFIDENCE));
        }
    }
    Ok(())
}

/// Triisap on a series-B consonant, or Muusikatoan on series A other than ប.
fn misplaced_shifter(word: &str) -> Option<String> {
    let chars: Vec<char> = word.chars().collect();
    for pair in chars.windows(2) {
        let (base, mark) = (pair[0], pair[1]);
        if mark == TRIISAP && is_series_b(base) {
            return Some(word.replace(TRIISAP, ""));
        }
        if mark == MUUSIKATOAN && is_series_a(base) && base != 'ប' {
            return Some(word.replace(MUUSIKATOAN, ""));
        }
    }
    None
}

fn bantoc_before_consonant(word: &str) -> bool {
    let chars: Vec<char> = word.chars().collect();
    chars.windows(2).any(|p| p[0] == BANTOC && is_consonant(p[1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use crate::diagnose::ErrorType;
    use crate::lexicon::{Lexicon, LexiconBundle};
    use crate::tagger::tag_tokens;
    use crate::test_utils::{context_for, sample_lexicon};
    use crate::validity::{Validator, WordCache};

    fn spelling_errors(text: &str) -> (Vec<String>, ErrorMap, Slots) {
        let lex = sample_lexicon();
        let cache = WordCache::default();
        let fixture = context_for(&lex, &cache, text);
        let mut errors = ErrorMap::new();
        let slots = check(&fixture.context(), &mut errors).unwrap();
        (fixture.texts(), errors, slots)
    }

    /// Spelling records for tokens that are already split.
    fn spelling_on(lex: &Lexicon, tokens: &[&str]) -> ErrorMap {
        let cache = WordCache::default();
        let validator = Validator::new(lex, &cache);
        let tagged = tag_tokens(tokens, &validator);
        let offsets = vec![None; tagged.len()];
        let original = tokens.concat();
        let ctx = Context {
            tokens: &tagged,
            validator,
            original: &original,
            offsets: &offsets,
        };
        let mut errors = ErrorMap::new();
        check(&ctx, &mut errors).unwrap();
        errors
    }

    fn index_of(tokens: &[String], text: &str) -> usize {
        tokens.iter().position(|t| t == text).unwrap()
    }

    #[test]
    fn test_typo_forced() {
        let (tokens, errors, _) = spelling_errors("ខ្ញុំ អោយ បាយ");
        let rec = errors.get(index_of(&tokens, "អោយ")).unwrap();
        assert_eq!(rec.suggestions, vec!["ឱ្យ"]);
        assert_eq!(rec.confidence, 2.0);
    }

    #[test]
    fn test_whitelisted_and_known_words_pass() {
        let (_, errors, slots) = spelling_errors("ខ្ញុំ ទៅ ភ្នំពេញ");
        assert!(errors.is_empty());
        assert!(slots.oov.is_empty());
    }

    #[test]
    fn test_truncated_word() {
        let (tokens, errors, _) = spelling_errors("ការងា");
        let rec = errors.get(index_of(&tokens, "ការងា")).unwrap();
        assert_eq!(rec.top_suggestion(), Some("ការងារ"));
        assert_eq!(rec.confidence, 0.95);
    }

    #[test]
    fn test_rare_word_pending() {
        // Listed with a tiny frequency, one vowel away from a very common word.
        let (tokens, errors, slots) = spelling_errors("សាលារេន");
        let idx = index_of(&tokens, "សាលារេន");
        assert!(!errors.contains(idx));
        assert_eq!(slots.rare, vec![idx]);
    }

    #[rstest]
    #[case::reach_lost_its_final("ការងារដ៏", "ការងារដល់", 0.85)]
    #[case::very_lost_its_bantoc("ល្អណាស", "ល្អណាស់", 0.90)]
    fn test_rare_fused_word_repaired(#[case] rare: &str, #[case] common: &str, #[case] confidence: f64) {
        let mut b = LexiconBundle::default();
        b.add_word(rare, &[], 0.3).add_word(common, &[], 900.0);
        let lex = Lexicon::from_bundle(b);
        let errors = spelling_on(&lex, &[rare]);
        let rec = errors.get(0).unwrap();
        assert_eq!(rec.suggestions, vec![common]);
        assert_eq!(rec.confidence, confidence);
        assert_eq!(rec.error_type, ErrorType::Spelling);
    }

    #[test]
    fn test_rare_fused_word_without_common_neighbour() {
        let mut b = LexiconBundle::default();
        b.add_word("ល្អណាស", &[], 0.3).add_word("ល្អណាស់", &[], 20.0);
        let lex = Lexicon::from_bundle(b);
        assert!(spelling_on(&lex, &["ល្អណាស"]).is_empty());
    }

    #[test]
    fn test_ji_ra_swapped_for_chi_ra() {
        let mut b = LexiconBundle::default();
        b.add_word("ចីរភាព", &["នាម"], 40.0);
        let lex = Lexicon::from_bundle(b);
        let rec = spelling_on(&lex, &["ជីរភាព"]).get(0).cloned().unwrap();
        assert_eq!(rec.suggestions, vec!["ចីរភាព"]);
        assert_eq!(rec.confidence, 0.90);

        // No record at all when the swapped spelling is not a word either.
        assert!(spelling_on(&lex, &["ជីរវង"]).is_empty());
    }

    #[test]
    fn test_trailing_ra() {
        let (tokens, errors, _) = spelling_errors("គឺជារ");
        let rec = errors.get(index_of(&tokens, "គឺជារ")).unwrap();
        assert_eq!(rec.top_suggestion(), Some("គឺជា"));
        assert_eq!(rec.error_type, ErrorType::Spelling);
    }

    #[test]
    fn test_name_after_title_exempt() {
        let (tokens, errors, _) = spelling_errors("លោក ឃ្វាង");
        assert!(!errors.contains(index_of(&tokens, "ឃ្វាង")));
    }

    #[test]
    fn test_oov_seeded() {
        let (tokens, errors, slots) = spelling_errors("ខ្ញុំ ឃ្វាង");
        let idx = index_of(&tokens, "ឃ្វាង");
        assert_eq!(errors.get(idx).map(|r| r.confidence), Some(OOV_CONFIDENCE));
        assert_eq!(slots.oov, vec![idx]);
    }

    #[test]
    fn test_shifter_marks() {
        assert_eq!(misplaced_shifter("ម៊ី"), Some("មី".to_string()));
        assert_eq!(misplaced_shifter("ក៉ា"), Some("កា".to_string()));
        assert_eq!(misplaced_shifter("ប៉ុន"), None);
        assert_eq!(misplaced_shifter("ស៊ី"), None);
        assert_eq!(misplaced_shifter("ម៉ោង"), None);
    }

    #[test]
    fn test_bantoc_position() {
        assert!(bantoc_before_consonant("កាត់ក"));
        assert!(!bantoc_before_consonant("កាត់"));
    }
}
