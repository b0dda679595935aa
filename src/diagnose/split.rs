//! Split-boundary reconstruction: two word tokens that should be one word.

use tracing::debug;

use super::{Context, ErrorMap, ErrorRecord};
use crate::error::Result;
use crate::script::char_len;
use crate::similarity::{close_words, ratio};
use crate::tables::{is_typo, STOPWORDS, SUSPICIOUS_BIGRAMS};
use crate::tagger::TokenKind;

const MIN_CONCAT_CHARS: usize = 4;
const MERGE_CONFIDENCE: f64 = 1.0;
const FUZZY_CONFIDENCE: f64 = 0.95;

const STRICT_CUTOFF: f64 = 0.92;
const SHORT_CUTOFF: f64 = 0.70;
const LONG_CUTOFF: f64 = 0.85;
const SHORT_CONCAT_CHARS: usize = 5;

/// A stop-word member this close to the suggestion means the merge just deletes it.
const STOPWORD_ECHO: f64 = 0.8;

pub(crate) fn check(ctx: &Context<'_>, errors: &mut ErrorMap) -> Result<()> {
    let lexicon = ctx.lexicon();
    let mut i = 0;
    while i < ctx.len() {
        let t1 = ctx.token(i)?;
        if !t1.is_word() {
            i += 1;
            continue;
        }

        // Only whitespace may sit between the two words.
        let mut j = i + 1;
        let mut sep = String::new();
        while let Some(tn) = ctx.tokens.get(j) {
            if tn.is_word() || tn.kind == TokenKind::Punct || !tn.text.trim().is_empty() {
                break;
            }
            sep.push_str(&tn.text);
            j += 1;
        }
        let Some(t2) = ctx.tokens.get(j).filter(|t| t.is_word()) else {
            i += 1;
            continue;
        };

        let (w1, w2) = (t1.text.as_str(), t2.text.as_str());
        let concat = format!("{w1}{w2}");
        let span = j - i + 1;
        let original = format!("{w1}{sep}{w2}");
        if char_len(&concat) < MIN_CONCAT_CHARS || is_typo(w1) || is_typo(w2) {
            i += 1;
            continue;
        }

        let phrase = format!("{w1} {w2}");
        if let Some(fix) = SUSPICIOUS_BIGRAMS.get(phrase.as_str()).filter(|fix| !fix.contains(' ')) {
            debug!(%phrase, fix, "forced merge");
            merge(errors, i, ErrorRecord::spelling(&original, [*fix], MERGE_CONFIDENCE).with_span(span));
            i = j + 1;
            continue;
        }

        if t1.in_dict && t2.in_dict && !sep.is_empty() {
            i += 1;
            continue;
        }
        if lexicon.bigram_score(w1, w2) > 0 && !is_typo(&concat) {
            i += 1;
            continue;
        }

        if lexicon.contains(&concat) {
            if concat != w1 && concat != w2 {
                // Without a separator the members already read as the merged
                // word, so the record names the first member and spans both.
                let shown = if sep.is_empty() { w1 } else { original.as_str() };
                debug!(%concat, "members join into a dictionary word");
                merge(errors, i, ErrorRecord::spelling(shown, [concat.as_str()], MERGE_CONFIDENCE).with_span(span));
            }
            i = j + 1;
            continue;
        }

        let mut matches = close_words(&concat, lexicon.words(), 1, STRICT_CUTOFF);
        if matches.is_empty() {
            let cutoff = if char_len(&concat) <= SHORT_CONCAT_CHARS {
                SHORT_CUTOFF
            } else {
                LONG_CUTOFF
            };
            matches = close_words(&concat, lexicon.words(), 1, cutoff);
        }
        if let Some(suggestion) = matches.first() {
            if fuzzy_merge_allowed(suggestion, &concat, t1.in_dict && t2.in_dict, w1, w2) {
                debug!(%concat, %suggestion, "fuzzy boundary merge");
                merge(errors, i, ErrorRecord::spelling(&original, matches.clone(), FUZZY_CONFIDENCE).with_span(span));
            }
        }
        i += 1;
    }
    Ok(())
}

fn fuzzy_merge_allowed(suggestion: &str, concat: &str, both_known: bool, w1: &str, w2: &str) -> bool {
    if suggestion == w1 || suggestion == w2 {
        return false;
    }
    if both_known && suggestion != concat {
        return false;
    }
    if STOPWORDS.contains(w1) && ratio(suggestion, w2) > STOPWORD_ECHO {
        return false;
    }
    if STOPWORDS.contains(w2) && ratio(suggestion, w1) > STOPWORD_ECHO {
        return false;
    }
    true
}

fn merge(errors: &mut ErrorMap, idx: usize, record: ErrorRecord) {
    if errors.insert(idx, record) {
        errors.absorb(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::{Lexicon, LexiconBundle};
    use crate::tagger::{tag_tokens, Token};
    use crate::validity::{Validator, WordCache};

    fn lexicon() -> Lexicon {
        let mut b = LexiconBundle::default();
        b.add_word("សាលា", &["នាម"], 200.0)
            .add_word("រៀន", &["កិរិយាសព្ទ"], 300.0)
            .add_word("សាលារៀន", &["នាម"], 150.0)
            .add_word("ប្រទេស", &["នាម"], 400.0)
            .add_word("កម្ពុជា", &["នាម"], 300.0)
            .add_word("ទៅ", &["កិរិយាសព្ទ"], 4000.0)
            .add_word("ផ្សារ", &["នាម"], 250.0)
            .add_bigram("ទៅ", "ផ្សារ", 90);
        Lexicon::from_bundle(b)
    }

    fn run(tokens: &[&str]) -> ErrorMap {
        let lex = lexicon();
        let cache = WordCache::default();
        let validator = Validator::new(&lex, &cache);
        let tagged: Vec<Token> = tag_tokens(tokens, &validator);
        let offsets = vec![None; tagged.len()];
        let ctx = Context {
            tokens: &tagged,
            validator,
            original: "",
            offsets: &offsets,
        };
        let mut errors = ErrorMap::new();
        check(&ctx, &mut errors).unwrap();
        errors
    }

    #[test]
    fn test_suspicious_phrase_forces_merge() {
        let errors = run(&["ប្រ", " ", "ទេស"]);
        let rec = errors.get(0).unwrap();
        assert_eq!(rec.original, "ប្រ ទេស");
        assert_eq!(rec.suggestions, vec!["ប្រទេស"]);
        assert_eq!(rec.confidence, 1.0);
        assert_eq!(rec.span, 3);
    }

    #[test]
    fn test_known_pair_with_space_is_left_alone() {
        let errors = run(&["សាលា", " ", "រៀន"]);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_adjacent_unknowns_join_into_word() {
        let errors = run(&["សាលារ", "ៀន"]);
        let rec = errors.get(0).unwrap();
        assert_eq!(rec.suggestions, vec!["សាលារៀន"]);
        assert_eq!(rec.confidence, 1.0);
        assert_eq!(rec.span, 2);
        assert_ne!(rec.top_suggestion(), Some(rec.original.as_str()));
    }

    #[test]
    fn test_frequent_bigram_is_intentional() {
        let errors = run(&["ទៅ", "ផ្សារ"]);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_fuzzy_merge() {
        // One letter short of "កម្ពុជា" once joined.
        let errors = run(&["កម្ពុ", " ", "ជ"]);
        let rec = errors.get(0).unwrap();
        assert_eq!(rec.suggestions, vec!["កម្ពុជា"]);
        assert_eq!(rec.confidence, 0.95);
        assert_eq!(rec.span, 3);
    }

    #[test]
    fn test_punctuation_blocks_pairing() {
        let errors = run(&["សាលារ", "។", "ៀន"]);
        assert!(errors.is_empty());
    }
}
