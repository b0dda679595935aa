//! Shared fixtures for unit tests.

use crate::checker::tokenize;
use crate::diagnose::{Context, ErrorMap, Stage};
use crate::error::Result;
use crate::lexicon::{Lexicon, LexiconBundle};
use crate::offsets::token_offsets;
use crate::tagger::{tag_tokens, Token};
use crate::validity::{Validator, WordCache};

/// A handful of everyday and register words, plus a few deliberate near-misses.
pub fn sample_lexicon() -> Lexicon {
    let mut b = LexiconBundle::default();
    b.add_word("ខ្ញុំ", &["សព្វនាម"], 2500.0)
        .add_word("ញ៉ាំ", &["កិរិយាសព្ទ"], 350.0)
        .add_word("បាយ", &["នាម"], 300.0)
        .add_word("ទៅ", &["កិរិយាសព្ទ"], 4000.0)
        .add_word("សាលារៀន", &["នាម"], 150.0)
        .add_word("សាលារេន", &["នាម"], 0.2)
        .add_word("គឺជា", &["កិរិយាសព្ទ"], 800.0)
        .add_word("គឺជារ", &["កិរិយាសព្ទ"], 2.0)
        .add_word("ស្ដេច", &["នាម"], 40.0)
        .add_word("ឈឺ", &["កិរិយាសព្ទ"], 120.0)
        .add_word("ដៃ", &["នាម"], 250.0)
        .add_word("សោយ", &["កិរិយាសព្ទ"], 5.0)
        .add_word("ពិសា", &["កិរិយាសព្ទ"], 30.0)
        .add_word("ឆាន់", &["កិរិយាសព្ទ"], 8.0)
        .add_word("មិន", &["កិរិយាវិសេសន៍"], 1500.0)
        .add_bigram("ញ៉ាំ", "បាយ", 60);
    Lexicon::from_bundle(b)
}

pub fn tagged(lexicon: &Lexicon, tokens: &[&str]) -> Vec<Token> {
    let cache = WordCache::default();
    tag_tokens(tokens, &Validator::new(lexicon, &cache))
}

/// A text run through the real front half of the pipeline.
pub struct Fixture<'a> {
    original: String,
    tokens: Vec<Token>,
    offsets: Vec<Option<usize>>,
    validator: Validator<'a>,
}

impl Fixture<'_> {
    pub fn context(&self) -> Context<'_> {
        Context {
            tokens: &self.tokens,
            validator: self.validator,
            original: &self.original,
            offsets: &self.offsets,
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.text.clone()).collect()
    }
}

pub fn context_for<'a>(lexicon: &'a Lexicon, cache: &'a WordCache, text: &str) -> Fixture<'a> {
    let validator = Validator::new(lexicon, cache);
    let words = tokenize(text, &validator);
    Fixture {
        original: text.to_string(),
        tokens: tag_tokens(&words, &validator),
        offsets: token_offsets(text, &words),
        validator,
    }
}

/// Run one auxiliary rule over pre-split tokens and return what it staged.
pub fn run_stage(
    lexicon: &Lexicon,
    tokens: &[&str],
    prior: &ErrorMap,
    rule: fn(&Context<'_>, &mut Stage<'_>) -> Result<()>,
) -> ErrorMap {
    let cache = WordCache::default();
    let validator = Validator::new(lexicon, &cache);
    let tagged = tag_tokens(tokens, &validator);
    let offsets = vec![None; tagged.len()];
    let original = tokens.concat();
    let ctx = Context {
        tokens: &tagged,
        validator,
        original: &original,
        offsets: &offsets,
    };
    let mut stage = Stage::new(prior);
    rule(&ctx, &mut stage).unwrap();
    stage.into_staged()
}
