//! The end-to-end check: pipeline, ranking pass and result assembly.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

use rayon::prelude::*;
use serde::{Serialize, Serializer};
use tracing::{debug, error};

use crate::candidates::{generate_concat_candidates, rerank_candidates, Candidate, CandidateCache};
use crate::config::CheckerConfig;
use crate::diagnose::{diagnose, Context, Diagnosis, ErrorMap, ErrorRecord, ErrorType};
use crate::error::{Result, SpellError};
use crate::lexicon::{global_lexicon, Lexicon};
use crate::normalize::normalize_text;
use crate::offsets::token_offsets;
use crate::repair::repair_tokens;
use crate::segment::viterbi_segment;
use crate::similarity::ratio;
use crate::tables::WHITELIST;
use crate::tagger::tag_tokens;
use crate::validity::{Validator, WordCache};

/// Contextual flags on these words are known false positives.
const CONTEXTUAL_EXCEPTIONS: [&str; 2] = ["ស្រូវ", "តម្រូវ"];

/// Result of one check, shaped for the JSON boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub tokens: Vec<String>,
    /// Byte offset of each token in the input; `-1` when unresolved.
    #[serde(serialize_with = "offsets_with_sentinel")]
    pub token_offsets: Vec<Option<usize>>,
    pub errors: ErrorMap,
}

fn offsets_with_sentinel<S: Serializer>(offsets: &[Option<usize>], s: S) -> std::result::Result<S::Ok, S::Error> {
    s.collect_seq(offsets.iter().map(|o| o.map_or(-1, |v| v as i64)))
}

impl CheckOutcome {
    fn success(tokens: Vec<String>, token_offsets: Vec<Option<usize>>, errors: ErrorMap) -> Self {
        Self {
            success: true,
            error: None,
            tokens,
            token_offsets,
            errors,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            tokens: Vec::new(),
            token_offsets: Vec::new(),
            errors: ErrorMap::new(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Normalize, segment and repair.
pub(crate) fn tokenize(text: &str, validator: &Validator<'_>) -> Vec<String> {
    let normalized = normalize_text(text);
    let segmented = viterbi_segment(&normalized, validator.lexicon());
    repair_tokens(&segmented, validator)
}

/// A checker over one shared lexicon, with its own bounded memo caches.
pub struct SpellChecker {
    lexicon: Arc<Lexicon>,
    config: CheckerConfig,
    words: WordCache,
    candidates: CandidateCache,
}

impl SpellChecker {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self::with_config(lexicon, CheckerConfig::default())
    }

    pub fn with_config(lexicon: Arc<Lexicon>, config: CheckerConfig) -> Self {
        Self {
            words: WordCache::new(config.cache_capacity),
            candidates: CandidateCache::new(config.candidate_cache_capacity),
            lexicon,
            config,
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Final token sequence for `text`, before tagging.
    pub fn segment(&self, text: &str) -> Vec<String> {
        tokenize(text, &self.validator())
    }

    /// Check one string. Failures, panics included, come back as a
    /// `success: false` outcome.
    pub fn check(&self, text: &str) -> CheckOutcome {
        match panic::catch_unwind(AssertUnwindSafe(|| self.try_check(text))) {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                error!(error = %e, "check failed");
                CheckOutcome::failure(e.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload);
                error!(%message, "check panicked");
                CheckOutcome::failure(message)
            }
        }
    }

    /// Check many strings in parallel; outcomes keep the input order.
    pub fn check_batch<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Vec<CheckOutcome> {
        texts.par_iter().map(|t| self.check(t.as_ref())).collect()
    }

    pub fn try_check(&self, text: &str) -> Result<CheckOutcome> {
        let validator = self.validator();
        let tokens = tokenize(text, &validator);
        let tagged = tag_tokens(&tokens, &validator);
        let offsets = token_offsets(text, &tokens);
        let ctx = Context {
            tokens: &tagged,
            validator,
            original: text,
            offsets: &offsets,
        };

        let Diagnosis { mut errors, rare, oov } = diagnose(&ctx)?;
        self.rank_oov(&ctx, &mut errors, &oov);
        self.rank_rare(&ctx, &mut errors, &rare);
        self.boundary_concats(&ctx, &mut errors);
        suppress_whitelisted(&mut errors);
        drop_self_suggestions(&mut errors);

        debug!(tokens = tokens.len(), errors = errors.len(), "check complete");
        Ok(CheckOutcome::success(tokens, offsets, errors))
    }

    fn validator(&self) -> Validator<'_> {
        Validator::new(&self.lexicon, &self.words)
    }

    fn ranked_words(&self, ctx: &Context<'_>, idx: usize, candidates: &[Candidate]) -> (Vec<String>, f64) {
        let ranked = rerank_candidates(candidates, ctx.tokens, idx, ctx.lexicon());
        let top = ranked.first().map_or(0.0, |r| r.score);
        let words = ranked
            .into_iter()
            .take(self.config.max_suggestions)
            .map(|r| r.word)
            .collect();
        (words, top)
    }

    /// Reorder the seeded suggestions of out-of-vocabulary tokens in context.
    /// The record keeps its confidence.
    fn rank_oov(&self, ctx: &Context<'_>, errors: &mut ErrorMap, oov: &[usize]) {
        for &i in oov {
            let Some(record) = errors.get(i) else {
                continue;
            };
            let word = ctx.text(i);
            let mut candidates = self.candidate_list(word);
            for seed in &record.suggestions {
                if !candidates.iter().any(|c| &c.word == seed) {
                    candidates.push(Candidate {
                        word: seed.clone(),
                        similarity: ratio(word, seed),
                    });
                }
            }
            let (suggestions, _) = self.ranked_words(ctx, i, &candidates);
            let mut record = record.clone();
            record.suggestions = suggestions;
            errors.replace(i, record);
        }
    }

    /// Rare dictionary words with no other record get a ranked list of the
    /// common words they resemble.
    fn rank_rare(&self, ctx: &Context<'_>, errors: &mut ErrorMap, rare: &[usize]) {
        for &i in rare {
            if errors.contains(i) {
                continue;
            }
            let word = ctx.text(i);
            let mut candidates = self.candidate_list(word);
            candidates.retain(|c| c.word != word);
            let (suggestions, top) = self.ranked_words(ctx, i, &candidates);
            debug!(word, ?suggestions, "rare word ranked");
            errors.insert(i, ErrorRecord::spelling(word, suggestions, top));
        }
    }

    fn candidate_list(&self, word: &str) -> Vec<Candidate> {
        self.candidates
            .get_or_generate(word, &self.lexicon, self.config.max_candidates, self.config.candidate_cutoff)
    }

    /// Two adjacent unknown words that together resemble one dictionary word.
    fn boundary_concats(&self, ctx: &Context<'_>, errors: &mut ErrorMap) {
        let lexicon = ctx.lexicon();
        for (i, pair) in ctx.tokens.windows(2).enumerate() {
            let (t1, t2) = (&pair[0], &pair[1]);
            if !t1.is_word() || !t2.is_word() || t1.in_dict || t2.in_dict || errors.is_locked(i) {
                continue;
            }
            let candidates = generate_concat_candidates(
                &t1.text,
                &t2.text,
                lexicon,
                self.config.max_candidates,
                self.config.concat_cutoff,
            );
            if candidates.is_empty() {
                continue;
            }
            let (fresh, top) = self.ranked_words(ctx, i, &candidates);
            let concat = format!("{}{}", t1.text, t2.text);

            let record = match errors.get(i) {
                Some(prev) => {
                    let mut merged = prev.clone();
                    for word in fresh {
                        if !merged.suggestions.contains(&word) {
                            merged.suggestions.push(word);
                        }
                    }
                    merged.confidence = prev.confidence.max(top);
                    merged.error_type = ErrorType::Spelling;
                    if merged.span < 2 {
                        merged.original = concat;
                        merged.span = 2;
                    }
                    merged
                }
                None => ErrorRecord::spelling(&concat, fresh, top).with_span(2),
            };
            debug!(index = i, original = %record.original, "boundary concat");
            errors.replace(i, record);
            errors.absorb(i);
        }
    }
}

/// Spelling records on whitelisted text, and two known contextual false
/// positives, are dropped. So are records with nothing to show.
pub(crate) fn suppress_whitelisted(errors: &mut ErrorMap) {
    errors.retain(|_, r| {
        let shown = r.original.trim();
        if shown.is_empty() {
            return false;
        }
        match r.error_type {
            ErrorType::Spelling => {
                let parts_listed = shown.split_whitespace().all(|p| WHITELIST.contains(p));
                !(WHITELIST.contains(shown) || parts_listed || WHITELIST.contains(shown.replace(' ', "").as_str()))
            }
            ErrorType::Contextual => !CONTEXTUAL_EXCEPTIONS.contains(&shown),
            ErrorType::RegisterMismatch => true,
        }
    });
}

pub(crate) fn drop_self_suggestions(errors: &mut ErrorMap) {
    errors.retain(|_, r| r.top_suggestion() != Some(r.original.as_str()));
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "check panicked".to_string()
    }
}

static GLOBAL_CHECKER: OnceLock<SpellChecker> = OnceLock::new();

/// Checker over the process-wide lexicon.
pub fn global_checker() -> Result<&'static SpellChecker> {
    if let Some(checker) = GLOBAL_CHECKER.get() {
        return Ok(checker);
    }
    let lexicon = global_lexicon().ok_or(SpellError::LexiconNotInitialized)?;
    Ok(GLOBAL_CHECKER.get_or_init(|| SpellChecker::new(lexicon)))
}

/// Check `text` against the process-wide lexicon.
pub fn check(text: &str) -> CheckOutcome {
    match global_checker() {
        Ok(checker) => checker.check(text),
        Err(e) => {
            error!(error = %e, "check without a lexicon");
            CheckOutcome::failure(e.to_string())
        }
    }
}
