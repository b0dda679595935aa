//! Error diagnosis: the ordered rule cascade that turns tagged tokens into
//! correction records.
//!
//! Core stages (per-token spelling, split reconstruction) write straight into
//! the [`ErrorMap`] and fail the whole check when they return `Err`. The
//! auxiliary rule families write into a [`Stage`] that is merged only when the
//! family completes, so a faulting family is skipped without leaving half of
//! its findings behind.

mod classifier;
mod homophone;
mod punctuation;
mod register;
mod spelling;
mod split;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Result, SpellError};
use crate::lexicon::Lexicon;
use crate::tagger::Token;
use crate::validity::Validator;

pub use spelling::OOV_CONFIDENCE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    Spelling,
    Contextual,
    RegisterMismatch,
}

/// One correction, keyed by the index of the first token it replaces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub original: String,
    pub suggestions: Vec<String>,
    /// In `[0, 1]`, or 2.0 for forced typo-map corrections.
    pub confidence: f64,
    pub error_type: ErrorType,
    /// Locked records are never replaced by a later rule.
    #[serde(skip_serializing_if = "is_false")]
    pub locked: bool,
    /// Number of tokens the record replaces.
    pub span: usize,
    /// Byte offset into the original text when it differs from the token's own.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl ErrorRecord {
    pub fn new<I, S>(original: &str, suggestions: I, confidence: f64, error_type: ErrorType) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            original: original.to_string(),
            suggestions: suggestions.into_iter().map(Into::into).collect(),
            confidence,
            error_type,
            locked: false,
            span: 1,
            offset: None,
        }
    }

    pub fn spelling<I, S>(original: &str, suggestions: I, confidence: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(original, suggestions, confidence, ErrorType::Spelling)
    }

    pub fn contextual<I, S>(original: &str, suggestions: I, confidence: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(original, suggestions, confidence, ErrorType::Contextual)
    }

    pub fn register<I, S>(original: &str, suggestions: I, confidence: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(original, suggestions, confidence, ErrorType::RegisterMismatch)
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn with_span(mut self, span: usize) -> Self {
        self.span = span.max(1);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn top_suggestion(&self) -> Option<&str> {
        self.suggestions.first().map(String::as_str)
    }

    pub fn is_spelling(&self) -> bool {
        self.error_type == ErrorType::Spelling
    }

    /// Would `self` win against `existing` at the same index?
    fn outranks(&self, existing: &ErrorRecord) -> bool {
        !existing.locked && self.confidence > existing.confidence
    }
}

/// Sparse token-index to record map with at most one record per index.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ErrorMap(BTreeMap<usize, ErrorRecord>);

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `record` unless the slot holds a locked record or one at least
    /// as confident. Returns whether the record was stored.
    pub fn insert(&mut self, idx: usize, record: ErrorRecord) -> bool {
        if let Some(existing) = self.0.get(&idx) {
            if !record.outranks(existing) {
                return false;
            }
        }
        self.0.insert(idx, record);
        true
    }

    /// Unconditional write, for ranking passes that refine a record in place.
    pub(crate) fn replace(&mut self, idx: usize, record: ErrorRecord) {
        self.0.insert(idx, record);
    }

    pub fn get(&self, idx: usize) -> Option<&ErrorRecord> {
        self.0.get(&idx)
    }

    pub fn contains(&self, idx: usize) -> bool {
        self.0.contains_key(&idx)
    }

    pub fn remove(&mut self, idx: usize) -> Option<ErrorRecord> {
        self.0.remove(&idx)
    }

    pub fn has_spelling(&self, idx: usize) -> bool {
        self.get(idx).is_some_and(ErrorRecord::is_spelling)
    }

    pub fn is_locked(&self, idx: usize) -> bool {
        self.get(idx).is_some_and(|r| r.locked)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &ErrorRecord)> + '_ {
        self.0.iter().map(|(i, r)| (*i, r))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(usize, &ErrorRecord) -> bool) {
        self.0.retain(|i, r| keep(*i, r));
    }

    /// Fold another map in under the usual priority rule.
    pub fn merge(&mut self, other: ErrorMap) {
        for (idx, record) in other.0 {
            self.insert(idx, record);
        }
    }

    /// Drop unlocked, weaker records on the tokens a merge at `idx` swallowed.
    pub(crate) fn absorb(&mut self, idx: usize) {
        let Some(merge) = self.0.get(&idx) else {
            return;
        };
        let (span, confidence) = (merge.span, merge.confidence);
        for covered in idx + 1..idx + span {
            if self
                .0
                .get(&covered)
                .is_some_and(|r| !r.locked && r.confidence < confidence)
            {
                self.0.remove(&covered);
            }
        }
    }

    pub fn into_inner(self) -> BTreeMap<usize, ErrorRecord> {
        self.0
    }
}

impl<'a> IntoIterator for &'a ErrorMap {
    type Item = (&'a usize, &'a ErrorRecord);
    type IntoIter = std::collections::btree_map::Iter<'a, usize, ErrorRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Read-only view of one check shared by every rule.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub tokens: &'a [Token],
    pub validator: Validator<'a>,
    /// Caller's text before normalization.
    pub original: &'a str,
    /// Byte offset of each token in `original`.
    pub offsets: &'a [Option<usize>],
}

impl<'a> Context<'a> {
    pub fn lexicon(&self) -> &'a Lexicon {
        self.validator.lexicon()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token text, or "" past either end.
    pub fn text(&self, i: usize) -> &'a str {
        self.tokens.get(i).map_or("", |t| t.text.as_str())
    }

    pub fn token(&self, i: usize) -> Result<&'a Token> {
        self.tokens
            .get(i)
            .ok_or_else(|| SpellError::diagnosis("context", format!("token {i} of {} out of range", self.len())))
    }

    pub fn offset(&self, i: usize) -> Option<usize> {
        self.offsets.get(i).copied().flatten()
    }

    pub fn next_where(&self, i: usize, pred: impl Fn(&Token) -> bool) -> Option<usize> {
        (i + 1..self.len()).find(|&k| pred(&self.tokens[k]))
    }

    pub fn prev_where(&self, i: usize, pred: impl Fn(&Token) -> bool) -> Option<usize> {
        (0..i.min(self.len())).rev().find(|&k| pred(&self.tokens[k]))
    }

    /// Nearest word or number after `i`.
    pub fn next_content(&self, i: usize) -> Option<usize> {
        self.next_where(i, Token::is_content)
    }

    pub fn prev_content(&self, i: usize) -> Option<usize> {
        self.prev_where(i, Token::is_content)
    }

    /// Nearest token after `i` that is not whitespace or foreign text.
    pub fn next_non_other(&self, i: usize) -> Option<usize> {
        self.next_where(i, |t| !t.is_other())
    }

    pub fn prev_non_other(&self, i: usize) -> Option<usize> {
        self.prev_where(i, |t| !t.is_other())
    }

    /// Nothing but whitespace between `i` and the end of its sentence.
    pub fn at_sentence_end(&self, i: usize, marks: &[&str]) -> bool {
        match self.next_non_other(i) {
            None => true,
            Some(k) => marks.contains(&self.text(k)),
        }
    }
}

/// Staging area for one auxiliary rule family.
pub(crate) struct Stage<'e> {
    prior: &'e ErrorMap,
    staged: ErrorMap,
}

impl<'e> Stage<'e> {
    pub(crate) fn new(prior: &'e ErrorMap) -> Self {
        Self {
            prior,
            staged: ErrorMap::new(),
        }
    }

    /// Same priority rule as [`ErrorMap::insert`], applied against both the
    /// committed map and this stage's own findings.
    pub(crate) fn insert(&mut self, idx: usize, record: ErrorRecord) -> bool {
        if let Some(existing) = self.prior.get(idx) {
            if !record.outranks(existing) {
                return false;
            }
        }
        self.staged.insert(idx, record)
    }

    pub(crate) fn get(&self, idx: usize) -> Option<&ErrorRecord> {
        self.staged.get(idx).or_else(|| self.prior.get(idx))
    }

    pub(crate) fn contains(&self, idx: usize) -> bool {
        self.get(idx).is_some()
    }

    pub(crate) fn has_spelling(&self, idx: usize) -> bool {
        self.get(idx).is_some_and(ErrorRecord::is_spelling)
    }

    pub(crate) fn is_locked(&self, idx: usize) -> bool {
        self.get(idx).is_some_and(|r| r.locked)
    }

    /// Usage rules leave misspelled tokens to the spelling records, except a
    /// word missing its final `រ` whose completion is known.
    pub(crate) fn defers_to_spelling(&self, ctx: &Context<'_>, idx: usize) -> bool {
        if !self.has_spelling(idx) {
            return false;
        }
        let word = ctx.text(idx);
        let truncated = word.chars().count() >= 2
            && word.ends_with('ា')
            && ctx.validator.is_known(&format!("{word}រ"));
        !truncated
    }

    pub(crate) fn into_staged(self) -> ErrorMap {
        self.staged
    }
}

/// Everything the ranking pass needs from diagnosis.
#[derive(Debug, Default)]
pub struct Diagnosis {
    pub errors: ErrorMap,
    /// Rare dictionary words that still need a ranked suggestion list.
    pub rare: Vec<usize>,
    /// Out-of-vocabulary tokens whose record is still the seed list.
    pub oov: Vec<usize>,
}

type AuxRule = fn(&Context<'_>, &mut Stage<'_>) -> Result<()>;

const AUX_STAGES: [(&str, AuxRule); 6] = [
    ("homophone", homophone::grammar_rules),
    ("usage", homophone::usage_rules),
    ("classifier", classifier::check),
    ("register", register::check),
    ("orthography", spelling::orthography),
    ("punctuation", punctuation::check),
];

/// Run the full cascade over one tagged token sequence.
pub fn diagnose(ctx: &Context<'_>) -> Result<Diagnosis> {
    let mut errors = ErrorMap::new();
    let slots = spelling::check(ctx, &mut errors)?;
    split::check(ctx, &mut errors)?;

    for (name, rule) in AUX_STAGES {
        run_aux(name, rule, ctx, &mut errors);
    }

    let oov = slots
        .oov
        .into_iter()
        .filter(|&i| {
            errors
                .get(i)
                .is_some_and(|r| r.is_spelling() && r.confidence == OOV_CONFIDENCE && r.span == 1)
        })
        .collect();
    debug!(records = errors.len(), "diagnosis complete");
    Ok(Diagnosis {
        errors,
        rare: slots.rare,
        oov,
    })
}

fn run_aux(name: &'static str, rule: AuxRule, ctx: &Context<'_>, errors: &mut ErrorMap) {
    let mut stage = Stage::new(errors);
    match rule(ctx, &mut stage) {
        Ok(()) => {
            let staged = stage.into_staged();
            debug!(stage = name, records = staged.len(), "stage finished");
            errors.merge(staged);
        }
        Err(e) => warn!(stage = name, error = %e, "skipping rule stage"),
    }
}
