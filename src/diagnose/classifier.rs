//! Numeral and classifier agreement.

use std::collections::HashMap;

use lazy_static::lazy_static;
use tracing::debug;

use super::{Context, ErrorRecord, Stage};
use crate::error::Result;
use crate::tables::{is_numeral, CLASSIFIERS, KHMER_NUM_WORDS};
use crate::tagger::{Token, TokenKind};

const MISMATCH_CONFIDENCE: f64 = 0.98;
const MISSING_CONFIDENCE: f64 = 0.90;

const NOUN_LOOKBACK: usize = 4;
const NOUN_LOOKAHEAD: usize = 3;

/// The polite title, often typed where the human classifier belongs.
const TITLE: &str = "អ្នក";
const HUMAN_CLASSIFIER: &str = "នាក់";

/// Quantity words that count like numerals.
const QUANTIFIERS: [&str; 4] = ["ប៉ុន្មាន", "ច្រើន", "ខ្លះ", "រាប់"];

lazy_static! {
    /// Nouns and the classifiers they are counted with.
    static ref NOUN_CLASSIFIERS: HashMap<&'static str, &'static [&'static str]> = [
        ("សិស្ស", &["នាក់", "រូប"][..]),
        ("គ្រូ", &["នាក់", "រូប"][..]),
        ("មនុស្ស", &["នាក់"][..]),
        ("កូន", &["នាក់"][..]),
        ("កម្មករ", &["នាក់"][..]),
        ("ព្រះសង្ឃ", &["អង្គ", "រូប"][..]),
        ("លោកសង្ឃ", &["អង្គ", "រូប"][..]),
        ("ឆ្កែ", &["ក្បាល"][..]),
        ("ឆ្មា", &["ក្បាល"][..]),
        ("គោ", &["ក្បាល"][..]),
        ("ក្របី", &["ក្បាល"][..]),
        ("ជ្រូក", &["ក្បាល"][..]),
        ("មាន់", &["ក្បាល"][..]),
        ("សៀវភៅ", &["ក្បាល"][..]),
        ("ឡាន", &["គ្រឿង"][..]),
        ("រថយន្ត", &["គ្រឿង"][..]),
        ("ម៉ូតូ", &["គ្រឿង"][..]),
        ("កង់", &["គ្រឿង"][..]),
        ("កុំព្យូទ័រ", &["គ្រឿង"][..]),
        ("ទូរស័ព្ទ", &["គ្រឿង"][..]),
        ("ផ្ទះ", &["ខ្នង"][..]),
        ("ក្រដាស", &["សន្លឹក"][..]),
        ("ស្វាយ", &["ផ្លែ"][..]),
        ("ក្រូច", &["ផ្លែ"][..]),
        ("ចេក", &["ផ្លែ"][..]),
        ("ដើមឈើ", &["ដើម"][..]),
        ("ខ្មៅដៃ", &["ដើម"][..]),
        ("ប៊ិច", &["ដើម"][..]),
        ("សំបុត្រ", &["ច្បាប់"][..]),
        ("លិខិត", &["ច្បាប់"][..]),
        ("ថ្នាំ", &["គ្រាប់"][..]),
        ("ស៊ុត", &["គ្រាប់"][..]),
        ("ស្បែកជើង", &["គូ"][..]),
        ("ទឹក", &["ដប"][..]),
        ("ស្រា", &["ដប"][..]),
    ]
    .into_iter()
    .collect();
}

fn counts_like_numeral(tok: &Token) -> bool {
    tok.kind == TokenKind::Number || is_numeral(&tok.text)
}

pub(crate) fn check(ctx: &Context<'_>, stage: &mut Stage<'_>) -> Result<()> {
    for i in 0..ctx.len() {
        let tok = ctx.token(i)?;
        if counts_like_numeral(tok) {
            numeral_agreement(ctx, stage, i)?;
        }
        if tok.text == TITLE || tok.text == HUMAN_CLASSIFIER {
            title_or_classifier(ctx, stage, i)?;
        }
    }
    Ok(())
}

/// The classifier after a numeral must be one the counted noun takes; with
/// no classifier at all, suggest the noun's own.
fn numeral_agreement(ctx: &Context<'_>, stage: &mut Stage<'_>, i: usize) -> Result<()> {
    let numeral = ctx.token(i)?;
    let next = ctx.next_where(i, |t| t.is_content() || KHMER_NUM_WORDS.contains(t.text.as_str()));

    if let Some(k) = next.filter(|&k| is_classifier(ctx.text(k))) {
        let classifier = ctx.text(k);
        let noun = noun_before(ctx, i).or_else(|| noun_after(ctx, k));
        if let Some((noun, valid)) = noun {
            if !valid.contains(&classifier) {
                debug!(%noun, classifier, "classifier does not fit noun");
                stage.insert(k, ErrorRecord::contextual(classifier, valid.iter().copied(), MISMATCH_CONFIDENCE).locked());
            }
        }
        return Ok(());
    }

    if let Some((noun, valid)) = noun_before(ctx, i) {
        debug!(%noun, numeral = %numeral.text, "numeral without classifier");
        let suggestions = valid.iter().map(|c| format!("{} {c}", numeral.text));
        stage.insert(i, ErrorRecord::contextual(&numeral.text, suggestions, MISSING_CONFIDENCE));
    }
    Ok(())
}

fn is_classifier(word: &str) -> bool {
    CLASSIFIERS.contains(word) || word == TITLE
}

fn lookup(word: &str) -> Option<(String, &'static [&'static str])> {
    NOUN_CLASSIFIERS.get(word).map(|valid| (word.to_string(), *valid))
}

/// Nearest counted noun among the four words before `i`, also trying each
/// word joined to the token before it.
fn noun_before(ctx: &Context<'_>, i: usize) -> Option<(String, &'static [&'static str])> {
    let mut seen = 0;
    for k in (0..i).rev() {
        let tok = &ctx.tokens[k];
        if tok.kind == TokenKind::Punct {
            return None;
        }
        if !tok.is_word() {
            continue;
        }
        if let Some(found) = lookup(&tok.text) {
            return Some(found);
        }
        if k > 0 {
            if let Some(found) = lookup(&format!("{}{}", ctx.text(k - 1), tok.text)) {
                return Some(found);
            }
        }
        seen += 1;
        if seen == NOUN_LOOKBACK {
            return None;
        }
    }
    None
}

fn noun_after(ctx: &Context<'_>, classifier: usize) -> Option<(String, &'static [&'static str])> {
    ctx.tokens[classifier + 1..]
        .iter()
        .take_while(|t| t.kind != TokenKind::Punct)
        .filter(|t| t.is_word())
        .take(NOUN_LOOKAHEAD)
        .find_map(|t| lookup(&t.text))
}

/// "នាក់" counts people after a numeral; "អ្នក" is the title everywhere else.
fn title_or_classifier(ctx: &Context<'_>, stage: &mut Stage<'_>, i: usize) -> Result<()> {
    if stage.is_locked(i) {
        return Ok(());
    }
    let word = ctx.token(i)?.text.as_str();
    let after_numeral = ctx
        .prev_content(i)
        .map(|k| &ctx.tokens[k])
        .is_some_and(|p| counts_like_numeral(p) || QUANTIFIERS.contains(&p.text.as_str()));

    if word == TITLE && after_numeral {
        stage.insert(i, ErrorRecord::contextual(word, [HUMAN_CLASSIFIER], 0.95));
    } else if word == HUMAN_CLASSIFIER && !after_numeral {
        stage.insert(i, ErrorRecord::contextual(word, [TITLE], 0.90));
    }
    Ok(())
}
