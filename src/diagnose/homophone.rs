//! Contextual homophone rules: look-alike function words told apart by
//! their neighbours.
//!
//! [`grammar_rules`] is the ordered rule table over non-whitespace
//! neighbours. [`usage_rules`] is the second, word-level pass that looks at
//! the preceding content word and leaves misspelled tokens alone.

use std::collections::HashMap;

use lazy_static::lazy_static;
use tracing::debug;

use super::{Context, ErrorRecord, Stage};
use crate::error::Result;
use crate::tables::{
    AUXILIARIES, CLASSIFIERS, HONORIFICS, INTRANSITIVE_VERBS, LOC_TIME_WORDS, MOTION_VERBS, PRONOUNS,
    SUSPICIOUS_BIGRAMS, TECHNICAL_TERMS, TRANSITIVE_VERBS_NOV, WHITELIST,
};
use crate::tagger::{PosTag, Token, TokenKind};

const PHRASE_CONFIDENCE: f64 = 0.95;

const SENTENCE_MARKS: [&str; 3] = ["។", "?", "!"];

/// Modal verbs that legitimately follow "and".
const MODALS: [&str; 4] = ["អាច", "គួរ", "គប្បី", "ត្រូវ"];

/// Words after which "នឹង" means "with" rather than "will".
const WITH_GOVERNORS: [&str; 10] = [
    "ជាមួយ", "ជាប់", "ជួប", "ទាក់ទង", "ដូចគ្នា", "ស្មើ", "ស្រដៀង", "ស្រដៀងគ្នា", "ខុស", "ខុសគ្នា",
];

const DESTINATIONS: [&str; 6] = ["សាលារៀន", "ផ្ទះ", "ផ្សារ", "មន្ទីរពេទ្យ", "ក្រុង", "ខេត្ត"];

const PLACE_ANCHORS: [&str; 8] = ["ផ្ទះ", "សណ្ឋាគារ", "ក្នុង", "លើ", "ក្រោម", "ឯ", "ខាង", "ក្បែរ"];

const MEANING_VERBS: [&str; 4] = ["មាន", "ដឹង", "យល់", "ស្វែងរក"];

/// Head words that take the genitive "នៃ".
const GENITIVE_HEADS: [&str; 16] = [
    "ការ", "ផ្នែក", "សេចក្តី", "ភាព", "ដំណើរ", "ផល", "អភិវឌ្ឍ", "សង្គម", "ជាតិ", "គម្រោង", "កម្មវិធី",
    "ឯកសារ", "គោលបំណង", "បញ្ហា", "សមិទ្ធផល", "លទ្ធផល",
];

const INTENSIFIED: [&str; 3] = ["អស្ចារ្យ", "វិសេស", "ឧត្តម"];

const NEGATIONS: [&str; 3] = ["មិន", "ពុំ", "អត់"];

const BODY_WORDS: [&str; 2] = ["ភ្នែក", "របួស"];

/// Marks after which "នូវ" has no object to introduce.
const CLAUSE_BREAKS: [&str; 5] = ["។", "៕", "?", "!", "៖"];

const COMMON_ADJECTIVES: [&str; 11] = [
    "ល្អ", "ស្អាត", "ធំ", "តូច", "ខ្ពស់", "ទាប", "ស្រស់", "ត្រចះត្រចង់", "សម្បូរបែប", "វិសេសវិសាល", "អស្ចារ្យ",
];

const VERB_MARKERS: [&str; 19] = [
    "បាន", "នឹង", "កំពុង", "ធ្លាប់", "ត្រូវ", "គួរ", "អាច", "ចេះ", "មិន", "ពុំ", "ដើម្បី", "ជួយ", "នាំគ្នា",
    "សាកល្បង", "ប្រឹងប្រែង", "ចូលរួម", "ចាប់ផ្តើម", "បន្ត", "ឈប់",
];

const NOUN_MARKERS: [&str; 14] = [
    "នៃ", "ផ្នែក", "ក្រសួង", "មន្ទីរ", "ក្រុមប្រឹក្សា", "គម្រោង", "កម្មវិធី", "អ្នក", "ការងារ", "វិស័យ", "ស្ថាប័ន",
    "ជាតិ", "អន្តរជាតិ", "ការ",
];

lazy_static! {
    /// Verb form to noun form of words that differ only by a final `ន៍`/`ណ៍`.
    static ref SUFFIX_PAIRS: HashMap<&'static str, &'static str> = [
        ("អភិវឌ្ឍ", "អភិវឌ្ឍន៍"),
        ("អនុវត្ត", "អនុវត្តន៍"),
        ("វិវត្ត", "វិវត្តន៍"),
        ("អភិរក្ស", "អភិរក្សណ៍"),
    ]
    .into_iter()
    .collect();

    static ref SUFFIX_PAIRS_REV: HashMap<&'static str, &'static str> =
        SUFFIX_PAIRS.iter().map(|(verb, noun)| (*noun, *verb)).collect();
}

/// Noun-like for the conjunction rules: tagged as a noun, pronoun or number,
/// or a listed word with no tags of its own.
fn is_noun(tok: &Token) -> bool {
    tok.has_pos(PosTag::Noun)
        || tok.has_pos(PosTag::Pron)
        || tok.has_pos(PosTag::Num)
        || WHITELIST.contains(tok.text.as_str())
        || TECHNICAL_TERMS.contains(tok.text.as_str())
}

fn contains_place(word: &str) -> bool {
    LOC_TIME_WORDS.iter().any(|loc| word.contains(loc))
}

pub(crate) fn grammar_rules(ctx: &Context<'_>, stage: &mut Stage<'_>) -> Result<()> {
    suspicious_phrases(ctx, stage)?;
    for i in 0..ctx.len() {
        if let Some(record) = grammar_rule(ctx, i)? {
            debug!(idx = i, word = %record.original, fix = ?record.top_suggestion(), "homophone");
            stage.insert(i, record);
        }
    }
    Ok(())
}

/// Two-word phrases whose correction keeps two words: replace each member
/// that changed.
fn suspicious_phrases(ctx: &Context<'_>, stage: &mut Stage<'_>) -> Result<()> {
    for i in 0..ctx.len() {
        let t1 = ctx.token(i)?;
        if stage.contains(i) || !t1.is_word() {
            continue;
        }
        let Some(j) = ctx.next_non_other(i) else {
            continue;
        };
        let t2 = ctx.token(j)?;
        if !t2.is_word() {
            continue;
        }
        let phrase = format!("{} {}", t1.text, t2.text);
        let Some((c1, c2)) = SUSPICIOUS_BIGRAMS.get(phrase.as_str()).and_then(|fix| fix.split_once(' ')) else {
            continue;
        };
        if c1 != t1.text {
            stage.insert(i, ErrorRecord::contextual(&t1.text, [c1], PHRASE_CONFIDENCE));
        }
        if c2 != t2.text {
            stage.insert(j, ErrorRecord::contextual(&t2.text, [c2], PHRASE_CONFIDENCE));
        }
    }
    Ok(())
}

fn grammar_rule(ctx: &Context<'_>, i: usize) -> Result<Option<ErrorRecord>> {
    let tok = ctx.token(i)?;
    let word = tok.text.as_str();
    let prev_idx = ctx.prev_non_other(i);
    let prev = prev_idx.map(|k| &ctx.tokens[k]);
    let next = ctx.next_non_other(i).map(|k| &ctx.tokens[k]);
    let prev_text = prev.map_or("", |t| t.text.as_str());
    let next_text = next.map_or("", |t| t.text.as_str());
    let fix = |to: &str, confidence: f64| Some(ErrorRecord::contextual(word, [to], confidence));

    let record = match word {
        "និង" => {
            let subject = prev.is_some_and(|p| p.has_pos(PosTag::Pron) || HONORIFICS.contains(prev_text));
            if subject && next.is_some_and(|n| n.is_verb_like() && !MODALS.contains(&next_text)) {
                fix("នឹង", 0.90)
            } else if ctx.at_sentence_end(i, &SENTENCE_MARKS) {
                fix("ហ្នឹង", 0.98)
            } else {
                None
            }
        }
        "នឹង" => match (prev, next) {
            (Some(p), Some(n)) if is_noun(p) && is_noun(n) => {
                let before_prev = prev_idx.and_then(|k| ctx.prev_non_other(k)).map_or("", |k| ctx.text(k));
                let with_phrase = WITH_GOVERNORS.contains(&prev_text)
                    || (prev_text == "មុខ" && before_prev == "ប្រឈម")
                    || (prev_text == "គ្នា" && ["ស្រដៀង", "ដូច", "ខុស"].contains(&before_prev));
                if with_phrase || n.is_verb_like() || prev_text == "សម" || next_text == "ផ្តល់" {
                    None
                } else {
                    fix("និង", 0.99)
                }
            }
            _ => None,
        },
        "ពីរ" if MOTION_VERBS.contains(prev_text) && next.is_some() && !CLASSIFIERS.contains(next_text) => {
            fix("ពី", 0.90)
        }
        "ពី" if CLASSIFIERS.contains(next_text) => fix("ពីរ", 0.90),
        "ដែរ" if next.is_some_and(Token::is_word) => fix("ដែល", 0.90),
        "ដែល" if ctx.at_sentence_end(i, &SENTENCE_MARKS) => fix("ដែរ", 0.95),
        "ដល់" if next.is_some_and(|n| COMMON_ADJECTIVES.contains(&next_text) || n.has_pos(PosTag::Adj)) => {
            fix("ដ៏", 0.92)
        }
        "ដ៏" if DESTINATIONS.contains(&next_text) => fix("ដល់", 0.88),
        "ន័យ" if prev.is_some_and(|p| !MEANING_VERBS.contains(&prev_text) && is_noun(p)) => fix("នៃ", 0.90),
        "នៃ" if ["យ៉ាង", "ដូចម្តេច", "ថា"].contains(&next_text) => fix("ន័យ", 0.85),
        "នាក់" if prev.is_none() || SENTENCE_MARKS.contains(&prev_text) => fix("អ្នក", 0.95),
        "នូវ" if PLACE_ANCHORS.contains(&next_text) => fix("នៅ", 0.90),
        "ផ្សា" if ["ទៅ", "នៅ"].contains(&prev_text) || ["ដែក", "កញ្ចក់"].contains(&next_text) => {
            fix("ផ្សារ", 0.95)
        }
        "ផ្សារ" => {
            if BODY_WORDS.contains(&next_text) || prev_text == "ឈឺ" {
                fix("ផ្សា", 0.95)
            } else if body_word_before(ctx, i) {
                fix("ផ្សា", 0.90)
            } else {
                None
            }
        }
        _ => None,
    };
    Ok(record)
}

/// An eye or a wound among the three words before `i`.
fn body_word_before(ctx: &Context<'_>, i: usize) -> bool {
    ctx.tokens[..i]
        .iter()
        .rev()
        .filter(|t| t.is_word())
        .take(3)
        .any(|t| BODY_WORDS.contains(&t.text.as_str()))
}

pub(crate) fn usage_rules(ctx: &Context<'_>, stage: &mut Stage<'_>) -> Result<()> {
    for i in 0..ctx.len() {
        if !ctx.token(i)?.is_word() || stage.defers_to_spelling(ctx, i) {
            continue;
        }
        if let Some(record) = usage_rule(ctx, i)? {
            debug!(idx = i, word = %record.original, fix = ?record.top_suggestion(), "usage");
            stage.insert(i, record);
        }
    }
    Ok(())
}

fn usage_rule(ctx: &Context<'_>, i: usize) -> Result<Option<ErrorRecord>> {
    let word = ctx.token(i)?.text.as_str();
    let prev = ctx.prev_content(i).map(|k| &ctx.tokens[k]);
    let prev_text = prev.map_or("", |t| t.text.as_str());
    let adjacent = ctx.tokens.get(i + 1);
    let fix = |to: &str, confidence: f64| Some(ErrorRecord::contextual(word, [to], confidence));

    if let Some(noun) = SUFFIX_PAIRS.get(word) {
        let marked = prev_text != "ការ" && NOUN_MARKERS.contains(&prev_text);
        return Ok(if marked { fix(*noun, 0.90) } else { None });
    }
    if let Some(verb) = SUFFIX_PAIRS_REV.get(word) {
        return Ok(if VERB_MARKERS.contains(&prev_text) { fix(*verb, 0.95) } else { None });
    }

    let record = match word {
        "នូវ" if object_marker_misused(ctx, i, prev) => {
            if prev_text == "ទៅ" {
                fix("ដល់", 0.99)
            } else {
                fix("នៅ", 0.95)
            }
        }
        "ដែល" if ctx.at_sentence_end(i, &CLAUSE_BREAKS) => fix("ដែរ", 0.95),
        "ដែរ" => {
            let negated = NEGATIONS.contains(&prev_text);
            let also = ctx.tokens[i.saturating_sub(3)..i].iter().any(|t| t.text == "ក៏");
            if prev.is_some() && !negated && !also && adjacent.is_some_and(Token::is_word) {
                fix("ដែល", 0.85)
            } else {
                None
            }
        }
        "ដ៏" if adjacent.is_some_and(|t| contains_place_prefix(&t.text)) => fix("ដល់", 0.99),
        "ដល់" => {
            let next = ctx.next_non_other(i).map(|k| &ctx.tokens[k]);
            match next {
                Some(n) if n.has_pos(PosTag::Adj) && !n.has_pos(PosTag::Noun) => fix("ដ៏", 0.95),
                Some(n) if INTENSIFIED.contains(&n.text.as_str()) => fix("ដ៏", 0.99),
                _ => None,
            }
        }
        "នៃ" if prev_text == "មាន" => Some(ErrorRecord::spelling(word, ["ន័យ"], 0.99)),
        "ន័យ" if GENITIVE_HEADS.contains(&prev_text) || prev_text.starts_with("ការ") => fix("នៃ", 0.95),
        _ => None,
    };
    Ok(record)
}

/// A place or time word, or a compound that starts with one.
fn contains_place_prefix(word: &str) -> bool {
    LOC_TIME_WORDS.contains(word) || LOC_TIME_WORDS.iter().any(|loc| word.starts_with(loc))
}

/// "នូវ" introduces the object of a transitive verb; anywhere else it is a
/// misspelt "នៅ".
fn object_marker_misused(ctx: &Context<'_>, i: usize, prev: Option<&Token>) -> bool {
    let Some(prev) = prev else {
        return true;
    };
    let p = prev.text.as_str();
    if prev.has_pos(PosTag::Pron) || PRONOUNS.contains(p) || INTRANSITIVE_VERBS.contains(p) || contains_place(p) {
        return true;
    }
    if AUXILIARIES.contains(p) {
        let governing = (i.saturating_sub(4)..i.saturating_sub(1))
            .rev()
            .find(|&k| ctx.tokens[k].is_word())
            .map(|k| ctx.text(k));
        if !governing.is_some_and(|v| TRANSITIVE_VERBS_NOV.contains(v)) {
            return true;
        }
    }
    if ctx.next_non_other(i).is_some_and(|k| contains_place(ctx.text(k))) {
        return true;
    }
    match ctx.tokens.get(i + 1) {
        None => true,
        Some(t) => CLAUSE_BREAKS.contains(&t.text.as_str()) || (t.kind == TokenKind::Other && t.text.trim().is_empty()),
    }
}
