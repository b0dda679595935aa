//! Honorific register agreement.
//!
//! Vocabulary comes in four registers: common (1), polite (2), monastic (3)
//! and royal (4). The checker walks the tokens once, tracking the highest
//! title seen in the current and the previous sentence, and flags verbs and
//! nouns whose register does not fit the subject they belong to.

use std::collections::HashMap;

use lazy_static::lazy_static;
use tracing::debug;

use super::{Context, ErrorRecord, Stage};
use crate::error::Result;
use crate::script::fold_coeng;
use crate::tables::{CLASSIFIERS, KHMER_NUM_WORDS};
use crate::tagger::{Token, TokenKind};

type Level = u8;

const VERB_CONFIDENCE: f64 = 0.95;
const HUMBLE_CONFIDENCE: f64 = 0.90;
const NOUN_CONFIDENCE: f64 = 0.85;

const SUBJECT_LOOKBACK: usize = 10;
const LOOKAHEAD_WORDS: usize = 5;

const STATUS_BREAKS: [&str; 3] = ["។", "៕", "?"];

const SELF: &str = "ខ្ញុំ";

/// Pronouns that take the register of whoever they refer back to.
const NEUTRAL_PRONOUNS: [&str; 5] = ["គាត់", "គេ", "យើង", "វា", "លោក"];

/// Recipients a monk or a king may give to with a common verb.
const LOW_RECIPIENTS: [&str; 4] = ["ក្មេង", "កុមារ", "ចៅ", "វា"];

const GIVE_VERBS: [&str; 3] = ["ឱ្យ", "ឲ្យ", "ផ្តល់"];

/// Money after a give verb is alms, not a royal treasury.
const MONEY: [&str; 2] = ["លុយ", "ប្រាក់"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Eat,
    Sleep,
    Walk,
    Speak,
    Die,
    Born,
    Drink,
    Bathe,
    See,
    Give,
    Return,
}

impl Action {
    /// Canonical verb for each register, common first.
    fn forms(self) -> [&'static str; 4] {
        match self {
            Action::Eat => ["ញ៉ាំ", "ពិសា", "ឆាន់", "សោយ"],
            Action::Sleep => ["ដេក", "សម្រាក", "សឹង", "ផ្ទុំ"],
            Action::Walk => ["ដើរ", "អញ្ជើញ", "និមន្ត", "យាង"],
            Action::Speak => ["និយាយ", "ប្រសាសន៍", "សង្ឃដីកា", "ព្រះបន្ទូល"],
            Action::Die => ["ស្លាប់", "អនិច្ចកម្ម", "សុគត", "សោយទិវង្គត"],
            Action::Born => ["កើត", "សម្រាលកូន", "កើត", "ប្រសូត"],
            Action::Drink => ["ផឹក", "ពិសា", "ឆាន់", "សេព"],
            Action::Bathe => ["ងូតទឹក", "ជម្រះកាយ", "ស្រង់", "សេពសោយ"],
            Action::See => ["មើល", "ទស្សនា", "មើល", "ទត"],
            Action::Give => ["ឱ្យ", "ជូន", "ប្រគេន", "ថ្វាយ"],
            Action::Return => ["ត្រឡប់", "ត្រឡប់", "និមន្តត្រឡប់", "យាងត្រឡប់"],
        }
    }

    fn form(self, level: Level) -> &'static str {
        self.forms()[usize::from(level.clamp(1, 4)) - 1]
    }
}

lazy_static! {
    /// Titles and pronouns with the register they set, Coeng Da folded to Coeng Ta.
    static ref SUBJECT_LEVELS: Vec<(String, Level)> = [
        ("ខ្ញុំ", 1), ("គាត់", 1), ("អ្នក", 1), ("គេ", 1), ("យើង", 1), ("វា", 1), ("សត្វ", 1),
        ("ឆ្កែ", 1), ("ឆ្មា", 1), ("កុមារ", 1), ("ក្មេង", 1), ("បុរស", 1), ("ស្ត្រី", 1),
        ("លោក", 2), ("លោកស្រី", 2), ("អ្នកគ្រូ", 2), ("លោកគ្រូ", 2), ("ចាស់ទុំ", 2), ("បង", 2),
        ("បងស្រី", 2), ("បងប្រុស", 2), ("គ្រូ", 2), ("គ្រូបង្រៀន", 2), ("ឯកឧត្តម", 2), ("លោកជំទាវ", 2),
        ("ឧត្តម", 2), ("ភ្ញៀវ", 2),
        ("ព្រះសង្ឃ", 3), ("ភិក្ខុ", 3), ("សាមណេរ", 3), ("លោកតា", 3), ("សង្ឃ", 3), ("ព្រះតេជគុណ", 3),
        ("អាត្មា", 3),
        ("ព្រះមហាក្សត្រ", 4), ("ស្ដេច", 4), ("ព្រះអង្គ", 4), ("ទ្រង់", 4), ("មហាក្សត្រ", 4), ("រាជ", 4),
        ("ក្សត្រ", 4), ("ព្រះនាង", 4), ("ព្រះរាជបុត្រ", 4), ("សម្ដេច", 4),
    ]
    .into_iter()
    .map(|(title, level)| (fold_coeng(title), level))
    .collect();

    /// Verbs that carry a register, with the action they name.
    static ref VERB_LEVELS: HashMap<&'static str, (Level, Action)> = {
        use Action::*;
        [
            ("ហូប", 1, Eat), ("ញ៉ាំ", 1, Eat), ("ស៊ី", 1, Eat), ("ពិសា", 2, Eat), ("ទទួលទាន", 2, Eat),
            ("ឆាន់", 3, Eat), ("សោយ", 4, Eat),
            ("ដេក", 1, Sleep), ("សម្រាក", 2, Sleep), ("សឹង", 3, Sleep), ("ផ្ទុំ", 4, Sleep),
            ("ដើរ", 1, Walk), ("ទៅ", 1, Walk), ("មក", 1, Walk), ("អញ្ជើញ", 2, Walk), ("និមន្ត", 3, Walk),
            ("យាង", 4, Walk),
            ("និយាយ", 1, Speak), ("ស្តី", 1, Speak), ("ប្រសាសន៍", 2, Speak), ("មានប្រសាសន៍", 2, Speak),
            ("សង្ឃដីកា", 3, Speak), ("មានសង្ឃដីកា", 3, Speak), ("ព្រះបន្ទូល", 4, Speak),
            ("មានព្រះបន្ទូល", 4, Speak),
            ("ស្លាប់", 1, Die), ("ងាប់", 1, Die), ("មរណភាព", 2, Die), ("អនិច្ចកម្ម", 2, Die), ("សុគត", 3, Die),
            ("សោយទិវង្គត", 4, Die),
            ("កើត", 1, Born), ("ប្រសូត", 4, Born),
            ("ផឹក", 1, Drink), ("សេព", 4, Drink),
            ("ងូតទឹក", 1, Bathe), ("ងូត", 1, Bathe), ("ជម្រះកាយ", 2, Bathe), ("ស្រង់", 3, Bathe),
            ("ស្រង់ទឹក", 3, Bathe), ("សេពសោយ", 4, Bathe),
            ("មើល", 1, See), ("ទស្សនា", 2, See), ("ទត", 4, See),
            ("ឱ្យ", 1, Give), ("ឲ្យ", 1, Give), ("ផ្តល់", 2, Give), ("ជូន", 2, Give), ("ប្រគេន", 3, Give),
            ("ថ្វាយ", 4, Give),
            ("វិល", 1, Return), ("ត្រឡប់", 1, Return), ("និមន្តត្រឡប់", 3, Return), ("និវត្ត", 4, Return),
            ("យាងត្រឡប់", 4, Return),
        ]
        .into_iter()
        .map(|(verb, level, action)| (verb, (level, action)))
        .collect()
    };

    /// Plain nouns with their monastic and royal counterparts.
    static ref NOUN_LEVELS: HashMap<&'static str, &'static [(Level, &'static str)]> = [
        ("បាយ", &[(3, "ចង្ហាន់"), (4, "ព្រះស្ងោយ")][..]),
        ("ទឹក", &[(3, "ទឹក"), (4, "ទឹក")][..]),
        ("ផ្ទះ", &[(3, "កុដិ"), (4, "ព្រះរាជដំណាក់")][..]),
        ("លុយ", &[(3, "បច្ច័យ"), (4, "ព្រះរាជទ្រព្យ")][..]),
        ("ប្រាក់", &[(3, "បច្ច័យ"), (4, "ព្រះរាជទ្រព្យ")][..]),
        ("សំបុត្រ", &[(3, "លិខិត"), (4, "ព្រះរាជសារ")][..]),
        ("ចិត្ត", &[(3, "ព្រះទ័យ"), (4, "ព្រះរាជហឫទ័យ")][..]),
        ("ដៃ", &[(3, "ព្រះហស្ត"), (4, "ព្រះហស្ត")][..]),
        ("ជើង", &[(3, "ព្រះបាទ"), (4, "ព្រះបាទ")][..]),
        ("ក្បាល", &[(3, "ព្រះកេស"), (4, "ព្រះកេស")][..]),
        ("ពោះ", &[(4, "ព្រះឧដរ")][..]),
        ("មាត់", &[(4, "ព្រះឱស្ឋ")][..]),
        ("ច្រមុះ", &[(4, "ព្រះនាសិក")][..]),
        ("ភ្នែក", &[(4, "ព្រះនេត្រ")][..]),
        ("ត្រចៀក", &[(4, "ព្រះសោតៈ")][..]),
    ]
    .into_iter()
    .collect();
}

/// Highest register of any title contained in `word`.
fn title_level(word: &str) -> Option<Level> {
    let folded = fold_coeng(word);
    SUBJECT_LEVELS
        .iter()
        .filter(|(title, _)| folded.contains(title.as_str()))
        .map(|(_, level)| *level)
        .max()
}

/// Highest register among the titles in the next few words of the sentence.
fn level_ahead(ctx: &Context<'_>, i: usize) -> Option<Level> {
    words_ahead(ctx, i).filter_map(|t| title_level(&t.text)).max()
}

fn words_ahead<'a>(ctx: &Context<'a>, i: usize) -> impl Iterator<Item = &'a Token> {
    ctx.tokens[(i + 1).min(ctx.len())..]
        .iter()
        .take_while(|t| !STATUS_BREAKS.contains(&t.text.as_str()))
        .filter(|t| t.is_word())
        .take(LOOKAHEAD_WORDS)
}

#[derive(Debug, Clone, Copy)]
struct SentenceStatus {
    current: Level,
    prev: Level,
}

impl Default for SentenceStatus {
    fn default() -> Self {
        Self { current: 1, prev: 1 }
    }
}

impl SentenceStatus {
    fn end_sentence(&mut self) {
        self.prev = self.current;
        self.current = 1;
    }

    fn raise(&mut self, level: Level) {
        self.current = self.current.max(level);
    }

    fn required(&self) -> Level {
        self.current.max(self.prev)
    }
}

#[derive(Debug)]
struct Subject {
    word: String,
    level: Level,
}

pub(crate) fn check(ctx: &Context<'_>, stage: &mut Stage<'_>) -> Result<()> {
    let mut status = SentenceStatus::default();
    for i in 0..ctx.len() {
        let tok = ctx.token(i)?;
        if tok.kind == TokenKind::Punct && STATUS_BREAKS.contains(&tok.text.as_str()) {
            status.end_sentence();
            continue;
        }
        if !tok.is_content() || stage.defers_to_spelling(ctx, i) {
            continue;
        }

        if tok.is_word() {
            let joined = i.checked_sub(1).map(|p| format!("{}{}", ctx.text(p), tok.text));
            let level = title_level(&tok.text).max(joined.as_deref().and_then(title_level));
            if let Some(level) = level {
                status.raise(level);
            }
        }

        if let Some(record) = noun_register(ctx, i, &status) {
            stage.insert(i, record);
        }
        if let Some(record) = verb_register(ctx, i, &status) {
            stage.insert(i, record);
        }
    }
    Ok(())
}

fn noun_register(ctx: &Context<'_>, i: usize, status: &SentenceStatus) -> Option<ErrorRecord> {
    let word = ctx.text(i);
    let forms = NOUN_LEVELS.get(word)?;
    let mut required = status.required();
    if required < 3 {
        required = required.max(level_ahead(ctx, i).unwrap_or(1));
    }
    if required < 3 {
        return None;
    }
    let (_, honorific) = forms.iter().find(|(level, _)| *level == required)?;
    if *honorific == word {
        return None;
    }
    let after_give = ctx.prev_content(i).is_some_and(|k| GIVE_VERBS.contains(&ctx.text(k)));
    if MONEY.contains(&word) && after_give {
        return None;
    }
    debug!(word, honorific, required, "plain noun in honorific context");
    Some(ErrorRecord::register(word, [*honorific], NOUN_CONFIDENCE))
}

/// A classifier right after a numeral counts something; it is not a subject.
fn counted_classifier(ctx: &Context<'_>, k: usize) -> bool {
    let word = ctx.text(k);
    if !(CLASSIFIERS.contains(word) || word == "អ្នក") || k == 0 {
        return false;
    }
    let before = &ctx.tokens[k - 1];
    before.kind == TokenKind::Number || KHMER_NUM_WORDS.contains(before.text.as_str())
}

/// Nearest titled subject within ten words back, stopping early once a
/// subject above the common register is found.
fn subject_before(ctx: &Context<'_>, i: usize) -> Option<Subject> {
    let mut found: Option<Subject> = None;
    let mut seen = 0;
    for k in (0..i).rev() {
        let tok = &ctx.tokens[k];
        if tok.kind == TokenKind::Punct && STATUS_BREAKS.contains(&tok.text.as_str()) {
            break;
        }
        if !tok.is_word() || counted_classifier(ctx, k) {
            continue;
        }
        seen += 1;

        // The joined form only names the subject when it reads as a higher title.
        let single = title_level(&tok.text);
        let joined = k
            .checked_sub(1)
            .map(|p| format!("{}{}", ctx.text(p), tok.text))
            .and_then(|j| title_level(&j).filter(|&l| single.is_none_or(|s| l > s)).map(|l| (j, l)));
        if let Some((word, level)) = joined.or_else(|| single.map(|l| (tok.text.clone(), l))) {
            let level = found.as_ref().map_or(level, |s| s.level.max(level));
            found = Some(Subject { word, level });
        }

        if found.as_ref().is_some_and(|s| s.level > 1) || seen == SUBJECT_LOOKBACK {
            break;
        }
    }
    found
}

fn verb_register(ctx: &Context<'_>, i: usize, status: &SentenceStatus) -> Option<ErrorRecord> {
    let word = ctx.text(i);
    let &(verb_level, action) = VERB_LEVELS.get(word)?;

    let mut subject = subject_before(ctx, i);
    if let Some(s) = subject.as_mut() {
        if NEUTRAL_PRONOUNS.iter().any(|p| s.word.contains(p)) {
            if status.current > s.level {
                s.level = status.current;
            } else if status.prev > s.level {
                s.level = status.prev;
            }
        }
    }
    let (subject_word, subject_level) = match subject {
        Some(s) => (Some(s.word), s.level),
        None => (None, level_ahead(ctx, i).filter(|&l| l > 1)?),
    };

    let mismatch = subject_level > verb_level || (subject_level < 3 && verb_level >= 3);
    if mismatch {
        let correct = action.form(subject_level);
        if correct == word || is_exempt(ctx, i, action, verb_level, subject_level) {
            return None;
        }
        debug!(word, correct, subject_level, verb_level, "verb register mismatch");
        return Some(ErrorRecord::register(word, [correct], VERB_CONFIDENCE));
    }

    if subject_word.as_deref() == Some(SELF) && verb_level > 1 {
        let mut humble: Vec<&str> = Vec::with_capacity(2);
        for form in [action.form(1), action.form(2)] {
            if form != word && !humble.contains(&form) {
                humble.push(form);
            }
        }
        if !humble.is_empty() {
            debug!(word, "first person with an elevated verb");
            return Some(ErrorRecord::register(word, humble, HUMBLE_CONFIDENCE));
        }
    }
    None
}

fn is_exempt(ctx: &Context<'_>, i: usize, action: Action, verb_level: Level, subject_level: Level) -> bool {
    let prev = ctx.prev_content(i).map(|k| ctx.text(k));
    let next = ctx.next_content(i).map(|k| ctx.text(k));

    // A directional after a main verb of the same action, as in "យាង ទៅ".
    let continues_verb = prev
        .and_then(|p| VERB_LEVELS.get(p))
        .is_some_and(|&(level, a)| a == action && level >= subject_level);
    if continues_verb {
        return true;
    }
    if ctx.text(i) == "ទៅ" && next == Some("កាន់") {
        return true;
    }
    if action != Action::Give {
        return false;
    }
    if subject_level < verb_level {
        // Giving up to someone of the verb's register.
        words_ahead(ctx, i).any(|t| title_level(&t.text).is_some_and(|l| l >= verb_level))
    } else if subject_level >= 3 && verb_level <= 2 {
        words_ahead(ctx, i).any(|t| LOW_RECIPIENTS.iter().any(|low| t.text.contains(low)))
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnose::{ErrorMap, ErrorType};
    use crate::test_utils::{run_stage, sample_lexicon};

    fn register_errors(tokens: &[&str]) -> ErrorMap {
        run_stage(&sample_lexicon(), tokens, &ErrorMap::new(), check)
    }

    #[test]
    fn test_royal_noun() {
        let errors = register_errors(&["ស្ដេច", " ", "ឈឺ", " ", "ដៃ", " ", "។"]);
        let rec = errors.get(4).unwrap();
        assert_eq!(rec.suggestions, vec!["ព្រះហស្ត"]);
        assert_eq!(rec.confidence, 0.85);
        assert_eq!(rec.error_type, ErrorType::RegisterMismatch);
    }

    #[test]
    fn test_self_with_royal_verb() {
        let errors = register_errors(&["ខ្ញុំ", " ", "សោយ", " ", "បាយ", " ", "។"]);
        let rec = errors.get(2).unwrap();
        assert_eq!(rec.top_suggestion(), Some("ញ៉ាំ"));
        assert!(!errors.contains(4));
    }

    #[test]
    fn test_humble_rule_for_polite_verb() {
        let errors = register_errors(&["ខ្ញុំ", "ពិសា", "បាយ"]);
        let rec = errors.get(1).unwrap();
        assert_eq!(rec.suggestions, vec!["ញ៉ាំ"]);
        assert_eq!(rec.confidence, 0.90);
    }

    #[test]
    fn test_polite_subject_with_common_verb() {
        let errors = register_errors(&["លោក", "ញ៉ាំ", "បាយ"]);
        assert_eq!(errors.get(1).and_then(|r| r.top_suggestion()), Some("ពិសា"));
        assert!(!errors.contains(2));
    }

    #[test]
    fn test_offering_to_monk_is_fine() {
        assert!(register_errors(&["ខ្ញុំ", "ប្រគេន", "ចង្ហាន់", "ដល់", "ព្រះសង្ឃ"]).is_empty());
    }

    #[test]
    fn test_directional_after_royal_verb() {
        assert!(register_errors(&["ស្ដេច", "យាង", "ទៅ"]).is_empty());
    }

    #[test]
    fn test_towards_is_not_walking() {
        let errors = register_errors(&["ព្រះសង្ឃ", "ទៅ", "កាន់", "វត្ត"]);
        assert!(!errors.contains(1));

        let errors = register_errors(&["ព្រះសង្ឃ", "ទៅ", "វត្ត"]);
        assert_eq!(errors.get(1).and_then(|r| r.top_suggestion()), Some("និមន្ត"));
    }

    #[test]
    fn test_pronoun_inherits_previous_sentence() {
        let errors = register_errors(&["ព្រះសង្ឃ", "។", "គាត់", "ញ៉ាំ"]);
        assert_eq!(errors.get(3).and_then(|r| r.top_suggestion()), Some("ឆាន់"));
    }

    #[test]
    fn test_alms_money_exempt() {
        let errors = register_errors(&["ព្រះសង្ឃ", "ឱ្យ", "លុយ", "ក្មេង"]);
        assert!(!errors.contains(2));
        assert!(!errors.contains(1));
    }

    #[test]
    fn test_title_levels() {
        assert_eq!(title_level("ស្តេច"), Some(4));
        assert_eq!(title_level("ព្រះសង្ឃ"), Some(3));
        assert_eq!(title_level("បាយ"), None);
        assert_eq!(Action::Eat.form(0), "ញ៉ាំ");
    }
}
