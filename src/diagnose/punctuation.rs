//! Punctuation placement and statement/question marks.

use tracing::debug;

use super::{Context, ErrorRecord, ErrorType, Stage};
use crate::error::Result;
use crate::tagger::TokenKind;

const KHAN: &str = "។";
const BARIYOOSAN: &str = "៕";
const COLON: &str = "៖";
const QUESTION: &str = "?";
const REPEAT: &str = "ៗ";

const SPACED_MARKS: [&str; 6] = [KHAN, BARIYOOSAN, COLON, "!", QUESTION, REPEAT];
const SENTENCE_MARKS: [&str; 3] = [KHAN, BARIYOOSAN, QUESTION];
/// Closing characters allowed to touch a mark.
const CLOSERS: [char; 4] = [')', ']', '»', '"'];

const QUESTION_STARTERS: [&str; 5] = ["តើ", "ហេតុអ្វី", "ម្តេច", "តាំងពីអង្កាល់", "ចូរ"];
const NEGATIONS: [&str; 7] = ["មិន", "គ្មាន", "ពុំ", "មិនបាន", "មិនមែន", "ពុំមែន", "អត់"];
const FINAL_PARTICLES: [&str; 7] = ["មែនទេ", "ឬ", "ដែរឬទេ", "ណា", "អត់", "រួច", "នៅ"];
/// Particles that are also ordinary verbs, read as questions only after a starter.
const AMBIGUOUS_PARTICLES: [&str; 2] = ["រួច", "នៅ"];
const INTERROGATIVES: [&str; 6] = ["អ្វី", "ណា", "ប៉ុន្មាន", "ម៉េច", "ទេ", "មែនទេ"];
const NEGATIVE_FINAL: &str = "ទេ";

const SPACING_CONFIDENCE: f64 = 0.85;

pub(crate) fn check(ctx: &Context<'_>, stage: &mut Stage<'_>) -> Result<()> {
    let mut sentence_start = 0;
    let mut last_content: Option<usize> = None;

    for i in 0..ctx.len() {
        let tok = ctx.token(i)?;
        if tok.is_content() {
            last_content = Some(i);
            continue;
        }
        if tok.kind != TokenKind::Punct {
            continue;
        }
        let mark = tok.text.as_str();

        if mark == BARIYOOSAN && ctx.next_content(i).is_some() {
            stage.insert(i, ErrorRecord::spelling(mark, [KHAN], 0.85));
        }
        if mark == COLON && ctx.next_content(i).is_none() {
            stage.insert(i, ErrorRecord::spelling(mark, [KHAN], 0.80));
        }
        if SPACED_MARKS.contains(&mark) {
            spacing(ctx, stage, i)?;
        }
        if SENTENCE_MARKS.contains(&mark) {
            sentence_mark(ctx, stage, i, sentence_start, last_content);
            sentence_start = i + 1;
            last_content = None;
        }
    }
    Ok(())
}

/// Whitespace around a mark, judged on the caller's text.
fn spacing(ctx: &Context<'_>, stage: &mut Stage<'_>, i: usize) -> Result<()> {
    let Some(pos) = ctx.offset(i) else {
        return Ok(());
    };
    let mark = ctx.token(i)?.text.as_str();
    let original = ctx.original;

    if mark != REPEAT {
        let after = original.get(pos + mark.len()..).and_then(|rest| rest.chars().next());
        if let Some(c) = after {
            let touches = !c.is_whitespace()
                && !SPACED_MARKS.iter().any(|m| m.starts_with(c))
                && !CLOSERS.contains(&c);
            if touches && !stage.contains(i) {
                debug!(mark, "no space after mark");
                stage.insert(i, ErrorRecord::contextual(mark, [format!("{mark} ")], SPACING_CONFIDENCE));
            }
        }
    }

    let before = original.get(..pos).unwrap_or("");
    let run_start = before.trim_end().len();
    if run_start < pos && !stage.contains(i) {
        debug!(mark, "space before mark");
        let shown = format!("{}{mark}", &before[run_start..]);
        stage.insert(
            i,
            ErrorRecord::contextual(&shown, [mark], SPACING_CONFIDENCE).with_offset(run_start),
        );
    }
    Ok(())
}

/// Choose between statement and question marks from the sentence's first and
/// last words.
fn sentence_mark(ctx: &Context<'_>, stage: &mut Stage<'_>, i: usize, start: usize, last: Option<usize>) {
    let mark = ctx.text(i);
    let first_word = (start..i)
        .find(|&k| ctx.tokens[k].is_content())
        .map_or("", |k| ctx.text(k));
    let last_word = last.map_or("", |k| ctx.text(k));
    let opens_question = QUESTION_STARTERS.contains(&first_word);

    let negated = last_word == NEGATIVE_FINAL
        && last.is_some_and(|end| (start..end).any(|k| NEGATIONS.contains(&ctx.text(k))));

    let mut question = opens_question || (last_word == NEGATIVE_FINAL && !negated);
    if !question && FINAL_PARTICLES.contains(&last_word) {
        question = !AMBIGUOUS_PARTICLES.contains(&last_word) || opens_question;
    }
    if !question && INTERROGATIVES.contains(&last_word) {
        question = last_word != NEGATIVE_FINAL || !negated;
    }

    if mark == KHAN && question {
        let replaceable = stage
            .get(i)
            .is_none_or(|r| r.error_type == ErrorType::Contextual);
        if replaceable {
            debug!(first_word, last_word, "question ends with a statement mark");
            stage.insert(i, ErrorRecord::contextual(mark, [QUESTION], 0.90));
        }
    } else if mark == QUESTION && !question {
        if last_word == NEGATIVE_FINAL && negated {
            stage.insert(i, ErrorRecord::contextual(mark, [KHAN], 0.95));
        } else if !FINAL_PARTICLES.contains(&last_word) && !INTERROGATIVES.contains(&last_word) {
            stage.insert(i, ErrorRecord::contextual(mark, [KHAN], 0.85));
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::diagnose::ErrorMap;
    use crate::test_utils::{context_for, run_stage, sample_lexicon};
    use crate::validity::WordCache;

    fn marks(tokens: &[&str]) -> ErrorMap {
        run_stage(&sample_lexicon(), tokens, &ErrorMap::new(), check)
    }

    #[rstest]
    #[case::starter(&["តើ", "អ្នក", "ទៅ", "ណា", "។"], 4, "?", 0.90)]
    #[case::bare_negative_final(&["អ្នក", "ទៅ", "ទេ", "។"], 3, "?", 0.90)]
    #[case::negated_statement(&["ខ្ញុំ", "មិន", "ទៅ", "ទេ", "?"], 4, "។", 0.95)]
    #[case::plain_statement(&["ខ្ញុំ", "ញ៉ាំ", "បាយ", "?"], 3, "។", 0.85)]
    #[case::early_end_mark(&["ខ្ញុំ", "ទៅ", "៕", "ខ្ញុំ", "ញ៉ាំ"], 2, "។", 0.85)]
    #[case::dangling_colon(&["ខ្ញុំ", "ញ៉ាំ", "៖"], 2, "។", 0.80)]
    fn test_mark_choice(#[case] tokens: &[&str], #[case] idx: usize, #[case] fix: &str, #[case] confidence: f64) {
        let errors = marks(tokens);
        let rec = errors.get(idx).unwrap();
        assert_eq!(rec.top_suggestion(), Some(fix));
        assert_eq!(rec.confidence, confidence);
    }

    #[rstest]
    #[case::real_question(&["តើ", "គាត់", "ទៅ", "?"])]
    #[case::particle(&["គាត់", "ទៅ", "ឬ", "?"])]
    #[case::statement(&["ខ្ញុំ", "ញ៉ាំ", "បាយ", "។"])]
    #[case::last_mark(&["ខ្ញុំ", "ញ៉ាំ", "បាយ", "៕"])]
    #[case::ambiguous_particle(&["ខ្ញុំ", "ញ៉ាំ", "បាយ", "រួច", "។"])]
    fn test_no_mark_change(#[case] tokens: &[&str]) {
        assert!(marks(tokens).is_empty());
    }

    #[test]
    fn test_each_sentence_judged_alone() {
        let errors = marks(&["តើ", "គាត់", "ទៅ", "?", "ខ្ញុំ", "ញ៉ាំ", "បាយ", "?"]);
        assert!(!errors.contains(3));
        assert_eq!(errors.get(7).and_then(|r| r.top_suggestion()), Some("។"));
    }

    fn spacing_errors(text: &str) -> (Vec<String>, ErrorMap) {
        let lex = sample_lexicon();
        let cache = WordCache::default();
        let fixture = context_for(&lex, &cache, text);
        let prior = ErrorMap::new();
        let mut stage = Stage::new(&prior);
        check(&fixture.context(), &mut stage).unwrap();
        (fixture.texts(), stage.into_staged())
    }

    #[test]
    fn test_missing_space_after_mark() {
        let (tokens, errors) = spacing_errors("ខ្ញុំញ៉ាំបាយ។ខ្ញុំទៅ");
        let idx = tokens.iter().position(|t| t == "។").unwrap();
        let rec = errors.get(idx).unwrap();
        assert_eq!(rec.suggestions, vec!["។ "]);
        assert_eq!(rec.error_type, ErrorType::Contextual);
    }

    #[test]
    fn test_space_before_mark() {
        let text = "ខ្ញុំទៅ  ។";
        let (tokens, errors) = spacing_errors(text);
        let idx = tokens.iter().position(|t| t == "។").unwrap();
        let rec = errors.get(idx).unwrap();
        assert_eq!(rec.original, "  ។");
        assert_eq!(rec.suggestions, vec!["។"]);
        assert_eq!(rec.offset, Some("ខ្ញុំទៅ".len()));
    }

    #[test]
    fn test_well_spaced_text_passes() {
        let (_, errors) = spacing_errors("ខ្ញុំញ៉ាំបាយ។ ខ្ញុំទៅ។");
        assert!(errors.is_empty());
    }
}
