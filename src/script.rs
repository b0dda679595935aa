//! Codepoint classification for Khmer text.
//!
//! Everything downstream reasons in terms of these ranges: the segmenter
//! prices unknown characters by block, the repairer glues dependent marks,
//! and the orthography checks look at consonant series.

/// Subscript joiner (coeng). Binds the following consonant below the previous one.
pub const COENG: char = '\u{17D2}';

/// Two-codepoint vowel spelling that renders identically to [`VOWEL_OE`].
pub const VOWEL_E_II: &str = "\u{17C1}\u{17B8}";
/// Canonical single-codepoint form of [`VOWEL_E_II`].
pub const VOWEL_OE: &str = "\u{17BE}";

/// Coeng + Da, historically interchangeable with [`COENG_TA`].
pub const COENG_DA: &str = "\u{17D2}\u{178A}";
pub const COENG_TA: &str = "\u{17D2}\u{178F}";

pub const MUUSIKATOAN: char = '\u{17C9}';
pub const TRIISAP: char = '\u{17CA}';
pub const BANTOC: char = '\u{17CB}';

/// The only single-syllable word that survives the bare-consonant filter.
pub const LEXICALIZED_SINGLE: &str = "ក៏";

/// Zero-width space, common in copy-pasted Khmer.
pub const ZWSP: char = '\u{200B}';

const SERIES_A: &str = "កខចឆដឋណតថបសហឡអ";
const SERIES_B: &str = "គឃងជឈញឌឍទធនពភមយរលវ";

/// Primary Khmer block, U+1780..=U+17FF.
#[inline]
pub fn is_khmer(c: char) -> bool {
    ('\u{1780}'..='\u{17FF}').contains(&c)
}

/// Primary block or Khmer Symbols (U+19E0..=U+19FF).
#[inline]
pub fn is_khmer_or_symbol(c: char) -> bool {
    is_khmer(c) || ('\u{19E0}'..='\u{19FF}').contains(&c)
}

#[inline]
pub fn is_consonant(c: char) -> bool {
    ('\u{1780}'..='\u{17A2}').contains(&c)
}

/// Dependent vowels and signs that cannot start a word.
#[inline]
pub fn is_dependent(c: char) -> bool {
    ('\u{17B4}'..='\u{17D3}').contains(&c)
}

/// Letters, vowels and signs, excluding punctuation and digits.
#[inline]
pub fn is_letter(c: char) -> bool {
    ('\u{1780}'..='\u{17D3}').contains(&c)
}

#[inline]
pub fn is_series_a(c: char) -> bool {
    SERIES_A.contains(c)
}

#[inline]
pub fn is_series_b(c: char) -> bool {
    SERIES_B.contains(c)
}

/// Non-empty run of Khmer letters only.
pub fn is_letter_sequence(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_letter)
}

/// Non-empty run of ASCII or Khmer digits.
pub fn is_digit_run(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_digit() || ('\u{17E0}'..='\u{17E9}').contains(&c))
}

pub fn contains_khmer(s: &str) -> bool {
    s.chars().any(is_khmer)
}

/// Exactly one base consonant, nothing else.
pub fn is_bare_consonant(s: &str) -> bool {
    let mut chars = s.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if is_consonant(c))
}

/// Exactly one dependent mark, nothing else.
pub fn is_bare_dependent(s: &str) -> bool {
    let mut chars = s.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if is_dependent(c))
}

/// Trim surrounding whitespace and drop zero-width spaces.
pub fn clean_token(s: &str) -> String {
    s.trim().chars().filter(|&c| c != ZWSP).collect()
}

/// Spellings with every Coeng-Da written as Coeng-Ta, and every Coeng-Ta as
/// Coeng-Da. A word holding both subscripts gets both.
pub fn coeng_variants(word: &str) -> Vec<String> {
    let mut variants = Vec::new();
    if word.contains(COENG_DA) {
        variants.push(word.replace(COENG_DA, COENG_TA));
    }
    if word.contains(COENG_TA) {
        variants.push(word.replace(COENG_TA, COENG_DA));
    }
    variants
}

/// Fold Coeng-Da onto Coeng-Ta so both spellings compare equal.
pub fn fold_coeng(word: &str) -> String {
    word.replace(COENG_DA, COENG_TA)
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_ranges() {
        assert!(is_khmer('ក'));
        assert!(is_khmer('។'));
        assert!(!is_khmer('a'));
        assert!(is_khmer_or_symbol('\u{19E0}'));
        assert!(is_consonant('អ'));
        assert!(!is_consonant('ា'));
        assert!(is_dependent('ា'));
        assert!(is_dependent(COENG));
        assert!(!is_letter('។'));
        assert!(!is_letter('០'));
    }

    #[test]
    fn test_letter_and_digit_runs() {
        assert!(is_letter_sequence("សាលារៀន"));
        assert!(!is_letter_sequence("សាលា។"));
        assert!(!is_letter_sequence(""));
        assert!(is_digit_run("2024"));
        assert!(is_digit_run("២០២៤"));
        assert!(!is_digit_run("២០.២៤"));
    }

    #[test]
    fn test_bare_forms() {
        assert!(is_bare_consonant("ក"));
        assert!(!is_bare_consonant("ក៏"));
        assert!(!is_bare_consonant("កា"));
        assert!(is_bare_dependent("ា"));
        assert!(!is_bare_dependent("កា"));
    }

    #[test]
    fn test_coeng_variants() {
        assert_eq!(coeng_variants("ស្ដេច"), vec!["ស្តេច"]);
        assert_eq!(coeng_variants("ស្តេច"), vec!["ស្ដេច"]);
        assert!(coeng_variants("បាយ").is_empty());
        let mixed = "ក\u{17D2}\u{178A}ា\u{17D2}\u{178F}";
        assert_eq!(
            coeng_variants(mixed),
            vec!["ក\u{17D2}\u{178F}ា\u{17D2}\u{178F}", "ក\u{17D2}\u{178A}ា\u{17D2}\u{178A}"]
        );
        assert_eq!(fold_coeng("ស្ដេច"), fold_coeng("ស្តេច"));
    }

    #[test]
    fn test_clean_token() {
        assert_eq!(clean_token(" ខ្ញុំ\u{200B} "), "ខ្ញុំ");
    }
}
