//! Text normalization ahead of segmentation.

use lazy_static::lazy_static;
use regex::Regex;

use crate::script::{VOWEL_E_II, VOWEL_OE};

lazy_static! {
    static ref PUNCT: Regex = Regex::new(r#"([!?:;"«»(){}\[\]%,។៕៖ៗ\-])"#).unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Canonicalize the split vowel, pad punctuation with spaces and collapse
/// whitespace runs. Leading and trailing whitespace is kept.
pub fn normalize_text(text: &str) -> String {
    let text = text.replace(VOWEL_E_II, VOWEL_OE);
    let padded = PUNCT.replace_all(&text, " $1 ");
    WHITESPACE.replace_all(&padded, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vowel_collapse() {
        assert_eq!(normalize_text("\u{1785}\u{17C1}\u{17B8}\u{1789}"), "\u{1785}\u{17BE}\u{1789}");
    }

    #[test]
    fn test_punctuation_padding() {
        assert_eq!(normalize_text("ខ្ញុំទៅ។"), "ខ្ញុំទៅ ។ ");
        assert_eq!(normalize_text("តើទៅណា?"), "តើទៅណា ? ");
        assert_eq!(normalize_text("ក(ខ)"), "ក ( ខ ) ");
        assert_eq!(normalize_text("ចប់៕ទៀត"), "ចប់ ៕ ទៀត");
    }

    #[test]
    fn test_whitespace_collapse_keeps_edges() {
        assert_eq!(normalize_text("  ក   ខ\n\nគ "), " ក ខ គ ");
    }

    #[test]
    fn test_idempotent() {
        let once = normalize_text("ស្ដេច ឈឺដៃ។ តើ«គាត់»ទៅណា?");
        assert_eq!(normalize_text(&once), once);
    }
}
