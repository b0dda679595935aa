//! Map final tokens back onto byte offsets in the caller's original text.

use crate::script::{VOWEL_E_II, VOWEL_OE};

/// Sequentially locate each token in `original`, trying the literal text and
/// then both spellings of the normalized vowel. Tokens that cannot be found
/// get `None` and do not move the cursor.
///
/// Whitespace tokens only match whitespace sitting at the cursor, since the
/// normalizer pads punctuation with spaces the original may not have.
pub fn token_offsets<S: AsRef<str>>(original: &str, tokens: &[S]) -> Vec<Option<usize>> {
    let mut cursor = 0;
    tokens
        .iter()
        .map(|token| {
            let token = token.as_ref();
            let found = locate(original, token, cursor);
            if let Some((start, len)) = found {
                cursor = start + len;
            }
            found.map(|(start, _)| start)
        })
        .collect()
}

fn locate(original: &str, token: &str, cursor: usize) -> Option<(usize, usize)> {
    let haystack = original.get(cursor..)?;
    if !token.is_empty() && token.chars().all(char::is_whitespace) {
        let run: usize = haystack
            .chars()
            .take_while(|c| c.is_whitespace())
            .map(char::len_utf8)
            .sum();
        return (run > 0).then_some((cursor, run));
    }
    let variants = [
        Some(token.to_string()),
        token.contains(VOWEL_OE).then(|| token.replace(VOWEL_OE, VOWEL_E_II)),
        token.contains(VOWEL_E_II).then(|| token.replace(VOWEL_E_II, VOWEL_OE)),
    ];
    variants
        .into_iter()
        .flatten()
        .filter(|form| !form.is_empty())
        .find_map(|form| haystack.find(&form).map(|at| (cursor + at, form.len())))
}
