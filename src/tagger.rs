//! Token typing and part-of-speech tagging.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::script::contains_khmer;
use crate::tables::{MANUAL_TAGS, POS_MAP, PRONOUNS, WHITELIST};
use crate::validity::Validator;

lazy_static! {
    static ref NUMBER: Regex = Regex::new(r"^[0-9០-៩.]+$").unwrap();
}

const PUNCT_SET: [&str; 28] = [
    ".", ",", "?", "!", "។", "៕", "៖", "ៗ", "(", ")", "[", "]", "{", "}", "«", "»", "\"", "'",
    "…", "—", "-", "%", "$", "+", "=", "*", "/", "៛",
];

/// Coarse part-of-speech tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PosTag {
    #[serde(rename = "N")]
    Noun,
    #[serde(rename = "V")]
    Verb,
    #[serde(rename = "ADJ")]
    Adj,
    #[serde(rename = "ADV")]
    Adv,
    #[serde(rename = "PRON")]
    Pron,
    #[serde(rename = "PREP")]
    Prep,
    #[serde(rename = "CONJ")]
    Conj,
    #[serde(rename = "PART")]
    Part,
    #[serde(rename = "NUM")]
    Num,
    #[serde(rename = "CLF")]
    Clf,
    #[serde(rename = "INTJ")]
    Intj,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenKind {
    Word,
    #[serde(rename = "NUM")]
    Number,
    Punct,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    pub pos: BTreeSet<PosTag>,
    pub in_dict: bool,
}

impl Token {
    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }

    /// Words and numbers; everything the contextual rules look at.
    pub fn is_content(&self) -> bool {
        matches!(self.kind, TokenKind::Word | TokenKind::Number)
    }

    pub fn is_other(&self) -> bool {
        self.kind == TokenKind::Other
    }

    pub fn has_pos(&self, tag: PosTag) -> bool {
        self.pos.contains(&tag)
    }

    pub fn is_verb_like(&self) -> bool {
        self.has_pos(PosTag::Verb) || self.has_pos(PosTag::Adj)
    }
}

/// Classify a token by inspecting its characters.
pub fn classify_token(token: &str) -> TokenKind {
    if PUNCT_SET.contains(&token) {
        return TokenKind::Punct;
    }
    if NUMBER.is_match(token) {
        return TokenKind::Number;
    }
    if token.chars().all(char::is_whitespace) {
        return TokenKind::Other;
    }
    if contains_khmer(token) {
        return TokenKind::Word;
    }
    TokenKind::Other
}

/// Map raw dictionary labels onto the coarse tag set.
pub fn normalize_pos<S: AsRef<str>>(raw: &[S]) -> BTreeSet<PosTag> {
    raw.iter()
        .filter_map(|p| POS_MAP.get(p.as_ref().trim()).copied())
        .collect()
}

pub fn tag_token(text: &str, validator: &Validator<'_>) -> Token {
    let kind = classify_token(text);
    let mut pos = BTreeSet::new();
    let mut in_dict = false;

    match kind {
        TokenKind::Word => {
            pos = normalize_pos(validator.lexicon().raw_pos(text));
            if let Some(tags) = MANUAL_TAGS.get(text) {
                pos.extend(tags.iter().copied());
            } else if WHITELIST.contains(text) && pos.is_empty() {
                pos.insert(PosTag::Noun);
            }
            in_dict = validator.is_known(text) || WHITELIST.contains(text);
        }
        TokenKind::Number => {
            pos.insert(PosTag::Num);
            in_dict = true;
        }
        TokenKind::Punct => in_dict = true,
        TokenKind::Other => {}
    }
    if PRONOUNS.contains(text) {
        pos.insert(PosTag::Pron);
    }

    Token {
        text: text.to_string(),
        kind,
        pos,
        in_dict,
    }
}

pub fn tag_tokens<S: AsRef<str>>(tokens: &[S], validator: &Validator<'_>) -> Vec<Token> {
    tokens.iter().map(|t| tag_token(t.as_ref(), validator)).collect()
}
