//! Spelling, word-boundary and register checking for Khmer text.
//!
//! Khmer is written without spaces between words, so every check starts by
//! inferring the words: [`normalize_text`], [`viterbi_segment`] and
//! [`repair_tokens`] produce the token sequence, [`tag_tokens`] types it, and
//! the diagnosis cascade turns it into correction records. [`SpellChecker`]
//! runs the whole pipeline over a shared [`Lexicon`].

pub mod candidates;
pub mod checker;
pub mod config;
pub mod diagnose;
pub mod error;
pub mod lexicon;
pub mod logging;
pub mod normalize;
pub mod offsets;
pub mod repair;
pub mod script;
pub mod segment;
pub mod similarity;
pub mod tables;
pub mod tagger;
pub mod validity;

#[cfg(feature = "python")]
mod python;

#[cfg(test)]
mod test_utils;

pub use candidates::{generate_candidates, generate_concat_candidates, rerank_candidates, Candidate, RankedCandidate};
pub use checker::{check, global_checker, CheckOutcome, SpellChecker};
pub use config::CheckerConfig;
pub use diagnose::{ErrorMap, ErrorRecord, ErrorType};
pub use error::{Result, SpellError};
pub use lexicon::{global_lexicon, init_global_lexicon, Lexicon, LexiconBundle};
pub use normalize::normalize_text;
pub use offsets::token_offsets;
pub use repair::repair_tokens;
pub use segment::viterbi_segment;
pub use tagger::{tag_tokens, PosTag, Token, TokenKind};
