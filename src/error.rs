//! Error types for lexicon loading and checking.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T, E = SpellError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum SpellError {
    /// The persisted lexicon bundle does not exist.
    #[error("lexicon bundle not found: {}", .0.display())]
    BundleNotFound(PathBuf),

    /// The bundle exists but could not be decoded.
    #[error("lexicon bundle at {} is corrupt: {source}", path.display())]
    BundleCorrupt {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("lexicon has not been initialized")]
    LexiconNotInitialized,

    /// A diagnosis stage hit an inconsistent token stream.
    #[error("{stage} failed: {message}")]
    Diagnosis { stage: &'static str, message: String },
}

impl SpellError {
    pub(crate) fn diagnosis(stage: &'static str, message: impl Into<String>) -> Self {
        Self::Diagnosis {
            stage,
            message: message.into(),
        }
    }
}

impl From<toml::de::Error> for SpellError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_not_found_message() {
        let err = SpellError::BundleNotFound(PathBuf::from("data/missing.bin"));
        assert_eq!(err.to_string(), "lexicon bundle not found: data/missing.bin");
    }

    #[test]
    fn test_diagnosis_message_names_stage() {
        let err = SpellError::diagnosis("classifier", "token 9 out of range");
        assert_eq!(err.to_string(), "classifier failed: token 9 out of range");
    }
}
