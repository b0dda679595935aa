//! Checker configuration, read from TOML.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::candidates::{DEFAULT_CONCAT_CUTOFF, DEFAULT_CUTOFF, DEFAULT_MAX_CANDIDATES};
use crate::error::{Result, SpellError};

/// Environment variable naming the lexicon bundle.
pub const BUNDLE_ENV: &str = "KHMER_SPELL_BUNDLE";
pub const DEFAULT_BUNDLE_PATH: &str = "data/spell_checker_bundle.bin";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckerConfig {
    pub bundle_path: Option<PathBuf>,
    /// Entries per word-validity memo table.
    pub cache_capacity: usize,
    pub candidate_cache_capacity: usize,
    /// Suggestions kept on a ranked record.
    pub max_suggestions: usize,
    pub max_candidates: usize,
    pub candidate_cutoff: f64,
    pub concat_cutoff: f64,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            bundle_path: None,
            cache_capacity: 4096,
            candidate_cache_capacity: 1024,
            max_suggestions: 5,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            candidate_cutoff: DEFAULT_CUTOFF,
            concat_cutoff: DEFAULT_CONCAT_CUTOFF,
        }
    }
}

impl CheckerConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Explicit path, then `KHMER_SPELL_BUNDLE`, then the default location.
    pub fn resolve_bundle_path(&self) -> PathBuf {
        if let Some(path) = &self.bundle_path {
            return path.clone();
        }
        match std::env::var_os(BUNDLE_ENV) {
            Some(p) if !p.is_empty() => PathBuf::from(p),
            _ => PathBuf::from(DEFAULT_BUNDLE_PATH),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.max_suggestions == 0 || self.max_candidates == 0 {
            return Err(SpellError::Config("suggestion and candidate limits must be positive".into()));
        }
        for (name, cutoff) in [("candidate_cutoff", self.candidate_cutoff), ("concat_cutoff", self.concat_cutoff)] {
            if !(0.0..=1.0).contains(&cutoff) {
                return Err(SpellError::Config(format!("{name} must be within [0, 1], got {cutoff}")));
            }
        }
        Ok(())
    }
}
