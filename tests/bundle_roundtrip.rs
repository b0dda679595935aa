mod common;

use std::fs;

use khmer_spell::{check, init_global_lexicon, CheckerConfig, Lexicon, LexiconBundle, SpellError};
use tempfile::tempdir;

#[test]
fn test_bundle_survives_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("bundle.bin");
    let bundle = common::bundle();
    bundle.write_to(&path).unwrap();

    assert_eq!(LexiconBundle::read_from(&path).unwrap(), bundle);
    assert!(!path.with_extension("partial").exists());

    let lex = Lexicon::load(&path).unwrap();
    assert!(lex.contains("សាលារៀន"));
    assert_eq!(lex.bigram_count("ញ៉ាំ", "បាយ"), 60);
}

#[test]
fn test_missing_and_corrupt_bundles() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("absent.bin");
    assert!(matches!(Lexicon::load(&missing), Err(SpellError::BundleNotFound(_))));

    let corrupt = dir.path().join("corrupt.bin");
    fs::write(&corrupt, [0xFFu8, 0x01, 0x02]).unwrap();
    assert!(matches!(Lexicon::load(&corrupt), Err(SpellError::BundleCorrupt { .. })));
}

#[test]
fn test_config_points_at_bundle() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lex.bin");
    common::bundle().write_to(&path).unwrap();

    let toml = format!("bundle_path = {:?}\nmax_suggestions = 2", path.display().to_string());
    let config = CheckerConfig::from_toml_str(&toml).unwrap();
    assert_eq!(config.resolve_bundle_path(), path);
    assert!(Lexicon::load(&config.resolve_bundle_path()).is_ok());
}

// The only test in this binary that touches the process-wide lexicon.
#[test]
fn test_global_check_after_init() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("global.bin");
    common::bundle().write_to(&path).unwrap();

    let first = init_global_lexicon(&path).unwrap();
    let again = init_global_lexicon(&dir.path().join("ignored.bin")).unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &again));

    let outcome = check("ខ្ញុំ អោយ បាយ");
    assert!(outcome.success);
    let json: serde_json::Value = serde_json::from_str(&outcome.to_json().unwrap()).unwrap();
    assert!(json["errors"].as_object().is_some_and(|e| !e.is_empty()));
}
