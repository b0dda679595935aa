#![allow(dead_code)]

use std::sync::Arc;

use khmer_spell::{CheckOutcome, ErrorRecord, Lexicon, LexiconBundle, SpellChecker};

pub const KNOWN_WORDS: [&str; 16] = [
    "ខ្ញុំ", "អ្នក", "ទៅ", "ញ៉ាំ", "បាយ", "ស្ដេច", "ឈឺ", "ដៃ", "ទេ", "មិន", "សាលារៀន", "ផ្ទះ",
    "ស្អាត", "ទឹក", "ផឹក", "រៀន",
];

pub fn bundle() -> LexiconBundle {
    let mut b = LexiconBundle::default();
    b.add_word("ខ្ញុំ", &["សព្វនាម"], 2500.0)
        .add_word("អ្នក", &["សព្វនាម"], 2000.0)
        .add_word("ទៅ", &["កិរិយាសព្ទ"], 4000.0)
        .add_word("ញ៉ាំ", &["កិរិយាសព្ទ"], 350.0)
        .add_word("បាយ", &["នាម"], 300.0)
        .add_word("ស្ដេច", &["នាម"], 40.0)
        .add_word("ឈឺ", &["កិរិយាសព្ទ"], 120.0)
        .add_word("ដៃ", &["នាម"], 250.0)
        .add_word("សោយ", &["កិរិយាសព្ទ"], 5.0)
        .add_word("ទេ", &["និបាត"], 1800.0)
        .add_word("មិន", &["កិរិយាវិសេសន៍"], 1500.0)
        .add_word("សាលារៀន", &["នាម"], 150.0)
        .add_word("ផ្ទះ", &["នាម"], 400.0)
        .add_word("ស្អាត", &["គុណនាម"], 90.0)
        .add_word("ទឹក", &["នាម"], 500.0)
        .add_word("ផឹក", &["កិរិយាសព្ទ"], 120.0)
        .add_word("រៀន", &["កិរិយាសព្ទ"], 300.0)
        .add_bigram("ញ៉ាំ", "បាយ", 60)
        .add_bigram("ផឹក", "ទឹក", 45);
    b
}

pub fn lexicon() -> Lexicon {
    Lexicon::from_bundle(bundle())
}

pub fn checker() -> SpellChecker {
    SpellChecker::new(Arc::new(lexicon()))
}

pub fn record_for<'a>(outcome: &'a CheckOutcome, token: &str) -> Option<&'a ErrorRecord> {
    let idx = outcome.tokens.iter().position(|t| t == token)?;
    outcome.errors.get(idx)
}
