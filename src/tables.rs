//! Hand-curated override tables.
//!
//! These sit on top of the statistical lexicon: the typo map and whitelist
//! win over anything the bundle says, the banned set is filtered out of it,
//! and the grammar word lists drive the contextual rules.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;

use crate::tagger::PosTag;

lazy_static! {
    /// Frequent misspellings and their single correction.
    pub static ref COMMON_TYPOS: HashMap<&'static str, &'static str> = [
        ("អោយ", "ឱ្យ"),
        ("ពត៌មាន", "ព័ត៌មាន"),
        ("ប្រើប្រាស", "ប្រើប្រាស់"),
        ("សប្តាហ៏", "សប្តាហ៍"),
        ("ប្រយោជ", "ប្រយោជន៍"),
        ("កម្មវិធិ", "កម្មវិធី"),
        ("សំខាន", "សំខាន់"),
        ("ប្រទែស", "ប្រទេស"),
        ("រដ្ធាភិបាល", "រដ្ឋាភិបាល"),
        ("វិទ្យាល៍យ", "វិទ្យាល័យ"),
        ("ការិយាល័", "ការិយាល័យ"),
        ("អរគុន", "អរគុណ"),
        ("សួរស្តី", "សួស្តី"),
        ("ញុំា", "ញ៉ាំ"),
        ("បញ្ហារ", "បញ្ហា"),
        ("ភាសារ", "ភាសា"),
        ("វប្បធម៏", "វប្បធម៌"),
        ("ជំរាបសួរ", "ជម្រាបសួរ"),
        ("ទំនាក់ទំនងន៍", "ទំនាក់ទំនង"),
        ("សុខភាភ", "សុខភាព"),
    ]
    .into_iter()
    .collect();

    /// Strings never flagged as spelling errors: place names, loanwords, brands.
    pub static ref WHITELIST: HashSet<&'static str> = [
        "កម្ពុជា", "ភ្នំពេញ", "សៀមរាប", "បាត់ដំបង", "កំពង់ចាម", "ព្រះសីហនុ",
        "អង្គរវត្ត", "តូនលេសាប", "មេគង្គ",
        "អ៊ីនធឺណិត", "ហ្វេសប៊ុក", "យូធូប", "តេឡេក្រាម", "កូវីដ", "អេស៊ាន",
        "ហ៊ុន", "ណាស់", "ៗ",
    ]
    .into_iter()
    .collect();

    /// Never suggested and never accepted as words.
    pub static ref BANNED_WORDS: HashSet<&'static str> = [
        "អាឆ្កួត", "អាល្ងង់", "អាឆ្កែ", "មីឆ្កួត", "អាចោរ",
    ]
    .into_iter()
    .collect();

    /// Function words that must not be swallowed by a fuzzy merge.
    pub static ref STOPWORDS: HashSet<&'static str> = [
        "និង", "នឹង", "នៅ", "ក្នុង", "ជា", "បាន", "ដែល", "នៃ", "ពី", "ទៅ", "មក",
        "ថា", "ដើម្បី", "ហើយ", "ក៏", "ដែរ", "ទេ", "គឺ", "ឬ", "ដល់", "នូវ", "ផង",
        "តែ", "មិន", "ដ៏", "ៗ",
    ]
    .into_iter()
    .collect();

    /// Productive nominalizing prefixes; a known stem after one of these is a compound.
    pub static ref SAFE_PREFIXES: Vec<&'static str> = vec![
        "សេចក្តី", "សេចក្ដី", "ការ", "ភាព", "អ្នក", "ក្រុម", "ព្រះ", "មហា", "អនុ", "សហ", "អន្តរ",
    ];

    pub static ref PRONOUNS: HashSet<&'static str> = [
        "ខ្ញុំ", "យើង", "យើងខ្ញុំ", "គាត់", "គេ", "វា", "ឯង", "អ្នក", "នាង", "ពួកគេ",
        "ពួកយើង", "ពួកគាត់", "លោក", "ទ្រង់", "អាត្មា", "ខ្លួន",
    ]
    .into_iter()
    .collect();

    /// Titles that usually precede a personal name.
    pub static ref HONORIFICS: HashSet<&'static str> = [
        "លោក", "លោកស្រី", "អ្នកស្រី", "អ្នកនាង", "កញ្ញា", "ឯកឧត្តម", "លោកជំទាវ",
        "សម្តេច", "សម្ដេច", "ព្រះ", "លោកគ្រូ", "អ្នកគ្រូ", "បណ្ឌិត", "ឧកញ៉ា",
    ]
    .into_iter()
    .collect();

    pub static ref COMMON_NAMES: HashSet<&'static str> = [
        "សុខ", "ចាន់", "ដារ៉ា", "សុភា", "វិចិត្រ", "បុប្ផា", "រតនា", "សុវណ្ណ",
        "ពិសិដ្ឋ", "ស្រីមុំ", "វណ្ណា", "សំណាង", "សុផល", "ធីតា",
    ]
    .into_iter()
    .collect();

    pub static ref TECHNICAL_TERMS: HashSet<&'static str> = [
        "កុំព្យូទ័រ", "ទូរស័ព្ទ", "បច្ចេកវិទ្យា", "ឌីជីថល", "កម្មវិធី", "គេហទំព័រ",
        "អ៊ីមែល", "ប្រព័ន្ធ", "ទិន្នន័យ", "អេឡិចត្រូនិក",
    ]
    .into_iter()
    .collect();

    /// Words missing from the bundle, with a usable frequency.
    pub static ref PATCH_WORDS: Vec<(&'static str, f64)> = vec![
        ("ហ្នឹង", 120.0),
        ("ញ៉ាំ", 350.0),
        ("ប្រគេន", 40.0),
        ("និមន្ត", 35.0),
        ("ស្រង់ទឹក", 2.0),
        ("សោយទិវង្គត", 1.5),
    ];

    /// Compounds the segmenter would otherwise split; frequency is raised to at least this.
    pub static ref FREQ_BOOSTS: Vec<(&'static str, f64)> = vec![
        ("សាលារៀន", 500.0),
        ("មន្ទីរពេទ្យ", 300.0),
        ("ការងារ", 800.0),
        ("ប្រជាជន", 600.0),
        ("រដ្ឋាភិបាល", 700.0),
        ("សាកលវិទ្យាល័យ", 200.0),
        ("ព្រះសង្ឃ", 150.0),
        ("ព្រះហស្ត", 20.0),
    ];

    /// Dictionary part-of-speech labels mapped onto the coarse tag set.
    pub static ref POS_MAP: HashMap<&'static str, PosTag> = [
        ("នាម", PosTag::Noun),
        ("n", PosTag::Noun),
        ("noun", PosTag::Noun),
        ("កិរិយាសព្ទ", PosTag::Verb),
        ("កិរិយា", PosTag::Verb),
        ("v", PosTag::Verb),
        ("verb", PosTag::Verb),
        ("គុណនាម", PosTag::Adj),
        ("adj", PosTag::Adj),
        ("កិរិយាវិសេសន៍", PosTag::Adv),
        ("adv", PosTag::Adv),
        ("សព្វនាម", PosTag::Pron),
        ("pron", PosTag::Pron),
        ("ធ្នាក់", PosTag::Prep),
        ("prep", PosTag::Prep),
        ("ឈ្នាប់", PosTag::Conj),
        ("conj", PosTag::Conj),
        ("និបាត", PosTag::Part),
        ("part", PosTag::Part),
        ("ឧទានសព្ទ", PosTag::Intj),
        ("intj", PosTag::Intj),
        ("លេខ", PosTag::Num),
        ("num", PosTag::Num),
        ("ចំនួន", PosTag::Num),
        ("clf", PosTag::Clf),
    ]
    .into_iter()
    .collect();

    /// Per-word tag patches applied after the dictionary tags.
    pub static ref MANUAL_TAGS: HashMap<&'static str, &'static [PosTag]> = [
        ("និង", &[PosTag::Conj][..]),
        ("នឹង", &[PosTag::Adv][..]),
        ("ហ្នឹង", &[PosTag::Part][..]),
        ("នៅ", &[PosTag::Verb, PosTag::Prep][..]),
        ("នូវ", &[PosTag::Prep][..]),
        ("ដល់", &[PosTag::Prep, PosTag::Verb][..]),
        ("ដ៏", &[PosTag::Part][..]),
        ("នៃ", &[PosTag::Prep][..]),
        ("ន័យ", &[PosTag::Noun][..]),
        ("ពី", &[PosTag::Prep][..]),
        ("ពីរ", &[PosTag::Num][..]),
        ("ដែល", &[PosTag::Pron][..]),
        ("ដែរ", &[PosTag::Adv][..]),
        ("ទេ", &[PosTag::Part][..]),
        ("តើ", &[PosTag::Part][..]),
        ("ឈឺ", &[PosTag::Verb, PosTag::Adj][..]),
        ("ល្អ", &[PosTag::Adj][..]),
    ]
    .into_iter()
    .collect();

    /// Word pairs that are always a legitimate split.
    pub static ref MANUAL_BIGRAMS: HashSet<&'static str> = [
        "ទៅ ផ្សារ", "ញ៉ាំ បាយ", "ផឹក ទឹក", "ទៅ រៀន", "ធ្វើ ការ", "រៀន ភាសា", "មើល សៀវភៅ",
    ]
    .into_iter()
    .collect();

    /// Phrases that are always wrong, with their correction. A correction
    /// without a space is a merge of the two words.
    pub static ref SUSPICIOUS_BIGRAMS: HashMap<&'static str, &'static str> = [
        ("សា លា", "សាលា"),
        ("ប្រ ទេស", "ប្រទេស"),
        ("រដ្ឋា ភិបាល", "រដ្ឋាភិបាល"),
        ("ការ ងារ", "ការងារ"),
        ("សុខ ភាព", "សុខភាព"),
        ("និង ទៅ", "នឹង ទៅ"),
        ("និង មក", "នឹង មក"),
        ("មក ពីរ", "មក ពី"),
        ("ចេញ ពីរ", "ចេញ ពី"),
    ]
    .into_iter()
    .collect();

    /// Sentence-terminal marks.
    pub static ref SENTENCE_END: HashSet<&'static str> = ["។", "៕", "?", "!"].into_iter().collect();

    /// Counting classifiers.
    pub static ref CLASSIFIERS: HashSet<&'static str> = [
        "នាក់", "រូប", "អង្គ", "ព្រះ", "ក្បាល", "ច្បាប់", "គ្រឿង", "ដុំ", "បន្ទះ", "សន្លឹក",
        "ដើម", "ផ្លែ", "ខ្នង", "ល្វែង", "គ្រាប់", "គូ", "ប្រអប់", "កំប៉ុង", "ដប", "ម៉ោង",
        "នាទី", "វិនាទី", "ដុល្លារ", "រៀល", "បាត", "ឆ្នាំ", "ខែ", "ថ្ងៃ", "ដង", "លើក", "ភាគរយ",
    ]
    .into_iter()
    .collect();

    /// Spelled-out numerals.
    pub static ref KHMER_NUM_WORDS: HashSet<&'static str> = [
        "មួយ", "ពីរ", "បី", "បួន", "ប្រាំ", "ប្រាំមួយ", "ប្រាំពីរ", "ប្រាំបី", "ប្រាំបួន",
        "ដប់", "ម្ភៃ", "សាមសិប", "សែសិប", "ហាសិប", "រយ", "ពាន់", "ម៉ឺន", "សែន", "លាន",
    ]
    .into_iter()
    .collect();

    /// Places and times that take the location preposition, not the object marker.
    pub static ref LOC_TIME_WORDS: HashSet<&'static str> = [
        "ផ្ទះ", "សាលារៀន", "ផ្សារ", "មន្ទីរពេទ្យ", "ក្រុង", "ខេត្ត", "ភូមិ", "វត្ត", "ការិយាល័យ",
        "ក្នុង", "លើ", "ក្រោម", "ក្បែរ", "ខាង", "មុខ", "ក្រៅ", "ឯ",
        "ព្រឹក", "ល្ងាច", "យប់", "ថ្ងៃ", "ម៉ោង", "ពេល", "ឆ្នាំ", "ខែ", "សប្តាហ៍",
        "ភ្នំពេញ", "សៀមរាប", "កម្ពុជា",
    ]
    .into_iter()
    .collect();

    pub static ref INTRANSITIVE_VERBS: HashSet<&'static str> = [
        "ដេក", "អង្គុយ", "ឈរ", "រស់", "ស្នាក់", "ធ្វើការ", "រៀន", "លេង", "សម្រាក", "ស្លាប់",
        "កើត", "យំ", "សើច", "ដើរ", "រត់",
    ]
    .into_iter()
    .collect();

    pub static ref AUXILIARIES: HashSet<&'static str> = [
        "បាន", "កំពុង", "នឹង", "ត្រូវ", "គួរ", "អាច", "ធ្លាប់", "ចង់", "មិន", "ពុំ",
    ]
    .into_iter()
    .collect();

    pub static ref MOTION_VERBS: HashSet<&'static str> = [
        "មក", "ទៅ", "ចេញ", "ត្រឡប់", "វិល", "ដើរ", "ធ្វើដំណើរ", "រត់", "ផ្លាស់", "យក", "ទទួល",
    ]
    .into_iter()
    .collect();

    /// Verbs that legitimately govern the object marker នូវ.
    pub static ref TRANSITIVE_VERBS_NOV: HashSet<&'static str> = [
        "ផ្តល់", "ផ្ដល់", "បង្កើត", "បង្ហាញ", "អនុវត្ត", "អនុវត្តន៍", "ដាក់ចេញ", "លើកកម្ពស់",
        "ពង្រឹង", "ការពារ", "ថែរក្សា", "រក្សា", "បង្ក", "នាំមក", "នាំយក", "ទទួល", "ទទួលបាន",
        "មាន", "ប្រកាន់យក",
    ]
    .into_iter()
    .collect();
}

/// Known typo correction, ignoring self-mapping entries.
pub fn typo_fix(word: &str) -> Option<&'static str> {
    COMMON_TYPOS.get(word).copied().filter(|fix| *fix != word)
}

pub fn is_typo(word: &str) -> bool {
    COMMON_TYPOS.contains_key(word)
}

pub fn is_numeral(word: &str) -> bool {
    crate::script::is_digit_run(word) || KHMER_NUM_WORDS.contains(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typos_never_map_to_themselves() {
        for (typo, fix) in COMMON_TYPOS.iter() {
            assert_ne!(typo, fix);
            assert_eq!(typo_fix(typo), Some(*fix));
        }
    }

    #[test]
    fn test_whitelist_and_banned_disjoint() {
        assert!(WHITELIST.is_disjoint(&BANNED_WORDS));
    }

    #[test]
    fn test_suspicious_bigrams_are_phrases() {
        assert!(SUSPICIOUS_BIGRAMS.keys().all(|k| k.split(' ').count() == 2));
    }

    #[test]
    fn test_numerals() {
        assert!(is_numeral("៥"));
        assert!(is_numeral("ពីរ"));
        assert!(!is_numeral("ពី"));
    }
}
