use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use super::config::{parse_romaji_toml, RomajiConfigError};
use super::DEFAULT_TOML;

/// Longest pattern the tokenizer tries at a single position.
pub const MAX_PATTERN_LEN: usize = 4;

/// Prefixes that turn a base rule into its small-kana variant ("lya", "xtu").
const SMALL_PREFIXES: [char; 2] = ['l', 'x'];

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// One Latin pattern → kana mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomanizationRule {
    pub pattern: String,
    pub kana: String,
}

/// Immutable romaji → kana rule table.
///
/// Built once and shared by reference; lookups never lock.
#[derive(Debug, Clone)]
pub struct RomajiTable {
    rules: HashMap<String, String>,
}

/// Map a full-size kana glyph to its small form. Glyphs without a small form
/// pass through unchanged.
fn smallify_char(c: char) -> char {
    match c {
        'あ' => 'ぁ',
        'い' => 'ぃ',
        'う' => 'ぅ',
        'え' => 'ぇ',
        'お' => 'ぉ',
        'や' => 'ゃ',
        'ゆ' => 'ゅ',
        'よ' => 'ょ',
        'つ' => 'っ',
        'わ' => 'ゎ',
        'か' => 'ゕ',
        'け' => 'ゖ',
        other => other,
    }
}

fn smallify(kana: &str) -> String {
    kana.chars().map(smallify_char).collect()
}

impl RomajiTable {
    /// Build a table from explicit mappings, adding the derived small-kana
    /// rules. Explicit mappings always win over derived ones.
    pub fn from_mappings(mappings: BTreeMap<String, String>) -> Self {
        let mut rules: HashMap<String, String> = mappings
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        for (pattern, kana) in &mappings {
            let derivable = pattern.len() >= 2
                && pattern.len() < MAX_PATTERN_LEN
                && pattern.bytes().all(|b| b.is_ascii_lowercase());
            if !derivable {
                continue;
            }
            let small = smallify(kana);
            for prefix in SMALL_PREFIXES {
                rules
                    .entry(format!("{prefix}{pattern}"))
                    .or_insert_with(|| small.clone());
            }
        }

        Self { rules }
    }

    pub fn from_rules(rules: impl IntoIterator<Item = RomanizationRule>) -> Self {
        Self::from_mappings(rules.into_iter().map(|r| (r.pattern, r.kana)).collect())
    }

    pub fn from_toml(toml_str: &str) -> Result<Self, RomajiConfigError> {
        Ok(Self::from_mappings(parse_romaji_toml(toml_str)?))
    }

    /// The embedded default table.
    pub fn default_table() -> Result<Self, RomajiConfigError> {
        Self::from_toml(DEFAULT_TOML)
    }

    /// Set custom TOML before first `global()` call.
    pub fn init_custom(toml_content: String) -> Result<(), RomajiConfigError> {
        // Validate eagerly
        parse_romaji_toml(&toml_content)?;
        CUSTOM_TOML
            .set(toml_content)
            .map_err(|_| RomajiConfigError::AlreadyInitialized)
    }

    /// Get or initialize the process-wide table.
    pub fn global() -> &'static RomajiTable {
        static INSTANCE: OnceLock<RomajiTable> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            let toml_str = CUSTOM_TOML
                .get()
                .map(|s| s.as_str())
                .unwrap_or(DEFAULT_TOML);
            RomajiTable::from_toml(toml_str).expect("romaji TOML must be valid")
        })
    }

    pub fn get(&self, pattern: &str) -> Option<&str> {
        self.rules.get(pattern).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All rules sorted by pattern.
    pub fn rules(&self) -> Vec<RomanizationRule> {
        let mut rules: Vec<RomanizationRule> = self
            .rules
            .iter()
            .map(|(pattern, kana)| RomanizationRule {
                pattern: pattern.clone(),
                kana: kana.clone(),
            })
            .collect();
        rules.sort_by(|a, b| a.pattern.cmp(&b.pattern));
        rules
    }

    /// Rules matching at `pos`, longest first, as `(length, kana)`.
    pub(super) fn matches_at<'a>(
        &'a self,
        chars: &'a [char],
        pos: usize,
    ) -> impl Iterator<Item = (usize, &'a str)> + 'a {
        let max = MAX_PATTERN_LEN.min(chars.len().saturating_sub(pos));
        let mut key = String::with_capacity(MAX_PATTERN_LEN * 4);
        (1..=max).rev().filter_map(move |len| {
            key.clear();
            key.extend(&chars[pos..pos + len]);
            self.get(&key).map(|kana| (len, kana))
        })
    }
}
