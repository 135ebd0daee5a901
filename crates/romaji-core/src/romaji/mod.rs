//! Romaji-to-kana transliteration.
//!
//! An immutable rule table maps 1–4 character Latin patterns to kana; the
//! tokenizer walks a word left to right with longest-match-first, handling
//! sokuon (っ) for doubled consonants and hatsuon (ん) for a standalone "n".

mod config;
mod table;
mod tokenizer;

pub use config::{parse_romaji_toml, RomajiConfigError};
pub use table::{RomajiTable, RomanizationRule, MAX_PATTERN_LEN};
pub use tokenizer::{contains_romaji, transliterate};

pub(crate) const DEFAULT_TOML: &str = include_str!("default_romaji.toml");

/// Returns the embedded default romaji TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_TOML
}
