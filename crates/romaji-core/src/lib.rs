//! Romaji-to-Japanese conversion core.
//!
//! Turns typed romaji into hiragana with a longest-match tokenizer, and picks
//! kanji/hiragana candidates for whole words from a dictionary that learns
//! from usage.

pub mod dict;
pub mod enhance;
pub mod kana;
pub(crate) mod persist;
pub mod romaji;
pub mod settings;
pub mod unicode;
pub mod usage_stats;
