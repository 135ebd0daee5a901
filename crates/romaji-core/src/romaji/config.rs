use std::collections::BTreeMap;

use serde::Deserialize;

use super::table::MAX_PATTERN_LEN;

#[derive(Deserialize)]
struct RomajiConfig {
    mappings: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RomajiConfigError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("[mappings] table is empty")]
    Empty,
    #[error("non-ASCII key: {0}")]
    NonAsciiKey(String),
    #[error("key longer than {MAX_PATTERN_LEN} characters: {0}")]
    KeyTooLong(String),
    #[error("empty value for key: {0}")]
    EmptyValue(String),
    #[error("duplicate key after lowercasing: {0}")]
    DuplicateKey(String),
    #[error("romaji table already initialized")]
    AlreadyInitialized,
}

/// Parse TOML text into a sorted `BTreeMap<romaji, kana>`.
///
/// Keys are lowercased; the tokenizer only ever sees lowercase input. Two
/// keys that differ only in case are rejected.
pub fn parse_romaji_toml(toml_str: &str) -> Result<BTreeMap<String, String>, RomajiConfigError> {
    let config: RomajiConfig =
        toml::from_str(toml_str).map_err(|e| RomajiConfigError::Parse(e.to_string()))?;

    if config.mappings.is_empty() {
        return Err(RomajiConfigError::Empty);
    }

    let mut mappings = BTreeMap::new();
    for (key, value) in config.mappings {
        if key.is_empty() || !key.is_ascii() {
            return Err(RomajiConfigError::NonAsciiKey(key));
        }
        if key.len() > MAX_PATTERN_LEN {
            return Err(RomajiConfigError::KeyTooLong(key));
        }
        if value.is_empty() {
            return Err(RomajiConfigError::EmptyValue(key));
        }
        let lower = key.to_ascii_lowercase();
        if mappings.contains_key(&lower) {
            return Err(RomajiConfigError::DuplicateKey(key));
        }
        mappings.insert(lower, value);
    }

    Ok(mappings)
}
