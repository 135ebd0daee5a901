use std::fs;

use romaji_engine::romaji_core::{romaji, settings};

pub fn romaji_export() {
    print!("{}", romaji::default_toml());
}

pub fn romaji_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let map = die!(romaji::parse_romaji_toml(&content), "Error: {}");
    println!("OK: {} mappings", map.len());
}

pub fn settings_export() {
    print!("{}", settings::default_toml());
}

pub fn settings_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let s = die!(settings::parse_settings_toml(&content), "Error: {}");
    println!(
        "OK: scoring.user_priority_score={}, scoring.base_score_weight={}, scoring.usage_weight={}, dictionary.on_base_load_failure={:?}",
        s.scoring.user_priority_score,
        s.scoring.base_score_weight,
        s.scoring.usage_weight,
        s.dictionary.on_base_load_failure,
    );
}

/// Install custom settings and romanization rules before anything reads
/// the defaults.
pub fn apply_overrides(settings_file: Option<&str>, romaji_file: Option<&str>) {
    if let Some(file) = settings_file {
        let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
        die!(settings::init_custom(content), "Error in {file}: {}");
    }
    if let Some(file) = romaji_file {
        let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
        die!(
            romaji::RomajiTable::init_custom(content),
            "Error in {file}: {}"
        );
    }
}
