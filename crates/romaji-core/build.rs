use std::collections::HashSet;

// Longest romaji pattern the tokenizer tries; keep in step with
// `romaji::table::MAX_PATTERN_LEN`.
const MAX_PATTERN_LEN: usize = 4;

fn main() {
    let settings = parse("src/default_settings.toml", include_str!("src/default_settings.toml"));
    check_scoring(&settings);

    let romaji = parse(
        "src/romaji/default_romaji.toml",
        include_str!("src/romaji/default_romaji.toml"),
    );
    check_mappings(&romaji);
}

fn parse(path: &str, content: &str) -> toml::Value {
    match content.parse::<toml::Value>() {
        Ok(value) => value,
        Err(e) => panic!("{path} contains invalid TOML: {e}"),
    }
}

fn number(table: &toml::Value, key: &str) -> f64 {
    match table.get(key) {
        Some(toml::Value::Integer(n)) => *n as f64,
        Some(toml::Value::Float(n)) => *n,
        _ => panic!("default_settings.toml: scoring.{key} must be a number"),
    }
}

/// System candidates must never outrank a user entry.
fn check_scoring(settings: &toml::Value) {
    let Some(scoring) = settings.get("scoring") else {
        panic!("default_settings.toml: missing [scoring]");
    };
    let user_priority = number(scoring, "user_priority_score");
    let weight = number(scoring, "base_score_weight");
    let max_base = number(scoring, "max_system_base_score");
    let user_base = number(scoring, "user_base_score");
    if max_base * weight > user_priority {
        panic!(
            "default_settings.toml: max_system_base_score * base_score_weight ({}) exceeds user_priority_score ({user_priority})",
            max_base * weight
        );
    }
    if user_base <= max_base {
        panic!("default_settings.toml: user_base_score must exceed max_system_base_score");
    }
}

fn check_mappings(romaji: &toml::Value) {
    let Some(mappings) = romaji.get("mappings").and_then(toml::Value::as_table) else {
        panic!("default_romaji.toml: missing [mappings]");
    };
    if mappings.is_empty() {
        panic!("default_romaji.toml: [mappings] is empty");
    }
    let mut seen = HashSet::new();
    for (key, value) in mappings {
        if key.is_empty() || !key.is_ascii() || key.len() > MAX_PATTERN_LEN {
            panic!("default_romaji.toml: bad key {key:?}");
        }
        if value.as_str().map_or(true, str::is_empty) {
            panic!("default_romaji.toml: {key} needs a non-empty kana string");
        }
        if !seen.insert(key.to_ascii_lowercase()) {
            panic!("default_romaji.toml: {key} repeats another key");
        }
    }
}
