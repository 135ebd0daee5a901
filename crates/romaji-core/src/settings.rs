//! Global settings loaded from TOML, following the same OnceLock pattern as the romaji table.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`

use std::sync::OnceLock;

use serde::Deserialize;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str).expect("settings TOML must be valid")
    })
}

/// Returns the embedded default settings TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub scoring: ScoringSettings,
    pub persistence: PersistenceSettings,
    pub enhance: EnhanceSettings,
    pub dictionary: DictionarySettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    pub user_priority_score: f64,
    pub base_score_weight: f64,
    pub usage_weight: f64,
    pub user_base_score: u32,
    pub max_system_base_score: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceSettings {
    pub save_interval_secs: u64,
    pub user_dict_file: String,
    pub usage_stats_file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnhanceSettings {
    pub enabled: bool,
    pub endpoint: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DictionarySettings {
    pub on_base_load_failure: BaseLoadPolicy,
}

/// What to do when the base dataset is missing or unparsable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseLoadPolicy {
    /// Initialization fails.
    Abort,
    /// Continue with the small built-in word list.
    Builtin,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_positive {
        ($section:ident . $field:ident) => {
            if (s.$section.$field as f64) <= 0.0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        };
    }
    macro_rules! check_non_empty {
        ($section:ident . $field:ident) => {
            if s.$section.$field.trim().is_empty() {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        };
    }

    check_positive!(scoring.user_priority_score);
    check_positive!(scoring.base_score_weight);
    check_positive!(scoring.usage_weight);
    check_positive!(scoring.user_base_score);
    check_positive!(scoring.max_system_base_score);

    check_positive!(persistence.save_interval_secs);
    check_non_empty!(persistence.user_dict_file);
    check_non_empty!(persistence.usage_stats_file);

    check_positive!(enhance.timeout_ms);
    check_non_empty!(enhance.endpoint);

    // User entries must outrank every system candidate.
    let sc = &s.scoring;
    if f64::from(sc.max_system_base_score) * sc.base_score_weight > sc.user_priority_score {
        return Err(SettingsError::InvalidValue {
            field: "scoring.max_system_base_score".to_string(),
            reason: "max_system_base_score * base_score_weight must not exceed user_priority_score"
                .to_string(),
        });
    }
    if sc.user_base_score <= sc.max_system_base_score {
        return Err(SettingsError::InvalidValue {
            field: "scoring.user_base_score".to_string(),
            reason: "must be greater than max_system_base_score".to_string(),
        });
    }

    Ok(())
}
