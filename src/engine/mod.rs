//! Consumer-facing conversion service.
//!
//! `RomajiEngine` wires the romanization table, the dictionary, usage
//! statistics, the optional kanji enhancer and the background saver into one
//! shared object. Every method takes `&self`; the engine is `Send + Sync`
//! and meant to be shared behind an `Arc` by concurrent callers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use romaji_core::dict::Dictionary;
use romaji_core::enhance::{CachedEnhancer, KanjiEnhancer};
use romaji_core::romaji::RomajiTable;
use romaji_core::settings::{settings, BaseLoadPolicy};
use romaji_core::unicode::{contains_japanese, is_word_char};
use romaji_core::usage_stats::{UsageError, UsageStats};
use serde::Serialize;
use tracing::{debug, debug_span, info, warn};

use crate::enhance::HttpTransliterator;
use crate::error::EngineError;
use crate::persist_worker::PersistWorker;

/// Where the base dictionary comes from.
#[derive(Debug, Clone)]
pub enum BaseDataset {
    /// The dataset compiled into the binary.
    Embedded,
    File(PathBuf),
    Json(String),
}

pub struct EngineOptions {
    /// Directory for the user dictionary and usage statistics. `None` keeps
    /// everything in memory.
    pub data_dir: Option<PathBuf>,
    pub base: BaseDataset,
    pub on_base_load_failure: BaseLoadPolicy,
    /// Refine dictionary picks with the kanji enhancer.
    pub enhance: bool,
    /// Enhancer backend; defaults to the HTTP transliteration client.
    pub enhancer: Option<Arc<dyn KanjiEnhancer>>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        let s = settings();
        Self {
            data_dir: None,
            base: BaseDataset::Embedded,
            on_base_load_failure: s.dictionary.on_base_load_failure,
            enhance: s.enhance.enabled,
            enhancer: None,
        }
    }
}

impl EngineOptions {
    pub fn with_data_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(dir.into()),
            ..Self::default()
        }
    }
}

/// Converted text plus the romaji it came from, as the caller typed it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    pub japanese: String,
    pub romaji: String,
}

impl ConversionResult {
    /// `japanese(romaji)`, the way converted chat lines are shown.
    pub fn formatted(&self) -> String {
        format!("{}({})", self.japanese, self.romaji)
    }

    fn push_verbatim(&mut self, s: &str) {
        self.japanese.push_str(s);
        self.romaji.push_str(s);
    }
}

pub struct RomajiEngine {
    table: &'static RomajiTable,
    dict: Arc<Dictionary>,
    stats: Arc<UsageStats>,
    worker: Option<PersistWorker>,
}

impl RomajiEngine {
    pub fn new(options: EngineOptions) -> Result<Self, EngineError> {
        let s = settings();
        let _span = debug_span!("engine_init").entered();

        let stats = match &options.data_dir {
            Some(dir) => {
                let path = dir.join(&s.persistence.usage_stats_file);
                match UsageStats::open(&path) {
                    Ok(stats) => stats,
                    Err(e) => {
                        warn!(
                            path = %path.display(),
                            error = %e,
                            "usage statistics unavailable, learning in memory only"
                        );
                        UsageStats::in_memory()
                    }
                }
            }
            None => UsageStats::in_memory(),
        };
        let stats = Arc::new(stats);

        let mut dict = Dictionary::new(Arc::clone(&stats));
        if let Some(dir) = &options.data_dir {
            dict = dict.with_user_path(dir.join(&s.persistence.user_dict_file));
        }
        if options.enhance {
            let timeout = Duration::from_millis(s.enhance.timeout_ms);
            let backend: Arc<dyn KanjiEnhancer> = match options.enhancer.clone() {
                Some(backend) => backend,
                None => Arc::new(HttpTransliterator::new(s.enhance.endpoint.clone(), timeout)),
            };
            dict = dict.with_enhancer(Arc::new(CachedEnhancer::new(backend, timeout)));
        }

        let loaded = match &options.base {
            BaseDataset::Embedded => dict.load_base(romaji_core::dict::DEFAULT_BASE_JSON),
            BaseDataset::File(path) => dict.load_base_file(path),
            BaseDataset::Json(json) => dict.load_base(json),
        };
        if let Err(e) = loaded {
            match options.on_base_load_failure {
                BaseLoadPolicy::Abort => return Err(EngineError::BaseDataset(e)),
                BaseLoadPolicy::Builtin => {
                    warn!(error = %e, "base dictionary failed to load");
                    dict.load_builtin();
                }
            }
        }

        if let Err(e) = dict.load_user_entries() {
            warn!(error = %e, "user dictionary unreadable, continuing without it");
        }

        let worker = match options.data_dir {
            Some(_) => Some(PersistWorker::spawn(Arc::clone(&stats)).map_err(EngineError::Worker)?),
            None => None,
        };

        info!(entries = dict.len(), usage_records = stats.len(), "romaji engine ready");
        Ok(Self {
            table: RomajiTable::global(),
            dict: Arc::new(dict),
            stats,
            worker,
        })
    }

    /// An engine with the embedded dataset and no persistence.
    pub fn in_memory() -> Result<Self, EngineError> {
        Self::new(EngineOptions::default())
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    pub fn stats(&self) -> &UsageStats {
        &self.stats
    }

    pub fn table(&self) -> &RomajiTable {
        self.table
    }

    pub fn transliterate(&self, word: &str) -> String {
        self.table.transliterate(word)
    }

    /// Whether `word` is a single romaji word worth converting: made of
    /// letters, `-` and `'` only, with at least one letter and at least one
    /// substring the table knows.
    pub fn word_is_romaji_like(&self, word: &str) -> bool {
        word.chars().any(|c| c.is_ascii_alphabetic())
            && word.chars().all(is_word_char)
            && self.table.contains_romaji(word)
    }

    /// Convert one word: dictionary first, tokenizer on a miss.
    pub fn convert_word(&self, word: &str) -> ConversionResult {
        if word.is_empty() {
            return ConversionResult::default();
        }
        let key = word.to_lowercase();
        let japanese = match self.dict.best_candidate(&key) {
            Some(candidate) => candidate.representation().to_string(),
            None => self.table.transliterate(&key),
        };
        self.schedule_save();
        ConversionResult {
            japanese,
            romaji: word.to_string(),
        }
    }

    /// Convert every romaji-like word in `text`. Whitespace, punctuation,
    /// digits and words that are not romaji are copied verbatim to both
    /// outputs.
    pub fn convert_text(&self, text: &str) -> ConversionResult {
        let mut out = ConversionResult::default();
        let mut rest = text;
        while !rest.is_empty() {
            let split = rest
                .char_indices()
                .find(|&(_, c)| !is_word_char(c))
                .map_or(rest.len(), |(i, _)| i);
            let (word, tail) = rest.split_at(split);
            if !word.is_empty() {
                if self.word_is_romaji_like(word) {
                    let converted = self.convert_word(word);
                    out.japanese.push_str(&converted.japanese);
                    out.romaji.push_str(&converted.romaji);
                } else {
                    out.push_verbatim(word);
                }
            }
            let gap = tail
                .char_indices()
                .find(|&(_, c)| is_word_char(c))
                .map_or(tail.len(), |(i, _)| i);
            let (between, next) = tail.split_at(gap);
            out.push_verbatim(between);
            rest = next;
        }
        debug!(input_len = text.len(), output = %out.japanese, "text converted");
        out
    }

    /// Convert a chat message, or `None` when it should be left alone: it
    /// is blank, already contains Japanese, or has no romaji-like word.
    pub fn convert_message(&self, text: &str) -> Option<ConversionResult> {
        if text.trim().is_empty() || contains_japanese(text) {
            return None;
        }
        let has_romaji = text
            .split(|c: char| !is_word_char(c))
            .any(|w| self.word_is_romaji_like(w));
        if !has_romaji {
            return None;
        }
        Some(self.convert_text(text))
    }

    /// Register `representation` for `romaji`. The reading defaults to the
    /// tokenizer's hiragana for `romaji`.
    pub fn register_user_entry(
        &self,
        romaji: &str,
        representation: &str,
        hiragana: Option<&str>,
    ) -> bool {
        let hiragana = match hiragana {
            Some(h) if !h.is_empty() => h.to_string(),
            _ => self.table.transliterate(romaji),
        };
        self.dict.register_user_entry(romaji, representation, &hiragana)
    }

    pub fn remove_user_candidate(&self, romaji: &str, representation: &str) -> bool {
        self.dict.remove_user_candidate(romaji, representation)
    }

    pub fn clear_user_entries(&self) -> usize {
        self.dict.clear_user_entries()
    }

    /// Forget all learned usage and persist the empty store.
    pub fn clear_usage(&self) -> Result<(), UsageError> {
        self.stats.clear()
    }

    fn schedule_save(&self) {
        if let Some(worker) = &self.worker {
            if self.stats.save_due() {
                worker.submit();
            }
        }
    }

    /// Write usage statistics and user entries now.
    pub fn flush(&self) -> Result<(), EngineError> {
        self.stats.save()?;
        self.dict
            .save_user_entries()
            .map_err(EngineError::UserDictionary)?;
        Ok(())
    }
}

impl Drop for RomajiEngine {
    fn drop(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.shutdown();
            if let Err(e) = self.flush() {
                warn!(error = %e, "final flush failed");
            }
        }
    }
}
