//! Romaji word dictionary with usage-aware candidate selection.
//!
//! `Dictionary` maps a lowercase romaji key to a `DictionaryEntry`. Entries
//! come from the base dataset (system, priority 0) and from runtime
//! registration (user, priority 1). Lookups pick the best-scoring candidate
//! and record one use of it, so repeated selections gradually win ties.
//!
//! The map sits behind an `RwLock`: readers never see a half-built entry,
//! and writes only happen on registration and clearing.

mod entry;
mod source;
#[cfg(test)]
mod tests;
mod user_file;

pub use entry::{CandidateOrigin, ConversionCandidate, DictionaryEntry};
pub use source::{builtin_fallback, parse_base_dataset, DEFAULT_BASE_JSON};
pub use user_file::UserRegistration;

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use crate::enhance::CachedEnhancer;
use crate::settings::{settings, ScoringSettings};
use crate::usage_stats::UsageStats;

/// Priority given to entries created by user registration.
const USER_ENTRY_PRIORITY: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum DictError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("base dataset contains no usable entries")]
    EmptyDataset,

    #[error("base dataset not found: {0}")]
    MissingDataset(PathBuf),
}

pub struct Dictionary {
    entries: RwLock<HashMap<String, DictionaryEntry>>,
    stats: Arc<UsageStats>,
    scoring: ScoringSettings,
    user_path: Option<PathBuf>,
    save_lock: Mutex<()>,
    enhancer: Option<Arc<CachedEnhancer>>,
}

impl Dictionary {
    pub fn new(stats: Arc<UsageStats>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stats,
            scoring: settings().scoring.clone(),
            user_path: None,
            save_lock: Mutex::new(()),
            enhancer: None,
        }
    }

    /// Persist user entries to `path` on every registration change.
    pub fn with_user_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.user_path = Some(path.into());
        self
    }

    pub fn with_enhancer(mut self, enhancer: Arc<CachedEnhancer>) -> Self {
        self.enhancer = Some(enhancer);
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringSettings) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn stats(&self) -> &Arc<UsageStats> {
        &self.stats
    }

    pub fn user_path(&self) -> Option<&Path> {
        self.user_path.as_deref()
    }

    pub fn enhancer(&self) -> Option<&Arc<CachedEnhancer>> {
        self.enhancer.as_ref()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, DictionaryEntry>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, DictionaryEntry>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Load a base dataset (JSON). Returns the number of entries added.
    pub fn load_base(&self, json: &str) -> Result<usize, DictError> {
        let groups = parse_base_dataset(json, self.scoring.max_system_base_score)?;
        let count = groups.len();
        for (romaji, candidates) in groups {
            self.add_entry(&romaji, candidates, 0);
        }
        info!(entries = count, "base dictionary loaded");
        Ok(count)
    }

    /// Load a base dataset from a file.
    pub fn load_base_file(&self, path: &Path) -> Result<usize, DictError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                DictError::MissingDataset(path.to_path_buf())
            } else {
                DictError::Io(e)
            }
        })?;
        self.load_base(&json)
    }

    /// Load the built-in fallback word list.
    pub fn load_builtin(&self) -> usize {
        let words = builtin_fallback();
        let count = words.len();
        for (romaji, candidates) in words {
            self.add_entry(&romaji, candidates, 0);
        }
        warn!(entries = count, "using built-in fallback dictionary");
        count
    }

    /// Replace the entry for `romaji` wholesale. No-op when `candidates` is
    /// empty.
    ///
    /// System candidates must keep `base_score * base_score_weight` at or
    /// below `user_priority_score`, or they can outrank user entries.
    pub fn add_entry(&self, romaji: &str, candidates: Vec<ConversionCandidate>, priority: u32) {
        if romaji.is_empty() || candidates.is_empty() {
            return;
        }
        let entry = DictionaryEntry::new(romaji, candidates, priority);
        self.write().insert(entry.romaji.clone(), entry);
    }

    /// Insert a registration without persisting.
    fn insert_user(&self, romaji: &str, representation: &str, hiragana: &str) -> bool {
        let key = romaji.to_lowercase();
        let candidate = ConversionCandidate::user(representation, hiragana, self.scoring.user_base_score);
        let mut map = self.write();
        match map.get_mut(&key) {
            Some(entry) => entry.add_candidate(candidate),
            None => {
                let entry = DictionaryEntry::new(&key, vec![candidate], USER_ENTRY_PRIORITY);
                map.insert(key, entry);
                true
            }
        }
    }

    /// Register `representation` for `romaji`, then persist user entries.
    ///
    /// An existing entry gains (or has replaced) the candidate with this
    /// representation; otherwise a new user entry is created. Returns `true`
    /// when a candidate was added rather than replaced. Empty input is ignored.
    pub fn register_user_entry(&self, romaji: &str, representation: &str, hiragana: &str) -> bool {
        if romaji.trim().is_empty() || representation.is_empty() {
            return false;
        }
        let added = self.insert_user(romaji, representation, hiragana);
        debug!(romaji, representation, added, "user entry registered");
        self.persist_user_entries();
        added
    }

    /// Remove one user-registered candidate; drops the entry if it becomes
    /// empty. A system candidate of the same representation that the
    /// registration replaced is restored. Returns `true` if something was
    /// removed.
    pub fn remove_user_candidate(&self, romaji: &str, representation: &str) -> bool {
        let key = romaji.to_lowercase();
        let removed = {
            let mut map = self.write();
            let Some(entry) = map.get_mut(&key) else {
                return false;
            };
            let is_user_candidate = entry.is_user()
                || entry
                    .candidates
                    .iter()
                    .any(|c| c.is_user() && c.representation() == representation);
            if !is_user_candidate {
                return false;
            }
            let removed = entry.remove_candidate(representation);
            if entry.candidates.is_empty() {
                map.remove(&key);
            }
            removed
        };
        if removed {
            debug!(romaji = %key, representation, "user candidate removed");
            self.persist_user_entries();
        }
        removed
    }

    /// Remove every user entry, and user candidates added to system entries,
    /// then persist. System candidates replaced by a registration come back. Returns the number of candidates removed.
    pub fn clear_user_entries(&self) -> usize {
        let removed = {
            let mut map = self.write();
            let mut removed = 0;
            map.retain(|_, entry| {
                if entry.is_user() {
                    removed += entry.candidates.len();
                    return false;
                }
                removed += entry.clear_user_candidates();
                !entry.candidates.is_empty()
            });
            removed
        };
        info!(removed, "user entries cleared");
        self.persist_user_entries();
        removed
    }

    /// Best candidate for `romaji`, recording one use of it.
    ///
    /// Case-insensitive. `None` when there is no entry; the caller then falls
    /// back to the tokenizer.
    pub fn best_candidate(&self, romaji: &str) -> Option<ConversionCandidate> {
        if romaji.is_empty() {
            return None;
        }
        let key = romaji.to_lowercase();
        let best = {
            let map = self.read();
            map.get(&key)?
                .best_candidate(&self.stats, &self.scoring)?
                .clone()
        };
        self.stats.record_usage(&key, best.representation());
        Some(self.enhance(best))
    }

    /// Let the enhancer respell a system pick. User picks are never touched,
    /// and usage stays recorded against the dictionary's own representation.
    fn enhance(&self, candidate: ConversionCandidate) -> ConversionCandidate {
        let Some(enhancer) = &self.enhancer else {
            return candidate;
        };
        if candidate.is_user() || candidate.hiragana.is_empty() {
            return candidate;
        }
        let enhanced = enhancer.enhance(&candidate.hiragana);
        if enhanced == candidate.hiragana || enhanced == candidate.kanji {
            return candidate;
        }
        debug!(hiragana = %candidate.hiragana, kanji = %enhanced, "candidate enhanced");
        ConversionCandidate {
            kanji: enhanced,
            ..candidate
        }
    }

    /// All candidates for `romaji` in entry order.
    pub fn candidates(&self, romaji: &str) -> Vec<ConversionCandidate> {
        self.read()
            .get(&romaji.to_lowercase())
            .map(|e| e.candidates.clone())
            .unwrap_or_default()
    }

    /// Candidates with their current scores, in entry order. Records nothing.
    pub fn scored_candidates(&self, romaji: &str) -> Vec<(ConversionCandidate, f64)> {
        self.read()
            .get(&romaji.to_lowercase())
            .map(|e| e.scored(&self.stats, &self.scoring))
            .unwrap_or_default()
    }

    pub fn entry(&self, romaji: &str) -> Option<DictionaryEntry> {
        self.read().get(&romaji.to_lowercase()).cloned()
    }

    pub fn contains(&self, romaji: &str) -> bool {
        !romaji.is_empty() && self.read().contains_key(&romaji.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Snapshot of every entry, sorted by romaji.
    pub fn entries(&self) -> Vec<DictionaryEntry> {
        let mut out: Vec<DictionaryEntry> = self.read().values().cloned().collect();
        out.sort_by(|a, b| a.romaji.cmp(&b.romaji));
        out
    }

    /// The user-registered subset: whole user entries plus user candidates
    /// of system entries, sorted by romaji.
    pub fn user_entries(&self) -> Vec<DictionaryEntry> {
        let mut out: Vec<DictionaryEntry> = self
            .read()
            .values()
            .filter_map(|e| {
                let candidates: Vec<ConversionCandidate> = e
                    .candidates
                    .iter()
                    .filter(|c| e.is_user() || c.is_user())
                    .cloned()
                    .collect();
                (!candidates.is_empty())
                    .then(|| DictionaryEntry::new(&e.romaji, candidates, USER_ENTRY_PRIORITY))
            })
            .collect();
        out.sort_by(|a, b| a.romaji.cmp(&b.romaji));
        out
    }

    /// Write the user subset to the user file. A no-op without a path.
    pub fn save_user_entries(&self) -> Result<(), DictError> {
        let Some(path) = self.user_path.as_deref() else {
            return Ok(());
        };
        let _guard = self.save_lock.lock().unwrap_or_else(|e| e.into_inner());
        let entries = self.user_entries();
        user_file::write(path, &entries)?;
        debug!(path = %path.display(), entries = entries.len(), "user dictionary saved");
        Ok(())
    }

    fn persist_user_entries(&self) {
        if let Err(e) = self.save_user_entries() {
            warn!(error = %e, "failed to save user dictionary");
        }
    }

    /// Load registrations from the user file. Returns how many were applied.
    pub fn load_user_entries(&self) -> Result<usize, DictError> {
        let Some(path) = self.user_path.as_deref() else {
            return Ok(0);
        };
        let registrations = user_file::read(path)?;
        let count = registrations.len();
        for r in registrations {
            self.insert_user(&r.romaji, &r.representation, &r.hiragana);
        }
        info!(path = %path.display(), registrations = count, "user dictionary loaded");
        Ok(count)
    }
}
