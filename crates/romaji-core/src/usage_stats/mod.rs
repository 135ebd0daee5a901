//! Per-(romaji, representation) usage counts and the learned score derived
//! from them.
//!
//! Counts live in a two-level map: the outer `RwLock` is only written when a
//! romaji key is seen for the first time, and each key owns its own `Mutex`
//! so increments to one key never contend with reads of another.

mod persistence;

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::settings::settings;

type Bucket = Arc<Mutex<HashMap<String, UsageRecord>>>;

#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Use count and last-use time of one representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub count: u32,
    /// Seconds since the Unix epoch.
    #[serde(rename = "last_used_time", alias = "lastUsedTime", default)]
    pub last_used: u64,
}

pub fn now_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// `log2(count + 1) * weight`, 0 for an unused candidate.
pub fn usage_score_for(count: u32, weight: f64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    (f64::from(count) + 1.0).log2() * weight
}

pub struct UsageStats {
    buckets: RwLock<HashMap<String, Bucket>>,
    path: Option<PathBuf>,
    usage_weight: f64,
    save_interval_secs: u64,
    dirty: AtomicBool,
    last_save: AtomicU64,
    save_lock: Mutex<()>,
}

impl UsageStats {
    fn with_path(path: Option<PathBuf>) -> Self {
        let s = settings();
        Self {
            buckets: RwLock::new(HashMap::new()),
            path,
            usage_weight: s.scoring.usage_weight,
            save_interval_secs: s.persistence.save_interval_secs,
            dirty: AtomicBool::new(false),
            last_save: AtomicU64::new(now_epoch()),
            save_lock: Mutex::new(()),
        }
    }

    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self::with_path(None)
    }

    /// Override the minimum interval between background saves.
    pub fn with_save_interval(mut self, secs: u64) -> Self {
        self.save_interval_secs = secs;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn bucket(&self, romaji: &str) -> Option<Bucket> {
        let map = self.buckets.read().unwrap_or_else(|e| e.into_inner());
        map.get(romaji).cloned()
    }

    fn bucket_or_create(&self, romaji: &str) -> Bucket {
        if let Some(bucket) = self.bucket(romaji) {
            return bucket;
        }
        let mut map = self.buckets.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(map.entry(romaji.to_string()).or_default())
    }

    /// Count one use of `representation` for `romaji`.
    pub fn record_usage(&self, romaji: &str, representation: &str) {
        let key = romaji.to_lowercase();
        let bucket = self.bucket_or_create(&key);
        let count = {
            let mut records = bucket.lock().unwrap_or_else(|e| e.into_inner());
            let record = records
                .entry(representation.to_string())
                .or_insert(UsageRecord {
                    count: 0,
                    last_used: 0,
                });
            record.count = record.count.saturating_add(1);
            record.last_used = now_epoch();
            record.count
        };
        self.dirty.store(true, Ordering::Release);
        debug!(romaji = %key, representation, count, "usage recorded");
    }

    pub fn usage_count(&self, romaji: &str, representation: &str) -> u32 {
        self.record(romaji, representation)
            .map_or(0, |r| r.count)
    }

    pub fn record(&self, romaji: &str, representation: &str) -> Option<UsageRecord> {
        let bucket = self.bucket(&romaji.to_lowercase())?;
        let records = bucket.lock().unwrap_or_else(|e| e.into_inner());
        records.get(representation).copied()
    }

    /// Learned score for a representation: 0 when never used.
    pub fn usage_score(&self, romaji: &str, representation: &str) -> f64 {
        usage_score_for(self.usage_count(romaji, representation), self.usage_weight)
    }

    /// Every representation recorded for `romaji`, most used first.
    pub fn stats_for(&self, romaji: &str) -> Vec<(String, UsageRecord)> {
        let Some(bucket) = self.bucket(&romaji.to_lowercase()) else {
            return Vec::new();
        };
        let records = bucket.lock().unwrap_or_else(|e| e.into_inner());
        let mut out: Vec<(String, UsageRecord)> =
            records.iter().map(|(k, v)| (k.clone(), *v)).collect();
        out.sort_by(|a, b| b.1.count.cmp(&a.1.count).then_with(|| a.0.cmp(&b.0)));
        out
    }

    /// Sorted snapshot of all records.
    pub fn records(&self) -> BTreeMap<String, BTreeMap<String, UsageRecord>> {
        let buckets: Vec<(String, Bucket)> = {
            let map = self.buckets.read().unwrap_or_else(|e| e.into_inner());
            map.iter().map(|(k, v)| (k.clone(), Arc::clone(v))).collect()
        };
        buckets
            .into_iter()
            .filter_map(|(romaji, bucket)| {
                let records = bucket.lock().unwrap_or_else(|e| e.into_inner());
                if records.is_empty() {
                    return None;
                }
                let inner = records.iter().map(|(k, v)| (k.clone(), *v)).collect();
                Some((romaji, inner))
            })
            .collect()
    }

    /// Number of (romaji, representation) records.
    pub fn len(&self) -> usize {
        let buckets: Vec<Bucket> = {
            let map = self.buckets.read().unwrap_or_else(|e| e.into_inner());
            map.values().cloned().collect()
        };
        buckets
            .iter()
            .map(|b| b.lock().unwrap_or_else(|e| e.into_inner()).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Drop every record and persist the empty store.
    pub fn clear(&self) -> Result<(), UsageError> {
        self.buckets
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        self.dirty.store(true, Ordering::Release);
        debug!("usage statistics cleared");
        self.save()
    }

    /// Whether a background save should run now.
    ///
    /// True at most once per save interval, and only with unsaved
    /// increments; the caller that gets `true` owns the save.
    pub fn save_due(&self) -> bool {
        if self.path.is_none() || !self.is_dirty() {
            return false;
        }
        let now = now_epoch();
        let last = self.last_save.load(Ordering::Acquire);
        if now.saturating_sub(last) < self.save_interval_secs {
            return false;
        }
        self.last_save
            .compare_exchange(last, now, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
