use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use super::{now_epoch, UsageError, UsageRecord, UsageStats};
use crate::persist::{atomic_write, read_if_exists};

type RawStats = BTreeMap<String, BTreeMap<String, serde_json::Value>>;

impl UsageStats {
    /// Open the store backed by `path`, starting empty if the file does not
    /// exist. Malformed records are skipped with a warning; a file that is
    /// not a JSON object at all is treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, UsageError> {
        let path = path.into();
        let stats = Self::with_path(Some(path.clone()));
        let Some(bytes) = read_if_exists(&path)? else {
            debug!(path = %path.display(), "no usage statistics file, starting empty");
            return Ok(stats);
        };
        match serde_json::from_slice::<RawStats>(&bytes) {
            Ok(raw) => stats.load_raw(raw),
            Err(e) => warn!(path = %path.display(), error = %e, "unreadable usage statistics, starting empty"),
        }
        info!(path = %path.display(), records = stats.len(), "usage statistics loaded");
        Ok(stats)
    }

    fn load_raw(&self, raw: RawStats) {
        let mut map = self.buckets.write().unwrap_or_else(|e| e.into_inner());
        for (romaji, reps) in raw {
            let mut records = HashMap::new();
            for (representation, value) in reps {
                match serde_json::from_value::<UsageRecord>(value) {
                    Ok(record) => {
                        records.insert(representation, record);
                    }
                    Err(e) => {
                        warn!(romaji = %romaji, representation = %representation, error = %e, "skipping malformed usage record");
                    }
                }
            }
            if !records.is_empty() {
                map.insert(romaji.to_lowercase(), Arc::new(Mutex::new(records)));
            }
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, UsageError> {
        Ok(serde_json::to_vec_pretty(&self.records())?)
    }

    /// Write the current snapshot to the backing file. A no-op for an
    /// in-memory store.
    ///
    /// On failure the store stays dirty, so the next trigger retries.
    pub fn save(&self) -> Result<(), UsageError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        let _guard = self.save_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.dirty.store(false, Ordering::Release);
        let result = self.write_snapshot(path);
        if result.is_err() {
            self.dirty.store(true, Ordering::Release);
        }
        self.last_save.store(now_epoch(), Ordering::Release);
        result
    }

    fn write_snapshot(&self, path: &Path) -> Result<(), UsageError> {
        let bytes = self.to_json()?;
        atomic_write(path, &bytes)?;
        debug!(path = %path.display(), "usage statistics saved");
        Ok(())
    }
}
