//! On-disk form of user-registered entries:
//! `{ "entries": [ { "romaji", "candidates": [ { "kanji", "hiragana" } ] } ] }`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::entry::DictionaryEntry;
use super::DictError;
use crate::persist::{atomic_write, read_if_exists};

#[derive(Serialize, Deserialize)]
struct UserFile<T> {
    entries: Vec<T>,
}

#[derive(Debug, Serialize, Deserialize)]
struct UserEntryRecord {
    romaji: String,
    candidates: Vec<UserCandidateRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct UserCandidateRecord {
    kanji: String,
    #[serde(default)]
    hiragana: String,
}

/// One persisted `(romaji, representation, hiragana)` registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRegistration {
    pub romaji: String,
    pub representation: String,
    pub hiragana: String,
}

pub(super) fn write(path: &Path, entries: &[DictionaryEntry]) -> Result<(), DictError> {
    let file = UserFile {
        entries: entries
            .iter()
            .map(|e| UserEntryRecord {
                romaji: e.romaji.clone(),
                candidates: e
                    .candidates
                    .iter()
                    .map(|c| UserCandidateRecord {
                        kanji: c.representation().to_string(),
                        hiragana: c.hiragana.clone(),
                    })
                    .collect(),
            })
            .collect(),
    };
    let bytes = serde_json::to_vec_pretty(&file)?;
    atomic_write(path, &bytes)?;
    Ok(())
}

/// Read registrations from `path`; a missing file yields none.
///
/// Entries with the wrong shape or without romaji, and candidates without
/// kanji, are skipped with a warning.
pub(super) fn read(path: &Path) -> Result<Vec<UserRegistration>, DictError> {
    let Some(bytes) = read_if_exists(path)? else {
        return Ok(Vec::new());
    };
    let file: UserFile<serde_json::Value> = serde_json::from_slice(&bytes)?;

    let mut out = Vec::new();
    for (i, value) in file.entries.into_iter().enumerate() {
        let record: UserEntryRecord = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                warn!(index = i, error = %e, "skipping malformed user entry");
                continue;
            }
        };
        if record.romaji.trim().is_empty() {
            warn!(index = i, "skipping user entry without romaji");
            continue;
        }
        for candidate in record.candidates {
            if candidate.kanji.is_empty() {
                warn!(romaji = %record.romaji, "skipping user candidate without kanji");
                continue;
            }
            out.push(UserRegistration {
                romaji: record.romaji.to_lowercase(),
                representation: candidate.kanji,
                hiragana: candidate.hiragana,
            });
        }
    }
    Ok(out)
}
