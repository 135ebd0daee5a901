//! Base dataset loading and the built-in fallback word list.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{debug, warn};

use super::entry::ConversionCandidate;
use super::DictError;
use crate::kana::hiragana_to_romaji;
use crate::romaji::transliterate;

pub const DEFAULT_BASE_JSON: &str = include_str!("../../data/base_dictionary.json");

const DEFAULT_BASE_SCORE: u32 = 100;

#[derive(Deserialize)]
struct RawDataset {
    entries: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct BaseRecord {
    #[serde(default)]
    kanji: String,
    #[serde(default)]
    hiragana: String,
    #[serde(rename = "baseScore", default = "default_base_score")]
    base_score: u32,
}

fn default_base_score() -> u32 {
    DEFAULT_BASE_SCORE
}

/// Parse a base dataset into `(romaji, candidates)` groups.
///
/// The romaji key of each record is derived from its hiragana. Records that
/// derive the same key share one group, in dataset order. Records with an
/// empty field or a malformed shape are skipped; a dataset that yields no
/// group at all is an error.
pub fn parse_base_dataset(
    json: &str,
    max_base_score: u32,
) -> Result<Vec<(String, Vec<ConversionCandidate>)>, DictError> {
    let raw: RawDataset = serde_json::from_str(json)?;
    let mut groups: Vec<(String, Vec<ConversionCandidate>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (i, value) in raw.entries.into_iter().enumerate() {
        let record: BaseRecord = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                warn!(index = i, error = %e, "skipping malformed base record");
                continue;
            }
        };
        if record.kanji.is_empty() || record.hiragana.is_empty() {
            debug!(index = i, "skipping base record with empty field");
            continue;
        }
        if record.base_score > max_base_score {
            warn!(
                kanji = %record.kanji,
                base_score = record.base_score,
                max_base_score,
                "base score above ceiling; it may outrank user entries"
            );
        }

        let romaji = hiragana_to_romaji(&record.hiragana).to_lowercase();
        let candidate = ConversionCandidate::system(record.kanji, record.hiragana, record.base_score);
        match index.get(&romaji) {
            Some(&at) => groups[at].1.push(candidate),
            None => {
                index.insert(romaji.clone(), groups.len());
                groups.push((romaji, vec![candidate]));
            }
        }
    }

    if groups.is_empty() {
        return Err(DictError::EmptyDataset);
    }
    Ok(groups)
}

#[rustfmt::skip]
const BUILTIN_WORDS: &[(&str, &str)] = &[
    ("arigatou", "有難う"), ("arigatai", "有難い"), ("osusume", "お勧め"),
    ("sugoi", "凄い"), ("mazui", "不味い"), ("oishii", "美味しい"),
    ("kawaii", "可愛い"), ("atarashii", "新しい"), ("furui", "古い"),
    ("ookii", "大きい"), ("tiisai", "小さい"), ("chiisai", "小さい"),
    ("hayai", "速い"), ("osoi", "遅い"), ("tsuyoi", "強い"),
    ("yowai", "弱い"), ("takai", "高い"), ("hikui", "低い"),
    ("tokyo", "東京"), ("osaka", "大阪"), ("kyoto", "京都"),
    ("onegai", "お願い"), ("oyasuminasai", "お休みなさい"), ("oyasumi", "お休み"),
    ("ohayougozaimasu", "おはようございます"), ("ohayou", "おはよう"),
    ("konnichiwa", "こんにちは"), ("konbanwa", "こんばんは"), ("domo", "どうも"),
    ("arigatougozaimasu", "ありがとうございます"),
    ("gakkou", "学校"), ("sensei", "先生"), ("gakusei", "学生"), ("daigaku", "大学"),
];

/// Minimal word list used when the base dataset cannot be loaded and the
/// policy allows degrading. Readings come from the tokenizer.
pub fn builtin_fallback() -> Vec<(String, Vec<ConversionCandidate>)> {
    BUILTIN_WORDS
        .iter()
        .map(|&(romaji, kanji)| {
            let candidate = ConversionCandidate::system(kanji, transliterate(romaji), DEFAULT_BASE_SCORE);
            (romaji.to_string(), vec![candidate])
        })
        .collect()
}
