use std::fs;
use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::enhance::{EnhanceError, KanjiEnhancer};

fn dict() -> Dictionary {
    Dictionary::new(Arc::new(UsageStats::in_memory()))
}

fn sys(kanji: &str, hiragana: &str, score: u32) -> ConversionCandidate {
    ConversionCandidate::system(kanji, hiragana, score)
}

#[test]
fn single_candidate_is_returned() {
    let d = dict();
    d.add_entry("sugoi", vec![sys("凄い", "すごい", 100)], 0);
    let best = d.best_candidate("sugoi").unwrap();
    assert_eq!(best.kanji, "凄い");
    assert_eq!(best.hiragana, "すごい");
}

#[test]
fn lookup_is_case_insensitive() {
    let d = dict();
    d.add_entry("Sugoi", vec![sys("凄い", "すごい", 100)], 0);
    assert!(d.contains("SUGOI"));
    assert_eq!(d.best_candidate("SuGoI").unwrap().kanji, "凄い");
}

#[test]
fn missing_and_empty_keys_yield_none() {
    let d = dict();
    assert!(d.best_candidate("nothing").is_none());
    assert!(d.best_candidate("").is_none());
    assert!(d.candidates("").is_empty());
    assert!(!d.contains(""));
}

#[test]
fn add_entry_replaces_wholesale() {
    let d = dict();
    d.add_entry("kami", vec![sys("紙", "かみ", 90), sys("神", "かみ", 85)], 0);
    d.add_entry("kami", vec![sys("髪", "かみ", 80)], 0);
    let c = d.candidates("kami");
    assert_eq!(c.len(), 1);
    assert_eq!(c[0].kanji, "髪");
}

#[test]
fn add_entry_with_no_candidates_is_noop() {
    let d = dict();
    d.add_entry("kami", vec![sys("紙", "かみ", 90)], 0);
    d.add_entry("kami", Vec::new(), 0);
    assert_eq!(d.candidates("kami").len(), 1);
    d.add_entry("", vec![sys("紙", "かみ", 90)], 0);
    assert_eq!(d.len(), 1);
}

#[test]
fn highest_base_score_wins() {
    let d = dict();
    d.add_entry(
        "arigatou",
        vec![sys("ありがとう", "ありがとう", 50), sys("有難う", "ありがとう", 100)],
        0,
    );
    assert_eq!(d.best_candidate("arigatou").unwrap().kanji, "有難う");
}

#[test]
fn ties_keep_first_candidate() {
    let d = dict();
    d.add_entry("hashi", vec![sys("橋", "はし", 80), sys("箸", "はし", 80)], 0);
    let first = d.best_candidate("hashi").unwrap();
    let second = d.best_candidate("hashi").unwrap();
    assert_eq!(first.kanji, "橋");
    assert_eq!(second.kanji, "橋");
}

#[test]
fn ties_in_user_entry_keep_first() {
    let d = dict();
    d.add_entry(
        "neko",
        vec![ConversionCandidate::user("猫", "ねこ", 1000), ConversionCandidate::user("ネコ", "ねこ", 1000)],
        1,
    );
    assert_eq!(d.best_candidate("neko").unwrap().kanji, "猫");
}

#[test]
fn usage_breaks_close_scores() {
    let d = dict();
    d.add_entry("kami", vec![sys("紙", "かみ", 90), sys("神", "かみ", 90)], 0);
    d.stats().record_usage("kami", "神");
    assert_eq!(d.best_candidate("kami").unwrap().kanji, "神");
}

#[test]
fn best_candidate_records_usage() {
    let d = dict();
    d.add_entry("sugoi", vec![sys("凄い", "すごい", 100)], 0);
    assert_eq!(d.best_candidate("sugoi").unwrap().kanji, "凄い");
    assert_eq!(d.stats().usage_count("sugoi", "凄い"), 1);
    for _ in 0..3 {
        d.best_candidate("sugoi");
    }
    let score = d.stats().usage_score("sugoi", "凄い");
    assert!(score > 20.0 && score < 25.0, "score={score}");
    d.best_candidate("sugoi");
    assert!(d.stats().usage_score("sugoi", "凄い") > 25.0);
}

#[test]
fn user_entry_outranks_system_regardless_of_usage() {
    let d = dict();
    d.add_entry("kami", vec![sys("紙", "かみ", 100)], 0);
    d.register_user_entry("kami", "加美", "かみ");
    for _ in 0..1000 {
        d.stats().record_usage("kami", "紙");
    }
    assert_eq!(d.best_candidate("kami").unwrap().kanji, "加美");
}

#[test]
fn system_ceiling_matches_user_priority() {
    let d = dict();
    d.add_entry("sugoi", vec![sys("凄い", "すごい", 100)], 0);
    d.add_entry("sugoi2", vec![ConversionCandidate::user("スゴイ", "すごい", 1000)], 1);
    let system = d.scored_candidates("sugoi")[0].1;
    let user = d.scored_candidates("sugoi2")[0].1;
    assert!((system - 10000.0).abs() < 1e-9);
    assert!((user - 10000.0).abs() < 1e-9);
}

#[test]
fn register_creates_user_entry() {
    let d = dict();
    assert!(d.register_user_entry("Neko", "猫", "ねこ"));
    let entry = d.entry("neko").unwrap();
    assert_eq!(entry.user_priority, 1);
    assert_eq!(entry.candidates[0].base_score, 1000);
    assert_eq!(entry.candidates[0].origin, CandidateOrigin::User);
}

#[test]
fn register_replaces_same_representation() {
    let d = dict();
    assert!(d.register_user_entry("neko", "猫", "ねこ"));
    assert!(!d.register_user_entry("neko", "猫", "ねこー"));
    let c = d.candidates("neko");
    assert_eq!(c.len(), 1);
    assert_eq!(c[0].hiragana, "ねこー");
    assert!(d.register_user_entry("neko", "ネコ", "ねこ"));
    assert_eq!(d.candidates("neko").len(), 2);
}

#[test]
fn register_ignores_empty_input() {
    let d = dict();
    assert!(!d.register_user_entry("", "猫", "ねこ"));
    assert!(!d.register_user_entry("neko", "", "ねこ"));
    assert!(d.is_empty());
}

#[test]
fn hiragana_only_candidates_stay_distinct() {
    let d = dict();
    d.add_entry("hashi", vec![sys("", "はし", 50)], 0);
    let mut entry = d.entry("hashi").unwrap();
    assert!(entry.add_candidate(sys("", "はしー", 40)));
    assert!(!entry.add_candidate(sys("", "はし", 60)));
    assert_eq!(entry.candidates.len(), 2);
    assert_eq!(entry.candidates[0].base_score, 60);
    assert_eq!(entry.candidates[0].representation(), "はし");
}

#[test]
fn clear_user_entries_leaves_base_entries() {
    let d = dict();
    d.add_entry("sugoi", vec![sys("凄い", "すごい", 100)], 0);
    d.add_entry("kami", vec![sys("紙", "かみ", 90)], 0);
    d.register_user_entry("neko", "猫", "ねこ");
    d.register_user_entry("inu", "犬", "いぬ");
    assert_eq!(d.len(), 4);

    assert_eq!(d.clear_user_entries(), 2);
    assert_eq!(d.len(), 2);
    assert!(d.contains("sugoi"));
    assert!(d.contains("kami"));
}

#[test]
fn clear_strips_user_candidates_from_system_entries() {
    let d = dict();
    d.add_entry("kami", vec![sys("紙", "かみ", 90)], 0);
    d.register_user_entry("kami", "加美", "かみ");
    assert_eq!(d.candidates("kami").len(), 2);
    d.clear_user_entries();
    let c = d.candidates("kami");
    assert_eq!(c.len(), 1);
    assert_eq!(c[0].kanji, "紙");
}

#[test]
fn remove_user_candidate() {
    let d = dict();
    d.add_entry("kami", vec![sys("紙", "かみ", 90)], 0);
    d.register_user_entry("kami", "加美", "かみ");
    d.register_user_entry("neko", "猫", "ねこ");

    assert!(!d.remove_user_candidate("kami", "紙"));
    assert!(d.remove_user_candidate("kami", "加美"));
    assert_eq!(d.candidates("kami").len(), 1);
    assert!(d.remove_user_candidate("neko", "猫"));
    assert!(!d.contains("neko"));
    assert!(!d.remove_user_candidate("missing", "x"));
}

#[test]
fn clear_restores_replaced_system_candidate() {
    let d = dict();
    d.add_entry("sugoi", vec![sys("凄い", "すごい", 100), sys("スゴイ", "すごい", 40)], 0);
    d.add_entry("kami", vec![sys("紙", "かみ", 90)], 0);
    assert!(!d.register_user_entry("sugoi", "凄い", "すごい"));
    assert_eq!(d.candidates("sugoi")[0].origin, CandidateOrigin::User);

    assert_eq!(d.clear_user_entries(), 1);
    assert!(d.contains("sugoi"));
    assert!(d.contains("kami"));
    let c = d.candidates("sugoi");
    assert_eq!(c, vec![sys("凄い", "すごい", 100), sys("スゴイ", "すごい", 40)]);
    assert!(d.user_entries().is_empty());
}

#[test]
fn remove_restores_replaced_system_candidate() {
    let d = dict();
    d.add_entry("sugoi", vec![sys("凄い", "すごい", 100)], 0);
    d.register_user_entry("sugoi", "凄い", "すごい");

    assert!(d.remove_user_candidate("sugoi", "凄い"));
    assert_eq!(d.candidates("sugoi"), vec![sys("凄い", "すごい", 100)]);
    assert!(!d.remove_user_candidate("sugoi", "凄い"));
    assert_eq!(d.candidates("sugoi").len(), 1);
}

#[test]
fn reregistering_keeps_original_system_candidate() {
    let d = dict();
    d.add_entry("sugoi", vec![sys("凄い", "すごい", 100)], 0);
    d.register_user_entry("sugoi", "凄い", "すごい");
    d.register_user_entry("sugoi", "凄い", "すごいー");
    d.clear_user_entries();
    assert_eq!(d.candidates("sugoi"), vec![sys("凄い", "すごい", 100)]);
}

#[test]
fn reload_after_clear_keeps_base_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("user.json");
    let d = dict().with_user_path(&path);
    d.add_entry("sugoi", vec![sys("凄い", "すごい", 100)], 0);
    d.add_entry("kami", vec![sys("紙", "かみ", 90)], 0);
    d.register_user_entry("sugoi", "凄い", "すごい");
    d.register_user_entry("kami", "加美", "かみ");
    d.register_user_entry("neko", "猫", "ねこ");
    assert_eq!(d.clear_user_entries(), 3);

    let fresh = dict().with_user_path(&path);
    fresh.add_entry("sugoi", vec![sys("凄い", "すごい", 100)], 0);
    fresh.add_entry("kami", vec![sys("紙", "かみ", 90)], 0);
    assert_eq!(fresh.load_user_entries().unwrap(), 0);
    assert_eq!(fresh.entries(), d.entries());
    assert_eq!(fresh.len(), 2);
    assert!(!fresh.contains("neko"));
    assert_eq!(fresh.candidates("sugoi"), vec![sys("凄い", "すごい", 100)]);
    assert_eq!(fresh.candidates("kami"), vec![sys("紙", "かみ", 90)]);
    assert!(fresh.user_entries().is_empty());
}

#[test]
fn entries_snapshot_is_sorted() {
    let d = dict();
    d.add_entry("b", vec![sys("B", "び", 1)], 0);
    d.add_entry("a", vec![sys("A", "あ", 1)], 0);
    let keys: Vec<String> = d.entries().into_iter().map(|e| e.romaji).collect();
    assert_eq!(keys, ["a", "b"]);
}

#[test]
fn load_default_base() {
    let d = dict();
    let n = d.load_base(DEFAULT_BASE_JSON).unwrap();
    assert_eq!(n, d.len());
    assert_eq!(d.best_candidate("sugoi").unwrap().kanji, "凄い");
    assert_eq!(d.best_candidate("kami").unwrap().kanji, "紙");
    assert_eq!(d.best_candidate("gakkou").unwrap().kanji, "学校");
    assert_eq!(d.candidates("atsui").len(), 3);
}

#[test]
fn load_base_failure_modes() {
    let d = dict();
    assert!(matches!(d.load_base("{"), Err(DictError::Json(_))));
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        d.load_base_file(&dir.path().join("absent.json")),
        Err(DictError::MissingDataset(_))
    ));
    assert!(d.is_empty());
}

#[test]
fn load_builtin_fallback() {
    let d = dict();
    assert!(d.load_builtin() > 0);
    assert_eq!(d.best_candidate("arigatou").unwrap().kanji, "有難う");
    assert_eq!(d.best_candidate("tokyo").unwrap().kanji, "東京");
}

#[test]
fn user_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("user-dictionary.json");

    let d = dict().with_user_path(&path);
    d.add_entry("kami", vec![sys("紙", "かみ", 90)], 0);
    d.register_user_entry("neko", "猫", "ねこ");
    d.register_user_entry("kami", "加美", "かみ");
    let before_neko = d.best_candidate("neko").unwrap();
    let before_kami = d.best_candidate("kami").unwrap();

    let fresh = dict().with_user_path(&path);
    fresh.add_entry("kami", vec![sys("紙", "かみ", 90)], 0);
    assert_eq!(fresh.load_user_entries().unwrap(), 2);
    assert_eq!(fresh.best_candidate("neko").unwrap(), before_neko);
    assert_eq!(fresh.best_candidate("kami").unwrap(), before_kami);
}

#[test]
fn user_file_contains_only_user_subset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("user.json");
    let d = dict().with_user_path(&path);
    d.add_entry("sugoi", vec![sys("凄い", "すごい", 100)], 0);
    d.register_user_entry("neko", "猫", "ねこ");

    let value: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    let entries = value["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["romaji"], "neko");
    assert_eq!(entries[0]["candidates"][0]["kanji"], "猫");
    assert_eq!(entries[0]["candidates"][0]["hiragana"], "ねこ");
}

#[test]
fn clear_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("user.json");
    let d = dict().with_user_path(&path);
    d.register_user_entry("neko", "猫", "ねこ");
    d.clear_user_entries();

    let fresh = dict().with_user_path(&path);
    assert_eq!(fresh.load_user_entries().unwrap(), 0);
    assert!(fresh.is_empty());
}

#[test]
fn malformed_user_records_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("user.json");
    fs::write(
        &path,
        r#"{"entries": [
            {"romaji": "neko", "candidates": [{"kanji": "猫", "hiragana": "ねこ"}]},
            {"romaji": 5},
            {"romaji": "", "candidates": [{"kanji": "空"}]},
            {"romaji": "inu", "candidates": [{"kanji": ""}, {"kanji": "犬"}]}
        ]}"#,
    )
    .unwrap();
    let d = dict().with_user_path(&path);
    assert_eq!(d.load_user_entries().unwrap(), 2);
    assert_eq!(d.best_candidate("neko").unwrap().kanji, "猫");
    assert_eq!(d.best_candidate("inu").unwrap().kanji, "犬");
    assert_eq!(d.best_candidate("inu").unwrap().hiragana, "");
}

#[test]
fn missing_user_file_loads_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let d = dict().with_user_path(dir.path().join("absent.json"));
    assert_eq!(d.load_user_entries().unwrap(), 0);
}

#[test]
fn save_failure_keeps_memory_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("user.json");
    fs::create_dir_all(path.join("blocker")).unwrap();
    let d = dict().with_user_path(&path);
    assert!(d.register_user_entry("neko", "猫", "ねこ"));
    assert!(d.save_user_entries().is_err());
    assert_eq!(d.best_candidate("neko").unwrap().kanji, "猫");
}

struct Respell(&'static str);

impl KanjiEnhancer for Respell {
    fn candidates(&self, _hiragana: &str) -> Result<Vec<String>, EnhanceError> {
        Ok(vec![self.0.to_string()])
    }
}

struct Broken;

impl KanjiEnhancer for Broken {
    fn candidates(&self, _hiragana: &str) -> Result<Vec<String>, EnhanceError> {
        Err(EnhanceError::Request("offline".into()))
    }
}

fn enhancer(backend: impl KanjiEnhancer + 'static) -> Arc<CachedEnhancer> {
    Arc::new(CachedEnhancer::new(Arc::new(backend), Duration::from_secs(2)))
}

#[test]
fn enhancer_respells_system_pick() {
    let d = dict().with_enhancer(enhancer(Respell("スゴイ")));
    d.add_entry("sugoi", vec![sys("凄い", "すごい", 100)], 0);
    assert_eq!(d.best_candidate("sugoi").unwrap().kanji, "スゴイ");
    // Usage stays on the dictionary's own spelling
    assert_eq!(d.stats().usage_count("sugoi", "凄い"), 1);
    assert_eq!(d.stats().usage_count("sugoi", "スゴイ"), 0);
}

#[test]
fn enhancer_skips_user_pick() {
    let d = dict().with_enhancer(enhancer(Respell("X")));
    d.register_user_entry("neko", "猫", "ねこ");
    assert_eq!(d.best_candidate("neko").unwrap().kanji, "猫");
}

#[test]
fn enhancer_failure_keeps_candidate() {
    let d = dict().with_enhancer(enhancer(Broken));
    d.add_entry("sugoi", vec![sys("凄い", "すごい", 100)], 0);
    assert_eq!(d.best_candidate("sugoi").unwrap().kanji, "凄い");
}
