use romaji_engine::romaji_core::dict::CandidateOrigin;

use super::{column_width, open_engine, pad, EngineArgs};

fn origin_label(origin: CandidateOrigin) -> &'static str {
    match origin {
        CandidateOrigin::System => "system",
        CandidateOrigin::User => "user",
    }
}

/// Convert a single word the way a chat line would, recording the use.
pub fn lookup(args: &EngineArgs, word: &str) {
    let engine = open_engine(args);
    let source = if engine.dictionary().contains(word) {
        "dictionary"
    } else {
        "tokenizer"
    };
    let result = engine.convert_word(word);
    println!("{}\t[{source}]", result.formatted());
}

/// Every candidate of an entry with its current score. Records nothing.
pub fn candidates(args: &EngineArgs, romaji: &str) {
    let engine = open_engine(args);
    let dict = engine.dictionary();
    let Some(entry) = dict.entry(romaji) else {
        println!("Not found: {romaji}");
        return;
    };
    let scored = dict.scored_candidates(romaji);
    let best = scored
        .iter()
        .enumerate()
        .fold(None::<(usize, f64)>, |acc, (i, (_, score))| match acc {
            Some((_, best)) if *score <= best => acc,
            _ => Some((i, *score)),
        })
        .map(|(i, _)| i);

    let repr_w = column_width(scored.iter().map(|(c, _)| c.representation()));
    let kana_w = column_width(scored.iter().map(|(c, _)| c.hiragana.as_str()));
    println!(
        "{} (priority {}, {} candidates)",
        entry.romaji,
        entry.user_priority,
        scored.len()
    );
    for (i, (c, score)) in scored.iter().enumerate() {
        let marker = if Some(i) == best { "*" } else { " " };
        let uses = engine.stats().usage_count(&entry.romaji, c.representation());
        println!(
            "{marker} {}  {}  {:<6}  base={:<5} uses={:<5} score={score:.2}",
            pad(c.representation(), repr_w),
            pad(&c.hiragana, kana_w),
            origin_label(c.origin),
            c.base_score,
            uses,
        );
    }
}

pub fn register(args: &EngineArgs, romaji: &str, representation: &str, hiragana: Option<&str>) {
    if args.data_dir().is_none() {
        eprintln!("Warning: --no-persist given, the registration is not saved");
    }
    let engine = open_engine(args);
    if engine.register_user_entry(romaji, representation, hiragana) {
        println!("Added: {romaji} → {representation}");
    } else if romaji.trim().is_empty() || representation.is_empty() {
        eprintln!("Error: romaji and representation must not be empty");
        std::process::exit(1);
    } else {
        println!("Updated: {romaji} → {representation}");
    }
    die!(engine.flush(), "Error saving: {}");
}

pub fn unregister(args: &EngineArgs, romaji: &str, representation: &str) {
    let engine = open_engine(args);
    if engine.remove_user_candidate(romaji, representation) {
        println!("Removed: {romaji} → {representation}");
    } else {
        println!("Not found: {romaji} → {representation}");
    }
    die!(engine.flush(), "Error saving: {}");
}

pub fn clear_user(args: &EngineArgs) {
    let engine = open_engine(args);
    let removed = engine.clear_user_entries();
    die!(engine.flush(), "Error saving: {}");
    println!("Removed {removed} user candidates");
}

pub fn list_user(args: &EngineArgs) {
    let engine = open_engine(args);
    let entries = engine.dictionary().user_entries();
    if entries.is_empty() {
        println!("(empty)");
        return;
    }
    let romaji_w = column_width(entries.iter().map(|e| e.romaji.as_str()));
    let mut count = 0;
    for entry in &entries {
        for c in &entry.candidates {
            println!("{}  {}\t{}", pad(&entry.romaji, romaji_w), c.representation(), c.hiragana);
            count += 1;
        }
    }
    println!("---");
    println!("{count} candidates in {} entries", entries.len());
}
