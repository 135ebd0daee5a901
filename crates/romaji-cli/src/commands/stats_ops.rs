use time::{OffsetDateTime, UtcOffset};

use romaji_engine::romaji_core::settings::settings;
use romaji_engine::romaji_core::usage_stats::{usage_score_for, UsageRecord};

use super::{column_width, open_engine, pad, EngineArgs};

fn format_time(epoch_secs: u64) -> String {
    let Some(t) = i64::try_from(epoch_secs)
        .ok()
        .filter(|&secs| secs > 0)
        .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
    else {
        return "-".to_string();
    };
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let t = t.to_offset(offset);
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        t.year(),
        t.month() as u8,
        t.day(),
        t.hour(),
        t.minute(),
        t.second()
    )
}

fn print_rows(romaji: &str, rows: &[(String, UsageRecord)], repr_w: usize) {
    let weight = settings().scoring.usage_weight;
    for (representation, record) in rows {
        println!(
            "{romaji}\t{}  count={:<5} score={:<6.2} last={}",
            pad(representation, repr_w),
            record.count,
            usage_score_for(record.count, weight),
            format_time(record.last_used),
        );
    }
}

/// Usage records for one key, or for every key when `romaji` is `None`.
pub fn stats(args: &EngineArgs, romaji: Option<&str>) {
    let engine = open_engine(args);
    let usage = engine.stats();
    match romaji {
        Some(romaji) => {
            let rows = usage.stats_for(romaji);
            if rows.is_empty() {
                println!("No usage recorded for {romaji}");
                return;
            }
            let repr_w = column_width(rows.iter().map(|(r, _)| r.as_str()));
            print_rows(&romaji.to_lowercase(), &rows, repr_w);
        }
        None => {
            let records = usage.records();
            if records.is_empty() {
                println!("(empty)");
                return;
            }
            let repr_w = column_width(records.values().flat_map(|m| m.keys().map(String::as_str)));
            let mut total = 0;
            for (romaji, by_repr) in &records {
                let mut rows: Vec<(String, UsageRecord)> =
                    by_repr.iter().map(|(r, rec)| (r.clone(), *rec)).collect();
                rows.sort_by(|a, b| b.1.count.cmp(&a.1.count));
                total += rows.len();
                print_rows(romaji, &rows, repr_w);
            }
            println!("---");
            println!("{total} records for {} keys", records.len());
        }
    }
}

pub fn clear_stats(args: &EngineArgs) {
    let engine = open_engine(args);
    let before = engine.stats().len();
    die!(engine.clear_usage(), "Error clearing usage statistics: {}");
    println!("Cleared usage statistics ({before} records)");
}
