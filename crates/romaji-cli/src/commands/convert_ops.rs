use std::io::{self, BufRead};

use romaji_engine::{ConversionResult, RomajiEngine};

use super::{open_engine, EngineArgs};

#[derive(Debug, Clone, Copy)]
pub struct ConvertFlags {
    /// Print `{"japanese", "romaji"}` objects instead of `japanese(romaji)`.
    pub json: bool,
    /// Leave lines alone that are blank, already Japanese, or not romaji.
    pub message: bool,
}

fn convert_line(engine: &RomajiEngine, line: &str, flags: ConvertFlags) -> Option<ConversionResult> {
    if flags.message {
        engine.convert_message(line)
    } else {
        Some(engine.convert_text(line))
    }
}

fn print_result(line: &str, result: Option<ConversionResult>, flags: ConvertFlags) {
    match (result, flags.json) {
        (Some(r), true) => println!(
            "{}",
            die!(serde_json::to_string(&r), "Error serializing result: {}")
        ),
        (Some(r), false) => println!("{}", r.formatted()),
        (None, true) => println!("null"),
        (None, false) => println!("{line}"),
    }
}

/// Convert `text`, or every stdin line when `text` is empty.
pub fn convert_cmd(args: &EngineArgs, text: &[String], flags: ConvertFlags) {
    let engine = open_engine(args);
    if !text.is_empty() {
        let line = text.join(" ");
        print_result(&line, convert_line(&engine, &line, flags), flags);
        return;
    }
    for line in io::stdin().lock().lines() {
        let line = die!(line, "Error reading stdin: {}");
        print_result(&line, convert_line(&engine, &line, flags), flags);
    }
}

/// Tokenizer output only; the dictionary is not consulted.
pub fn transliterate_cmd(words: &[String]) {
    let table = romaji_engine::romaji_core::romaji::RomajiTable::global();
    for word in words {
        println!("{word}\t{}", table.transliterate(word));
    }
}
