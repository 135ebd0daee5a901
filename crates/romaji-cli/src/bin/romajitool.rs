use std::path::PathBuf;

use clap::{Parser, Subcommand};

use romaji_cli::commands::convert_ops::ConvertFlags;
use romaji_cli::commands::{config_ops, convert_ops, dict_ops, stats_ops, EngineArgs};

#[derive(Parser)]
#[command(name = "romajitool", about = "Romaji to Japanese conversion tool")]
struct Cli {
    #[command(flatten)]
    engine: EngineArgs,
    /// Custom settings TOML (see `settings-export`)
    #[arg(long, global = true)]
    settings: Option<String>,
    /// Custom romanization TOML (see `romaji-export`)
    #[arg(long, global = true)]
    romaji_table: Option<String>,
    /// Write JSON-lines traces to this directory (requires --features trace)
    #[arg(long, global = true)]
    trace_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert romaji text (reads stdin lines when no text is given)
    Convert {
        /// Text to convert
        text: Vec<String>,
        /// Output as JSON instead of `japanese(romaji)`
        #[arg(long)]
        json: bool,
        /// Chat mode: leave Japanese, blank and non-romaji lines unchanged
        #[arg(long)]
        message: bool,
    },
    /// Show tokenizer output without the dictionary
    Transliterate {
        /// Romaji words
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Convert one word and show where the result came from
    Lookup {
        /// Romaji word
        word: String,
    },
    /// List the scored candidates of a dictionary entry
    Candidates {
        /// Romaji key
        romaji: String,
    },
    /// Register a user conversion
    Register {
        /// Romaji key
        romaji: String,
        /// Kanji (or kana) to produce
        representation: String,
        /// Hiragana reading (default: tokenizer output for the romaji)
        #[arg(long)]
        hiragana: Option<String>,
    },
    /// Remove a user conversion
    Unregister {
        /// Romaji key
        romaji: String,
        /// Registered kanji (or kana)
        representation: String,
    },
    /// List user conversions
    UserList,
    /// Remove every user conversion
    ClearUser,
    /// Show usage statistics
    Stats {
        /// Only this romaji key
        romaji: Option<String>,
    },
    /// Forget all usage statistics
    ClearStats,
    /// Export default romaji mappings as TOML
    RomajiExport,
    /// Validate a custom romaji TOML file
    RomajiValidate {
        /// Path to the TOML file
        file: String,
    },
    /// Export default settings as TOML
    SettingsExport,
    /// Validate a custom settings TOML file
    SettingsValidate {
        /// Path to the TOML file
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Some(dir) = &cli.trace_dir {
        romaji_engine::trace_init::init_tracing(dir);
    }
    config_ops::apply_overrides(cli.settings.as_deref(), cli.romaji_table.as_deref());
    let engine = &cli.engine;

    match cli.command {
        Command::Convert {
            text,
            json,
            message,
        } => convert_ops::convert_cmd(engine, &text, ConvertFlags { json, message }),
        Command::Transliterate { words } => convert_ops::transliterate_cmd(&words),
        Command::Lookup { word } => dict_ops::lookup(engine, &word),
        Command::Candidates { romaji } => dict_ops::candidates(engine, &romaji),
        Command::Register {
            romaji,
            representation,
            hiragana,
        } => dict_ops::register(engine, &romaji, &representation, hiragana.as_deref()),
        Command::Unregister {
            romaji,
            representation,
        } => dict_ops::unregister(engine, &romaji, &representation),
        Command::UserList => dict_ops::list_user(engine),
        Command::ClearUser => dict_ops::clear_user(engine),
        Command::Stats { romaji } => stats_ops::stats(engine, romaji.as_deref()),
        Command::ClearStats => stats_ops::clear_stats(engine),
        Command::RomajiExport => config_ops::romaji_export(),
        Command::RomajiValidate { file } => config_ops::romaji_validate(&file),
        Command::SettingsExport => config_ops::settings_export(),
        Command::SettingsValidate { file } => config_ops::settings_validate(&file),
    }
}
