use std::path::PathBuf;
use std::process;

use clap::Args;
use unicode_width::UnicodeWidthStr;

use romaji_engine::romaji_core::settings::BaseLoadPolicy;
use romaji_engine::{BaseDataset, EngineOptions, RomajiEngine};

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            std::process::exit(1);
        })
    };
}

pub mod config_ops;
pub mod convert_ops;
pub mod dict_ops;
pub mod stats_ops;

/// Options shared by every command that opens an engine.
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// Directory holding the user dictionary and usage statistics
    /// (default: ~/.romaji-switcher)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    /// Keep everything in memory; nothing is read from or written to disk
    #[arg(long, global = true, conflicts_with = "data_dir")]
    pub no_persist: bool,
    /// Base dictionary JSON file (default: the embedded dataset)
    #[arg(long, global = true)]
    pub base: Option<PathBuf>,
    /// Fall back to the built-in word list if the base dictionary fails to load
    #[arg(long, global = true)]
    pub builtin_fallback: bool,
    /// Refine dictionary picks through the transliteration service
    #[arg(long, global = true)]
    pub enhance: bool,
}

pub fn default_data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".romaji-switcher")
}

impl EngineArgs {
    pub fn data_dir(&self) -> Option<PathBuf> {
        if self.no_persist {
            return None;
        }
        Some(self.data_dir.clone().unwrap_or_else(default_data_dir))
    }

    pub fn options(&self) -> EngineOptions {
        let mut options = EngineOptions::default();
        options.data_dir = self.data_dir();
        if let Some(base) = &self.base {
            options.base = BaseDataset::File(base.clone());
        }
        if self.builtin_fallback {
            options.on_base_load_failure = BaseLoadPolicy::Builtin;
        }
        options.enhance |= self.enhance;
        options
    }
}

pub fn open_engine(args: &EngineArgs) -> RomajiEngine {
    let options = args.options();
    if let Some(dir) = &options.data_dir {
        die!(
            std::fs::create_dir_all(dir),
            "Error creating data directory {}: {}",
            dir.display()
        );
    }
    RomajiEngine::new(options).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    })
}

/// Left-align `s` in a column `width` terminal cells wide.
pub(crate) fn pad(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    format!("{s}{}", " ".repeat(width.saturating_sub(w)))
}

/// Widest cell of a column, in terminal cells.
pub(crate) fn column_width<'a>(cells: impl IntoIterator<Item = &'a str>) -> usize {
    cells
        .into_iter()
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0)
}
