//! Romaji to Japanese conversion for chat text.
//!
//! The conversion core (tokenizer, dictionary, usage statistics) lives in
//! `romaji-core`; this crate adds the shared `RomajiEngine`, the HTTP kanji
//! enhancer and background persistence.

pub mod engine;
pub mod enhance;
pub mod error;
mod persist_worker;
pub mod trace_init;

pub use engine::{BaseDataset, ConversionResult, EngineOptions, RomajiEngine};
pub use enhance::HttpTransliterator;
pub use error::EngineError;
pub use romaji_core;
