use std::io;

use romaji_core::dict::DictError;
use romaji_core::usage_stats::UsageError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("base dictionary unavailable: {0}")]
    BaseDataset(#[source] DictError),

    #[error("user dictionary: {0}")]
    UserDictionary(#[source] DictError),

    #[error("usage statistics: {0}")]
    Usage(#[from] UsageError),

    #[error("failed to start persistence worker: {0}")]
    Worker(#[source] io::Error),
}
