//! Optional hiragana → kanji refinement by an external collaborator.
//!
//! The collaborator is best-effort: every call is bounded by a timeout, and
//! any failure leaves the caller's own candidate in place. Outcomes, failures
//! included, are cached by input so a word is looked up at most once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum EnhanceError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("no answer within {0:?}")]
    Timeout(Duration),
    #[error("enhancer worker unavailable: {0}")]
    Worker(String),
}

/// A source of kanji spellings for a hiragana reading.
pub trait KanjiEnhancer: Send + Sync {
    /// Candidate spellings, best first. An empty list means "no suggestion".
    fn candidates(&self, hiragana: &str) -> Result<Vec<String>, EnhanceError>;

    /// The best spelling, or the input unchanged when there is none.
    fn enhance(&self, hiragana: &str) -> Result<String, EnhanceError> {
        Ok(self
            .candidates(hiragana)?
            .into_iter()
            .next()
            .unwrap_or_else(|| hiragana.to_string()))
    }
}

pub struct CachedEnhancer {
    backend: Arc<dyn KanjiEnhancer>,
    cache: RwLock<HashMap<String, Vec<String>>>,
    enabled: AtomicBool,
    timeout: Duration,
}

impl CachedEnhancer {
    pub fn new(backend: Arc<dyn KanjiEnhancer>, timeout: Duration) -> Self {
        Self {
            backend,
            cache: RwLock::new(HashMap::new()),
            enabled: AtomicBool::new(true),
            timeout,
        }
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Best spelling for `hiragana`, or the input when the collaborator is
    /// disabled, fails, times out, or has nothing to offer.
    pub fn enhance(&self, hiragana: &str) -> String {
        self.candidates(hiragana)
            .into_iter()
            .next()
            .unwrap_or_else(|| hiragana.to_string())
    }

    /// Cached candidate list for `hiragana`; empty on any failure.
    pub fn candidates(&self, hiragana: &str) -> Vec<String> {
        if hiragana.is_empty() || !self.is_enabled() {
            return Vec::new();
        }
        if let Some(hit) = self
            .cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(hiragana)
        {
            return hit.clone();
        }

        let found = match self.fetch(hiragana) {
            Ok(found) => found,
            Err(e) => {
                warn!(hiragana, error = %e, "kanji enhancement failed");
                Vec::new()
            }
        };
        debug!(hiragana, candidates = found.len(), "kanji enhancement cached");
        self.cache
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(hiragana.to_string(), found.clone());
        found
    }

    /// Run the backend on a helper thread so a hung request cannot block the
    /// caller past `timeout`.
    fn fetch(&self, hiragana: &str) -> Result<Vec<String>, EnhanceError> {
        let (tx, rx) = mpsc::channel();
        let backend = Arc::clone(&self.backend);
        let input = hiragana.to_string();
        thread::Builder::new()
            .name("romaji-enhance".into())
            .spawn(move || {
                let _ = tx.send(backend.candidates(&input));
            })
            .map_err(|e| EnhanceError::Worker(e.to_string()))?;
        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(EnhanceError::Timeout(self.timeout)),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(EnhanceError::Worker("worker exited without answer".into()))
            }
        }
    }

    pub fn clear_cache(&self) {
        self.cache.write().unwrap_or_else(|e| e.into_inner()).clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    struct Fixed {
        calls: AtomicUsize,
        answer: Result<Vec<String>, ()>,
        delay: Duration,
    }

    impl Fixed {
        fn ok(words: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                answer: Ok(words.iter().map(|s| s.to_string()).collect()),
                delay: Duration::ZERO,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                answer: Err(()),
                delay: Duration::ZERO,
            })
        }

        fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                answer: Ok(vec!["遅い".to_string()]),
                delay,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl KanjiEnhancer for Fixed {
        fn candidates(&self, _hiragana: &str) -> Result<Vec<String>, EnhanceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(self.delay);
            self.answer
                .clone()
                .map_err(|_| EnhanceError::Request("boom".into()))
        }
    }

    fn cached(backend: Arc<Fixed>) -> CachedEnhancer {
        CachedEnhancer::new(backend, Duration::from_secs(2))
    }

    #[test]
    fn returns_first_candidate_and_caches() {
        let backend = Fixed::ok(&["東京", "東亰"]);
        let e = cached(Arc::clone(&backend));
        assert_eq!(e.enhance("とうきょう"), "東京");
        assert_eq!(e.enhance("とうきょう"), "東京");
        assert_eq!(backend.calls(), 1);
        assert_eq!(e.cache_len(), 1);
    }

    #[test]
    fn failure_returns_input_and_is_cached() {
        let backend = Fixed::failing();
        let e = cached(Arc::clone(&backend));
        assert_eq!(e.enhance("すごい"), "すごい");
        assert_eq!(e.enhance("すごい"), "すごい");
        assert_eq!(backend.calls(), 1);
    }

    #[test]
    fn empty_answer_returns_input() {
        let e = cached(Fixed::ok(&[]));
        assert_eq!(e.enhance("すごい"), "すごい");
    }

    #[test]
    fn disabled_skips_backend() {
        let backend = Fixed::ok(&["凄い"]);
        let e = cached(Arc::clone(&backend));
        e.disable();
        assert!(!e.is_enabled());
        assert_eq!(e.enhance("すごい"), "すごい");
        assert_eq!(backend.calls(), 0);
        e.enable();
        assert_eq!(e.enhance("すごい"), "凄い");
    }

    #[test]
    fn timeout_returns_input() {
        let backend = Fixed::slow(Duration::from_millis(500));
        let e = CachedEnhancer::new(backend, Duration::from_millis(20));
        assert_eq!(e.enhance("おそい"), "おそい");
    }

    #[test]
    fn clear_cache_forces_refetch() {
        let backend = Fixed::ok(&["凄い"]);
        let e = cached(Arc::clone(&backend));
        e.enhance("すごい");
        e.clear_cache();
        assert_eq!(e.cache_len(), 0);
        e.enhance("すごい");
        assert_eq!(backend.calls(), 2);
    }

    #[test]
    fn empty_input_is_not_looked_up() {
        let backend = Fixed::ok(&["x"]);
        let e = cached(Arc::clone(&backend));
        assert_eq!(e.enhance(""), "");
        assert_eq!(backend.calls(), 0);
    }

    #[test]
    fn trait_default_enhance() {
        let backend = Fixed::ok(&[]);
        assert_eq!(backend.enhance("あ").unwrap(), "あ");
        assert!(Fixed::failing().enhance("あ").is_err());
    }
}
