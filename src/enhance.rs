//! HTTP client for a `transliterate` endpoint (hiragana → kanji).
//!
//! Request: `GET <endpoint>?langpair=ja-Hira|ja&text=<hiragana>`.
//! Response: `[["<segment>", ["candidate", ...]], ...]`.

use std::time::Duration;

use romaji_core::enhance::{EnhanceError, KanjiEnhancer};
use tracing::debug;

const LANG_PAIR: &str = "ja-Hira|ja";

pub struct HttpTransliterator {
    agent: ureq::Agent,
    endpoint: String,
}

impl HttpTransliterator {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            agent,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl KanjiEnhancer for HttpTransliterator {
    fn candidates(&self, hiragana: &str) -> Result<Vec<String>, EnhanceError> {
        let body = self
            .agent
            .get(&self.endpoint)
            .query("langpair", LANG_PAIR)
            .query("text", hiragana)
            .call()
            .map_err(|e| EnhanceError::Request(format!("{}: {e}", self.endpoint)))?
            .into_body()
            .read_to_string()
            .map_err(|e| EnhanceError::Request(format!("{}: {e}", self.endpoint)))?;
        let candidates = parse_response(&body)?;
        debug!(hiragana, candidates = candidates.len(), "transliterate response");
        Ok(candidates)
    }
}

/// Candidates for the whole input.
///
/// A single segment yields its candidate list as is. When the service splits
/// the input into several segments, the result is one candidate made of each
/// segment's first choice; a segment without choices keeps its own text.
pub fn parse_response(body: &str) -> Result<Vec<String>, EnhanceError> {
    let segments: Vec<(String, Vec<String>)> =
        serde_json::from_str(body).map_err(|e| EnhanceError::Malformed(e.to_string()))?;
    match segments.len() {
        0 => Ok(Vec::new()),
        1 => {
            let (_, candidates) = segments.into_iter().next().unwrap_or_default();
            Ok(candidates.into_iter().filter(|c| !c.is_empty()).collect())
        }
        _ => {
            let joined: String = segments
                .into_iter()
                .map(|(segment, candidates)| {
                    candidates
                        .into_iter()
                        .find(|c| !c.is_empty())
                        .unwrap_or(segment)
                })
                .collect();
            Ok(vec![joined])
        }
    }
}
