use serde::Serialize;

use crate::settings::ScoringSettings;
use crate::usage_stats::UsageStats;

/// Where a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateOrigin {
    /// Base dataset or built-in fallback.
    System,
    /// Registered at runtime by the user.
    User,
}

/// One orthographic rendering of a romaji word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionCandidate {
    /// Kanji spelling; empty for a hiragana-only candidate.
    pub kanji: String,
    pub hiragana: String,
    pub base_score: u32,
    pub origin: CandidateOrigin,
}

impl ConversionCandidate {
    pub fn system(kanji: impl Into<String>, hiragana: impl Into<String>, base_score: u32) -> Self {
        Self {
            kanji: kanji.into(),
            hiragana: hiragana.into(),
            base_score,
            origin: CandidateOrigin::System,
        }
    }

    pub fn user(kanji: impl Into<String>, hiragana: impl Into<String>, base_score: u32) -> Self {
        Self {
            kanji: kanji.into(),
            hiragana: hiragana.into(),
            base_score,
            origin: CandidateOrigin::User,
        }
    }

    /// Display text and identity key: the kanji, or the hiragana when there
    /// is no kanji. Two hiragana-only candidates with different readings stay
    /// distinct.
    pub fn representation(&self) -> &str {
        if self.kanji.is_empty() {
            &self.hiragana
        } else {
            &self.kanji
        }
    }

    pub fn is_user(&self) -> bool {
        self.origin == CandidateOrigin::User
    }

    /// `user_priority_score + usage` inside a user entry, otherwise
    /// `base_score * base_score_weight + usage`.
    pub fn score(&self, user_priority: u32, usage_score: f64, scoring: &ScoringSettings) -> f64 {
        if user_priority > 0 {
            scoring.user_priority_score + usage_score
        } else {
            f64::from(self.base_score) * scoring.base_score_weight + usage_score
        }
    }
}

/// All candidates for one romaji key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DictionaryEntry {
    pub romaji: String,
    pub candidates: Vec<ConversionCandidate>,
    /// 0 for system entries; > 0 for user-registered entries.
    pub user_priority: u32,
    /// System candidates replaced by a user registration of the same
    /// representation, restored when that registration goes away.
    #[serde(skip)]
    shadowed: Vec<ConversionCandidate>,
}

impl DictionaryEntry {
    pub fn new(romaji: &str, candidates: Vec<ConversionCandidate>, user_priority: u32) -> Self {
        Self {
            romaji: romaji.to_lowercase(),
            candidates,
            user_priority,
            shadowed: Vec::new(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.user_priority > 0
    }

    /// Replace the candidate with the same representation in place, or
    /// append. Returns `true` when appended.
    ///
    /// A system candidate replaced by a user one is kept aside and comes
    /// back when the user candidate is removed.
    pub fn add_candidate(&mut self, candidate: ConversionCandidate) -> bool {
        let Some(existing) = self
            .candidates
            .iter_mut()
            .find(|c| c.representation() == candidate.representation())
        else {
            self.candidates.push(candidate);
            return true;
        };
        if !existing.is_user() && candidate.is_user() {
            let displaced = std::mem::replace(existing, candidate);
            self.shadowed
                .retain(|c| c.representation() != displaced.representation());
            self.shadowed.push(displaced);
        } else {
            *existing = candidate;
        }
        false
    }

    /// Remove the candidate with this representation, putting back the system
    /// candidate it displaced if there was one. Returns `true` if found.
    pub fn remove_candidate(&mut self, representation: &str) -> bool {
        let Some(pos) = self
            .candidates
            .iter()
            .position(|c| c.representation() == representation)
        else {
            return false;
        };
        match self
            .shadowed
            .iter()
            .position(|c| c.representation() == representation)
        {
            Some(i) => self.candidates[pos] = self.shadowed.swap_remove(i),
            None => {
                self.candidates.remove(pos);
            }
        }
        true
    }

    /// Drop every user candidate, restoring displaced system candidates in
    /// their old positions. Returns how many user candidates went away.
    pub fn clear_user_candidates(&mut self) -> usize {
        let users: Vec<String> = self
            .candidates
            .iter()
            .filter(|c| c.is_user())
            .map(|c| c.representation().to_string())
            .collect();
        for representation in &users {
            self.remove_candidate(representation);
        }
        users.len()
    }

    /// Highest-scoring candidate; the first one wins a tie. Does not record
    /// usage.
    pub fn best_candidate(
        &self,
        stats: &UsageStats,
        scoring: &ScoringSettings,
    ) -> Option<&ConversionCandidate> {
        let (first, rest) = self.candidates.split_first()?;
        if rest.is_empty() {
            return Some(first);
        }
        let score_of = |c: &ConversionCandidate| {
            let usage = stats.usage_score(&self.romaji, c.representation());
            c.score(self.user_priority, usage, scoring)
        };

        let mut best = first;
        let mut best_score = score_of(first);
        for candidate in rest {
            let score = score_of(candidate);
            if score > best_score {
                best = candidate;
                best_score = score;
            }
        }
        Some(best)
    }

    /// Candidates with their current scores, in entry order.
    pub fn scored(
        &self,
        stats: &UsageStats,
        scoring: &ScoringSettings,
    ) -> Vec<(ConversionCandidate, f64)> {
        self.candidates
            .iter()
            .map(|c| {
                let usage = stats.usage_score(&self.romaji, c.representation());
                (c.clone(), c.score(self.user_priority, usage, scoring))
            })
            .collect()
    }
}
