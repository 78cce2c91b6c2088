// src/matching/fuzzy.rs - Best-candidate approximate matching against the
// reference vocabulary

use strsim::jaro_winkler;

use crate::models::matching::MatchCandidate;

/// Similarity at or above this clears a candidate for automatic resolution.
pub const DEFAULT_MATCH_CUTOFF: f64 = 0.5;

/// Pluggable string-similarity strategy. Implementations must be
/// deterministic and score into [0, 1], 1 meaning identical.
pub trait SimilarityScorer {
    fn score(&self, a: &str, b: &str) -> f64;
}

/// The default scorer. Jaro-Winkler behaves well on short names where a
/// shared prefix is a strong signal, and is what the rest of the matching
/// stack standardizes on.
#[derive(Debug, Clone, Copy, Default)]
pub struct JaroWinklerScorer;

impl SimilarityScorer for JaroWinklerScorer {
    fn score(&self, a: &str, b: &str) -> f64 {
        jaro_winkler(a, b)
    }
}

/// Searches a reference vocabulary for the single best approximate match to
/// a raw name. Never fails: a miss degrades to the no-match outcome of the
/// retrieval mode the caller asked for.
#[derive(Debug, Clone)]
pub struct FuzzyMatcher<'a, S = JaroWinklerScorer> {
    vocabulary: &'a [String],
    cutoff: f64,
    scorer: S,
}

impl<'a> FuzzyMatcher<'a, JaroWinklerScorer> {
    pub fn new(vocabulary: &'a [String]) -> Self {
        Self::with_scorer(vocabulary, DEFAULT_MATCH_CUTOFF, JaroWinklerScorer)
    }
}

impl<'a, S: SimilarityScorer> FuzzyMatcher<'a, S> {
    pub fn with_scorer(vocabulary: &'a [String], cutoff: f64, scorer: S) -> Self {
        Self {
            vocabulary,
            cutoff,
            scorer,
        }
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Computes the single best candidate for `raw`. Ties at the maximum
    /// score keep the earliest vocabulary entry, so results are stable
    /// across runs. The candidate is accepted (matched_name populated) only
    /// when its score is at or above the cutoff.
    pub fn best_candidate(&self, raw: &str) -> MatchCandidate {
        let mut best: Option<(&str, f64)> = None;

        if !raw.is_empty() {
            for entry in self.vocabulary {
                let score = self.scorer.score(raw, entry);
                // Strict comparison keeps the first of tied candidates.
                if best.map_or(true, |(_, best_score)| score > best_score) {
                    best = Some((entry, score));
                }
            }
        }

        let (matched_name, confidence) = match best {
            Some((entry, score)) if score >= self.cutoff => (Some(entry.to_string()), score),
            Some((_, score)) => (None, score),
            None => (None, 0.0),
        };

        MatchCandidate {
            raw_name: raw.to_string(),
            matched_name,
            confidence,
        }
    }

    /// Padded mode: the best match, or the raw name itself when nothing
    /// clears the cutoff. Guaranteed non-absent.
    pub fn match_padded(&self, raw: &str) -> String {
        self.best_candidate(raw).padded().to_string()
    }

    /// Unpadded mode: `None` exactly when no candidate clears the cutoff.
    pub fn match_unpadded(&self, raw: &str) -> Option<String> {
        self.best_candidate(raw).accepted().map(|name| name.to_string())
    }
}
