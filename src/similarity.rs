//! Identifier similarity for "did you mean" suggestions

use serde::{Deserialize, Serialize};

/// Default minimum similarity for a candidate to be suggested (exclusive)
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// Default maximum number of suggestions per error
pub const DEFAULT_MAX_SUGGESTIONS: usize = 3;

/// Normalized edit-distance similarity in `[0, 1]`.
///
/// `1 - levenshtein(a, b) / max(len(a), len(b))`, counted in chars. Two empty
/// strings are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

/// Ranks candidate identifiers against an unknown one
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatcher {
    /// Candidates must score strictly above this
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Upper bound on returned suggestions
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_max_suggestions() -> usize {
    DEFAULT_MAX_SUGGESTIONS
}

impl Default for SimilarityMatcher {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
        }
    }
}

impl SimilarityMatcher {
    pub fn new(threshold: f64, max_suggestions: usize) -> Self {
        Self { threshold, max_suggestions }
    }

    /// Candidates above the threshold, in the order they were given.
    ///
    /// Order is the caller's (registry declaration order); candidates are
    /// not re-ranked by score.
    pub fn suggest<'a, I>(&self, target: &str, candidates: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        candidates
            .into_iter()
            .filter(|candidate| similarity(target, candidate) > self.threshold)
            .take(self.max_suggestions)
            .map(str::to_string)
            .collect()
    }
}
