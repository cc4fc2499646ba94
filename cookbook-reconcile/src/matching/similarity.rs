//! Name similarity and candidate selection
//!
//! Score = normalized Levenshtein (1 - distance / longer length) plus a
//! containment bonus when the shorter key appears inside the longer one,
//! clamped to 1.0. Keys are expected to be normalized already.

use crate::catalog::RecipeId;
use crate::config::ReconcileConfig;
use crate::error::AmbiguousMatchWarning;
use std::cmp::Ordering;
use tracing::debug;

/// Similarity of two normalized keys under the default weighting
pub fn similarity(key_a: &str, key_b: &str) -> f64 {
    NameMatcher::default().score(key_a, key_b)
}

/// Outcome of searching the catalog for an incoming key
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub recipe_id: RecipeId,
    pub score: f64,
    /// Keys were identical
    pub exact: bool,
    /// Set when more than one candidate qualified
    pub ambiguity: Option<AmbiguousMatchWarning>,
}

/// Scores keys and picks the best candidate at or above a threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NameMatcher {
    containment_bonus: f64,
    min_containment_len: usize,
}

impl Default for NameMatcher {
    fn default() -> Self {
        Self::from_config(&ReconcileConfig::default())
    }
}

impl NameMatcher {
    pub fn from_config(config: &ReconcileConfig) -> Self {
        Self {
            containment_bonus: config.containment_bonus,
            min_containment_len: config.min_containment_len,
        }
    }

    /// Similarity in [0.0, 1.0]
    ///
    /// Identical keys score 1.0. An empty key scores 0.0 against anything.
    pub fn score(&self, key_a: &str, key_b: &str) -> f64 {
        if key_a.is_empty() || key_b.is_empty() {
            return 0.0;
        }
        if key_a == key_b {
            return 1.0;
        }

        let base = strsim::normalized_levenshtein(key_a, key_b);
        let (shorter, longer) = if key_a.chars().count() <= key_b.chars().count() {
            (key_a, key_b)
        } else {
            (key_b, key_a)
        };

        let bonus = if shorter.chars().count() >= self.min_containment_len
            && longer.contains(shorter)
        {
            self.containment_bonus
        } else {
            0.0
        };

        (base + bonus).min(1.0)
    }

    /// Best candidate for `key`, or `None` when nothing reaches `threshold`
    ///
    /// `candidates` are `(id, normalized_key)` pairs. Exact key equality wins
    /// regardless of threshold. Otherwise candidates scoring at or above the
    /// threshold are ranked by score, then by lowest (earliest) id.
    pub fn find_match<'a, I>(&self, key: &str, candidates: I, threshold: f64) -> Option<MatchResult>
    where
        I: IntoIterator<Item = (RecipeId, &'a str)>,
    {
        if key.is_empty() {
            return None;
        }

        let mut exact: Vec<RecipeId> = Vec::new();
        let mut scored: Vec<(RecipeId, f64)> = Vec::new();

        for (id, candidate) in candidates {
            if candidate == key {
                exact.push(id);
            } else {
                let score = self.score(key, candidate);
                if score >= threshold {
                    scored.push((id, score));
                }
            }
        }

        if !exact.is_empty() {
            exact.sort();
            let chosen = exact[0];
            let ambiguity = (exact.len() > 1).then(|| AmbiguousMatchWarning {
                chosen,
                candidates: exact.iter().map(|id| (*id, 1.0)).collect(),
            });
            return Some(MatchResult {
                recipe_id: chosen,
                score: 1.0,
                exact: true,
                ambiguity,
            });
        }

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        let &(chosen, score) = scored.first()?;
        debug!(
            key = %key,
            recipe_id = %chosen,
            score = score,
            qualifying = scored.len(),
            "Fuzzy name match"
        );

        let ambiguity = (scored.len() > 1).then(|| AmbiguousMatchWarning {
            chosen,
            candidates: scored.clone(),
        });

        Some(MatchResult {
            recipe_id: chosen,
            score,
            exact: false,
            ambiguity,
        })
    }
}
