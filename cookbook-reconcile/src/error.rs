//! Error types for cookbook-reconcile
//!
//! Only configuration problems are hard failures. A malformed extraction record
//! produces a [`ValidationError`] for that record alone, and ambiguous matches
//! are warnings resolved by the tie-break rule.

use crate::catalog::RecipeId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Engine-level error
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Invalid configuration (threshold out of range, unreadable TOML)
    #[error("Configuration error: {0}")]
    Config(String),

    /// cookbook-common error
    #[error("Common error: {0}")]
    Common(#[from] cookbook_common::Error),
}

/// Result type for engine operations that can fail
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Why an incoming record was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationReason {
    /// Name missing or blank, and the record is not a confirmed continuation
    MissingName,
}

impl std::fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => f.write_str("record has no recipe name"),
        }
    }
}

/// Rejection of one malformed extraction record
///
/// Never mutates the catalog and never produces an audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("record {record_index} of page batch {batch_index} ({source_image}) rejected: {reason}")]
pub struct ValidationError {
    /// Position of the page batch within the run
    pub batch_index: usize,
    /// Position of the record within its page batch
    pub record_index: usize,
    /// Source image the record was extracted from
    pub source_image: String,
    pub reason: ValidationReason,
}

/// Several existing recipes matched above the merge threshold
///
/// Resolved by the tie-break (highest score, then earliest inserted) and
/// attached to the resulting audit entry for later review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbiguousMatchWarning {
    /// Recipe the record was merged into
    pub chosen: RecipeId,
    /// Every candidate at or above threshold, best first
    pub candidates: Vec<(RecipeId, f64)>,
}

impl std::fmt::Display for AmbiguousMatchWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listed: Vec<String> = self
            .candidates
            .iter()
            .map(|(id, score)| format!("{} ({:.3})", id, score))
            .collect();
        write!(
            f,
            "ambiguous match among {}; chose {}",
            listed.join(", "),
            self.chosen
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message_names_record() {
        let err = ValidationError {
            batch_index: 2,
            record_index: 1,
            source_image: "IMG_0042.jpg".to_string(),
            reason: ValidationReason::MissingName,
        };
        let msg = err.to_string();
        assert!(msg.contains("record 1 of page batch 2"));
        assert!(msg.contains("IMG_0042.jpg"));
        assert!(msg.contains("no recipe name"));
    }

    #[test]
    fn test_ambiguity_display_lists_candidates() {
        let warning = AmbiguousMatchWarning {
            chosen: RecipeId(3),
            candidates: vec![(RecipeId(3), 0.9), (RecipeId(7), 0.9)],
        };
        let msg = warning.to_string();
        assert!(msg.contains("#3 (0.900)"));
        assert!(msg.contains("#7 (0.900)"));
        assert!(msg.ends_with("chose #3"));
    }

    #[test]
    fn test_common_error_converts() {
        let err: ReconcileError = cookbook_common::Error::Config("bad".to_string()).into();
        assert!(matches!(err, ReconcileError::Common(_)));
    }
}
