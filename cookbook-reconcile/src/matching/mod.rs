//! Recipe name matching
//!
//! Pure functions only: normalization produces the comparison key, similarity
//! scores two keys and picks the best catalog candidate.

pub mod normalizer;
pub mod similarity;

pub use normalizer::{collapse_whitespace, normalize};
pub use similarity::{similarity, MatchResult, NameMatcher};
