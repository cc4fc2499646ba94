//! Fusion of extraction fragments into catalog recipes
//!
//! - `record_merger`: field-wise union of two records for the same recipe
//! - `continuation`: stitches recipes split across consecutive pages
//! - `chapter_assigner`: files orphan recipes under declared chapters

pub mod chapter_assigner;
pub mod continuation;
pub mod record_merger;

pub use chapter_assigner::{assign_chapters, ChapterAssigner, ChapterAssignment};
pub use continuation::{ContinuationResolver, PendingFragment};
pub use record_merger::{merge, merge_into, MergeSummary};
