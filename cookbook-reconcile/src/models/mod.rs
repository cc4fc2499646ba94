//! Data models for cookbook-reconcile
//!
//! - `raw`: loosely typed extractor output
//! - `fragment`: cleaned, strictly typed record
//! - `recipe` / `chapter`: catalog entities
//! - `audit`: append-only mutation log

pub mod audit;
pub mod chapter;
pub mod fragment;
pub mod raw;
pub mod recipe;

pub use audit::{AuditEntry, AuditKind, AuditLog};
pub use chapter::Chapter;
pub use fragment::{CompletenessHint, Fragment};
pub use raw::{PageBatch, RawChapterContext, RawExtraction, RawSubRecipe};
pub use recipe::{DishRole, MealType, Nutrition, Recipe, SubRecipe};
