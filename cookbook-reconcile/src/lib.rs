//! cookbook-reconcile library interface
//!
//! Merges recipe records extracted from cookbook page images into a durable,
//! de-duplicated catalog. The engine is synchronous and performs no I/O:
//! callers hand in page batches and an existing [`Catalog`] and get back a
//! [`Reconciliation`].

pub mod catalog;
pub mod config;
pub mod error;
pub mod fusion;
pub mod matching;
pub mod models;
pub mod workflow;

pub use crate::catalog::{Catalog, CatalogSummary, RecipeId, RecipeIndex};
pub use crate::config::{resolve_reconcile_config, ReconcileConfig};
pub use crate::error::{
    AmbiguousMatchWarning, ReconcileError, ReconcileResult, ValidationError, ValidationReason,
};
pub use crate::models::{AuditEntry, AuditKind, Chapter, PageBatch, RawExtraction, Recipe};
pub use crate::workflow::{reconcile, CatalogUpsertOrchestrator, Reconciliation, UpsertDecision};
