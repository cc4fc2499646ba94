//! Reconciliation workflow
//!
//! [`CatalogUpsertOrchestrator`] drives one run: page batches in, updated
//! catalog plus per-record rejections out. [`reconcile`] is the one-call form.

pub mod orchestrator;

pub use orchestrator::{
    reconcile, CatalogUpsertOrchestrator, Reconciliation, UpsertDecision, UpsertStats,
};
