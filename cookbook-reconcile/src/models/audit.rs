//! Append-only audit log of catalog mutations

use crate::catalog::RecipeId;
use crate::error::AmbiguousMatchWarning;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of catalog mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    /// New recipe inserted
    Added,
    /// Continuation fragment appended to a running recipe
    Updated,
    /// Fuzzy or exact name match merged into an existing recipe
    Merged,
    /// Orphan recipe assigned to a chapter
    ChapterReassigned,
    /// Incoming record carried nothing the existing recipe lacked
    SkippedDuplicate,
}

impl AuditKind {
    pub const ALL: [AuditKind; 5] = [
        AuditKind::Added,
        AuditKind::Updated,
        AuditKind::Merged,
        AuditKind::ChapterReassigned,
        AuditKind::SkippedDuplicate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Updated => "updated",
            Self::Merged => "merged",
            Self::ChapterReassigned => "chapter_reassigned",
            Self::SkippedDuplicate => "skipped_duplicate",
        }
    }
}

impl std::fmt::Display for AuditKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalog mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    /// Reconcile run that produced the entry
    pub run_id: Uuid,
    pub kind: AuditKind,
    pub recipe_id: RecipeId,
    pub recipe_name: String,
    pub detail: String,
    /// Competing candidates when the match was ambiguous
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambiguity: Option<AmbiguousMatchWarning>,
}

impl AuditEntry {
    /// Entry stamped with the current time
    pub fn new(
        run_id: Uuid,
        kind: AuditKind,
        recipe_id: RecipeId,
        recipe_name: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: cookbook_common::run::now(),
            run_id,
            kind,
            recipe_id,
            recipe_name: recipe_name.into(),
            detail: detail.into(),
            ambiguity: None,
        }
    }

    pub fn with_ambiguity(mut self, ambiguity: Option<AmbiguousMatchWarning>) -> Self {
        self.ambiguity = ambiguity;
        self
    }
}

/// Append-only sequence of [`AuditEntry`]
///
/// Entries cannot be removed or edited once appended.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: AuditEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &AuditEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries of the given kind
    pub fn count(&self, kind: AuditKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    /// Entries of the given kind, oldest first
    pub fn of_kind(&self, kind: AuditKind) -> impl Iterator<Item = &AuditEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    /// Entries written by one reconcile run
    pub fn for_run(&self, run_id: Uuid) -> impl Iterator<Item = &AuditEntry> {
        self.entries.iter().filter(move |e| e.run_id == run_id)
    }
}
