// Catalog Upsert Orchestrator - Per-record reconciliation loop
//
// Page batches are processed in order. Each record is cleaned into a
// fragment, offered to the continuation resolver, then matched against the
// catalog and merged or inserted. Chapter assignment runs once at the end.

use crate::catalog::{Catalog, RecipeId};
use crate::config::ReconcileConfig;
use crate::error::{AmbiguousMatchWarning, ReconcileResult, ValidationError, ValidationReason};
use crate::fusion::chapter_assigner::{ChapterAssigner, ChapterAssignment};
use crate::fusion::continuation::{ContinuationResolver, PendingFragment};
use crate::fusion::record_merger::merge_into;
use crate::matching::{MatchResult, NameMatcher};
use crate::models::fragment::declared_chapter;
use crate::models::{
    AuditEntry, AuditKind, Chapter, CompletenessHint, Fragment, PageBatch, RawExtraction, Recipe,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// What happened to one accepted record
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertDecision {
    /// No match; inserted as a new recipe
    Inserted(RecipeId),
    /// Matched and added new content
    Merged {
        recipe_id: RecipeId,
        score: f64,
        ambiguity: Option<AmbiguousMatchWarning>,
    },
    /// Matched but carried no new content
    SkippedDuplicate(RecipeId),
    /// Continued the pending recipe from the previous page
    Continued(RecipeId),
}

impl UpsertDecision {
    pub fn recipe_id(&self) -> RecipeId {
        match self {
            Self::Inserted(id) | Self::SkippedDuplicate(id) | Self::Continued(id) => *id,
            Self::Merged { recipe_id, .. } => *recipe_id,
        }
    }
}

/// Per-run counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertStats {
    pub added: usize,
    pub merged: usize,
    pub updated: usize,
    pub skipped_duplicates: usize,
    pub chapters_reassigned: usize,
}

/// Outcome of one reconcile run
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub catalog: Catalog,
    pub run_id: Uuid,
    /// Records rejected as malformed, in processing order
    pub rejected: Vec<ValidationError>,
    /// Recipes still waiting for a continuation when the run ended
    pub dangling: Vec<RecipeId>,
    pub assignments: Vec<ChapterAssignment>,
    pub stats: UpsertStats,
}

/// Owns the catalog for the duration of one run
pub struct CatalogUpsertOrchestrator {
    config: ReconcileConfig,
    matcher: NameMatcher,
    catalog: Catalog,
    run_id: Uuid,
    continuation: ContinuationResolver,
    rejected: Vec<ValidationError>,
    stats: UpsertStats,
    batches_seen: usize,
}

impl CatalogUpsertOrchestrator {
    /// Start a run over `existing`; fails only on invalid configuration
    pub fn new(existing: Catalog, config: ReconcileConfig) -> ReconcileResult<Self> {
        config.validate()?;
        let matcher = NameMatcher::from_config(&config);
        let run_id = cookbook_common::run::new_run_id();
        info!(
            run_id = %run_id,
            existing_recipes = existing.len(),
            merge_threshold = config.merge_threshold,
            chapter_assignment_threshold = config.chapter_assignment_threshold,
            "Starting catalog reconciliation"
        );

        Ok(Self {
            config,
            matcher,
            catalog: existing,
            run_id,
            continuation: ContinuationResolver::new(matcher, config.merge_threshold),
            rejected: Vec::new(),
            stats: UpsertStats::default(),
            batches_seen: 0,
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn stats(&self) -> UpsertStats {
        self.stats
    }

    /// Reconcile every record of one page batch, in order
    ///
    /// A batch without records (photo page) upserts its chapter declaration,
    /// if any, and leaves the pending continuation untouched.
    pub fn process_batch(&mut self, batch: PageBatch) -> Vec<Result<UpsertDecision, ValidationError>> {
        let batch_index = self.batches_seen;
        self.batches_seen += 1;

        if let Some(declared) = batch.chapter.and_then(declared_chapter) {
            if self.catalog.upsert_chapter(declared) {
                debug!(batch = batch_index, source = %batch.source_image, "Chapter declaration recorded");
            }
        }

        if batch.records.is_empty() {
            debug!(batch = batch_index, source = %batch.source_image, "No records on page");
            return Vec::new();
        }

        self.continuation.begin_page();

        let mut outcomes = Vec::with_capacity(batch.records.len());
        for (record_index, raw) in batch.records.into_iter().enumerate() {
            outcomes.push(self.upsert_record(
                batch_index,
                record_index,
                raw,
                &batch.source_image,
                batch.declared_page_number,
            ));
        }
        outcomes
    }

    fn upsert_record(
        &mut self,
        batch_index: usize,
        record_index: usize,
        raw: RawExtraction,
        source_image: &str,
        page_number: Option<u32>,
    ) -> Result<UpsertDecision, ValidationError> {
        let mut fragment = Fragment::from_raw(raw, source_image, page_number);
        // Recorded only once the record is accepted
        let declared = fragment.chapter.take();

        if let Some(target) = self.continuation.resolve(&fragment) {
            if let Some(name) = self.catalog.recipe(target).map(|r| r.name.clone()) {
                fragment.chapter = self.record_chapter(declared);
                return Ok(self.continue_recipe(target, name, fragment, batch_index));
            }
        }

        let Some(key) = fragment.normalized_key() else {
            let err = ValidationError {
                batch_index,
                record_index,
                source_image: fragment.source_image,
                reason: ValidationReason::MissingName,
            };
            warn!(error = %err, "Rejected extraction record");
            self.rejected.push(err.clone());
            return Err(err);
        };
        let name = fragment.name.clone().unwrap_or_default();
        fragment.chapter = self.record_chapter(declared);

        if fragment.continuation_marker {
            warn!(
                name = %name,
                batch = batch_index,
                "Continuation marker matched no pending recipe; reconciling as a new record"
            );
        }

        let found = self
            .matcher
            .find_match(&key, self.catalog.keys(), self.config.merge_threshold);

        let decision = match found {
            Some(found) => self.merge_match(found, fragment, name, batch_index),
            None => {
                let hint = fragment.completeness;
                let page = fragment.page_number;
                self.insert(fragment.into_recipe(name), batch_index, hint, page)
            }
        };
        Ok(decision)
    }

    /// Merge a record into the catalog recipe its name matched
    fn merge_match(
        &mut self,
        found: MatchResult,
        fragment: Fragment,
        name: String,
        batch_index: usize,
    ) -> UpsertDecision {
        let hint = fragment.completeness;
        let page = fragment.page_number;
        let incoming = fragment.into_recipe(name);
        let Some(existing) = self.catalog.recipe_mut(found.recipe_id) else {
            return self.insert(incoming, batch_index, hint, page);
        };
        let summary = merge_into(existing, &incoming);
        let recipe_name = existing.name.clone();

        if let Some(ambiguity) = &found.ambiguity {
            warn!(recipe_id = %found.recipe_id, name = %recipe_name, "{}", ambiguity);
        }

        let (kind, decision) = if summary.content_changed() {
            self.stats.merged += 1;
            (
                AuditKind::Merged,
                UpsertDecision::Merged {
                    recipe_id: found.recipe_id,
                    score: found.score,
                    ambiguity: found.ambiguity.clone(),
                },
            )
        } else {
            self.stats.skipped_duplicates += 1;
            (
                AuditKind::SkippedDuplicate,
                UpsertDecision::SkippedDuplicate(found.recipe_id),
            )
        };
        debug!(
            recipe_id = %found.recipe_id,
            incoming = %incoming.name,
            score = found.score,
            kind = %kind,
            "Record matched existing recipe"
        );

        let detail = if found.exact {
            format!("exact name match: {}", summary.describe())
        } else {
            format!(
                "'{}' matched at {:.3}: {}",
                incoming.name,
                found.score,
                summary.describe()
            )
        };
        self.catalog.record(
            AuditEntry::new(self.run_id, kind, found.recipe_id, recipe_name, detail)
                .with_ambiguity(found.ambiguity),
        );

        self.track_pending(found.recipe_id, hint, page, batch_index);
        decision
    }

    /// Upsert an accepted record's chapter and return the stored version
    fn record_chapter(&mut self, declared: Option<Chapter>) -> Option<Chapter> {
        let chapter = declared?;
        self.catalog.upsert_chapter(chapter.clone());
        self.catalog.matching_chapter(&chapter).cloned().or(Some(chapter))
    }

    /// Merge a confirmed continuation into the pending recipe `name`
    fn continue_recipe(
        &mut self,
        target: RecipeId,
        name: String,
        fragment: Fragment,
        batch_index: usize,
    ) -> UpsertDecision {
        let hint = fragment.completeness;
        let page = fragment.page_number;
        let incoming = fragment.into_recipe(name);
        let Some(existing) = self.catalog.recipe_mut(target) else {
            return self.insert(incoming, batch_index, hint, page);
        };
        let summary = merge_into(existing, &incoming);
        let recipe_name = existing.name.clone();

        self.continuation.confirm();
        self.stats.updated += 1;
        debug!(recipe_id = %target, page = ?page, "Continuation merged");

        let detail = match page {
            Some(page) => format!("continued on page {}: {}", page, summary.describe()),
            None => format!("continued on next page: {}", summary.describe()),
        };
        self.catalog
            .record(AuditEntry::new(self.run_id, AuditKind::Updated, target, recipe_name, detail));

        self.track_pending(target, hint, page, batch_index);
        UpsertDecision::Continued(target)
    }

    fn insert(
        &mut self,
        recipe: Recipe,
        batch_index: usize,
        hint: CompletenessHint,
        page: Option<u32>,
    ) -> UpsertDecision {
        let name = recipe.name.clone();
        let complete = recipe.is_complete;
        let id = self.catalog.insert(recipe);
        self.stats.added += 1;
        debug!(recipe_id = %id, name = %name, complete, "Recipe added");

        let detail = if complete {
            "new recipe".to_string()
        } else {
            "new recipe (incomplete)".to_string()
        };
        self.catalog
            .record(AuditEntry::new(self.run_id, AuditKind::Added, id, name, detail));

        self.track_pending(id, hint, page, batch_index);
        UpsertDecision::Inserted(id)
    }

    fn track_pending(
        &mut self,
        recipe_id: RecipeId,
        hint: CompletenessHint,
        page: Option<u32>,
        batch_index: usize,
    ) {
        let Some(recipe) = self.catalog.recipe(recipe_id) else {
            return;
        };
        let pending = PendingFragment {
            recipe_id,
            key: recipe.normalized_key.clone(),
            page_number: page,
            batch_index,
        };
        let complete = recipe.is_complete;
        self.continuation.observe(hint, pending, complete);
    }

    /// Assign chapters, collect dangling recipes and hand back the catalog
    pub fn finish(mut self) -> Reconciliation {
        let assignments =
            ChapterAssigner::new(&self.config).assign_chapters(&mut self.catalog, self.run_id);
        self.stats.chapters_reassigned = assignments.len();

        let mut dangling = Vec::new();
        if let Some(pending) = self.continuation.finish() {
            if let Some(recipe) = self.catalog.recipe(pending.recipe_id) {
                if !recipe.is_complete {
                    warn!(
                        recipe_id = %pending.recipe_id,
                        name = %recipe.name,
                        "Recipe still awaiting continuation at end of run; left incomplete"
                    );
                    dangling.push(pending.recipe_id);
                }
            }
        }

        info!(
            run_id = %self.run_id,
            added = self.stats.added,
            merged = self.stats.merged,
            updated = self.stats.updated,
            skipped_duplicates = self.stats.skipped_duplicates,
            chapters_reassigned = self.stats.chapters_reassigned,
            rejected = self.rejected.len(),
            total_recipes = self.catalog.len(),
            "Catalog reconciliation complete"
        );

        Reconciliation {
            catalog: self.catalog,
            run_id: self.run_id,
            rejected: self.rejected,
            dangling,
            assignments,
            stats: self.stats,
        }
    }
}

/// Reconcile page batches into `existing` and return the updated catalog
///
/// Fails only when `config` is invalid. Malformed records are reported in
/// [`Reconciliation::rejected`] and never touch the catalog.
pub fn reconcile<I>(
    batches: I,
    existing: Catalog,
    config: &ReconcileConfig,
) -> ReconcileResult<Reconciliation>
where
    I: IntoIterator<Item = PageBatch>,
{
    let mut orchestrator = CatalogUpsertOrchestrator::new(existing, *config)?;
    for batch in batches {
        orchestrator.process_batch(batch);
    }
    Ok(orchestrator.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, ingredients: &[&str], instructions: &[&str]) -> RawExtraction {
        RawExtraction {
            name: Some(name.to_string()),
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
            instructions: instructions.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ReconcileConfig::default().with_merge_threshold(1.5);
        assert!(CatalogUpsertOrchestrator::new(Catalog::new(), config).is_err());
    }

    #[test]
    fn test_insert_then_exact_duplicate_skipped() {
        let mut orchestrator =
            CatalogUpsertOrchestrator::new(Catalog::new(), ReconcileConfig::default()).unwrap();
        let toast = record("Toast", &["bread"], &["toast it"]);

        let first = orchestrator.process_batch(PageBatch::new("a.jpg", Some(1)).with_record(toast.clone()));
        let second = orchestrator.process_batch(PageBatch::new("b.jpg", Some(9)).with_record(toast));

        assert_eq!(first, vec![Ok(UpsertDecision::Inserted(RecipeId(1)))]);
        assert_eq!(second, vec![Ok(UpsertDecision::SkippedDuplicate(RecipeId(1)))]);

        let result = orchestrator.finish();
        let recipe = result.catalog.recipe(RecipeId(1)).unwrap();
        assert_eq!(recipe.source_images, vec!["a.jpg", "b.jpg"]);
        assert_eq!(recipe.page_numbers, vec![1, 9]);
        assert_eq!(result.stats.added, 1);
        assert_eq!(result.stats.skipped_duplicates, 1);
    }

    #[test]
    fn test_untitled_record_without_pending_is_rejected() {
        let mut orchestrator =
            CatalogUpsertOrchestrator::new(Catalog::new(), ReconcileConfig::default()).unwrap();
        let outcomes = orchestrator.process_batch(
            PageBatch::new("a.jpg", Some(1)).with_record(record("  ", &["salt"], &[])),
        );
        assert!(matches!(
            outcomes[0],
            Err(ValidationError { reason: ValidationReason::MissingName, .. })
        ));
        assert!(orchestrator.catalog().is_empty());
        assert!(orchestrator.catalog().audit_log().is_empty());
    }

    #[test]
    fn test_photo_page_keeps_pending_continuation() {
        let mut ribs = record("Braised Short Ribs", &["2 lb short ribs"], &[]);
        ribs.completeness_hint = Some("incomplete".to_string());
        let tail = record("", &[], &["Braise for 3 hours."]);

        let batches = vec![
            PageBatch::new("p5.jpg", None).with_record(ribs),
            PageBatch::new("photo.jpg", None),
            PageBatch::new("p6.jpg", None).with_record(tail),
        ];
        let result = reconcile(batches, Catalog::new(), &ReconcileConfig::default()).unwrap();

        assert_eq!(result.catalog.len(), 1);
        assert_eq!(result.stats.updated, 1);
        assert!(result.catalog.recipe(RecipeId(1)).unwrap().is_complete);
        assert!(result.rejected.is_empty());
    }

    #[test]
    fn test_dangling_recipe_reported() {
        let mut ribs = record("Braised Short Ribs", &["2 lb short ribs"], &[]);
        ribs.completeness_hint = Some("incomplete".to_string());
        let result = reconcile(
            vec![PageBatch::new("p5.jpg", Some(5)).with_record(ribs)],
            Catalog::new(),
            &ReconcileConfig::default(),
        )
        .unwrap();

        assert_eq!(result.dangling, vec![RecipeId(1)]);
        assert!(!result.catalog.recipe(RecipeId(1)).unwrap().is_complete);
    }

    #[test]
    fn test_rejected_record_leaves_chapters_untouched() {
        let mut nameless = record("", &["mystery"], &[]);
        nameless.chapter_context = Some(crate::models::RawChapterContext {
            chapter_number: Some("9".to_string()),
            title: Some("Desserts".to_string()),
            expected_recipe_names: vec!["Flan".to_string()],
        });
        let batch = PageBatch::new("p30.jpg", Some(30))
            .with_record(record("Flan", &["eggs"], &["Bake."]))
            .with_record(nameless);

        let result = reconcile(vec![batch], Catalog::new(), &ReconcileConfig::default()).unwrap();

        assert_eq!(result.rejected.len(), 1);
        assert!(result.catalog.chapters().is_empty());
        assert!(result.assignments.is_empty());
        assert!(result.catalog.recipe(RecipeId(1)).unwrap().is_unassigned());
        assert_eq!(result.catalog.audit_log().count(AuditKind::ChapterReassigned), 0);
    }

    #[test]
    fn test_continuation_records_its_chapter() {
        let mut ribs = record("Braised Short Ribs", &["2 lb short ribs"], &[]);
        ribs.completeness_hint = Some("incomplete".to_string());
        let mut tail = record("", &[], &["Braise for 3 hours."]);
        tail.chapter_context = Some(crate::models::RawChapterContext {
            chapter_number: Some("6".to_string()),
            title: Some("Braises".to_string()),
            expected_recipe_names: vec![],
        });

        let result = reconcile(
            vec![
                PageBatch::new("p5.jpg", Some(5)).with_record(ribs),
                PageBatch::new("p6.jpg", Some(6)).with_record(tail),
            ],
            Catalog::new(),
            &ReconcileConfig::default(),
        )
        .unwrap();

        assert_eq!(result.stats.updated, 1);
        assert_eq!(result.catalog.chapters().len(), 1);
        let recipe = result.catalog.recipe(RecipeId(1)).unwrap();
        assert_eq!(recipe.chapter.as_deref(), Some("Braises"));
        assert_eq!(recipe.chapter_number.as_deref(), Some("6"));
    }

    #[test]
    fn test_batch_chapter_declaration_recorded() {
        let chapter = crate::models::RawChapterContext {
            chapter_number: Some("3".to_string()),
            title: Some("Salads".to_string()),
            expected_recipe_names: vec!["Kale Caesar".to_string()],
        };

        let result = reconcile(
            vec![PageBatch::new("ch3.jpg", Some(40)).with_chapter(chapter)],
            Catalog::new(),
            &ReconcileConfig::default(),
        )
        .unwrap();

        assert_eq!(result.catalog.chapters().len(), 1);
        assert_eq!(result.catalog.chapters()[0].expected_recipe_names, vec!["Kale Caesar"]);
    }
}
