// Chapter Assignment Resolver - Files orphan recipes under a chapter
//
// Chapter title pages list the recipes they contain. After a run, every
// recipe without a chapter is scored against those lists; the best match at
// or above the assignment threshold wins. Ties go to the earlier chapter.

use crate::catalog::{Catalog, RecipeId};
use crate::config::ReconcileConfig;
use crate::matching::{normalize, NameMatcher};
use crate::models::{AuditEntry, AuditKind, Chapter};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// One orphan filed under a chapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterAssignment {
    pub recipe_id: RecipeId,
    pub chapter_title: String,
    pub chapter_number: Option<String>,
    /// Expected name that matched
    pub matched_name: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct ChapterAssigner {
    matcher: NameMatcher,
    threshold: f64,
}

impl ChapterAssigner {
    pub fn new(config: &ReconcileConfig) -> Self {
        Self {
            matcher: NameMatcher::from_config(config),
            threshold: config.chapter_assignment_threshold,
        }
    }

    /// Best chapter for a recipe key: `(chapter, expected name, score)`
    pub fn best_chapter<'a>(
        &self,
        key: &str,
        chapters: &'a [Chapter],
    ) -> Option<(&'a Chapter, &'a str, f64)> {
        let mut best: Option<(&Chapter, &str, f64)> = None;
        for chapter in chapters {
            for expected in &chapter.expected_recipe_names {
                let score = self.matcher.score(key, &normalize(expected));
                if best.map_or(true, |(_, _, s)| score > s) {
                    best = Some((chapter, expected.as_str(), score));
                }
            }
        }
        best.filter(|(_, _, score)| *score >= self.threshold)
    }

    /// Assign every unassigned recipe that matches a chapter's expected names
    ///
    /// Writes one `chapter_reassigned` audit entry per assignment. Recipes
    /// without a match are left alone.
    pub fn assign_chapters(&self, catalog: &mut Catalog, run_id: Uuid) -> Vec<ChapterAssignment> {
        if catalog.chapters().is_empty() {
            return Vec::new();
        }

        let mut assignments = Vec::new();
        for (id, recipe) in catalog.recipes() {
            if !recipe.is_unassigned() {
                continue;
            }
            match self.best_chapter(&recipe.normalized_key, catalog.chapters()) {
                Some((chapter, matched, score)) => assignments.push(ChapterAssignment {
                    recipe_id: id,
                    chapter_title: chapter.display_title(),
                    chapter_number: chapter.chapter_number.clone(),
                    matched_name: matched.to_string(),
                    score,
                }),
                None => debug!(recipe_id = %id, name = %recipe.name, "No chapter match"),
            }
        }

        for assignment in &assignments {
            let Some(recipe) = catalog.recipe_mut(assignment.recipe_id) else {
                continue;
            };
            recipe.chapter = Some(assignment.chapter_title.clone());
            if assignment.chapter_number.is_some() {
                recipe.chapter_number = assignment.chapter_number.clone();
            }
            let name = recipe.name.clone();

            info!(
                recipe_id = %assignment.recipe_id,
                chapter = %assignment.chapter_title,
                score = assignment.score,
                "Recipe assigned to chapter"
            );
            catalog.record(AuditEntry::new(
                run_id,
                AuditKind::ChapterReassigned,
                assignment.recipe_id,
                name,
                format!(
                    "matched '{}' listed in chapter '{}' (score {:.3})",
                    assignment.matched_name, assignment.chapter_title, assignment.score
                ),
            ));
        }

        assignments
    }
}

/// Assign orphans using the configured chapter threshold
pub fn assign_chapters(
    catalog: &mut Catalog,
    config: &ReconcileConfig,
    run_id: Uuid,
) -> Vec<ChapterAssignment> {
    ChapterAssigner::new(config).assign_chapters(catalog, run_id)
}
