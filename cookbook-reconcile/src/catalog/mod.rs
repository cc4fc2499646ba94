//! Catalog aggregate: recipes, chapters and the audit log
//!
//! Recipes are addressed by [`RecipeId`], assigned in insertion order and
//! never reused. The engine never removes a recipe.

pub mod index;
pub mod summary;

pub use index::RecipeIndex;
pub use summary::CatalogSummary;

use crate::matching::normalizer::normalize;
use crate::models::{AuditEntry, AuditLog, Chapter, Recipe};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Stable synthetic recipe identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(pub u64);

impl std::fmt::Display for RecipeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

fn first_id() -> u64 {
    1
}

/// Reconciled cookbook catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    recipes: BTreeMap<RecipeId, Recipe>,
    /// Declaration order
    #[serde(default)]
    chapters: Vec<Chapter>,
    #[serde(default)]
    audit_log: AuditLog,
    #[serde(default = "first_id")]
    next_id: u64,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            recipes: BTreeMap::new(),
            chapters: Vec::new(),
            audit_log: AuditLog::new(),
            next_id: first_id(),
        }
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a recipe under a fresh identifier
    pub fn insert(&mut self, recipe: Recipe) -> RecipeId {
        let after_last = self
            .recipes
            .keys()
            .next_back()
            .map_or(first_id(), |id| id.0 + 1);
        let id = RecipeId(self.next_id.max(after_last));
        self.next_id = id.0 + 1;
        self.recipes.insert(id, recipe);
        id
    }

    pub fn recipe(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.get(&id)
    }

    pub(crate) fn recipe_mut(&mut self, id: RecipeId) -> Option<&mut Recipe> {
        self.recipes.get_mut(&id)
    }

    /// Recipes in insertion order
    pub fn recipes(&self) -> impl Iterator<Item = (RecipeId, &Recipe)> {
        self.recipes.iter().map(|(id, recipe)| (*id, recipe))
    }

    /// `(id, normalized_key)` pairs in insertion order, for matching
    pub fn keys(&self) -> impl Iterator<Item = (RecipeId, &str)> {
        self.recipes
            .iter()
            .map(|(id, recipe)| (*id, recipe.normalized_key.as_str()))
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Chapters in declaration order
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Chapter by number, or by normalized title for unnumbered chapters
    pub fn chapter(&self, number_or_title: &str) -> Option<&Chapter> {
        let title_key = format!("title:{}", normalize(number_or_title));
        self.chapters.iter().find(|c| {
            c.key()
                .is_some_and(|k| k == number_or_title || k == title_key)
        })
    }

    /// Stored chapter that `chapter` would be folded into
    ///
    /// Chapters match on [`Chapter::key`], or on normalized title when one
    /// side is unnumbered.
    pub fn matching_chapter(&self, chapter: &Chapter) -> Option<&Chapter> {
        self.chapter_position(chapter).map(|i| &self.chapters[i])
    }

    fn chapter_position(&self, incoming: &Chapter) -> Option<usize> {
        let key = incoming.key()?;
        let incoming_title = incoming
            .title
            .as_deref()
            .map(normalize)
            .filter(|t| !t.is_empty());

        self.chapters.iter().position(|c| {
            c.key().as_deref() == Some(key.as_str())
                || ((c.chapter_number.is_none() || incoming.chapter_number.is_none())
                    && incoming_title.is_some()
                    && c.title.as_deref().map(normalize) == incoming_title)
        })
    }

    /// Insert a chapter or fold it into the matching existing one
    ///
    /// Missing number/title are backfilled and expected recipe names unioned
    /// by normalized key. Returns `true` if anything changed; a chapter with
    /// neither number nor title is ignored.
    pub fn upsert_chapter(&mut self, incoming: Chapter) -> bool {
        if incoming.key().is_none() {
            return false;
        }

        let Some(position) = self.chapter_position(&incoming) else {
            let mut chapter = incoming;
            chapter.expected_recipe_names = union_names(Vec::new(), chapter.expected_recipe_names);
            self.chapters.push(chapter);
            return true;
        };

        let existing = &mut self.chapters[position];
        let mut changed = false;
        if existing.chapter_number.is_none() && incoming.chapter_number.is_some() {
            existing.chapter_number = incoming.chapter_number;
            changed = true;
        }
        if existing.title.is_none() && incoming.title.is_some() {
            existing.title = incoming.title;
            changed = true;
        }
        let before = existing.expected_recipe_names.len();
        existing.expected_recipe_names = union_names(
            std::mem::take(&mut existing.expected_recipe_names),
            incoming.expected_recipe_names,
        );
        changed || existing.expected_recipe_names.len() != before
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit_log
    }

    pub(crate) fn record(&mut self, entry: AuditEntry) {
        self.audit_log.append(entry);
    }
}

fn union_names(mut existing: Vec<String>, incoming: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = existing.iter().map(|n| normalize(n)).collect();
    for name in incoming {
        let key = normalize(&name);
        if !key.is_empty() && seen.insert(key) {
            existing.push(name);
        }
    }
    existing
}
