//! Browse index over a reconciled catalog
//!
//! Groups recipe ids by chapter, dietary tag and macro bucket, and lists
//! recipe names that chapter pages promise but the catalog does not contain.

use super::{Catalog, RecipeId};
use crate::config::ReconcileConfig;
use crate::matching::{normalize, NameMatcher};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Bucket for recipes without a chapter
pub const UNKNOWN_CHAPTER: &str = "Unknown";

/// More than this many grams of protein is high protein
pub const HIGH_PROTEIN_GRAMS: u32 = 30;
/// Fewer than this many grams of carbohydrate is low carb
pub const LOW_CARB_GRAMS: u32 = 20;
/// Fewer than this many calories is low calorie
pub const LOW_CALORIE_KCAL: u32 = 400;

static FIRST_INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("integer pattern is valid"));

/// Recipes grouped by macro nutrient thresholds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroBuckets {
    pub high_protein: Vec<RecipeId>,
    pub low_carb: Vec<RecipeId>,
    pub low_calorie: Vec<RecipeId>,
}

/// Expected recipe name with no matching catalog recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedName {
    pub name: String,
    /// Display title of the chapter that lists it
    pub chapter: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIndex {
    pub by_chapter: BTreeMap<String, Vec<RecipeId>>,
    /// Keyed by lower snake case tag ("GLUTEN-FREE" -> "gluten_free")
    pub by_dietary: BTreeMap<String, Vec<RecipeId>>,
    pub by_macros: MacroBuckets,
    pub unmatched: Vec<UnmatchedName>,
}

impl RecipeIndex {
    /// Build the index; expected names are matched at `config.merge_threshold`
    pub fn build(catalog: &Catalog, config: &ReconcileConfig) -> Self {
        let mut index = Self::default();

        for (id, recipe) in catalog.recipes() {
            let chapter = if recipe.is_unassigned() {
                UNKNOWN_CHAPTER.to_string()
            } else {
                recipe.chapter.clone().unwrap_or_default()
            };
            index.by_chapter.entry(chapter).or_default().push(id);

            let mut tags = HashSet::new();
            for tag in &recipe.dietary_info {
                let key = dietary_key(tag);
                if !key.is_empty() && tags.insert(key.clone()) {
                    index.by_dietary.entry(key).or_default().push(id);
                }
            }

            let nutrition = &recipe.nutrition;
            if first_integer(nutrition.protein.as_deref()).is_some_and(|g| g > HIGH_PROTEIN_GRAMS) {
                index.by_macros.high_protein.push(id);
            }
            if first_integer(nutrition.carbs.as_deref()).is_some_and(|g| g < LOW_CARB_GRAMS) {
                index.by_macros.low_carb.push(id);
            }
            if first_integer(nutrition.calories.as_deref()).is_some_and(|k| k < LOW_CALORIE_KCAL) {
                index.by_macros.low_calorie.push(id);
            }
        }

        let matcher = NameMatcher::from_config(config);
        let mut reported = HashSet::new();
        for chapter in catalog.chapters() {
            for listed in &chapter.expected_recipe_names {
                let key = normalize(listed);
                if key.is_empty() || reported.contains(&key) {
                    continue;
                }
                let found = matcher
                    .find_match(&key, catalog.keys(), config.merge_threshold)
                    .is_some();
                if !found {
                    reported.insert(key);
                    index.unmatched.push(UnmatchedName {
                        name: listed.clone(),
                        chapter: chapter.display_title(),
                    });
                }
            }
        }

        index
    }

    /// Recipes filed under a chapter display title
    pub fn chapter(&self, title: &str) -> &[RecipeId] {
        self.by_chapter.get(title).map_or(&[], Vec::as_slice)
    }

    /// Recipes carrying a dietary tag, in any spelling ("Gluten Free", "GLUTEN-FREE")
    pub fn dietary(&self, tag: &str) -> &[RecipeId] {
        self.by_dietary
            .get(&dietary_key(tag))
            .map_or(&[], Vec::as_slice)
    }
}

fn dietary_key(tag: &str) -> String {
    tag.trim()
        .to_lowercase()
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// First run of digits in a printed value: "32g" -> 32, "about 450 kcal" -> 450
fn first_integer(value: Option<&str>) -> Option<u32> {
    FIRST_INTEGER.find(value?)?.as_str().parse().ok()
}
