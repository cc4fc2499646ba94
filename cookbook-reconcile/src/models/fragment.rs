//! Strict recipe fragment: the single validation chokepoint
//!
//! Every raw record passes through [`Fragment::from_raw`] before the engine
//! looks at it. After this point lists are trimmed and de-duplicated,
//! placeholder scalars are gone, classifications are typed, and a
//! "continued" marker in the title has become a flag.

use crate::matching::normalizer::{collapse_whitespace, normalize};
use crate::models::chapter::Chapter;
use crate::models::raw::{RawChapterContext, RawExtraction, RawSubRecipe};
use crate::models::recipe::{Nutrition, Recipe, SubRecipe};
use crate::models::{DishRole, MealType};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Trailing marker: "Short Ribs (continued)", "Short Ribs, cont'd", "Continued"
static CONTINUED_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[\s,:;(\[\-–—]+)(?:continued|cont'd|cont\.)[\s)\].]*$")
        .expect("continued suffix pattern is valid")
});

/// Leading marker: "Continued: Short Ribs", "Continued from previous page - Short Ribs"
static CONTINUED_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:continued|cont'd|cont\.)(?:\s+from\s+(?:the\s+)?(?:previous|prior|last)\s+page)?\s*(?:[:;,\-–—]\s*|$)",
    )
    .expect("continued prefix pattern is valid")
});

/// Values the extractor emits when it has nothing to say
const PLACEHOLDERS: &[&str] = &["", "null", "none", "n/a", "na", "unknown", "-", "--", "?", "tbd"];

/// True for empty or placeholder scalar text
pub fn is_placeholder(value: &str) -> bool {
    let lowered = value.trim().to_lowercase();
    PLACEHOLDERS.contains(&lowered.as_str())
}

/// Whether the extractor says the recipe ends on this page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletenessHint {
    Complete,
    /// Cut off mid-list or mid-step; expects a continuation
    Incomplete,
    #[default]
    Unknown,
}

/// Cleaned extraction record
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Display name with any "continued" marker removed; `None` when untitled
    pub name: Option<String>,
    pub continuation_marker: bool,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub tips: Vec<String>,
    pub dietary_info: Vec<String>,
    pub sub_recipes: Vec<SubRecipe>,
    pub nutrition: Nutrition,
    pub description: Option<String>,
    pub nutrition_full: Option<String>,
    pub meal_type: Option<MealType>,
    pub dish_role: Option<DishRole>,
    pub page_number: Option<u32>,
    pub completeness: CompletenessHint,
    /// Chapter context reported with the record, expected names included
    pub chapter: Option<Chapter>,
    pub source_image: String,
}

impl Fragment {
    /// Map a raw record into the strict fragment type
    ///
    /// `batch_source` and `batch_page` come from the page batch and are used
    /// when the record does not report its own.
    pub fn from_raw(raw: RawExtraction, batch_source: &str, batch_page: Option<u32>) -> Self {
        let (name, marker_in_title) = match raw.name.as_deref().map(split_continuation_marker) {
            Some((name, marker)) => (Some(name).filter(|n| !n.is_empty()), marker),
            None => (None, false),
        };

        let completeness = match raw.completeness_hint.as_deref().map(parse_hint) {
            Some(hint) if hint != CompletenessHint::Unknown => hint,
            _ => match raw.is_complete {
                Some(true) => CompletenessHint::Complete,
                Some(false) => CompletenessHint::Incomplete,
                None => CompletenessHint::Unknown,
            },
        };

        let source_image = clean_scalar(raw.source_image)
            .unwrap_or_else(|| batch_source.to_string());

        Self {
            name,
            continuation_marker: marker_in_title || raw.is_continuation.unwrap_or(false),
            ingredients: clean_list(raw.ingredients),
            instructions: clean_list(raw.instructions),
            tips: clean_list(raw.tips),
            dietary_info: clean_list(
                raw.dietary_info.into_iter().map(|tag| tag.trim().to_uppercase()),
            ),
            sub_recipes: clean_sub_recipes(raw.sub_recipes),
            nutrition: Nutrition {
                calories: clean_scalar(raw.calories),
                protein: clean_scalar(raw.protein),
                carbs: clean_scalar(raw.carbs),
                fat: clean_scalar(raw.fat),
                serves: clean_scalar(raw.serves),
                prep_time: clean_scalar(raw.prep_time),
                cook_time: clean_scalar(raw.cook_time),
                total_time: clean_scalar(raw.total_time),
            },
            description: clean_scalar(raw.description),
            nutrition_full: clean_scalar(raw.nutrition_full),
            meal_type: clean_scalar(raw.meal_type).and_then(|m| m.parse().ok()),
            dish_role: clean_scalar(raw.dish_role).and_then(|r| r.parse().ok()),
            page_number: raw.declared_page_number.or(batch_page),
            completeness,
            chapter: raw.chapter_context.and_then(declared_chapter),
            source_image,
        }
    }

    /// Comparison key of the name, if titled
    pub fn normalized_key(&self) -> Option<String> {
        self.name.as_deref().map(normalize).filter(|k| !k.is_empty())
    }

    pub fn is_untitled(&self) -> bool {
        self.normalized_key().is_none()
    }

    /// Extractor explicitly said the recipe runs onto the next page
    pub fn declared_incomplete(&self) -> bool {
        self.completeness == CompletenessHint::Incomplete
    }

    /// Build a recipe from this fragment under the given display name
    ///
    /// A fragment is complete when it has both ingredients and instructions
    /// and was not declared incomplete.
    pub fn into_recipe(self, name: String) -> Recipe {
        let mut recipe = Recipe::new(name);
        recipe.is_complete = !self.ingredients.is_empty()
            && !self.instructions.is_empty()
            && !self.declared_incomplete();
        if let Some(chapter) = self.chapter {
            recipe.chapter = Some(chapter.display_title());
            recipe.chapter_number = chapter.chapter_number;
        }
        recipe.page_numbers = self.page_number.into_iter().collect();
        recipe.source_images = vec![self.source_image];
        recipe.ingredients = self.ingredients;
        recipe.instructions = self.instructions;
        recipe.tips = self.tips;
        recipe.dietary_info = self.dietary_info;
        recipe.sub_recipes = self.sub_recipes;
        recipe.nutrition = self.nutrition;
        recipe.description = self.description;
        recipe.nutrition_full = self.nutrition_full;
        recipe.meal_type = self.meal_type;
        recipe.dish_role = self.dish_role;
        recipe
    }
}

/// Strip a "continued" marker from a title
///
/// Returns the remaining name (possibly empty) and whether a marker was found.
pub fn split_continuation_marker(title: &str) -> (String, bool) {
    let trimmed = title.trim();
    if let Some(found) = CONTINUED_PREFIX.find(trimmed) {
        return (collapse_whitespace(&trimmed[found.end()..]), true);
    }
    if let Some(found) = CONTINUED_SUFFIX.find(trimmed) {
        return (collapse_whitespace(&trimmed[..found.start()]), true);
    }
    (collapse_whitespace(trimmed), false)
}

fn parse_hint(hint: &str) -> CompletenessHint {
    match hint.trim().to_lowercase().as_str() {
        "complete" | "completed" | "full" => CompletenessHint::Complete,
        "incomplete" | "partial" | "continues" | "truncated" => CompletenessHint::Incomplete,
        _ => CompletenessHint::Unknown,
    }
}

fn clean_scalar(value: Option<String>) -> Option<String> {
    value
        .map(|v| collapse_whitespace(&v))
        .filter(|v| !is_placeholder(v))
}

/// Trim, drop blanks, and de-duplicate by whitespace-normalized text
fn clean_list<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|item| collapse_whitespace(&item))
        .filter(|item| !item.is_empty())
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

fn clean_sub_recipes(raw: Vec<RawSubRecipe>) -> Vec<SubRecipe> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(|sub| {
            let name = clean_scalar(sub.name)?;
            Some(SubRecipe {
                name,
                ingredients: clean_list(sub.ingredients),
                instructions: clean_list(sub.instructions),
            })
        })
        .filter(|sub| seen.insert(normalize(&sub.name)))
        .collect()
}

/// Clean a chapter declaration; `None` when it has neither number nor title
///
/// The extractor's "Unknown" chapter title counts as no title.
pub fn declared_chapter(raw: RawChapterContext) -> Option<Chapter> {
    let chapter = Chapter {
        chapter_number: clean_scalar(raw.chapter_number),
        title: clean_scalar(raw.title),
        expected_recipe_names: clean_list(raw.expected_recipe_names),
    };
    (chapter.chapter_number.is_some() || chapter.title.is_some()).then_some(chapter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_continuation_marker_variants() {
        assert_eq!(
            split_continuation_marker("Braised Short Ribs (continued)"),
            ("Braised Short Ribs".to_string(), true)
        );
        assert_eq!(
            split_continuation_marker("Short Ribs, cont'd"),
            ("Short Ribs".to_string(), true)
        );
        assert_eq!(
            split_continuation_marker("Continued: Short Ribs"),
            ("Short Ribs".to_string(), true)
        );
        assert_eq!(split_continuation_marker("CONTINUED"), (String::new(), true));
        assert_eq!(
            split_continuation_marker("Continued from previous page"),
            (String::new(), true)
        );
    }

    #[test]
    fn test_marker_not_found_inside_words() {
        assert_eq!(
            split_continuation_marker("Discontinued Cake"),
            ("Discontinued Cake".to_string(), false)
        );
        assert_eq!(
            split_continuation_marker("  Pad   Thai "),
            ("Pad Thai".to_string(), false)
        );
    }

    #[test]
    fn test_from_raw_cleans_everything() {
        let raw = RawExtraction {
            name: Some("  Lentil Soup ".to_string()),
            ingredients: vec![
                "1 cup lentils".to_string(),
                " 1  cup lentils".to_string(),
                "".to_string(),
                "2 carrots".to_string(),
            ],
            dietary_info: vec!["vegan ".to_string(), "VEGAN".to_string()],
            serves: Some("N/A".to_string()),
            calories: Some("210".to_string()),
            meal_type: Some("lunch".to_string()),
            dish_role: Some("appetizer".to_string()),
            completeness_hint: Some("partial".to_string()),
            ..Default::default()
        };

        let fragment = Fragment::from_raw(raw, "IMG_0001.jpg", Some(12));

        assert_eq!(fragment.name.as_deref(), Some("Lentil Soup"));
        assert_eq!(fragment.ingredients, vec!["1 cup lentils", "2 carrots"]);
        assert_eq!(fragment.dietary_info, vec!["VEGAN"]);
        assert!(fragment.nutrition.serves.is_none());
        assert_eq!(fragment.nutrition.calories.as_deref(), Some("210"));
        assert_eq!(fragment.meal_type, Some(MealType::Lunch));
        assert_eq!(fragment.dish_role, None);
        assert_eq!(fragment.page_number, Some(12));
        assert_eq!(fragment.source_image, "IMG_0001.jpg");
        assert!(fragment.declared_incomplete());
    }

    #[test]
    fn test_from_raw_unknown_chapter_dropped() {
        let raw = RawExtraction {
            name: Some("Soup".to_string()),
            chapter_context: Some(RawChapterContext {
                chapter_number: None,
                title: Some("Unknown".to_string()),
                expected_recipe_names: vec![],
            }),
            ..Default::default()
        };
        let fragment = Fragment::from_raw(raw, "a.jpg", None);
        assert!(fragment.chapter.is_none());
    }

    #[test]
    fn test_is_complete_flag_used_without_hint() {
        let raw = RawExtraction {
            name: Some("Soup".to_string()),
            is_complete: Some(false),
            ..Default::default()
        };
        let fragment = Fragment::from_raw(raw, "a.jpg", None);
        assert_eq!(fragment.completeness, CompletenessHint::Incomplete);
    }

    #[test]
    fn test_untitled_marker_only_fragment() {
        let raw = RawExtraction {
            name: Some("(continued)".to_string()),
            instructions: vec!["Serve hot.".to_string()],
            ..Default::default()
        };
        let fragment = Fragment::from_raw(raw, "a.jpg", Some(6));
        assert!(fragment.is_untitled());
        assert!(fragment.continuation_marker);
    }

    #[test]
    fn test_into_recipe_completeness() {
        let mut raw = RawExtraction::named("Toast");
        raw.ingredients = vec!["bread".to_string()];
        raw.instructions = vec!["toast".to_string()];
        let recipe = Fragment::from_raw(raw.clone(), "a.jpg", Some(3)).into_recipe("Toast".into());
        assert!(recipe.is_complete);
        assert_eq!(recipe.page_numbers, vec![3]);
        assert_eq!(recipe.source_images, vec!["a.jpg"]);

        raw.completeness_hint = Some("incomplete".to_string());
        let recipe = Fragment::from_raw(raw, "a.jpg", None).into_recipe("Toast".into());
        assert!(!recipe.is_complete);
    }
}
