// Record Merger - Field-wise union of two records describing one recipe
//
// Lists union by whitespace-normalized text (existing order first), scalars
// fill only when the existing value is missing or a placeholder, provenance
// only grows, completeness only turns on.

use crate::matching::normalizer::{collapse_whitespace, normalize};
use crate::models::fragment::is_placeholder;
use crate::models::{MealType, Recipe, SubRecipe};
use std::collections::HashSet;

/// What a merge changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub ingredients_added: usize,
    pub instructions_added: usize,
    pub tips_added: usize,
    pub dietary_added: usize,
    /// New sub-recipes plus sub-recipes that gained ingredients or steps
    pub sub_recipes_changed: usize,
    /// Scalar fields that were empty and got a value
    pub scalars_filled: Vec<&'static str>,
    /// meal_type or dish_role was set or refined
    pub reclassified: bool,
    pub became_complete: bool,
    pub source_images_added: usize,
    pub pages_added: usize,
}

impl MergeSummary {
    /// Recipe content changed; provenance alone does not count
    pub fn content_changed(&self) -> bool {
        self.ingredients_added > 0
            || self.instructions_added > 0
            || self.tips_added > 0
            || self.dietary_added > 0
            || self.sub_recipes_changed > 0
            || !self.scalars_filled.is_empty()
            || self.reclassified
            || self.became_complete
    }

    /// Human-readable change list for audit entries
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        for (count, label) in [
            (self.ingredients_added, "ingredients"),
            (self.instructions_added, "instructions"),
            (self.tips_added, "tips"),
            (self.dietary_added, "dietary tags"),
            (self.sub_recipes_changed, "sub-recipes"),
        ] {
            if count > 0 {
                parts.push(format!("+{} {}", count, label));
            }
        }
        if !self.scalars_filled.is_empty() {
            parts.push(format!("filled {}", self.scalars_filled.join(", ")));
        }
        if self.reclassified {
            parts.push("reclassified".to_string());
        }
        if self.became_complete {
            parts.push("now complete".to_string());
        }
        if self.pages_added > 0 {
            parts.push(format!("+{} pages", self.pages_added));
        }
        if self.source_images_added > 0 {
            parts.push(format!("+{} source images", self.source_images_added));
        }
        if parts.is_empty() {
            "no new content".to_string()
        } else {
            parts.join("; ")
        }
    }
}

/// Merge `incoming` into `existing` in place
///
/// The existing display name and normalized key are kept.
pub fn merge_into(existing: &mut Recipe, incoming: &Recipe) -> MergeSummary {
    let mut summary = MergeSummary {
        ingredients_added: union_list(&mut existing.ingredients, &incoming.ingredients, text_key),
        instructions_added: union_list(&mut existing.instructions, &incoming.instructions, text_key),
        tips_added: union_list(&mut existing.tips, &incoming.tips, text_key),
        dietary_added: union_list(&mut existing.dietary_info, &incoming.dietary_info, tag_key),
        sub_recipes_changed: union_sub_recipes(&mut existing.sub_recipes, &incoming.sub_recipes),
        ..Default::default()
    };

    for ((field, slot), (_, value)) in existing
        .nutrition
        .fields_mut()
        .into_iter()
        .zip(incoming.nutrition.fields())
    {
        if fill_scalar(slot, value) {
            summary.scalars_filled.push(field);
        }
    }
    for (field, slot, value) in [
        ("description", &mut existing.description, &incoming.description),
        ("nutrition_full", &mut existing.nutrition_full, &incoming.nutrition_full),
    ] {
        if fill_scalar(slot, value) {
            summary.scalars_filled.push(field);
        }
    }
    summary.scalars_filled.extend(fill_chapter(existing, incoming));

    summary.reclassified = merge_meal_type(&mut existing.meal_type, incoming.meal_type);
    if existing.dish_role.is_none() && incoming.dish_role.is_some() {
        existing.dish_role = incoming.dish_role;
        summary.reclassified = true;
    }

    for image in &incoming.source_images {
        if !existing.source_images.contains(image) {
            existing.source_images.push(image.clone());
            summary.source_images_added += 1;
        }
    }
    for page in &incoming.page_numbers {
        if !existing.page_numbers.contains(page) {
            existing.page_numbers.push(*page);
            summary.pages_added += 1;
        }
    }

    if !existing.is_complete && (incoming.is_complete || existing.has_core_content()) {
        existing.is_complete = true;
        summary.became_complete = true;
    }

    summary
}

/// Pure form of [`merge_into`]
pub fn merge(mut existing: Recipe, incoming: &Recipe) -> Recipe {
    merge_into(&mut existing, incoming);
    existing
}

fn text_key(item: &str) -> String {
    collapse_whitespace(item)
}

fn tag_key(tag: &str) -> String {
    collapse_whitespace(tag).to_uppercase()
}

/// Append incoming items whose key is not present yet; returns how many
fn union_list(existing: &mut Vec<String>, incoming: &[String], key: fn(&str) -> String) -> usize {
    let mut seen: HashSet<String> = existing.iter().map(|item| key(item)).collect();
    let before = existing.len();
    for item in incoming {
        let k = key(item);
        if !k.is_empty() && seen.insert(k) {
            existing.push(item.clone());
        }
    }
    existing.len() - before
}

fn union_sub_recipes(existing: &mut Vec<SubRecipe>, incoming: &[SubRecipe]) -> usize {
    let mut changed = 0;
    for sub in incoming {
        let key = normalize(&sub.name);
        match existing.iter_mut().find(|e| normalize(&e.name) == key) {
            Some(current) => {
                let added = union_list(&mut current.ingredients, &sub.ingredients, text_key)
                    + union_list(&mut current.instructions, &sub.instructions, text_key);
                if added > 0 {
                    changed += 1;
                }
            }
            None => {
                existing.push(sub.clone());
                changed += 1;
            }
        }
    }
    changed
}

/// Backfill chapter title and number as one pair
///
/// A half-known chapter only takes the missing half from an incoming record
/// naming the same chapter.
fn fill_chapter(existing: &mut Recipe, incoming: &Recipe) -> Vec<&'static str> {
    let known = |v: &Option<String>| v.as_deref().is_some_and(|v| !is_placeholder(v));
    let same_title = || match (&existing.chapter, &incoming.chapter) {
        (Some(a), Some(b)) => normalize(a) == normalize(b),
        _ => false,
    };
    let same_number = || match (&existing.chapter_number, &incoming.chapter_number) {
        (Some(a), Some(b)) => a.trim() == b.trim(),
        _ => false,
    };

    let (take_title, take_number) = match (known(&existing.chapter), known(&existing.chapter_number)) {
        (false, false) => (true, true),
        (true, false) => (false, same_title()),
        (false, true) => (same_number(), false),
        (true, true) => (false, false),
    };

    let mut filled = Vec::new();
    if take_title && fill_scalar(&mut existing.chapter, &incoming.chapter) {
        filled.push("chapter");
    }
    if take_number && fill_scalar(&mut existing.chapter_number, &incoming.chapter_number) {
        filled.push("chapter_number");
    }
    filled
}

fn fill_scalar(slot: &mut Option<String>, value: &Option<String>) -> bool {
    let slot_empty = slot.as_deref().map_or(true, is_placeholder);
    match value {
        Some(v) if slot_empty && !is_placeholder(v) => {
            *slot = Some(v.clone());
            true
        }
        _ => false,
    }
}

/// `None` takes anything; `Any` is refined by a specific meal type
fn merge_meal_type(slot: &mut Option<MealType>, incoming: Option<MealType>) -> bool {
    match (*slot, incoming) {
        (None, Some(m)) => {
            *slot = Some(m);
            true
        }
        (Some(MealType::Any), Some(m)) if m != MealType::Any => {
            *slot = Some(m);
            true
        }
        _ => false,
    }
}
