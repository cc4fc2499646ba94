//! Canonical recipe record held by the catalog

use crate::matching::normalizer::normalize;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Meal the dish is typically served at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Dessert,
    Snack,
    /// Versatile dish. Weakest classification: a specific meal type refines it.
    Any,
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" | "brunch" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" | "supper" => Ok(Self::Dinner),
            "dessert" | "desserts" => Ok(Self::Dessert),
            "snack" | "snacks" => Ok(Self::Snack),
            "any" => Ok(Self::Any),
            other => Err(format!("unknown meal type: {}", other)),
        }
    }
}

/// Role of the dish within a meal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DishRole {
    Main,
    Side,
    /// Component used by another recipe (dressing, sauce, rub)
    SubRecipe,
}

impl FromStr for DishRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "main" | "entree" => Ok(Self::Main),
            "side" => Ok(Self::Side),
            "sub_recipe" | "subrecipe" | "component" => Ok(Self::SubRecipe),
            other => Err(format!("unknown dish role: {}", other)),
        }
    }
}

/// Nutrition and timing scalars, kept as the printed strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Nutrition {
    pub calories: Option<String>,
    pub protein: Option<String>,
    pub carbs: Option<String>,
    pub fat: Option<String>,
    pub serves: Option<String>,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub total_time: Option<String>,
}

impl Nutrition {
    /// Named mutable slots, in display order
    pub fn fields_mut(&mut self) -> [(&'static str, &mut Option<String>); 8] {
        [
            ("calories", &mut self.calories),
            ("protein", &mut self.protein),
            ("carbs", &mut self.carbs),
            ("fat", &mut self.fat),
            ("serves", &mut self.serves),
            ("prep_time", &mut self.prep_time),
            ("cook_time", &mut self.cook_time),
            ("total_time", &mut self.total_time),
        ]
    }

    /// Named slots, in display order
    pub fn fields(&self) -> [(&'static str, &Option<String>); 8] {
        [
            ("calories", &self.calories),
            ("protein", &self.protein),
            ("carbs", &self.carbs),
            ("fat", &self.fat),
            ("serves", &self.serves),
            ("prep_time", &self.prep_time),
            ("cook_time", &self.cook_time),
            ("total_time", &self.total_time),
        ]
    }
}

/// Component recipe printed inside a parent (e.g. a vinaigrette box)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubRecipe {
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

impl SubRecipe {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ingredients: Vec::new(),
            instructions: Vec::new(),
        }
    }
}

/// Reconciled recipe
///
/// `normalized_key` is derived from `name` at construction and never changes:
/// merges keep the existing display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub normalized_key: String,
    #[serde(default)]
    pub chapter: Option<String>,
    #[serde(default)]
    pub chapter_number: Option<String>,
    #[serde(default)]
    pub page_numbers: Vec<u32>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub sub_recipes: Vec<SubRecipe>,
    #[serde(default)]
    pub dietary_info: Vec<String>,
    #[serde(default)]
    pub nutrition: Nutrition,
    #[serde(default)]
    pub description: Option<String>,
    /// Whole printed nutrition line, e.g. "143 CALORIES | 8 GRAMS PROTEIN"
    #[serde(default)]
    pub nutrition_full: Option<String>,
    #[serde(default)]
    pub meal_type: Option<MealType>,
    #[serde(default)]
    pub dish_role: Option<DishRole>,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default)]
    pub source_images: Vec<String>,
}

impl Recipe {
    /// Empty recipe with the given display name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let normalized_key = normalize(&name);
        Self {
            name,
            normalized_key,
            chapter: None,
            chapter_number: None,
            page_numbers: Vec::new(),
            ingredients: Vec::new(),
            instructions: Vec::new(),
            tips: Vec::new(),
            sub_recipes: Vec::new(),
            dietary_info: Vec::new(),
            nutrition: Nutrition::default(),
            description: None,
            nutrition_full: None,
            meal_type: None,
            dish_role: None,
            is_complete: false,
            source_images: Vec::new(),
        }
    }

    /// Both ingredients and instructions are present
    pub fn has_core_content(&self) -> bool {
        !self.ingredients.is_empty() && !self.instructions.is_empty()
    }

    /// No chapter, or the extractor's "Unknown" placeholder
    pub fn is_unassigned(&self) -> bool {
        match self.chapter.as_deref() {
            None => true,
            Some(chapter) => {
                let trimmed = chapter.trim();
                trimmed.is_empty() || trimmed.eq_ignore_ascii_case("unknown")
            }
        }
    }

    pub fn with_ingredients<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_instructions<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instructions = items.into_iter().map(Into::into).collect();
        self
    }
}
