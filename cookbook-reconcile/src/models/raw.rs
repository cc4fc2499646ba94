//! Raw extraction records as produced by the vision extractor
//!
//! The extractor's JSON is loosely typed: lists may be `null` or a bare string,
//! scalars may be numbers, sub-recipes may be strings or objects, and unknown
//! keys appear freely. Everything here deserializes tolerantly; cleaning and
//! validation happen once, in [`Fragment::from_raw`](super::fragment::Fragment::from_raw).

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One recipe-shaped record extracted from a page image
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawExtraction {
    #[serde(deserialize_with = "lenient_scalar")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub ingredients: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub instructions: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub tips: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub dietary_info: Vec<String>,
    #[serde(deserialize_with = "lenient_sub_recipes")]
    pub sub_recipes: Vec<RawSubRecipe>,

    #[serde(deserialize_with = "lenient_scalar")]
    pub serves: Option<String>,
    #[serde(deserialize_with = "lenient_scalar")]
    pub prep_time: Option<String>,
    #[serde(deserialize_with = "lenient_scalar")]
    pub cook_time: Option<String>,
    #[serde(deserialize_with = "lenient_scalar")]
    pub total_time: Option<String>,
    #[serde(deserialize_with = "lenient_scalar")]
    pub calories: Option<String>,
    #[serde(deserialize_with = "lenient_scalar")]
    pub protein: Option<String>,
    #[serde(deserialize_with = "lenient_scalar")]
    pub carbs: Option<String>,
    #[serde(deserialize_with = "lenient_scalar")]
    pub fat: Option<String>,
    #[serde(deserialize_with = "lenient_scalar")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_scalar")]
    pub nutrition_full: Option<String>,

    #[serde(deserialize_with = "lenient_scalar")]
    pub meal_type: Option<String>,
    #[serde(deserialize_with = "lenient_scalar")]
    pub dish_role: Option<String>,

    #[serde(alias = "page_number", deserialize_with = "lenient_page_number")]
    pub declared_page_number: Option<u32>,
    /// "complete" / "incomplete"; takes precedence over `is_complete`
    #[serde(deserialize_with = "lenient_scalar")]
    pub completeness_hint: Option<String>,
    #[serde(deserialize_with = "lenient_bool")]
    pub is_complete: Option<bool>,
    #[serde(deserialize_with = "lenient_bool")]
    pub is_continuation: Option<bool>,

    pub chapter_context: Option<RawChapterContext>,
    #[serde(deserialize_with = "lenient_scalar")]
    pub source_image: Option<String>,
}

impl RawExtraction {
    /// Parse one record from extractor JSON text
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Convert one record from an already-parsed JSON value
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// Record with only a name, for building batches by hand
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// Sub-recipe as extracted: a bare name or a full object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSubRecipe {
    pub name: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

/// Chapter context reported with a record or declared by a chapter page
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawChapterContext {
    #[serde(deserialize_with = "lenient_scalar")]
    pub chapter_number: Option<String>,
    #[serde(alias = "chapter_title", deserialize_with = "lenient_scalar")]
    pub title: Option<String>,
    #[serde(alias = "recipe_list", deserialize_with = "lenient_list")]
    pub expected_recipe_names: Vec<String>,
}

/// Everything the extractor produced for one page image, in processing order
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageBatch {
    pub source_image: String,
    #[serde(alias = "page_number", deserialize_with = "lenient_page_number")]
    pub declared_page_number: Option<u32>,
    /// Chapter declared by this page (chapter title page / table of contents)
    pub chapter: Option<RawChapterContext>,
    #[serde(alias = "recipes")]
    pub records: Vec<RawExtraction>,
}

impl PageBatch {
    pub fn new(source_image: impl Into<String>, declared_page_number: Option<u32>) -> Self {
        Self {
            source_image: source_image.into(),
            declared_page_number,
            chapter: None,
            records: Vec::new(),
        }
    }

    pub fn with_record(mut self, record: RawExtraction) -> Self {
        self.records.push(record);
        self
    }

    pub fn with_chapter(mut self, chapter: RawChapterContext) -> Self {
        self.chapter = Some(chapter);
        self
    }
}

// ============================================================================
// Lenient deserializers
// ============================================================================

fn value_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_list(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.into_iter().filter_map(value_text).collect(),
        other => value_text(other).into_iter().collect(),
    }
}

fn lenient_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(value_text))
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .map(value_list)
        .unwrap_or_default())
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

/// Accepts `12`, `"12"`, `"p. 12"`; anything without digits is absent
fn lenient_page_number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Some(Value::String(s)) => {
            let digits: String = s
                .chars()
                .skip_while(|c| !c.is_ascii_digit())
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().ok()
        }
        _ => None,
    })
}

fn lenient_sub_recipes<'de, D>(deserializer: D) -> Result<Vec<RawSubRecipe>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items,
        Some(other) => vec![other],
        None => return Ok(Vec::new()),
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(mut map) => Some(RawSubRecipe {
                name: map.remove("name").and_then(value_text),
                ingredients: map.remove("ingredients").map(value_list).unwrap_or_default(),
                instructions: map.remove("instructions").map(value_list).unwrap_or_default(),
            }),
            other => value_text(other).map(|name| RawSubRecipe {
                name: Some(name),
                ..Default::default()
            }),
        })
        .collect())
}
