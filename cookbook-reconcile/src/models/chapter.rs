//! Cookbook chapters and chapter references

use crate::matching::normalizer::normalize;
use serde::{Deserialize, Serialize};

/// Chapter as declared by a chapter title page or table of contents
///
/// `expected_recipe_names` is reassignment evidence only, never recipe content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub chapter_number: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub expected_recipe_names: Vec<String>,
}

impl Chapter {
    /// Catalog key: the chapter number, or the normalized title when unnumbered
    ///
    /// Returns `None` when the chapter has neither.
    pub fn key(&self) -> Option<String> {
        if let Some(number) = self.chapter_number.as_deref() {
            return Some(number.to_string());
        }
        self.title
            .as_deref()
            .map(normalize)
            .filter(|k| !k.is_empty())
            .map(|k| format!("title:{}", k))
    }

    /// Name written onto an assigned recipe's `chapter` field
    pub fn display_title(&self) -> String {
        match (&self.title, &self.chapter_number) {
            (Some(title), _) => title.clone(),
            (None, Some(number)) => format!("Chapter {}", number),
            (None, None) => "Unknown".to_string(),
        }
    }
}
