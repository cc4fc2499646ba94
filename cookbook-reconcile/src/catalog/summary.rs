//! Catalog statistics for reporting

use super::Catalog;
use crate::models::AuditKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSummary {
    pub total_recipes: usize,
    pub complete: usize,
    pub incomplete: usize,
    /// Recipes with no chapter (or the "Unknown" placeholder)
    pub unassigned: usize,
    pub chapters: usize,
    /// Recipe count per assigned chapter title
    pub per_chapter: BTreeMap<String, usize>,
    /// Audit entry count per kind, every kind present
    pub audit_counts: BTreeMap<AuditKind, usize>,
}

impl CatalogSummary {
    pub fn of(catalog: &Catalog) -> Self {
        let mut summary = Self {
            total_recipes: catalog.len(),
            chapters: catalog.chapters().len(),
            ..Default::default()
        };

        for (_, recipe) in catalog.recipes() {
            if recipe.is_complete {
                summary.complete += 1;
            } else {
                summary.incomplete += 1;
            }
            match recipe.chapter.as_ref() {
                Some(chapter) if !recipe.is_unassigned() => {
                    *summary.per_chapter.entry(chapter.clone()).or_insert(0) += 1;
                }
                _ => summary.unassigned += 1,
            }
        }

        for kind in AuditKind::ALL {
            summary
                .audit_counts
                .insert(kind, catalog.audit_log().count(kind));
        }

        summary
    }

    /// Share of recipes marked complete, 0.0 for an empty catalog
    pub fn completeness(&self) -> f64 {
        if self.total_recipes == 0 {
            0.0
        } else {
            self.complete as f64 / self.total_recipes as f64
        }
    }
}
