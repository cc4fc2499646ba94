//! Page batch and record builders shared by the integration tests

use cookbook_reconcile::models::{PageBatch, RawChapterContext, RawExtraction};
use cookbook_reconcile::{reconcile, Catalog, ReconcileConfig, Reconciliation};

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Titled record with the given lists
pub fn record(name: &str, ingredients: &[&str], instructions: &[&str]) -> RawExtraction {
    RawExtraction {
        name: Some(name.to_string()),
        ingredients: strings(ingredients),
        instructions: strings(instructions),
        ..Default::default()
    }
}

/// Record the extractor could not title (top of a continuation page)
pub fn untitled(ingredients: &[&str], instructions: &[&str]) -> RawExtraction {
    RawExtraction {
        name: None,
        ingredients: strings(ingredients),
        instructions: strings(instructions),
        ..Default::default()
    }
}

/// Record flagged as running onto the next page
pub fn cut_off(mut raw: RawExtraction) -> RawExtraction {
    raw.completeness_hint = Some("incomplete".to_string());
    raw
}

pub fn page(source: &str, page_number: Option<u32>, records: Vec<RawExtraction>) -> PageBatch {
    let mut batch = PageBatch::new(source, page_number);
    batch.records = records;
    batch
}

/// Chapter title page listing the recipes it contains
pub fn chapter_page(source: &str, number: Option<&str>, title: &str, names: &[&str]) -> PageBatch {
    PageBatch::new(source, None).with_chapter(RawChapterContext {
        chapter_number: number.map(str::to_string),
        title: Some(title.to_string()),
        expected_recipe_names: strings(names),
    })
}

/// Reconcile into an empty catalog with default thresholds
pub fn run(batches: Vec<PageBatch>) -> Reconciliation {
    run_with(batches, Catalog::new(), &ReconcileConfig::default())
}

pub fn run_with(batches: Vec<PageBatch>, existing: Catalog, config: &ReconcileConfig) -> Reconciliation {
    reconcile(batches, existing, config).expect("valid configuration")
}
