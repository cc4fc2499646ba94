//! Reconciliation thresholds and their resolution
//!
//! Provides multi-tier resolution with ENV → TOML → compiled default priority.
//! Cookbook OCR noise varies by source, so none of these values are baked into
//! the matching logic.

use crate::error::{ReconcileError, ReconcileResult};
use cookbook_common::config::{load_default_toml_config, TomlConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// ENV override for [`ReconcileConfig::merge_threshold`]
pub const MERGE_THRESHOLD_ENV: &str = "COOKBOOK_MERGE_THRESHOLD";
/// ENV override for [`ReconcileConfig::chapter_assignment_threshold`]
pub const CHAPTER_THRESHOLD_ENV: &str = "COOKBOOK_CHAPTER_THRESHOLD";

/// Tunable parameters consumed by the engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Minimum similarity (inclusive) for two recipe names to merge
    pub merge_threshold: f64,
    /// Minimum similarity (inclusive) for assigning an orphan to a chapter
    pub chapter_assignment_threshold: f64,
    /// Added to the edit-distance score when one key contains the other
    pub containment_bonus: f64,
    /// Shorter key must have at least this many characters to earn the bonus
    pub min_containment_len: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            merge_threshold: 0.82,
            chapter_assignment_threshold: 0.75,
            containment_bonus: 0.10,
            min_containment_len: 4,
        }
    }
}

impl ReconcileConfig {
    /// Check every ratio lies in [0.0, 1.0]
    pub fn validate(&self) -> ReconcileResult<()> {
        check_unit_interval("merge_threshold", self.merge_threshold)?;
        check_unit_interval(
            "chapter_assignment_threshold",
            self.chapter_assignment_threshold,
        )?;
        check_unit_interval("containment_bonus", self.containment_bonus)?;
        Ok(())
    }

    /// Copy with a different merge threshold
    pub fn with_merge_threshold(mut self, threshold: f64) -> Self {
        self.merge_threshold = threshold;
        self
    }

    /// Copy with a different chapter assignment threshold
    pub fn with_chapter_assignment_threshold(mut self, threshold: f64) -> Self {
        self.chapter_assignment_threshold = threshold;
        self
    }
}

fn check_unit_interval(name: &str, value: f64) -> ReconcileResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ReconcileError::Config(format!(
            "{} must be within [0.0, 1.0], got {}",
            name, value
        )))
    }
}

/// Resolve engine configuration from ENV and TOML over compiled defaults
///
/// **Priority:** ENV → TOML → default. A value present in more than one
/// source is logged so that a stale TOML entry does not go unnoticed.
pub fn resolve_reconcile_config(toml_config: &TomlConfig) -> ReconcileResult<ReconcileConfig> {
    let defaults = ReconcileConfig::default();
    let section = &toml_config.reconcile;

    let merge_threshold = resolve_ratio(
        "merge_threshold",
        MERGE_THRESHOLD_ENV,
        section.merge_threshold,
        defaults.merge_threshold,
    )?;
    let chapter_assignment_threshold = resolve_ratio(
        "chapter_assignment_threshold",
        CHAPTER_THRESHOLD_ENV,
        section.chapter_assignment_threshold,
        defaults.chapter_assignment_threshold,
    )?;

    let config = ReconcileConfig {
        merge_threshold,
        chapter_assignment_threshold,
        containment_bonus: section.containment_bonus.unwrap_or(defaults.containment_bonus),
        min_containment_len: section
            .min_containment_len
            .unwrap_or(defaults.min_containment_len),
    };
    config.validate()?;

    info!(
        merge_threshold = config.merge_threshold,
        chapter_assignment_threshold = config.chapter_assignment_threshold,
        "Reconcile configuration resolved"
    );
    Ok(config)
}

/// Load the TOML file (`COOKBOOK_CONFIG`, then the standard locations) and resolve
///
/// A missing file falls back to ENV and compiled defaults.
pub fn load_reconcile_config() -> ReconcileResult<ReconcileConfig> {
    let toml_config = load_default_toml_config()?;
    resolve_reconcile_config(&toml_config)
}

fn resolve_ratio(
    name: &str,
    env_name: &str,
    toml_value: Option<f64>,
    default: f64,
) -> ReconcileResult<f64> {
    let env_value = match std::env::var(env_name) {
        Ok(raw) => Some(raw.trim().parse::<f64>().map_err(|e| {
            ReconcileError::Config(format!("{}={:?} is not a number: {}", env_name, raw, e))
        })?),
        Err(_) => None,
    };

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "{} found in multiple sources: environment, TOML. Using environment (highest priority).",
            name
        );
    }

    Ok(env_value.or(toml_value).unwrap_or(default))
}
