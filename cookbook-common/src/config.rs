//! Configuration file model and discovery
//!
//! Config file resolution order:
//! 1. Explicit path from the `COOKBOOK_CONFIG` environment variable
//! 2. User config directory (`~/.config/cookbook/config.toml` on Linux)
//! 3. System config (`/etc/cookbook/config.toml`, Linux only)
//!
//! A missing file is not an error: every value has a compiled default in the
//! consuming crate.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "COOKBOOK_CONFIG";

/// Parsed TOML configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// `[reconcile]` table
    pub reconcile: ReconcileSection,
}

/// `[reconcile]` table: every key optional, defaults live with the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileSection {
    pub merge_threshold: Option<f64>,
    pub chapter_assignment_threshold: Option<f64>,
    pub containment_bonus: Option<f64>,
    pub min_containment_len: Option<usize>,
}

/// Parse a TOML document into a [`TomlConfig`]
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    let config = parse_toml_config(&content)?;
    debug!(path = %path.display(), "Loaded TOML config");
    Ok(config)
}

/// Locate and load the config file, falling back to an empty config
///
/// An explicitly named file (`COOKBOOK_CONFIG`) that cannot be read is an
/// error; a missing default file is not.
pub fn load_default_toml_config() -> Result<TomlConfig> {
    if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
        return load_toml_config(Path::new(&explicit));
    }

    match find_config_file() {
        Some(path) => load_toml_config(&path),
        None => {
            debug!("No config file found, using compiled defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Find the first existing default config file for the platform
pub fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("cookbook").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/cookbook/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}
