//! # Cookbook Common Library
//!
//! Shared code for the cookbook cataloging crates:
//! - Error and result types
//! - TOML configuration file model and discovery
//! - Run identifiers and audit timestamps

pub mod config;
pub mod error;
pub mod run;

pub use error::{Error, Result};
