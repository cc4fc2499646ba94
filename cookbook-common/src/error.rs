//! Common error types for the cookbook crates

use thiserror::Error;

/// Common result type for cookbook operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Config file missing, unreadable or malformed
    #[error("Configuration error: {0}")]
    Config(String),
}
