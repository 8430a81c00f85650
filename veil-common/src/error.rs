//! Common error types for Veil

use thiserror::Error;

/// Common result type for Veil operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Veil services
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
