//! Error types for alertsynth-core.
//!
//! Only configuration can fail. Sanitization and normalization are total:
//! they degrade to defaults instead of returning errors.

/// Errors raised while loading or validating [`Config`](crate::config::Config).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
