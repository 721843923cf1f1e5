//! Error types for msgbench-core

use thiserror::Error;

use crate::config::ConfigError;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid job descriptor; no requests were issued
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP client construction failed
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
