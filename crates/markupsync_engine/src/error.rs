//! Engine error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by an analysis engine.
///
/// Every variant displays its message verbatim so that a failure crossing the
/// bridge reads exactly as the engine produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum EngineError {
    /// The source text could not be parsed.
    #[error("{0}")]
    Parse(String),

    /// The configuration was rejected by the engine.
    #[error("{0}")]
    Config(String),

    /// Any other failure raised while running the engine.
    #[error("{0}")]
    Runtime(String),
}

impl EngineError {
    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a runtime error.
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime(message.into())
    }

    /// Returns the bare error message.
    pub fn message(&self) -> &str {
        match self {
            Self::Parse(message) | Self::Config(message) | Self::Runtime(message) => message,
        }
    }
}
