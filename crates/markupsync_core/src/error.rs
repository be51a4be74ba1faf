//! Bridge error types.

use markupsync_engine::EngineError;
use thiserror::Error;

/// Errors that can occur while running the engine through the bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The engine failed. Displayed exactly as the engine reported it.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The bridge worker could not be started.
    #[error("Failed to start bridge worker: {0}")]
    WorkerSetup(String),

    /// The bridge worker went away before answering.
    #[error("Bridge worker disconnected before responding")]
    WorkerDisconnected,

    /// A request or response could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Creates a worker setup error.
    pub fn worker_setup(message: impl Into<String>) -> Self {
        Self::WorkerSetup(message.into())
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns the engine error, if the engine is what failed.
    pub fn as_engine_error(&self) -> Option<&EngineError> {
        match self {
            Self::Engine(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
