//! Execution requests sent to an engine.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// A resolved engine configuration.
///
/// The bridge only looks at `identity`; `value` is handed to the engine as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigHandle {
    identity: String,
    #[serde(default)]
    value: serde_json::Value,
}

impl ConfigHandle {
    /// Creates a handle with an explicit identity.
    pub fn new(identity: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            identity: identity.into(),
            value,
        }
    }

    /// Creates a handle for a configuration loaded from `path`.
    pub fn from_path(path: &Path, value: serde_json::Value) -> Self {
        Self::new(path.to_string_lossy(), value)
    }

    /// Creates an empty handle identified only by `identity`.
    pub fn inline(identity: impl Into<String>) -> Self {
        Self::new(identity, serde_json::Value::Object(serde_json::Map::new()))
    }

    /// The key under which per-configuration state is tracked.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// The configuration payload.
    pub fn value(&self) -> &serde_json::Value {
        &self.value
    }
}

/// Request for one engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    /// Source text to analyze.
    pub source_text: String,
    /// File name of the source (also what the engine reports against).
    pub name: String,
    /// Resolved configuration.
    pub config: ConfigHandle,
    /// Whether the engine should produce a fixed text.
    #[serde(default)]
    pub fix: bool,
}

impl ExecutionRequest {
    /// Creates a lint-only request.
    pub fn new(
        source_text: impl Into<String>,
        name: impl Into<String>,
        config: ConfigHandle,
    ) -> Self {
        Self {
            source_text: source_text.into(),
            name: name.into(),
            config,
            fix: false,
        }
    }

    /// Returns a copy of this request with the fix flag set to `fix`.
    pub fn with_fix(&self, fix: bool) -> Self {
        Self {
            fix,
            ..self.clone()
        }
    }

    /// Identity of the configuration this request runs under.
    pub fn config_identity(&self) -> &str {
        self.config.identity()
    }
}
