//! Bridge configuration.

use std::fs;
use std::path::Path;

use jsonc_parser::ParseOptions;
use serde::{Deserialize, Serialize};

use crate::BridgeError;

/// Options for the bridge itself (not the engine's configuration).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct BridgeOptions {
    /// Name given to the bridge worker thread.
    pub worker_thread_name: String,

    /// Stack size for the bridge worker thread, in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_stack_size: Option<usize>,

    /// Prefix prepended to engine rule ids in host messages.
    pub rule_prefix: String,
}

fn default_worker_thread_name() -> String {
    "markupsync-worker".to_string()
}

fn default_rule_prefix() -> String {
    "markup".to_string()
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            worker_thread_name: default_worker_thread_name(),
            worker_stack_size: None,
            rule_prefix: default_rule_prefix(),
        }
    }
}

impl BridgeOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads options from a JSON or JSONC file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            BridgeError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Parses options from a JSON or JSONC string.
    pub fn from_json(json: &str) -> Result<Self, BridgeError> {
        let value = jsonc_parser::parse_to_serde_value(json, &ParseOptions::default())
            .map_err(|e| BridgeError::config(format!("Invalid JSON: {}", e)))?
            .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));

        serde_json::from_value(value)
            .map_err(|e| BridgeError::config(format!("Invalid options: {}", e)))
    }
}
