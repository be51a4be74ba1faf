//! Configuration resolution for source files.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use jsonc_parser::ParseOptions;
use markupsync_engine::ConfigHandle;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::BridgeError;

/// File names searched for, in order, in each directory.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".markuplintrc",
    ".markuplintrc.json",
    ".markuplintrc.jsonc",
];

/// Finds the engine configuration that applies to a file.
pub trait ConfigResolver {
    /// Returns the configuration for `path`, or `None` if there is none.
    fn resolve(&self, path: &Path) -> Result<Option<ConfigHandle>, BridgeError>;
}

/// Always resolves to the same configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigResolver(Option<ConfigHandle>);

impl StaticConfigResolver {
    /// Resolves every file to `config`.
    pub fn new(config: ConfigHandle) -> Self {
        Self(Some(config))
    }

    /// Resolves every file to no configuration.
    pub fn none() -> Self {
        Self(None)
    }
}

impl ConfigResolver for StaticConfigResolver {
    fn resolve(&self, _path: &Path) -> Result<Option<ConfigHandle>, BridgeError> {
        Ok(self.0.clone())
    }
}

/// Resolves configuration by searching a file's ancestors for a config file.
///
/// The nearest `.markuplintrc`, `.markuplintrc.json` or `.markuplintrc.jsonc`
/// wins. Parsed configurations are cached by path, so every file under the
/// same config shares one handle identity.
#[derive(Debug, Default)]
pub struct FileConfigResolver {
    loaded: Mutex<HashMap<PathBuf, ConfigHandle>>,
}

impl FileConfigResolver {
    /// Creates a resolver with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the path of the nearest config file for `path`.
    ///
    /// Relative paths are taken against the current directory, so the
    /// search continues above it.
    pub fn find_config_file(path: &Path) -> Option<PathBuf> {
        search_start(path)?.ancestors().find_map(|dir| {
            CONFIG_FILE_NAMES
                .iter()
                .map(|name| dir.join(name))
                .find(|candidate| candidate.is_file())
        })
    }

    fn load(&self, config_path: &Path) -> Result<ConfigHandle, BridgeError> {
        if let Some(handle) = self.loaded.lock().get(config_path) {
            return Ok(handle.clone());
        }

        let content = fs::read_to_string(config_path)?;
        let value = jsonc_parser::parse_to_serde_value(&content, &ParseOptions::default())
            .map_err(|e| {
                warn!("Failed to parse {}: {}", config_path.display(), e);
                BridgeError::config(format!("Failed to parse {}: {}", config_path.display(), e))
            })?
            .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));

        debug!("Loaded config {}", config_path.display());
        let handle = ConfigHandle::from_path(config_path, value);
        self.loaded
            .lock()
            .insert(config_path.to_path_buf(), handle.clone());
        Ok(handle)
    }
}

impl ConfigResolver for FileConfigResolver {
    fn resolve(&self, path: &Path) -> Result<Option<ConfigHandle>, BridgeError> {
        match Self::find_config_file(path) {
            Some(config_path) => self.load(&config_path).map(Some),
            None => {
                debug!("No config found for {}", path.display());
                Ok(None)
            }
        }
    }
}

/// Absolute directory where the config search for `path` begins.
fn search_start(path: &Path) -> Option<PathBuf> {
    let physical = physical_filename(path);
    let physical = std::path::absolute(&physical).unwrap_or(physical);
    if physical.is_dir() {
        Some(physical)
    } else {
        physical.parent().map(Path::to_path_buf)
    }
}

/// Returns the on-disk file behind a possibly virtual file name.
///
/// Hosts that lint embedded blocks name them like `page.md/0_block.html`.
/// The nearest ancestor that exists on disk stands in for the file; if none
/// does, `path` is returned unchanged.
pub fn physical_filename(path: &Path) -> PathBuf {
    path.ancestors()
        .find(|candidate| !candidate.as_os_str().is_empty() && candidate.exists())
        .unwrap_or(path)
        .to_path_buf()
}
