//! Per-configuration record of unusable fast paths.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

static GLOBAL_REGISTRY: OnceLock<Arc<BrokenStateRegistry>> = OnceLock::new();

/// Set of configurations whose fast path is known not to complete
/// synchronously.
///
/// Entries are only ever added. Absence means "not broken", so concurrent
/// writers racing on the same identity all converge on the same state.
#[derive(Debug, Default)]
pub struct BrokenStateRegistry {
    broken: RwLock<HashSet<String>>,
}

impl BrokenStateRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> Arc<Self> {
        Arc::clone(GLOBAL_REGISTRY.get_or_init(|| Arc::new(Self::new())))
    }

    /// Returns `true` if the fast path is broken for `identity`.
    pub fn is_broken(&self, identity: &str) -> bool {
        self.broken.read().contains(identity)
    }

    /// Records that the fast path is broken for `identity`.
    ///
    /// Returns `true` if this call made the transition.
    pub fn mark_broken(&self, identity: &str) -> bool {
        if self.is_broken(identity) {
            return false;
        }
        self.broken.write().insert(identity.to_string())
    }

    /// Number of broken configurations.
    pub fn len(&self) -> usize {
        self.broken.read().len()
    }

    /// Returns `true` if no configuration is broken.
    pub fn is_empty(&self) -> bool {
        self.broken.read().is_empty()
    }
}
