//! At-most-once fix computation per reporting pass.

use std::cell::RefCell;

use markupsync_engine::{Engine, ExecutionRequest};
use tracing::debug;

use crate::{BridgeError, ExecutionCoordinator};

/// Source of the whole-file fix for a reporting pass.
pub trait FixSource {
    /// Returns the fixed text the first time a change is available, then
    /// `None`.
    fn compute_fix(&self) -> Result<Option<String>, BridgeError>;
}

/// State of a fix cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixCycleState {
    /// No fix has been requested yet.
    Pending,
    /// The fix was requested; holds the text if it changed the source.
    Computed(Option<String>),
}

/// Runs the engine in fix mode at most once per reporting pass.
///
/// Every report of the pass shares one guard. The first `compute_fix`
/// re-runs the engine with `fix = true`; every later call returns `None`.
pub struct FixCycleGuard<'a, E: Engine> {
    coordinator: &'a ExecutionCoordinator<E>,
    request: ExecutionRequest,
    state: RefCell<FixCycleState>,
}

impl<'a, E: Engine> FixCycleGuard<'a, E> {
    /// Creates a guard for the pass that produced `request`.
    pub fn new(coordinator: &'a ExecutionCoordinator<E>, request: &ExecutionRequest) -> Self {
        Self {
            coordinator,
            request: request.with_fix(true),
            state: RefCell::new(FixCycleState::Pending),
        }
    }

    /// Current state of the cycle.
    pub fn state(&self) -> FixCycleState {
        self.state.borrow().clone()
    }
}

impl<E: Engine> FixSource for FixCycleGuard<'_, E> {
    fn compute_fix(&self) -> Result<Option<String>, BridgeError> {
        {
            let mut state = self.state.borrow_mut();
            if let FixCycleState::Computed(_) = *state {
                return Ok(None);
            }
            // A failed computation still consumes the cycle.
            *state = FixCycleState::Computed(None);
        }

        let result = self.coordinator.run(&self.request)?;
        let fixed = result
            .fixed_code
            .filter(|code| *code != self.request.source_text);

        if fixed.is_none() {
            debug!("Fix for {} leaves the source unchanged", self.request.name);
        }

        *self.state.borrow_mut() = FixCycleState::Computed(fixed.clone());
        Ok(fixed)
    }
}
