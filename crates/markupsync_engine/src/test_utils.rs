//! Test utilities for markupsync_engine.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::signal::format_sync_failure;
use crate::{Engine, EngineError, EngineResult, ExecutionRequest, FastPathOutcome, Violation};

/// How `ScriptedEngine::exec_sync` behaves.
#[derive(Debug, Clone)]
pub enum FastPath {
    /// Finish synchronously.
    Complete,
    /// Report the sync-failure signal for this operation.
    FinishedAsync(String),
    /// Fail with this error.
    Fail(EngineError),
}

/// In-memory engine with scripted answers and call counters.
///
/// Lint runs return the configured violations. Fix runs return the
/// configured fixed code, or the unchanged source if none was set.
#[derive(Debug)]
pub struct ScriptedEngine {
    violations: Vec<Violation>,
    fixed_code: Option<String>,
    fast_path: Mutex<FastPath>,
    bridged_error: Option<EngineError>,
    fast_path_calls: AtomicUsize,
    bridged_calls: AtomicUsize,
    fix_calls: AtomicUsize,
}

impl ScriptedEngine {
    /// Creates an engine whose fast path always completes.
    pub fn new(violations: Vec<Violation>) -> Self {
        Self {
            violations,
            fixed_code: None,
            fast_path: Mutex::new(FastPath::Complete),
            bridged_error: None,
            fast_path_calls: AtomicUsize::new(0),
            bridged_calls: AtomicUsize::new(0),
            fix_calls: AtomicUsize::new(0),
        }
    }

    /// Sets the text returned by fix runs.
    pub fn with_fixed_code(mut self, fixed_code: impl Into<String>) -> Self {
        self.fixed_code = Some(fixed_code.into());
        self
    }

    /// Sets the fast path behavior.
    pub fn with_fast_path(self, fast_path: FastPath) -> Self {
        self.set_fast_path(fast_path);
        self
    }

    /// Makes every bridged run fail with `error`.
    pub fn with_bridged_error(mut self, error: EngineError) -> Self {
        self.bridged_error = Some(error);
        self
    }

    /// Changes the fast path behavior of a shared engine.
    pub fn set_fast_path(&self, fast_path: FastPath) {
        *self.fast_path.lock().expect("fast path lock poisoned") = fast_path;
    }

    /// Number of `exec_sync` calls.
    pub fn fast_path_calls(&self) -> usize {
        self.fast_path_calls.load(Ordering::SeqCst)
    }

    /// Number of `exec` calls.
    pub fn bridged_calls(&self) -> usize {
        self.bridged_calls.load(Ordering::SeqCst)
    }

    /// Number of runs with `fix = true`, on either path.
    pub fn fix_calls(&self) -> usize {
        self.fix_calls.load(Ordering::SeqCst)
    }

    fn evaluate(&self, request: &ExecutionRequest) -> EngineResult {
        if request.fix {
            self.fix_calls.fetch_add(1, Ordering::SeqCst);
            let fixed = self
                .fixed_code
                .clone()
                .unwrap_or_else(|| request.source_text.clone());
            EngineResult::new(Vec::new()).with_fixed_code(fixed)
        } else {
            EngineResult::new(self.violations.clone())
        }
    }
}

impl Engine for ScriptedEngine {
    fn exec_sync(&self, request: &ExecutionRequest) -> FastPathOutcome {
        self.fast_path_calls.fetch_add(1, Ordering::SeqCst);
        let fast_path = self
            .fast_path
            .lock()
            .expect("fast path lock poisoned")
            .clone();

        match fast_path {
            FastPath::Complete => FastPathOutcome::Completed(self.evaluate(request)),
            FastPath::FinishedAsync(operation) => FastPathOutcome::from_result(Err(
                EngineError::runtime(format_sync_failure(&operation)),
            )),
            FastPath::Fail(err) => FastPathOutcome::Failed(err),
        }
    }

    fn exec(
        &self,
        request: ExecutionRequest,
    ) -> impl Future<Output = Result<EngineResult, EngineError>> + Send {
        self.bridged_calls.fetch_add(1, Ordering::SeqCst);
        let outcome = match &self.bridged_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.evaluate(&request)),
        };

        async move {
            tokio::task::yield_now().await;
            outcome
        }
    }
}
