//! Fast-path / bridged-path selection.

use std::sync::Arc;

use markupsync_engine::{Engine, EngineResult, ExecutionRequest, FastPathOutcome};
use tracing::{debug, trace};

use crate::proxy::SynchronousProxyFactory;
use crate::registry::BrokenStateRegistry;
use crate::{BridgeError, BridgeOptions};

/// Runs engine requests synchronously, preferring the engine's fast path.
///
/// A configuration whose fast path once reported that it could not complete
/// synchronously is recorded as broken and goes straight to the bridge from
/// then on.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use markupsync_core::ExecutionCoordinator;
///
/// let coordinator = ExecutionCoordinator::new(Arc::new(engine));
/// let result = coordinator.run(&request)?;
/// ```
pub struct ExecutionCoordinator<E: Engine> {
    engine: Arc<E>,
    registry: Arc<BrokenStateRegistry>,
    proxy: SynchronousProxyFactory<E>,
}

impl<E: Engine> ExecutionCoordinator<E> {
    /// Creates a coordinator using the process-wide registry.
    pub fn new(engine: Arc<E>) -> Self {
        Self::with_registry(engine, BrokenStateRegistry::global(), BridgeOptions::default())
    }

    /// Creates a coordinator with its own registry and options.
    pub fn with_registry(
        engine: Arc<E>,
        registry: Arc<BrokenStateRegistry>,
        options: BridgeOptions,
    ) -> Self {
        let proxy = SynchronousProxyFactory::new(Arc::clone(&engine), options);
        Self {
            engine,
            registry,
            proxy,
        }
    }

    /// Runs `request` and returns the engine result.
    ///
    /// Engine failures other than the "did not complete synchronously"
    /// signal are returned unchanged and never retried.
    pub fn run(&self, request: &ExecutionRequest) -> Result<EngineResult, BridgeError> {
        let identity = request.config_identity();

        if self.registry.is_broken(identity) {
            trace!("Bridged run for {} (config {})", request.name, identity);
            return self.run_bridged(request);
        }

        trace!("Fast run for {} (config {})", request.name, identity);
        match self.engine.exec_sync(request) {
            FastPathOutcome::Completed(result) => Ok(result),
            FastPathOutcome::DidNotCompleteSynchronously { operation } => {
                if self.registry.mark_broken(identity) {
                    debug!(
                        "`{}` did not complete synchronously for config {}; using the bridge from now on",
                        operation, identity
                    );
                }
                self.run_bridged(request)
            }
            FastPathOutcome::Failed(err) => Err(BridgeError::Engine(err)),
        }
    }

    fn run_bridged(&self, request: &ExecutionRequest) -> Result<EngineResult, BridgeError> {
        self.proxy.get()?.call(request)
    }

    /// The registry this coordinator records broken configurations in.
    pub fn registry(&self) -> &BrokenStateRegistry {
        &self.registry
    }

    /// The factory for the bridged path.
    pub fn proxy_factory(&self) -> &SynchronousProxyFactory<E> {
        &self.proxy
    }

    /// The engine behind this coordinator.
    pub fn engine(&self) -> &E {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markupsync_engine::test_utils::{FastPath, ScriptedEngine};
    use markupsync_engine::{ConfigHandle, EngineError, Violation};
    use pretty_assertions::assert_eq;

    fn coordinator(engine: ScriptedEngine) -> ExecutionCoordinator<ScriptedEngine> {
        ExecutionCoordinator::with_registry(
            Arc::new(engine),
            Arc::new(BrokenStateRegistry::new()),
            BridgeOptions::default(),
        )
    }

    fn request(config: &str) -> ExecutionRequest {
        ExecutionRequest::new("<div>", "index.html", ConfigHandle::inline(config))
    }

    #[test]
    fn test_fast_path_success_skips_bridge() {
        let violation = Violation::new("no-foo", "bad", 3, 5);
        let coordinator = coordinator(ScriptedEngine::new(vec![violation.clone()]));

        let result = coordinator.run(&request("cfg")).unwrap();

        assert_eq!(result.violations, vec![violation]);
        assert_eq!(coordinator.engine().fast_path_calls(), 1);
        assert_eq!(coordinator.engine().bridged_calls(), 0);
        assert!(!coordinator.proxy_factory().is_initialized());
        assert!(coordinator.registry().is_empty());
    }

    #[test]
    fn test_sync_failure_falls_back_and_marks_broken() {
        let engine = ScriptedEngine::new(vec![Violation::new("no-foo", "bad", 1, 1)])
            .with_fast_path(FastPath::FinishedAsync("fix".to_string()));
        let coordinator = coordinator(engine);

        let result = coordinator.run(&request("cfg")).unwrap();

        assert_eq!(result.violations.len(), 1);
        assert!(coordinator.registry().is_broken("cfg"));
        assert_eq!(coordinator.engine().fast_path_calls(), 1);
        assert_eq!(coordinator.engine().bridged_calls(), 1);
    }

    #[test]
    fn test_broken_config_never_retries_fast_path() {
        let engine = ScriptedEngine::new(vec![])
            .with_fast_path(FastPath::FinishedAsync("verify".to_string()));
        let coordinator = coordinator(engine);

        coordinator.run(&request("cfg")).unwrap();
        // Even a now-healthy fast path is not retried for this config.
        coordinator.engine().set_fast_path(FastPath::Complete);
        coordinator.run(&request("cfg")).unwrap();
        coordinator.run(&request("cfg").with_fix(true)).unwrap();

        assert_eq!(coordinator.engine().fast_path_calls(), 1);
        assert_eq!(coordinator.engine().bridged_calls(), 3);
    }

    #[test]
    fn test_broken_state_is_per_config() {
        let engine = ScriptedEngine::new(vec![])
            .with_fast_path(FastPath::FinishedAsync("fix".to_string()));
        let coordinator = coordinator(engine);

        coordinator.run(&request("a")).unwrap();
        coordinator.engine().set_fast_path(FastPath::Complete);
        coordinator.run(&request("b")).unwrap();

        assert!(coordinator.registry().is_broken("a"));
        assert!(!coordinator.registry().is_broken("b"));
        assert_eq!(coordinator.engine().fast_path_calls(), 2);
        assert_eq!(coordinator.engine().bridged_calls(), 1);
    }

    #[test]
    fn test_unrelated_failure_is_rethrown_unchanged() {
        let engine = ScriptedEngine::new(vec![])
            .with_fast_path(FastPath::Fail(EngineError::parse("parse error")));
        let coordinator = coordinator(engine);

        let err = coordinator.run(&request("cfg")).unwrap_err();

        assert_eq!(err.to_string(), "parse error");
        assert_eq!(err.as_engine_error(), Some(&EngineError::parse("parse error")));
        assert!(coordinator.registry().is_empty());
        assert_eq!(coordinator.engine().bridged_calls(), 0);
    }

    #[test]
    fn test_bridged_failure_after_fallback_is_terminal() {
        let engine = ScriptedEngine::new(vec![])
            .with_fast_path(FastPath::FinishedAsync("fix".to_string()))
            .with_bridged_error(EngineError::runtime("engine crashed"));
        let coordinator = coordinator(engine);

        let err = coordinator.run(&request("cfg")).unwrap_err();

        assert_eq!(err.to_string(), "engine crashed");
        assert_eq!(coordinator.engine().fast_path_calls(), 1);
        assert_eq!(coordinator.engine().bridged_calls(), 1);
        assert!(coordinator.registry().is_broken("cfg"));
    }

    #[test]
    fn test_shared_registry_is_honored() {
        let registry = Arc::new(BrokenStateRegistry::new());
        registry.mark_broken("cfg");

        let coordinator = ExecutionCoordinator::with_registry(
            Arc::new(ScriptedEngine::new(vec![])),
            Arc::clone(&registry),
            BridgeOptions::default(),
        );
        coordinator.run(&request("cfg")).unwrap();

        assert_eq!(coordinator.engine().fast_path_calls(), 0);
        assert_eq!(coordinator.engine().bridged_calls(), 1);
    }
}
