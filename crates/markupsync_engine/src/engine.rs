//! Engine abstraction.
//!
//! This module provides the `Engine` trait which abstracts the analysis
//! engine behind the bridge. An engine is asynchronous, but may be able to
//! finish some calls before returning; the bridge tries that first.

use std::future::Future;

use crate::signal::parse_sync_failure;
use crate::{EngineError, EngineResult, ExecutionRequest};

/// Outcome of an optimistic synchronous engine call.
#[derive(Debug, Clone, PartialEq)]
pub enum FastPathOutcome {
    /// The call finished before returning.
    Completed(EngineResult),
    /// The call could not settle synchronously; `operation` names the
    /// engine entry point that gave up.
    DidNotCompleteSynchronously {
        /// The operation that did not complete.
        operation: String,
    },
    /// The call failed for a reason unrelated to synchronicity.
    Failed(EngineError),
}

impl FastPathOutcome {
    /// Classifies a plain result from an engine that reports an unfinished
    /// synchronous call as an error message.
    pub fn from_result(result: Result<EngineResult, EngineError>) -> Self {
        match result {
            Ok(result) => Self::Completed(result),
            Err(err) => match parse_sync_failure(err.message()) {
                Some(operation) => Self::DidNotCompleteSynchronously {
                    operation: operation.to_string(),
                },
                None => Self::Failed(err),
            },
        }
    }

    /// Returns `true` if the fast path produced a result.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Trait for an analysis engine.
///
/// Implementations must be shareable with the bridge worker thread.
pub trait Engine: Send + Sync + 'static {
    /// Runs the engine optimistically on the calling thread.
    ///
    /// # Arguments
    ///
    /// * `request` - Source text, file name, configuration and fix flag
    ///
    /// # Returns
    ///
    /// `Completed` with the result, `DidNotCompleteSynchronously` if the
    /// engine could not settle before returning, or `Failed`.
    fn exec_sync(&self, request: &ExecutionRequest) -> FastPathOutcome;

    /// Runs the engine to completion.
    ///
    /// The bridge drives this future on its worker runtime and blocks the
    /// caller until it resolves.
    ///
    /// # Arguments
    ///
    /// * `request` - Source text, file name, configuration and fix flag
    fn exec(
        &self,
        request: ExecutionRequest,
    ) -> impl Future<Output = Result<EngineResult, EngineError>> + Send;
}
