//! # markupsync_engine
//!
//! Engine contract for the markupsync lint bridge.
//!
//! This crate provides:
//! - The request and result types exchanged with an analysis engine
//! - The `Engine` trait with its optimistic and guaranteed call forms
//! - Classification of the engine's "did not complete synchronously" signal
//!
//! ## Architecture
//!
//! An engine is asynchronous at heart. It offers two ways in:
//!
//! - **Fast path**: `Engine::exec_sync`, an optimistic call that either
//!   finishes before returning or reports that it could not
//! - **Guaranteed path**: `Engine::exec`, a future that the bridge drives to
//!   completion on a dedicated worker
//!
//! ## Features
//!
//! - `test-utils`: Enable `ScriptedEngine`, an in-memory engine for tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use markupsync_engine::{ConfigHandle, Engine, ExecutionRequest, FastPathOutcome};
//!
//! let request = ExecutionRequest::new("<div></div>", "index.html", ConfigHandle::inline("default"));
//! match engine.exec_sync(&request) {
//!     FastPathOutcome::Completed(result) => println!("{} violations", result.violations.len()),
//!     other => println!("fast path unavailable: {other:?}"),
//! }
//! ```

mod engine;
mod error;
mod request;
pub mod signal;
mod violation;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use engine::{Engine, FastPathOutcome};
pub use error::EngineError;
pub use request::{ConfigHandle, ExecutionRequest};
pub use violation::{EngineResult, Severity, Violation};
