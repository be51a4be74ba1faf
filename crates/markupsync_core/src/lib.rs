//! # markupsync_core
//!
//! Synchronous lint-rule bridge to an asynchronous markup engine.
//!
//! This crate provides:
//! - The `ExecutionCoordinator`, which prefers the engine's fast path and
//!   falls back to a worker-backed blocking call per configuration
//! - The `BrokenStateRegistry` of configurations whose fast path failed
//! - The lazily started bridge worker (`SynchronousProxyFactory`)
//! - At-most-once fix computation per pass (`FixCycleGuard`)
//! - Translation of engine violations to host reports
//! - The per-file `MarkupRule` callback and configuration resolution
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use markupsync_core::{HostReport, MarkupRule};
//!
//! let rule = MarkupRule::new(Arc::new(engine));
//! let count = rule.check("index.html", &source, &mut |report: HostReport<'_>| {
//!     if let Some(fix) = report.fix.apply()? {
//!         println!("replace 0..{} with fixed text", fix.range.1);
//!     }
//!     Ok(())
//! })?;
//! ```

mod config;
mod coordinator;
mod error;
mod fix_cycle;
pub mod message;
pub mod proxy;
pub mod registry;
mod reporter;
pub mod resolver;
mod rule;

pub use config::BridgeOptions;
pub use coordinator::ExecutionCoordinator;
pub use error::BridgeError;
pub use fix_cycle::{FixCycleGuard, FixCycleState, FixSource};
pub use message::{HostMessage, HostSeverity, decode_message};
pub use proxy::{SyncProxy, SynchronousProxyFactory};
pub use registry::BrokenStateRegistry;
pub use reporter::{FixThunk, HostFix, HostLocation, HostReport, ReportPayload, ViolationReporter};
pub use resolver::{ConfigResolver, FileConfigResolver, StaticConfigResolver};
pub use rule::{MarkupRule, ReportSink};

pub use markupsync_engine::{
    ConfigHandle, Engine, EngineError, EngineResult, ExecutionRequest, FastPathOutcome, Severity,
    Violation,
};
