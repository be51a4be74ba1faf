//! The per-file lint rule callback.

use std::path::Path;
use std::sync::Arc;

use markupsync_engine::{Engine, ExecutionRequest};
use tracing::debug;

use crate::fix_cycle::FixCycleGuard;
use crate::message::{HostMessage, HostSeverity, decode_message};
use crate::reporter::{HostReport, ViolationReporter};
use crate::resolver::{ConfigResolver, FileConfigResolver};
use crate::{BridgeError, BridgeOptions, BrokenStateRegistry, ExecutionCoordinator};

/// Receives the reports of a pass.
///
/// A sink may apply a report's fix while handling it; all fixes of a pass
/// share one fix cycle.
pub trait ReportSink {
    /// Handles one report.
    fn report(&mut self, report: HostReport<'_>) -> Result<(), BridgeError>;
}

impl<F> ReportSink for F
where
    F: FnMut(HostReport<'_>) -> Result<(), BridgeError>,
{
    fn report(&mut self, report: HostReport<'_>) -> Result<(), BridgeError> {
        self(report)
    }
}

/// A lint rule that runs the markup engine over one file per call.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use markupsync_core::MarkupRule;
///
/// let rule = MarkupRule::new(Arc::new(engine));
/// let count = rule.check("index.html", &source, &mut |report: HostReport<'_>| -> Result<(), BridgeError> {
///     println!("{}:{} {}", report.location.line, report.location.column, report.message);
///     Ok(())
/// })?;
/// ```
pub struct MarkupRule<E: Engine, R: ConfigResolver = FileConfigResolver> {
    coordinator: ExecutionCoordinator<E>,
    resolver: R,
    options: BridgeOptions,
}

impl<E: Engine> MarkupRule<E> {
    /// Creates a rule that finds configuration files on disk and records
    /// broken configurations process-wide.
    pub fn new(engine: Arc<E>) -> Self {
        Self::with_resolver(engine, FileConfigResolver::new(), BridgeOptions::default())
    }
}

impl<E: Engine, R: ConfigResolver> MarkupRule<E, R> {
    /// Creates a rule with a custom resolver and options.
    pub fn with_resolver(engine: Arc<E>, resolver: R, options: BridgeOptions) -> Self {
        Self::with_registry(engine, resolver, BrokenStateRegistry::global(), options)
    }

    /// Creates a rule with its own broken-state registry.
    pub fn with_registry(
        engine: Arc<E>,
        resolver: R,
        registry: Arc<BrokenStateRegistry>,
        options: BridgeOptions,
    ) -> Self {
        let coordinator = ExecutionCoordinator::with_registry(engine, registry, options.clone());
        Self {
            coordinator,
            resolver,
            options,
        }
    }

    /// Lints `source_text` and hands every report to `sink`.
    ///
    /// Returns the number of reports. A file without configuration yields no
    /// reports and never reaches the engine.
    pub fn check<S>(
        &self,
        filename: &str,
        source_text: &str,
        sink: &mut S,
    ) -> Result<usize, BridgeError>
    where
        S: ReportSink + ?Sized,
    {
        let Some(config) = self.resolver.resolve(Path::new(filename))? else {
            debug!("Skipping {}: no configuration", filename);
            return Ok(0);
        };

        let request = ExecutionRequest::new(source_text, filename, config);
        let result = self.coordinator.run(&request)?;

        let fix_cycle = FixCycleGuard::new(&self.coordinator, &request);
        let reports = ViolationReporter::new(source_text).emit(&result.violations, &fix_cycle)?;
        let count = reports.len();

        for report in reports {
            sink.report(report)?;
        }

        debug!("Reported {} violations for {}", count, filename);
        Ok(count)
    }

    /// Decodes a report message for display under this rule's prefix.
    pub fn decode_message(
        &self,
        raw: &str,
        host_severity: HostSeverity,
    ) -> Result<HostMessage, BridgeError> {
        decode_message(raw, host_severity, &self.options.rule_prefix)
    }

    /// The coordinator running the engine for this rule.
    pub fn coordinator(&self) -> &ExecutionCoordinator<E> {
        &self.coordinator
    }
}
