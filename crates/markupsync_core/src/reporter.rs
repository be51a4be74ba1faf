//! Translation of engine violations into host reports.

use markupsync_engine::{Severity, Violation};
use serde::{Deserialize, Serialize};

use crate::BridgeError;
use crate::fix_cycle::FixSource;

/// Payload serialized into a host report's message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPayload {
    /// Severity as reported by the engine.
    pub severity: Severity,
    /// The violation message.
    pub message: String,
    /// The engine rule id, without prefix.
    #[serde(rename = "ruleId")]
    pub rule_id: String,
}

/// Host-side position: 1-based line, 0-based column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostLocation {
    /// Line number (1-based).
    pub line: u32,
    /// Column number (0-based).
    pub column: u32,
}

/// A whole-source replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostFix {
    /// Byte range to replace; always the entire source.
    pub range: (usize, usize),
    /// Replacement text.
    pub text: String,
}

/// Lazily computed fix attached to a report.
#[derive(Clone, Copy)]
pub struct FixThunk<'a> {
    source: &'a dyn FixSource,
    source_len: usize,
}

impl FixThunk<'_> {
    /// Computes the fix, if this is the first request in the pass and the
    /// engine changed the source.
    pub fn apply(&self) -> Result<Option<HostFix>, BridgeError> {
        Ok(self.source.compute_fix()?.map(|text| HostFix {
            range: (0, self.source_len),
            text,
        }))
    }
}

impl std::fmt::Debug for FixThunk<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixThunk")
            .field("source_len", &self.source_len)
            .finish_non_exhaustive()
    }
}

/// One report handed to the host.
#[derive(Debug)]
pub struct HostReport<'a> {
    /// JSON of `{severity, message, ruleId}`.
    pub message: String,
    /// Where the violation starts.
    pub location: HostLocation,
    /// The pass's shared fix, computed on demand.
    pub fix: FixThunk<'a>,
}

/// Maps engine violations to host reports for one source text.
#[derive(Debug, Clone, Copy)]
pub struct ViolationReporter {
    source_len: usize,
}

impl ViolationReporter {
    /// Creates a reporter for `source_text`.
    pub fn new(source_text: &str) -> Self {
        Self {
            source_len: source_text.len(),
        }
    }

    /// Emits one report per violation, in engine order.
    pub fn emit<'a>(
        &self,
        violations: &[Violation],
        fixes: &'a dyn FixSource,
    ) -> Result<Vec<HostReport<'a>>, BridgeError> {
        violations
            .iter()
            .map(|violation| self.report(violation, fixes))
            .collect()
    }

    fn report<'a>(
        &self,
        violation: &Violation,
        fixes: &'a dyn FixSource,
    ) -> Result<HostReport<'a>, BridgeError> {
        let payload = ReportPayload {
            severity: violation.severity,
            message: violation.message.clone(),
            rule_id: violation.rule_id.clone(),
        };

        Ok(HostReport {
            message: serde_json::to_string(&payload)?,
            location: HostLocation {
                line: violation.line,
                // Engine columns are 1-based, host columns 0-based.
                column: violation.col.saturating_sub(1),
            },
            fix: FixThunk {
                source: fixes,
                source_len: self.source_len,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    /// Yields `text` once, like a fix cycle with a changing fix.
    struct OnceFix {
        text: Option<&'static str>,
        calls: Cell<usize>,
    }

    impl OnceFix {
        fn new(text: Option<&'static str>) -> Self {
            Self {
                text,
                calls: Cell::new(0),
            }
        }
    }

    impl FixSource for OnceFix {
        fn compute_fix(&self) -> Result<Option<String>, BridgeError> {
            let calls = self.calls.get();
            self.calls.set(calls + 1);
            Ok(if calls == 0 {
                self.text.map(str::to_string)
            } else {
                None
            })
        }
    }

    #[test]
    fn test_column_is_shifted_to_zero_based() {
        let fixes = OnceFix::new(None);
        let violations = vec![Violation::new("no-foo", "bad", 3, 5)];

        let reports = ViolationReporter::new("").emit(&violations, &fixes).unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].location, HostLocation { line: 3, column: 4 });
    }

    #[test]
    fn test_column_zero_saturates() {
        let fixes = OnceFix::new(None);
        let violations = vec![Violation::new("no-foo", "bad", 1, 0)];

        let reports = ViolationReporter::new("").emit(&violations, &fixes).unwrap();

        assert_eq!(reports[0].location.column, 0);
    }

    #[test]
    fn test_message_payload() {
        let fixes = OnceFix::new(None);
        let violations = vec![
            Violation::new("attr-duplication", "Duplicate \"id\"", 1, 1)
                .with_severity(Severity::Warning),
        ];

        let reports = ViolationReporter::new("").emit(&violations, &fixes).unwrap();

        assert_eq!(
            reports[0].message,
            r#"{"severity":"warning","message":"Duplicate \"id\"","ruleId":"attr-duplication"}"#
        );
        let payload: ReportPayload = serde_json::from_str(&reports[0].message).unwrap();
        assert_eq!(payload.rule_id, "attr-duplication");
    }

    #[test]
    fn test_order_is_engine_order() {
        let fixes = OnceFix::new(None);
        let violations = vec![
            Violation::new("z-rule", "later in file", 9, 1),
            Violation::new("a-rule", "earlier in file", 1, 1),
            Violation::new("z-rule", "later in file", 9, 1),
        ];

        let reports = ViolationReporter::new("").emit(&violations, &fixes).unwrap();
        let lines: Vec<u32> = reports.iter().map(|r| r.location.line).collect();

        assert_eq!(lines, vec![9, 1, 9]);
    }

    #[test]
    fn test_fix_replaces_whole_source() {
        let source = "<p>héllo</p>";
        let fixes = OnceFix::new(Some("<p>hello</p>"));
        let violations = vec![Violation::new("r", "m", 1, 1), Violation::new("r", "m", 1, 4)];

        let reports = ViolationReporter::new(source).emit(&violations, &fixes).unwrap();

        assert_eq!(
            reports[1].fix.apply().unwrap(),
            Some(HostFix {
                range: (0, source.len()),
                text: "<p>hello</p>".to_string(),
            })
        );
        assert_eq!(reports[0].fix.apply().unwrap(), None);
    }

    #[test]
    fn test_no_violations_no_reports() {
        let fixes = OnceFix::new(Some("changed"));
        let reports = ViolationReporter::new("x").emit(&[], &fixes).unwrap();

        assert!(reports.is_empty());
        assert_eq!(fixes.calls.get(), 0);
    }
}
