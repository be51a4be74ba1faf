//! Violation types for engine results.

use serde::{Deserialize, Serialize};

/// Severity level reported by the engine.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Info - informational message.
    Info,
    /// Warning - should be reviewed.
    Warning,
    /// Error - must be fixed.
    #[default]
    Error,
}

impl Severity {
    /// Returns the position of this severity in `info < warning < error`.
    pub fn index(self) -> u8 {
        match self {
            Self::Info => 0,
            Self::Warning => 1,
            Self::Error => 2,
        }
    }
}

/// A single defect reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// The engine rule that produced this violation.
    pub rule_id: String,

    /// Severity level.
    #[serde(default)]
    pub severity: Severity,

    /// The violation message.
    pub message: String,

    /// Line number (1-based).
    pub line: u32,

    /// Column number (1-based).
    pub col: u32,
}

impl Violation {
    /// Creates a new error-level violation.
    pub fn new(
        rule_id: impl Into<String>,
        message: impl Into<String>,
        line: u32,
        col: u32,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity: Severity::Error,
            message: message.into(),
            line,
            col,
        }
    }

    /// Sets the severity level.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// Outcome of one engine run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineResult {
    /// Violations in the order the engine reported them.
    #[serde(default)]
    pub violations: Vec<Violation>,

    /// The rewritten source, present when the engine ran in fix mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_code: Option<String>,
}

impl EngineResult {
    /// Creates a result carrying only violations.
    pub fn new(violations: Vec<Violation>) -> Self {
        Self {
            violations,
            fixed_code: None,
        }
    }

    /// Sets the fixed source text.
    pub fn with_fixed_code(mut self, fixed_code: impl Into<String>) -> Self {
        self.fixed_code = Some(fixed_code.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_violation_new() {
        let violation = Violation::new("no-foo", "bad", 3, 5);

        assert_eq!(violation.rule_id, "no-foo");
        assert_eq!(violation.message, "bad");
        assert_eq!(violation.severity, Severity::Error);
        assert_eq!((violation.line, violation.col), (3, 5));
    }

    #[test]
    fn test_violation_with_severity() {
        let violation = Violation::new("rule", "msg", 1, 1).with_severity(Severity::Info);
        assert_eq!(violation.severity, Severity::Info);
    }

    #[test]
    fn test_severity_index_order() {
        assert_eq!(Severity::Info.index(), 0);
        assert_eq!(Severity::Warning.index(), 1);
        assert_eq!(Severity::Error.index(), 2);
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_violation_deserialization() {
        let json = r#"{
            "ruleId": "attr-duplication",
            "severity": "warning",
            "message": "Duplicate attribute",
            "line": 2,
            "col": 7
        }"#;

        let violation: Violation = serde_json::from_str(json).unwrap();

        assert_eq!(violation.rule_id, "attr-duplication");
        assert_eq!(violation.severity, Severity::Warning);
        assert_eq!(violation.line, 2);
        assert_eq!(violation.col, 7);
    }

    #[test]
    fn test_engine_result_omits_absent_fixed_code() {
        let json = serde_json::to_string(&EngineResult::new(vec![])).unwrap();
        assert_eq!(json, r#"{"violations":[]}"#);

        let fixed = EngineResult::new(vec![]).with_fixed_code("<p></p>");
        let json = serde_json::to_string(&fixed).unwrap();
        assert!(json.contains(r#""fixedCode":"<p></p>""#));
    }

    #[test]
    fn test_engine_result_msgpack_preserves_text() {
        let result = EngineResult::new(vec![
            Violation::new("character-reference", "Illegal ä character", 1, 12)
                .with_severity(Severity::Warning),
        ])
        .with_fixed_code("<p>日本語 &amp; ä</p>\n");

        let bytes = rmp_serde::to_vec_named(&result).unwrap();
        let back: EngineResult = rmp_serde::from_slice(&bytes).unwrap();

        assert_eq!(back, result);
    }
}
