//! Decoding of report messages on the host side.
//!
//! Reports carry their payload as JSON. When the host renders them, the
//! payload is turned back into a message whose rule id is namespaced under
//! the plugin prefix and whose severity is never lower than the one the host
//! configured for the rule.

use serde::{Deserialize, Serialize};

use crate::BridgeError;
use crate::reporter::ReportPayload;

/// Severity as configured on the host rule.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum HostSeverity {
    /// Rule disabled.
    Off,
    /// Report as a warning.
    #[default]
    Warn,
    /// Report as an error.
    Error,
}

impl HostSeverity {
    /// Maps `0 | 1 | 2` to a severity, clamping anything higher to `Error`.
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => Self::Off,
            1 => Self::Warn,
            _ => Self::Error,
        }
    }
}

/// A decoded report message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostMessage {
    /// Rule id namespaced as `<prefix>/<ruleId>`.
    pub rule_id: String,
    /// The violation message.
    pub message: String,
    /// The stricter of the host and engine severities.
    pub severity: HostSeverity,
}

/// Decodes a report message produced by `ViolationReporter`.
///
/// # Arguments
///
/// * `raw` - The JSON report message
/// * `host_severity` - Severity the host configured for the rule
/// * `prefix` - Namespace for engine rule ids
pub fn decode_message(
    raw: &str,
    host_severity: HostSeverity,
    prefix: &str,
) -> Result<HostMessage, BridgeError> {
    let payload: ReportPayload = serde_json::from_str(raw)?;
    let engine_severity = HostSeverity::from_index(payload.severity.index());

    Ok(HostMessage {
        rule_id: format!("{}/{}", prefix, payload.rule_id),
        message: payload.message,
        severity: host_severity.max(engine_severity),
    })
}
