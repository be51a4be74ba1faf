//! The "did not complete synchronously" signal.
//!
//! Engines that can only report failures as text announce an unfinished
//! synchronous call with the message
//! `` `<op>Sync` finished async. Use `<op>` instead ``, naming the same
//! operation on both sides. Anything else is an ordinary failure.

use std::sync::LazyLock;

use regex::Regex;

static SYNC_FAILURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^`(\w+)Sync` finished async\. Use `(\w+)` instead$")
        .expect("Invalid sync failure pattern")
});

/// Formats the signal for `operation`.
pub fn format_sync_failure(operation: &str) -> String {
    format!("`{operation}Sync` finished async. Use `{operation}` instead")
}

/// Returns the operation named by a sync-failure message.
///
/// Both occurrences must name the same operation; `regex` has no
/// backreferences so the two captures are compared here.
pub fn parse_sync_failure(message: &str) -> Option<&str> {
    let captures = SYNC_FAILURE.captures(message)?;
    let failed = captures.get(1)?.as_str();
    let suggested = captures.get(2)?.as_str();
    (failed == suggested).then_some(failed)
}

/// Returns `true` if `message` is a sync-failure signal.
pub fn is_sync_failure(message: &str) -> bool {
    parse_sync_failure(message).is_some()
}
