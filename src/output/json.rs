//! JSON serialization for workflow results.

use serde::Serialize;

/// Serialize a report (an [`IsothermRun`](crate::IsothermRun), an
/// [`Isotherm`](crate::Isotherm), a single evaluation, ...) to compact JSON.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for report types).
pub fn to_json<T: Serialize + ?Sized>(report: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(report)
}

/// Serialize a report to pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for report types).
pub fn to_json_pretty<T: Serialize + ?Sized>(report: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
