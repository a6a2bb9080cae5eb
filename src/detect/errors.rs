//! Severity triage of `ERRO DE SISTEMA` lines.

use super::{SeverityBuckets, SeverityLevel};
use tracing::debug;

/// Marker that flags a line as a system error.
pub const SYSTEM_ERROR_MARKER: &str = "ERRO DE SISTEMA";

/// Bucket `ERRO DE SISTEMA` lines by their `Nível: N` tag.
///
/// Lines are stored trimmed, in input order. A system error without a level
/// tag is dropped.
pub fn classify_errors<S: AsRef<str>>(lines: &[S]) -> SeverityBuckets {
    let mut buckets = SeverityBuckets::new();

    for line in lines.iter().map(AsRef::as_ref) {
        if !line.contains(SYSTEM_ERROR_MARKER) {
            continue;
        }
        match SeverityLevel::ALL.iter().find(|l| line.contains(l.marker())) {
            Some(level) => buckets.push(*level, line.trim().to_string()),
            None => debug!(line, "system error without level tag, skipping"),
        }
    }

    buckets
}
