//! Per-class access counts and percentages.

use serde::{Deserialize, Serialize};

/// Summary counts over the bucketed accesses of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_accesses: usize,
    pub normal: usize,
    pub suspicious: usize,
    pub critical: usize,
    pub percent_normal: f64,
    pub percent_suspicious: f64,
    pub percent_critical: f64,
}

impl Metrics {
    /// Percentages are taken over `normal + suspicious + critical`; zero when empty.
    pub fn from_counts(normal: usize, suspicious: usize, critical: usize) -> Self {
        let total = normal + suspicious + critical;
        let pct = |n: usize| {
            if total == 0 {
                0.0
            } else {
                n as f64 / total as f64 * 100.0
            }
        };
        Self {
            total_accesses: total,
            normal,
            suspicious,
            critical,
            percent_normal: pct(normal),
            percent_suspicious: pct(suspicious),
            percent_critical: pct(critical),
        }
    }
}
