//! System-error detection and severity bucketing.

pub mod errors;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Severity levels carried by `ERRO DE SISTEMA` lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeverityLevel {
    #[serde(rename = "Nível 1")]
    Level1,
    #[serde(rename = "Nível 2")]
    Level2,
    #[serde(rename = "Nível 3 (Crítico)")]
    Level3Critical,
}

impl SeverityLevel {
    pub const ALL: [SeverityLevel; 3] = [
        SeverityLevel::Level1,
        SeverityLevel::Level2,
        SeverityLevel::Level3Critical,
    ];

    /// Report label, kept identical to the historical output files.
    pub fn label(&self) -> &'static str {
        match self {
            SeverityLevel::Level1 => "Nível 1",
            SeverityLevel::Level2 => "Nível 2",
            SeverityLevel::Level3Critical => "Nível 3 (Crítico)",
        }
    }

    /// Marker that tags a log line with this level.
    pub fn marker(&self) -> &'static str {
        match self {
            SeverityLevel::Level1 => "Nível: 1",
            SeverityLevel::Level2 => "Nível: 2",
            SeverityLevel::Level3Critical => "Nível: 3",
        }
    }
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// System-error lines grouped by level. All three levels are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeverityBuckets {
    buckets: BTreeMap<SeverityLevel, Vec<String>>,
}

impl Default for SeverityBuckets {
    fn default() -> Self {
        Self {
            buckets: SeverityLevel::ALL.iter().map(|l| (*l, Vec::new())).collect(),
        }
    }
}

impl SeverityBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: SeverityLevel, line: String) {
        self.buckets.entry(level).or_default().push(line);
    }

    pub fn get(&self, level: SeverityLevel) -> &[String] {
        self.buckets.get(&level).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Levels in severity order with their lines.
    pub fn iter(&self) -> impl Iterator<Item = (SeverityLevel, &[String])> + '_ {
        SeverityLevel::ALL.into_iter().map(move |l| (l, self.get(l)))
    }

    pub fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
