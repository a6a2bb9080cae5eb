//! Access classification: model verdict plus the overnight rule.
//!
//! The outlier model is trained on the current batch only. Its verdict
//! decides Normal vs Suspicious, but any access whose hour falls in the
//! closed window 22..=6 (22:00 through 06:59) is Critical regardless of
//! the model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::features::{ActorType, FeatureSet, LineParseError};
use super::metrics::Metrics;
use super::model::{ModelError, OutlierModel, Verdict};

/// First hour of the overnight window, inclusive.
pub const NIGHT_START_HOUR: u32 = 22;
/// Last hour of the overnight window, inclusive.
pub const NIGHT_END_HOUR: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AccessClass {
    #[serde(rename = "Normais")]
    Normal,
    #[serde(rename = "Suspeitos")]
    Suspicious,
    #[serde(rename = "Críticos")]
    Critical,
}

impl AccessClass {
    pub const ALL: [AccessClass; 3] = [
        AccessClass::Normal,
        AccessClass::Suspicious,
        AccessClass::Critical,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AccessClass::Normal => "Normais",
            AccessClass::Suspicious => "Suspeitos",
            AccessClass::Critical => "Críticos",
        }
    }

    /// Decide the class of one access.
    pub fn decide(verdict: Verdict, clock: ClockTime) -> Self {
        if clock.is_overnight() {
            AccessClass::Critical
        } else if verdict.is_inlier() {
            AccessClass::Normal
        } else {
            AccessClass::Suspicious
        }
    }
}

impl std::fmt::Display for AccessClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Hour and minute read back from a log line's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
}

impl ClockTime {
    /// Read `HH:MM` from the second space-delimited token of `line`.
    ///
    /// For `[15/03/2024 23:10] ENTRADA ...` the token is `23:10]`; anything
    /// after the minute digits is ignored. A missing minute counts as `:00`.
    pub fn from_line(line: &str) -> Result<Self, LineParseError> {
        let token = line.split(' ').nth(1).ok_or(LineParseError::Clock)?;
        let (hour, rest) = token.split_once(':').unwrap_or((token, ""));
        let hour: u32 = hour.parse().map_err(|_| LineParseError::Clock)?;

        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let minute: u32 = match &rest[..digits_end] {
            "" => 0,
            digits => digits.parse().map_err(|_| LineParseError::Clock)?,
        };

        if hour > 23 || minute > 59 {
            return Err(LineParseError::Clock);
        }
        Ok(Self { hour, minute })
    }

    /// Only the hour counts: 06:59 is still overnight.
    pub fn is_overnight(&self) -> bool {
        self.hour >= NIGHT_START_HOUR || self.hour <= NIGHT_END_HOUR
    }
}

/// One bucketed access line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedAccess {
    pub line: String,
    pub actor: ActorType,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Access lines grouped by class. All three classes are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassificationBuckets {
    buckets: BTreeMap<AccessClass, Vec<ClassifiedAccess>>,
}

impl Default for ClassificationBuckets {
    fn default() -> Self {
        Self {
            buckets: AccessClass::ALL.iter().map(|c| (*c, Vec::new())).collect(),
        }
    }
}

impl ClassificationBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, class: AccessClass, access: ClassifiedAccess) {
        self.buckets.entry(class).or_default().push(access);
    }

    pub fn get(&self, class: AccessClass) -> &[ClassifiedAccess] {
        self.buckets.get(&class).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Line text of one class, in input order.
    pub fn lines(&self, class: AccessClass) -> Vec<&str> {
        self.get(class).iter().map(|a| a.line.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AccessClass, &[ClassifiedAccess])> + '_ {
        AccessClass::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    pub fn count(&self, class: AccessClass) -> usize {
        self.get(class).len()
    }

    pub fn metrics(&self) -> Metrics {
        Metrics::from_counts(
            self.count(AccessClass::Normal),
            self.count(AccessClass::Suspicious),
            self.count(AccessClass::Critical),
        )
    }
}

/// Fit `model` on `features`, then bucket every access.
///
/// An empty feature set yields empty buckets and zeroed metrics without
/// touching the model.
pub fn classify_accesses(
    features: &FeatureSet,
    model: &mut dyn OutlierModel,
) -> Result<(ClassificationBuckets, Metrics), ModelError> {
    let mut buckets = ClassificationBuckets::new();
    if features.is_empty() {
        debug!("no access events, skipping model fit");
        return Ok((buckets, Metrics::default()));
    }

    model.fit(&features.rows)?;
    let verdicts = model.predict(&features.rows)?;
    let scores = model.decision_scores(&features.rows)?;

    for (i, (line, verdict)) in features.lines.iter().zip(verdicts).enumerate() {
        let clock = match ClockTime::from_line(line) {
            Ok(clock) => clock,
            Err(_) => {
                debug!(line = %line, "no clock time in access line, skipping");
                continue;
            }
        };
        let class = AccessClass::decide(verdict, clock);
        buckets.push(
            class,
            ClassifiedAccess {
                line: line.clone(),
                actor: features.actors.get(i).copied().unwrap_or(ActorType::Other),
                verdict,
                score: scores.as_ref().and_then(|s| s.get(i).copied()),
            },
        );
    }

    let metrics = buckets.metrics();
    info!(
        total = metrics.total_accesses,
        normal = metrics.normal,
        suspicious = metrics.suspicious,
        critical = metrics.critical,
        "accesses classified"
    );
    Ok((buckets, metrics))
}
