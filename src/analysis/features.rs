//! Feature extraction from gate entry/exit lines.
//!
//! Each `ENTRADA`/`SAÍDA` line yields one row: the hour of day, the day of
//! week (Monday = 0) and, in the extended variant, the actor type code.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const ENTRY_MARKER: &str = "ENTRADA";
pub const EXIT_MARKER: &str = "SAÍDA";

/// Timestamp layout of the leading bracketed token, e.g. `[15/03/2024 23:10]`.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

#[derive(Debug, Error, PartialEq)]
pub enum LineParseError {
    #[error("invalid timestamp {raw:?}: {reason}")]
    Timestamp { raw: String, reason: String },
    #[error("no clock time in line")]
    Clock,
}

/// Who passed through the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorType {
    #[serde(rename = "MORADOR")]
    Resident,
    #[serde(rename = "PRESTADOR")]
    ServiceProvider,
    #[serde(rename = "VISITANTE")]
    Visitor,
    #[serde(rename = "OUTRO")]
    Other,
}

impl ActorType {
    /// First matching keyword wins; order is significant.
    pub fn from_line(line: &str) -> Self {
        if line.contains("MORADOR") {
            ActorType::Resident
        } else if line.contains("PRESTADOR") {
            ActorType::ServiceProvider
        } else if line.contains("VISITANTE") {
            ActorType::Visitor
        } else {
            ActorType::Other
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            ActorType::Resident => 0,
            ActorType::ServiceProvider => 1,
            ActorType::Visitor => 2,
            ActorType::Other => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActorType::Resident => "MORADOR",
            ActorType::ServiceProvider => "PRESTADOR",
            ActorType::Visitor => "VISITANTE",
            ActorType::Other => "OUTRO",
        }
    }
}

impl std::fmt::Display for ActorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which columns go into a feature row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureVariant {
    /// `[hour, weekday]`
    Baseline,
    /// `[hour, weekday, actor code]`
    #[default]
    Extended,
}

impl FeatureVariant {
    pub fn width(&self) -> usize {
        match self {
            FeatureVariant::Baseline => 2,
            FeatureVariant::Extended => 3,
        }
    }
}

/// One parsed gate passage.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessEvent {
    pub timestamp: NaiveDateTime,
    pub hour: u32,
    pub weekday: u32,
    pub actor: ActorType,
    pub line: String,
}

impl AccessEvent {
    /// Parse a line already known to mention an entry or exit.
    pub fn parse(line: &str) -> Result<Self, LineParseError> {
        let trimmed = line.trim();
        let unquoted = trimmed.trim_matches('"');
        let raw = unquoted.split(']').next().unwrap_or_default().replace('[', "");

        let timestamp = NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(|e| {
            LineParseError::Timestamp {
                raw: raw.clone(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            timestamp,
            hour: timestamp.hour(),
            weekday: timestamp.weekday().num_days_from_monday(),
            actor: ActorType::from_line(line),
            line: trimmed.to_string(),
        })
    }

    pub fn to_row(&self, variant: FeatureVariant) -> Vec<f64> {
        let mut row = vec![self.hour as f64, self.weekday as f64];
        if variant == FeatureVariant::Extended {
            row.push(self.actor.code() as f64);
        }
        row
    }
}

/// Feature matrix with the parallel line text and actor types.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSet {
    pub variant: FeatureVariant,
    pub rows: Vec<Vec<f64>>,
    pub lines: Vec<String>,
    pub actors: Vec<ActorType>,
}

impl FeatureSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn is_access_line(line: &str) -> bool {
    line.contains(ENTRY_MARKER) || line.contains(EXIT_MARKER)
}

/// Build the feature matrix for every entry/exit line with a valid timestamp.
///
/// Lines whose timestamp does not parse are skipped; the batch continues.
pub fn extract_features<S: AsRef<str>>(lines: &[S], variant: FeatureVariant) -> FeatureSet {
    let mut set = FeatureSet {
        variant,
        ..FeatureSet::default()
    };

    for line in lines.iter().map(AsRef::as_ref).filter(|l| is_access_line(l)) {
        match AccessEvent::parse(line) {
            Ok(event) => {
                set.rows.push(event.to_row(variant));
                set.actors.push(event.actor);
                set.lines.push(event.line);
            }
            Err(e) => debug!(error = %e, line, "dropping access line"),
        }
    }

    set
}
