//! portaria -- condominium gate access-log analyzer.
//!
//! This crate reads a gate log, triages system errors by severity, scores
//! entry/exit events with an isolation forest, applies the overnight rule,
//! raises alerts and writes a report.

pub mod alert;
pub mod analysis;
pub mod config;
pub mod detect;
pub mod expr;
pub mod ingest;
pub mod present;
pub mod report;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::alert::{AlertOutcome, AlertSink};
use crate::analysis::{ClassificationBuckets, IsolationForest, Metrics};
use crate::config::Config;
use crate::detect::SeverityBuckets;

/// In-memory results of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub errors: SeverityBuckets,
    pub classifications: ClassificationBuckets,
    pub metrics: Metrics,
}

/// Everything a run produced, including what reached disk.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub input: PathBuf,
    #[serde(flatten)]
    pub analysis: Analysis,
    /// Report path, when the report was written.
    pub report: Option<PathBuf>,
    pub alerts: Option<AlertOutcome>,
}

/// Triage errors and classify accesses for an in-memory batch of lines.
pub fn analyze_lines<S: AsRef<str>>(lines: &[S], config: &Config) -> Result<Analysis> {
    let errors = detect::errors::classify_errors(lines);
    let features = analysis::extract_features(lines, config.analysis.variant);
    info!(
        lines = lines.len(),
        system_errors = errors.total(),
        access_events = features.len(),
        "log scanned"
    );

    let mut model = IsolationForest::new(config.analysis.forest_params())
        .context("invalid isolation forest parameters")?;
    let (classifications, metrics) = analysis::classify_accesses(&features, &mut model)
        .context("access classification failed")?;

    Ok(Analysis {
        errors,
        classifications,
        metrics,
    })
}

/// Run the whole pipeline for one log file.
///
/// Unreadable input degrades to an empty analysis. Report and alert write
/// failures are logged and reflected in the result; they do not abort.
pub fn run<W: Write>(input: &Path, output: &Path, config: &Config, console: &mut W) -> Result<RunResult> {
    info!(input = %input.display(), output = %output.display(), "starting analysis");

    let lines = ingest::read_lines(input);
    if lines.is_empty() {
        warn!(input = %input.display(), "no data in input");
    }

    let analysis = analyze_lines(&lines, config)?;

    let alerts = config.alerts.enabled.then(|| {
        alert::raise_alerts(
            &analysis.classifications,
            &analysis.errors,
            &AlertSink::from(&config.alerts),
            console,
        )
    });

    let report = match report::write_report(
        output,
        &analysis.errors,
        &analysis.classifications,
        &analysis.metrics,
    ) {
        Ok(()) => Some(output.to_path_buf()),
        Err(e) => {
            error!(error = %e, "report not saved, results remain available");
            None
        }
    };

    Ok(RunResult {
        input: input.to_path_buf(),
        analysis,
        report,
        alerts,
    })
}
