//! Operator alerts for critical accesses and level-3 system failures.
//!
//! Each non-empty category is echoed to the console with an `ALERTA:` tag
//! and appended to its own alert log. Alert logs are created on demand and
//! never truncated.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info};

use crate::analysis::{AccessClass, ClassificationBuckets};
use crate::config::AlertConfig;
use crate::detect::{SeverityBuckets, SeverityLevel};

pub const ACCESS_HEADER: &str = "=== ALERTAS CRÍTICOS ===";
pub const FAILURE_HEADER: &str = "=== ALERTAS DE FALHAS CRÍTICAS ===";

/// Where alert entries are appended.
#[derive(Debug, Clone)]
pub struct AlertSink {
    pub access_log: PathBuf,
    pub failure_log: PathBuf,
}

impl From<&AlertConfig> for AlertSink {
    fn from(cfg: &AlertConfig) -> Self {
        Self {
            access_log: cfg.access_log.clone(),
            failure_log: cfg.failure_log.clone(),
        }
    }
}

/// What one alert pass produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlertOutcome {
    pub critical_accesses: usize,
    pub critical_failures: usize,
    /// Alert logs that could not be written.
    pub failed_writes: Vec<PathBuf>,
}

struct Category<'a> {
    banner: &'static str,
    none_message: &'static str,
    header: &'static str,
    log: &'a Path,
}

/// Echo and record critical accesses and level-3 failures.
///
/// Write failures are logged and listed in the outcome; they never abort.
pub fn raise_alerts<W: Write>(
    classifications: &ClassificationBuckets,
    errors: &SeverityBuckets,
    sink: &AlertSink,
    console: &mut W,
) -> AlertOutcome {
    let mut outcome = AlertOutcome::default();

    let accesses = classifications.lines(AccessClass::Critical);
    let access_category = Category {
        banner: "=== ALERTA: ACESSOS CRÍTICOS DETECTADOS ===",
        none_message: "Nenhum acesso crítico detectado.",
        header: ACCESS_HEADER,
        log: &sink.access_log,
    };
    outcome.critical_accesses = accesses.len();
    if let Err(path) = alert_category(&access_category, &accesses, console) {
        outcome.failed_writes.push(path);
    }

    let failures: Vec<&str> = errors
        .get(SeverityLevel::Level3Critical)
        .iter()
        .map(String::as_str)
        .collect();
    let failure_category = Category {
        banner: "=== ALERTA: FALHAS CRÍTICAS DETECTADAS ===",
        none_message: "Nenhuma falha crítica detectada.",
        header: FAILURE_HEADER,
        log: &sink.failure_log,
    };
    outcome.critical_failures = failures.len();
    if let Err(path) = alert_category(&failure_category, &failures, console) {
        outcome.failed_writes.push(path);
    }

    outcome
}

fn alert_category<W: Write>(
    category: &Category<'_>,
    entries: &[&str],
    console: &mut W,
) -> Result<(), PathBuf> {
    if entries.is_empty() {
        echo(console, |c| writeln!(c, "{}", category.none_message));
        return Ok(());
    }

    echo(console, |c| {
        writeln!(c, "\n{}", category.banner)?;
        for entry in entries {
            writeln!(c, "ALERTA: {}", entry)?;
        }
        Ok(())
    });

    match append_alerts(category.log, category.header, entries) {
        Ok(()) => {
            info!(path = %category.log.display(), count = entries.len(), "alerts recorded");
            Ok(())
        }
        Err(e) => {
            error!(path = %category.log.display(), error = %e, "failed to record alerts");
            Err(category.log.to_path_buf())
        }
    }
}

/// Append a header and one line per entry, creating the file if needed.
pub fn append_alerts(path: &Path, header: &str, entries: &[&str]) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut block = String::with_capacity(header.len() + 1);
    block.push_str(header);
    block.push('\n');
    for entry in entries {
        block.push_str(entry);
        block.push('\n');
    }
    file.write_all(block.as_bytes())
}

fn echo<W: Write>(console: &mut W, f: impl FnOnce(&mut W) -> io::Result<()>) {
    if let Err(e) = f(console) {
        error!(error = %e, "failed to print alerts");
    }
}
