//! Results file: system errors, access classes and metrics.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::info;

use crate::analysis::{ClassificationBuckets, Metrics};
use crate::config::ReportConfig;
use crate::detect::SeverityBuckets;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Render the full report text.
pub fn render_report(
    errors: &SeverityBuckets,
    classifications: &ClassificationBuckets,
    metrics: &Metrics,
) -> String {
    let mut out = String::from("=== RELATÓRIO COMPLETO DE ANÁLISE ===\n\n");

    out.push_str("=== ERROS DE SISTEMA ===\n");
    for (level, lines) in errors.iter() {
        out.push_str(&format!("\n--- {} ---\n", level.label()));
        for line in lines {
            out.push_str(line);
            out.push('\n');
        }
    }

    out.push_str("\n=== CLASSIFICAÇÃO DE ACESSOS ===\n");
    for (class, accesses) in classifications.iter() {
        out.push_str(&format!("\n--- {} ---\n", class.label()));
        for access in accesses {
            out.push_str(&access.line);
            out.push('\n');
        }
    }

    out.push_str("\n=== MÉTRICAS ESTATÍSTICAS ===\n");
    out.push_str(&format_metrics(metrics));
    out
}

/// Metric lines shared by the report and the console summary.
pub fn format_metrics(metrics: &Metrics) -> String {
    format!(
        "\nTotal de acessos: {}\n\
         Acessos normais: {} ({:.1}%)\n\
         Acessos suspeitos: {} ({:.1}%)\n\
         Acessos críticos: {} ({:.1}%)\n",
        metrics.total_accesses,
        metrics.normal,
        metrics.percent_normal,
        metrics.suspicious,
        metrics.percent_suspicious,
        metrics.critical,
        metrics.percent_critical,
    )
}

/// Overwrite `path` with the rendered report.
pub fn write_report(
    path: &Path,
    errors: &SeverityBuckets,
    classifications: &ClassificationBuckets,
    metrics: &Metrics,
) -> Result<(), ReportError> {
    std::fs::write(path, render_report(errors, classifications, metrics)).map_err(|source| {
        ReportError::Write {
            path: path.to_path_buf(),
            source,
        }
    })?;
    info!(path = %path.display(), "report written");
    Ok(())
}

/// `analise_completa_YYYYmmdd_HHMMSS.log` in the directory of `input`.
pub fn timestamped_path(input: &Path, at: NaiveDateTime) -> PathBuf {
    let name = format!("analise_completa_{}.log", at.format("%Y%m%d_%H%M%S"));
    match input.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Report destination for `input` under the report settings.
pub fn output_path(cfg: &ReportConfig, input: &Path, now: NaiveDateTime) -> PathBuf {
    if cfg.timestamped {
        timestamped_path(input, now)
    } else {
        cfg.output.clone()
    }
}
