//! Console presentation of analysis results.

pub mod session;

use crate::analysis::AccessClass;
use crate::report::format_metrics;
use crate::Analysis;

/// Entries shown per access class before eliding the rest.
pub const DEFAULT_LIMIT: usize = 10;

const BAR_WIDTH: usize = 40;

/// Human-readable summary: errors per level, access classes, statistics.
///
/// At most `limit` accesses are listed per class.
pub fn render_summary(analysis: &Analysis, limit: usize) -> String {
    let mut out = String::from("=== RESULTADOS DA ANÁLISE ===\n\n");

    out.push_str("ERROS DE SISTEMA:\n");
    for (level, lines) in analysis.errors.iter() {
        out.push_str(&format!("\n{}:\n", level));
        if lines.is_empty() {
            out.push_str("Nenhum erro encontrado.\n");
        }
        for line in lines {
            out.push_str(&format!("- {}\n", line));
        }
    }

    out.push_str("\nCLASSIFICAÇÃO DE ACESSOS:\n");
    for (class, accesses) in analysis.classifications.iter() {
        out.push_str(&format!("\n{} ({}):\n", class, accesses.len()));
        if accesses.is_empty() {
            out.push_str(&format!("Nenhum acesso classificado como {}.\n", class));
        }
        for access in accesses.iter().take(limit) {
            out.push_str(&format!("- {}\n", access.line));
        }
        if accesses.len() > limit {
            out.push_str(&format!("- ... e mais {} acessos\n", accesses.len() - limit));
        }
    }

    out.push_str("\nESTATÍSTICAS:\n");
    out.push_str(&format_metrics(&analysis.metrics));
    out
}

/// Text bar charts of the access classes and error levels.
pub fn render_bars(analysis: &Analysis) -> String {
    let accesses: Vec<(&str, usize)> = AccessClass::ALL
        .iter()
        .map(|c| (c.label(), analysis.classifications.count(*c)))
        .collect();
    let errors: Vec<(&str, usize)> = analysis
        .errors
        .iter()
        .map(|(level, lines)| (level.label(), lines.len()))
        .collect();

    let mut out = String::from("Distribuição de Classificação de Acessos\n");
    out.push_str(&bar_chart(&accesses));
    out.push_str("\nDistribuição de Erros por Nível de Gravidade\n");
    out.push_str(&bar_chart(&errors));
    out
}

fn bar_chart(series: &[(&str, usize)]) -> String {
    let label_width = series
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    let max = series.iter().map(|(_, n)| *n).max().unwrap_or(0);

    let mut out = String::new();
    for (label, n) in series {
        let len = if max == 0 { 0 } else { n * BAR_WIDTH / max };
        let pad = label_width - label.chars().count();
        out.push_str(&format!(
            "{}{} | {} {}\n",
            label,
            " ".repeat(pad),
            "#".repeat(len),
            n
        ));
    }
    out
}
