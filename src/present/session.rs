//! Interactive console session.
//!
//! The operator types log paths one per line; each is analyzed and
//! summarised until `sair` or `exit`. All state lives in `ConsoleSession`.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use tracing::info;

use super::{render_bars, render_summary, DEFAULT_LIMIT};
use crate::config::Config;
use crate::report::output_path;
use crate::RunResult;

const QUIT_WORDS: [&str; 2] = ["sair", "exit"];

pub struct ConsoleSession {
    pub config: Config,
    /// Log file chosen by the operator.
    pub input: Option<PathBuf>,
    /// Results of the most recent analysis.
    pub last: Option<RunResult>,
}

impl ConsoleSession {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            input: None,
            last: None,
        }
    }

    pub fn select(&mut self, path: impl Into<PathBuf>) {
        self.input = Some(path.into());
    }

    pub fn clear(&mut self) {
        self.last = None;
    }

    /// Analyze the selected file and print its summary.
    pub fn analyze<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let Some(input) = self.input.clone() else {
            writeln!(out, "Selecione um arquivo de log primeiro")?;
            return Ok(());
        };

        self.clear();
        let output = output_path(&self.config.report, &input, Local::now().naive_local());
        let result = crate::run(&input, &output, &self.config, &mut *out)?;

        if result.analysis.metrics.total_accesses == 0 && result.analysis.errors.is_empty() {
            writeln!(out, "Nenhum dado válido para análise.")?;
        } else {
            writeln!(out, "\n{}", render_summary(&result.analysis, DEFAULT_LIMIT))?;
            writeln!(out, "{}", render_bars(&result.analysis))?;
        }
        if let Some(path) = &result.report {
            writeln!(out, "Resultados salvos em: {}", path.display())?;
        }

        self.last = Some(result);
        Ok(())
    }

    /// Read paths from `input` until a quit word or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        writeln!(out, "Modo console ativado (digite 'sair' para encerrar)")?;
        for line in input.lines() {
            let line = line?;
            let path = line.trim();
            if QUIT_WORDS.contains(&path.to_lowercase().as_str()) {
                break;
            }
            if path.is_empty() {
                continue;
            }

            info!(path, "console analysis requested");
            self.select(path);
            self.analyze(&mut *out)?;
            writeln!(out, "{}", "=".repeat(50))?;
        }
        Ok(())
    }
}
