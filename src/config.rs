//! TOML configuration for portaria.
//!
//! Layered: an explicit path, then the `PORTARIA_CONFIG` environment
//! variable, then `./portaria.toml`, then compiled-in defaults. Every
//! section falls back to its defaults when omitted.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analysis::{FeatureVariant, ForestParams};

pub const CONFIG_ENV: &str = "PORTARIA_CONFIG";
pub const LOCAL_CONFIG: &str = "portaria.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub alerts: AlertConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        config
            .analysis
            .forest_params()
            .validate()
            .with_context(|| format!("invalid [analysis] section in {}", path.display()))?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Resolve the configuration.
    ///
    /// An explicit path must load; the other layers fall through on error.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let path = Path::new(&env_path);
            match Self::load(path) {
                Ok(cfg) => return Ok(cfg),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "PORTARIA_CONFIG set but file could not be loaded, trying fallback"
                    );
                }
            }
        }

        let local = Path::new(LOCAL_CONFIG);
        if local.exists() {
            match Self::load(local) {
                Ok(cfg) => return Ok(cfg),
                Err(e) => {
                    warn!(
                        path = %local.display(),
                        error = %e,
                        "local config file exists but could not be loaded, using defaults"
                    );
                }
            }
        }

        debug!("no config file found, using compiled-in defaults");
        Ok(Self::default())
    }
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Feature layout and isolation forest parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub variant: FeatureVariant,
    /// Expected share of outliers in each batch.
    pub contamination: f64,
    pub seed: u64,
    pub trees: usize,
    pub max_samples: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let forest = ForestParams::default();
        Self {
            variant: FeatureVariant::Extended,
            contamination: forest.contamination,
            seed: forest.seed,
            trees: forest.trees,
            max_samples: forest.max_samples,
        }
    }
}

impl AnalysisConfig {
    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            trees: self.trees,
            max_samples: self.max_samples,
            contamination: self.contamination,
            seed: self.seed,
        }
    }
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub enabled: bool,
    /// Append-only log of critical accesses.
    pub access_log: PathBuf,
    /// Append-only log of level-3 system failures.
    pub failure_log: PathBuf,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            access_log: PathBuf::from("alertas_criticos.log"),
            failure_log: PathBuf::from("alertas_falhas_criticas.log"),
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output: PathBuf,
    /// Write `analise_completa_<timestamp>.log` next to the input instead.
    pub timestamped: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("resultados_classificados_ia.log"),
            timestamped: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.analysis.variant, FeatureVariant::Extended);
        assert_eq!(cfg.analysis.contamination, 0.1);
        assert_eq!(cfg.analysis.seed, 42);
        assert_eq!(cfg.analysis.trees, 100);
        assert_eq!(cfg.analysis.max_samples, 256);
        assert!(cfg.alerts.enabled);
        assert_eq!(cfg.alerts.access_log, PathBuf::from("alertas_criticos.log"));
        assert_eq!(
            cfg.alerts.failure_log,
            PathBuf::from("alertas_falhas_criticas.log")
        );
        assert_eq!(
            cfg.report.output,
            PathBuf::from("resultados_classificados_ia.log")
        );
        assert!(!cfg.report.timestamped);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[analysis]
variant = "baseline"
contamination = 0.2
seed = 7
trees = 50
max_samples = 128

[alerts]
enabled = false
access_log = "/var/log/portaria/acessos.log"
failure_log = "/var/log/portaria/falhas.log"

[report]
output = "saida.log"
timestamped = true

[logging]
level = "debug"
"#;
        let cfg: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.analysis.variant, FeatureVariant::Baseline);
        assert_eq!(cfg.analysis.contamination, 0.2);
        assert_eq!(cfg.analysis.forest_params().seed, 7);
        assert_eq!(cfg.analysis.forest_params().trees, 50);
        assert_eq!(cfg.analysis.forest_params().max_samples, 128);
        assert!(!cfg.alerts.enabled);
        assert_eq!(
            cfg.alerts.failure_log,
            PathBuf::from("/var/log/portaria/falhas.log")
        );
        assert_eq!(cfg.report.output, PathBuf::from("saida.log"));
        assert!(cfg.report.timestamped);
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let cfg: Config = toml::from_str("[analysis]\nseed = 1\n").unwrap();
        assert_eq!(cfg.analysis.seed, 1);
        assert_eq!(cfg.analysis.contamination, 0.1);
        assert!(cfg.alerts.enabled);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("portaria.toml");
        std::fs::write(&path, "[report]\noutput = \"relatorio.log\"\n").unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.report.output, PathBuf::from("relatorio.log"));

        let resolved = Config::resolve(Some(&path)).unwrap();
        assert_eq!(resolved.report.output, PathBuf::from("relatorio.log"));
    }

    #[test]
    fn test_load_rejects_bad_contamination() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("portaria.toml");
        std::fs::write(&path, "[analysis]\ncontamination = 0.9\n").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_explicit_missing_file_errors() {
        let result = Config::resolve(Some(Path::new("/nonexistent/portaria.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(back.analysis.seed, cfg.analysis.seed);
        assert_eq!(back.alerts.access_log, cfg.alerts.access_log);
        assert_eq!(back.report.output, cfg.report.output);
    }
}
