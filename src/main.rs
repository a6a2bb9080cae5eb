use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};

use portaria::analysis::FeatureVariant;
use portaria::config::Config;
use portaria::present::session::ConsoleSession;
use portaria::present::{render_bars, render_summary, DEFAULT_LIMIT};

#[derive(Parser)]
#[command(
    name = "portaria",
    about = "Condominium gate access-log analyzer",
    version,
    long_about = None
)]
struct Cli {
    /// Configuration file (overrides PORTARIA_CONFIG and ./portaria.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis on a gate log
    Analyze {
        /// Log file to analyze
        input: PathBuf,

        /// Report destination (default from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Use the baseline feature layout (hour, weekday)
        #[arg(long)]
        baseline: bool,

        /// Do not print or append alerts
        #[arg(long)]
        no_alerts: bool,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Classify system errors by severity only
    Errors {
        /// Log file to scan
        input: PathBuf,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Interactive session: type log paths, `sair` to quit
    Console,

    /// Evaluate an arithmetic expression or equation from recognized text
    Calc {
        /// Recognized text
        text: String,
    },

    /// Print the effective configuration
    Config,
}

/// Stderr subscriber filtered by `RUST_LOG`, else `level`.
fn subscriber(level: &str, json: bool) -> Box<dyn tracing::Subscriber + Send + Sync> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        Box::new(builder.json().finish())
    } else {
        Box::new(builder.finish())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    // The configured level is unknown until the config loads, so resolving
    // logs at the default level.
    let mut config = tracing::subscriber::with_default(subscriber("info", cli.log_json), || {
        Config::resolve(cli.config.as_deref())
    })?;
    tracing::subscriber::set_global_default(subscriber(&config.logging.level, cli.log_json))?;

    match cli.command {
        Commands::Analyze {
            input,
            output,
            baseline,
            no_alerts,
            json,
        } => {
            if baseline {
                config.analysis.variant = FeatureVariant::Baseline;
            }
            if no_alerts {
                config.alerts.enabled = false;
            }
            let output = output.unwrap_or_else(|| {
                portaria::report::output_path(&config.report, &input, Local::now().naive_local())
            });
            tracing::info!(input = %input.display(), variant = ?config.analysis.variant, "Running analysis");

            let stdout = std::io::stdout();
            let result = if json {
                // alerts still go to their files; keep stdout pure JSON
                portaria::run(&input, &output, &config, &mut std::io::sink())?
            } else {
                portaria::run(&input, &output, &config, &mut stdout.lock())?
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("\n{}", render_summary(&result.analysis, DEFAULT_LIMIT));
                println!("{}", render_bars(&result.analysis));
                match &result.report {
                    Some(path) => println!("Resultados salvos em: {}", path.display()),
                    None => println!("Relatório não pôde ser salvo."),
                }
            }
        }
        Commands::Errors { input, json } => {
            tracing::info!(input = %input.display(), "Classifying system errors");
            let lines = portaria::ingest::read_lines(&input);
            let errors = portaria::detect::errors::classify_errors(&lines);

            if json {
                println!("{}", serde_json::to_string_pretty(&errors)?);
            } else {
                println!("\n=== ERROS DE SISTEMA ===");
                for (level, entries) in errors.iter() {
                    println!("\n{} ({}):", level, entries.len());
                    for entry in entries {
                        println!(" - {}", entry);
                    }
                }
                println!();
            }
        }
        Commands::Console => {
            let mut session = ConsoleSession::new(config);
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            session.run(stdin.lock(), &mut stdout.lock())?;
        }
        Commands::Calc { text } => {
            println!("{}", portaria::expr::evaluate_recognized(&text));
        }
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
