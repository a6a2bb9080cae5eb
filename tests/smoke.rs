//! Smoke tests -- verify the binary runs and each subcommand is wired.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn portaria(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("portaria").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("PORTARIA_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn write_log(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("portaria.log");
    std::fs::write(
        &path,
        "[15/03/2024 23:10] ENTRADA MORADOR \"João\"\n\
         [15/03/2024 14:00] SAÍDA VISITANTE \"Maria\"\n\
         ERRO DE SISTEMA - Nível: 3 - Câmera do portão offline\n",
    )
    .unwrap();
    path
}

#[test]
fn test_cli_help() {
    Command::cargo_bin("portaria")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Condominium gate access-log analyzer"));
}

#[test]
fn test_cli_version() {
    Command::cargo_bin("portaria")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("portaria"));
}

#[test]
fn test_subcommands_exist() {
    for sub in ["analyze", "errors", "console", "calc", "config"] {
        Command::cargo_bin("portaria")
            .unwrap()
            .args([sub, "--help"])
            .assert()
            .success();
    }
}

#[test]
fn test_analyze_prints_summary_and_writes_files() {
    let dir = TempDir::new().unwrap();
    let log = write_log(&dir);

    portaria(&dir)
        .arg("analyze")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("=== ALERTA: ACESSOS CRÍTICOS DETECTADOS ==="))
        .stdout(predicate::str::contains("ALERTA: [15/03/2024 23:10] ENTRADA MORADOR"))
        .stdout(predicate::str::contains("=== RESULTADOS DA ANÁLISE ==="))
        .stdout(predicate::str::contains("Acessos críticos: 1 (50.0%)"));

    let report = std::fs::read_to_string(dir.path().join("resultados_classificados_ia.log")).unwrap();
    assert!(report.starts_with("=== RELATÓRIO COMPLETO DE ANÁLISE ==="));
    assert!(dir.path().join("alertas_criticos.log").exists());
    assert!(dir.path().join("alertas_falhas_criticas.log").exists());
}

#[test]
fn test_analyze_json_without_alerts() {
    let dir = TempDir::new().unwrap();
    let log = write_log(&dir);
    let out = dir.path().join("saida.log");

    let assert = portaria(&dir)
        .arg("analyze")
        .arg(&log)
        .arg("--output")
        .arg(&out)
        .args(["--no-alerts", "--json"])
        .assert()
        .success();

    let value: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(value["metrics"]["total_accesses"], 2);
    assert_eq!(value["errors"]["Nível 3 (Crítico)"].as_array().unwrap().len(), 1);
    assert!(value["alerts"].is_null());
    assert!(out.exists());
    assert!(!dir.path().join("alertas_criticos.log").exists());
}

#[test]
fn test_analyze_missing_input_still_succeeds() {
    let dir = TempDir::new().unwrap();
    portaria(&dir)
        .args(["analyze", "nao_existe.log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total de acessos: 0"))
        .stdout(predicate::str::contains("Nenhum acesso crítico detectado."));
}

#[test]
fn test_errors_subcommand() {
    let dir = TempDir::new().unwrap();
    let log = write_log(&dir);
    portaria(&dir)
        .arg("errors")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("Nível 3 (Crítico) (1):"))
        .stdout(predicate::str::contains("Câmera do portão offline"));
}

#[test]
fn test_calc_subcommand() {
    let dir = TempDir::new().unwrap();
    portaria(&dir)
        .args(["calc", "3 + 4 = 7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Resultado: 3+4 = 7 → True"));
}

#[test]
fn test_console_reads_until_quit() {
    let dir = TempDir::new().unwrap();
    let log = write_log(&dir);
    portaria(&dir)
        .arg("console")
        .write_stdin(format!("{}\nsair\n", log.display()))
        .assert()
        .success()
        .stdout(predicate::str::contains("Modo console ativado"))
        .stdout(predicate::str::contains("Críticos (1):"));
}

#[test]
fn test_config_uses_explicit_file() {
    let dir = TempDir::new().unwrap();
    let cfg = dir.path().join("custom.toml");
    std::fs::write(&cfg, "[analysis]\nseed = 7\ncontamination = 0.2\n").unwrap();

    portaria(&dir)
        .arg("--config")
        .arg(&cfg)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("seed = 7"))
        .stdout(predicate::str::contains("access_log = \"alertas_criticos.log\""));
}

#[test]
fn test_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let cfg = dir.path().join("bad.toml");
    std::fs::write(&cfg, "[analysis]\ncontamination = 0.9\n").unwrap();

    portaria(&dir)
        .arg("--config")
        .arg(&cfg)
        .arg("config")
        .assert()
        .failure();
}

#[test]
fn test_broken_env_config_is_reported() {
    let dir = TempDir::new().unwrap();
    let cfg = dir.path().join("quebrado.toml");
    std::fs::write(&cfg, "not [valid toml").unwrap();

    portaria(&dir)
        .env("PORTARIA_CONFIG", &cfg)
        .arg("config")
        .assert()
        .success()
        .stderr(predicate::str::contains("could not be loaded"))
        .stdout(predicate::str::contains("seed = 42"));
}

#[test]
fn test_broken_local_config_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("portaria.toml"), "[analysis\nseed = 7\n").unwrap();

    portaria(&dir)
        .arg("config")
        .assert()
        .success()
        .stderr(predicate::str::contains("could not be loaded"))
        .stdout(predicate::str::contains("seed = 42"));
}
