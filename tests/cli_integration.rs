//! Testes de integração para a CLI `cidade`.

#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cidade_bin() -> Command {
    Command::cargo_bin("cidade").expect("binary is built")
}

fn write_png(dir: &std::path::Path, name: &str) -> String {
    let path = dir.join(name);
    image::RgbImage::new(4, 4).save(&path).expect("write png");
    format!("file://{}", path.display())
}

#[test]
fn test_version_command() {
    cidade_bin()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cidade"));
}

#[test]
fn test_help_command() {
    cidade_bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("preload"));
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("cidade.toml");

    cidade_bin()
        .arg("init")
        .arg("--path")
        .arg(temp_dir.path())
        .assert()
        .success();

    let content = std::fs::read_to_string(&config_path).expect("Failed to read config");
    assert!(content.contains("[general]"));
    assert!(content.contains("[cache]"));
    assert!(content.contains("max_size = 100"));
    assert!(content.contains("[preload]"));
}

#[test]
fn test_init_twice_keeps_existing_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("cidade.toml");

    cidade_bin()
        .arg("init")
        .arg("--path")
        .arg(temp_dir.path())
        .assert()
        .success();

    let customized = std::fs::read_to_string(&config_path)
        .unwrap()
        .replace("max_size = 100", "max_size = 42");
    std::fs::write(&config_path, &customized).unwrap();

    cidade_bin()
        .arg("init")
        .arg("--path")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert_eq!(content, customized);
}

#[test]
fn test_preload_local_files_json() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let good = write_png(temp_dir.path(), "posto.png");
    let missing = format!("file://{}/nao-existe.png", temp_dir.path().display());

    let output = cidade_bin()
        .arg("-q")
        .arg("preload")
        .arg("--json")
        .arg(&good)
        .arg(&missing)
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(value["loaded"], 1);
    assert_eq!(value["failed"], 1);
    assert_eq!(value["stats"]["fetches"], 2);
    assert_eq!(value["cache"]["eviction"], "fifo");
    assert_eq!(value["cache"]["max_age_secs"], 1800);
}

#[test]
fn test_preload_reads_url_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let a = write_png(temp_dir.path(), "a.png");
    let b = write_png(temp_dir.path(), "b.png");
    let list = temp_dir.path().join("urls.txt");
    std::fs::write(&list, format!("# imagens da home\n{}\n\n{}\n", a, b)).unwrap();

    cidade_bin()
        .arg("-q")
        .arg("preload")
        .arg("--file")
        .arg(&list)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 carregadas, 0 falharam"));
}

#[test]
fn test_preload_without_urls_fails() {
    cidade_bin().arg("-q").arg("preload").assert().failure();
}

#[test]
fn test_invalid_command() {
    cidade_bin()
        .arg("invalid-command-that-does-not-exist")
        .assert()
        .failure();
}

#[test]
fn test_verbose_and_quiet_flags() {
    cidade_bin().arg("-v").arg("version").assert().success();
    cidade_bin().arg("-q").arg("version").assert().success();
}

#[test]
fn test_broken_config_falls_back_to_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("custom.toml");
    std::fs::write(&config_path, "[cache]\nmax_size = 0\n").unwrap();

    cidade_bin()
        .arg("--config")
        .arg(&config_path)
        .arg("version")
        .assert()
        .success()
        .stderr(predicate::str::contains("usando padrões"));
}
