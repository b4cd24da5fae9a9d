//! The admin binary's handling of its configuration file.

mod common;

use std::process::Command;

use common::quest_file;
use tempfile::TempDir;

fn mudquest() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mudquest"))
}

#[test]
fn broken_config_is_reported_not_ignored() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("mudquest.toml");
    std::fs::write(&config, "[quests]\ndefinitions = [not toml").unwrap();

    let out = mudquest()
        .arg("-c")
        .arg(&config)
        .arg("validate")
        .arg("--file")
        .arg(quest_file())
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Failed to parse config file"), "{}", stderr);
}

#[test]
fn absent_config_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let out = mudquest()
        .arg("-c")
        .arg(dir.path().join("absent.toml"))
        .arg("validate")
        .arg("--file")
        .arg(quest_file())
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stdout).contains("7 quests OK"));
}
