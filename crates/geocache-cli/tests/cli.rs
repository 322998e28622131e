//! CLI command integration tests.
//! Each test uses a temp directory via GEOCACHE_DATA_DIR for full isolation.

use std::io::{BufRead, BufReader, Write};
use std::process::Stdio;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn geocache_cmd(data_dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("geocache").unwrap();
    cmd.env("GEOCACHE_DATA_DIR", data_dir.path());
    cmd
}

/// Every tile holds a cache, so the 7x7 visible square is fully populated.
fn dense_world(dir: &TempDir) {
    std::fs::write(
        dir.path().join("config.toml"),
        "seed = 7\nspawn_probability = 1.0\n",
    )
    .unwrap();
}

fn extract_stat_value<'a>(stdout: &'a str, label: &str) -> &'a str {
    stdout
        .lines()
        .find(|l| l.starts_with(label))
        .and_then(|l| l.split_whitespace().last())
        .unwrap_or("")
}

#[test]
fn stats_fresh_db() {
    let dir = TempDir::new().unwrap();
    geocache_cmd(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("caches:     0"))
        .stdout(predicate::str::contains("taken:      0"))
        .stdout(predicate::str::contains("last take:  never"))
        .stdout(predicate::str::contains("carrying:   none"));
}

#[test]
fn play_look_then_quit() {
    let dir = TempDir::new().unwrap();
    dense_world(&dir);
    geocache_cmd(&dir)
        .arg("play")
        .write_stdin("look\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("+ cache 0,0 holds"))
        .stdout(predicate::str::contains("you are at"))
        .stdout(predicate::str::contains("You don't have a token."));
}

#[test]
fn play_reports_bad_commands_and_continues() {
    let dir = TempDir::new().unwrap();
    geocache_cmd(&dir)
        .arg("play")
        .write_stdin("dance\ntake 1\nstatus\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown command 'dance'"))
        .stdout(predicate::str::contains("You don't have a token."));
}

#[test]
fn take_persists_across_runs() {
    let dir = TempDir::new().unwrap();
    dense_world(&dir);

    geocache_cmd(&dir)
        .arg("play")
        .write_stdin("take 0 0\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("took"))
        .stdout(predicate::str::contains("* cache 0,0 holds 0 (taken)"));

    let output = geocache_cmd(&dir).arg("stats").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(extract_stat_value(&stdout, "caches:"), "49");
    assert_eq!(extract_stat_value(&stdout, "taken:"), "1");
    assert_ne!(extract_stat_value(&stdout, "last take:"), "never");

    // Taking again in a later session is refused.
    geocache_cmd(&dir)
        .arg("play")
        .write_stdin("take 0 0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing happens at 0,0"));
}

#[test]
fn killed_session_keeps_taken_token() {
    let dir = TempDir::new().unwrap();
    dense_world(&dir);

    #[allow(deprecated)]
    let bin = assert_cmd::cargo::cargo_bin("geocache");
    let mut child = std::process::Command::new(bin)
        .env("GEOCACHE_DATA_DIR", dir.path())
        .arg("play")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    // stdin stays open, so the session is still running when it is killed
    let mut stdin = child.stdin.take().unwrap();
    writeln!(stdin, "take 0 0").unwrap();
    stdin.flush().unwrap();

    let mut reader = BufReader::new(child.stdout.take().unwrap());
    let mut line = String::new();
    let carried = loop {
        line.clear();
        assert!(reader.read_line(&mut line).unwrap() > 0, "play exited before the take");
        if let Some(rest) = line.strip_prefix("took ") {
            break rest.split_whitespace().next().unwrap().to_string();
        }
    };
    child.kill().unwrap();
    child.wait().unwrap();
    drop(stdin);

    let output = geocache_cmd(&dir).arg("stats").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(extract_stat_value(&stdout, "taken:"), "1");
    assert_eq!(extract_stat_value(&stdout, "carrying:"), carried);
}

#[test]
fn look_lists_visible_caches() {
    let dir = TempDir::new().unwrap();
    dense_world(&dir);
    geocache_cmd(&dir)
        .arg("look")
        .assert()
        .success()
        .stdout(predicate::str::contains("cell 0,0"))
        .stdout(predicate::str::contains("cache -3,-3 holds"))
        .stdout(predicate::str::contains("cache 3,3 holds"))
        .stdout(predicate::str::contains("cache 4,0").not());
}

#[test]
fn export_reset_import_roundtrip() {
    let dir = TempDir::new().unwrap();
    dense_world(&dir);
    let export_path = dir.path().join("export.json");

    geocache_cmd(&dir)
        .arg("play")
        .write_stdin("take 0 0\nquit\n")
        .assert()
        .success();

    geocache_cmd(&dir)
        .arg("export")
        .arg(&export_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("exported to"));

    let json = std::fs::read_to_string(&export_path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["cells"].as_array().unwrap().len(), 49);

    geocache_cmd(&dir)
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("world reset"));

    geocache_cmd(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("caches:     0"))
        .stdout(predicate::str::contains("carrying:   none"));

    geocache_cmd(&dir)
        .arg("import")
        .arg(&export_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("caches=49, taken=1"));
}

#[test]
fn import_rejects_garbage() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "not json").unwrap();
    geocache_cmd(&dir)
        .arg("import")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to import"));
}

#[test]
fn explicit_config_flag_overrides_default_path() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("empty-world.toml");
    std::fs::write(&config, "spawn_probability = 0.0\n").unwrap();
    geocache_cmd(&dir)
        .arg("look")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("no caches in range"));
}
