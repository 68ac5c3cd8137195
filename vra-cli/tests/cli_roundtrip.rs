use std::path::Path;
use std::process::{Command, Stdio};

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn vra_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vra"));
    cmd.arg("--home").arg(home).env("NO_COLOR", "1");
    cmd
}

fn register(home: &Path, vin: &str) -> String {
    let output = vra_cmd(home)
        .args(["register", "--vin", vin, "--make", "Mahindra", "--model", "Bolero"])
        .args(["--year", "2015"])
        .output()
        .expect("run vra register");
    assert!(
        output.status.success(),
        "command failed: status={} stderr={}",
        output.status,
        String::from_utf8_lossy(&output.stderr),
    );
    let stdout = String::from_utf8(output.stdout).unwrap();
    stdout
        .lines()
        .find_map(|line| line.trim().strip_prefix("id: "))
        .map(str::to_owned)
        .unwrap_or_else(|| panic!("no id line in output:\n{stdout}"))
}

#[test]
fn register_transfer_and_show_roundtrip() {
    let home = TempDir::new().unwrap();
    let id = register(home.path(), "1A2B3C4D5E6F7G8H9I");

    for (name, email) in [("John Doe", "john.doe@email.com"), ("Jack man", "jack.man.one@email.com")] {
        vra_cmd(home.path())
            .args(["transfer", &id, "--name", name, "--email", email])
            .assert()
            .success()
            .stdout(contains("Transferred"));
    }

    let output = vra_cmd(home.path())
        .args(["show", &id, "--json"])
        .output()
        .expect("run vra show");
    assert!(output.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(doc["_id"], serde_json::json!(id));
    assert_eq!(doc["vin"], "1A2B3C4D5E6F7G8H9I");
    let owners = doc["owners"].as_array().expect("owners array");
    assert_eq!(owners.len(), 2);
    assert_eq!(owners[0]["name"], "John Doe");
    assert_eq!(owners[1]["name"], "Jack man");

    vra_cmd(home.path())
        .args(["show", &id])
        .assert()
        .success()
        .stdout(contains("Mahindra Bolero (2015)"))
        .stdout(contains("Jack man"));
}

#[test]
fn update_keeps_history_and_changes_make() {
    let home = TempDir::new().unwrap();
    let id = register(home.path(), "123456789ABCDEFGHI");
    vra_cmd(home.path())
        .args(["transfer", &id, "--name", "John Doe"])
        .assert()
        .success();

    vra_cmd(home.path())
        .args(["update", &id, "--make", "Suzuki"])
        .assert()
        .success()
        .stdout(contains("Updated"));

    let output = vra_cmd(home.path()).args(["show", &id, "--json"]).output().unwrap();
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(doc["make"], "Suzuki");
    assert_eq!(doc["model"], "Bolero");
    assert_eq!(doc["owners"].as_array().map(Vec::len), Some(1));
}

#[test]
fn missing_record_fails_with_not_found() {
    let home = TempDir::new().unwrap();
    let ghost = "0190a5f2c3b47d2e9a1b2c3d4e5f6a7b";

    vra_cmd(home.path())
        .args(["transfer", ghost, "--name", "John Doe"])
        .assert()
        .failure()
        .stderr(contains("no record matches identifier"));

    vra_cmd(home.path())
        .args(["update", ghost, "--vin", "V", "--make", "M", "--model", "X", "--year", "2015"])
        .assert()
        .failure()
        .stderr(contains("no record matches identifier"));

    vra_cmd(home.path())
        .args(["show", ghost])
        .assert()
        .failure();
}

#[test]
fn invalid_input_is_rejected_before_storage() {
    let home = TempDir::new().unwrap();

    vra_cmd(home.path())
        .args(["register", "--vin", "", "--make", "Mahindra", "--model", "Bolero", "--year", "2015"])
        .assert()
        .failure()
        .stderr(contains("invalid input"));

    vra_cmd(home.path())
        .args(["transfer", "../escape", "--name", "John Doe"])
        .assert()
        .failure();

    let collection = home.path().join(".vra/collections/vehicles");
    let records = std::fs::read_dir(&collection)
        .map(|dir| {
            dir.filter_map(Result::ok)
                .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "yaml"))
                .count()
        })
        .unwrap_or(0);
    assert_eq!(records, 0, "nothing may be written for rejected input");
}

#[test]
fn concurrent_transfer_processes_are_all_recorded() {
    const N: usize = 8;
    let home = TempDir::new().unwrap();
    let id = register(home.path(), "1A2B3C4D5E6F7G8H9I");

    let children: Vec<_> = (0..N)
        .map(|i| {
            vra_cmd(home.path())
                .args(["transfer", &id, "--name", &format!("Owner {i}")])
                .stdout(Stdio::null())
                .stderr(Stdio::piped())
                .spawn()
                .expect("spawn vra transfer")
        })
        .collect();
    for child in children {
        let output = child.wait_with_output().expect("wait vra transfer");
        assert!(
            output.status.success(),
            "transfer failed: {}",
            String::from_utf8_lossy(&output.stderr),
        );
    }

    let output = vra_cmd(home.path()).args(["show", &id, "--json"]).output().unwrap();
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let owners = doc["owners"].as_array().expect("owners array");
    assert_eq!(owners.len(), N, "every concurrent transfer must be kept");
}
