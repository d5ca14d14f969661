//! End-to-end CLI integration tests.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn blockpool() -> Command {
    let mut cmd = Command::cargo_bin("blockpool").expect("binary not found");
    cmd.env_remove("BLOCKPOOL_BLOCK_SIZE")
        .env_remove("BLOCKPOOL_GROWTH")
        .env_remove("BLOCKPOOL_THREADS");
    cmd
}

#[test]
fn help_flag() {
    blockpool()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--growth"));
}

#[test]
fn version_flag() {
    blockpool()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("blockpool"));
}

#[test]
fn small_run_prints_text_report() {
    blockpool()
        .args(["-t", "2", "-n", "200", "--block-size", "24"])
        .assert()
        .success()
        .stdout(predicate::str::contains("block size 32 B"))
        .stdout(predicate::str::contains("Invariants: ok"));
}

#[test]
fn json_report_balances_blocks() {
    let output = blockpool()
        .args(["-t", "4", "-n", "1000", "-g", "16", "--hold", "3", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["stats"]["available"], report["stats"]["total"]);
    assert_eq!(report["stats"]["in_use"], 0);
    assert_eq!(report["verified"], true);
    assert_eq!(report["teardown"]["chunks_released"], report["stats"]["chunks"]);
}

#[test]
fn env_configures_block_size() {
    let output = blockpool()
        .env("BLOCKPOOL_BLOCK_SIZE", "100")
        .args(["-t", "1", "-n", "10", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["stats"]["block_size"], 112);
}

#[test]
fn exhausted_budget_exits_with_out_of_memory() {
    blockpool()
        .args(["-t", "1", "-n", "5", "-g", "1", "--hold", "4", "--max-blocks", "2", "-q"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("out of memory"));
}

#[test]
fn bad_options_file_exits_with_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();
    blockpool()
        .args(["--options", file.path().to_str().unwrap(), "-n", "1", "-q"])
        .assert()
        .code(4);
}

#[test]
fn zero_threads_exits_with_config_error() {
    blockpool().args(["-t", "0"]).assert().code(4);
}

#[test]
fn poisoned_zeroed_run_succeeds() {
    blockpool()
        .args(["-t", "2", "-n", "500", "--poison", "--zeroed", "-q"])
        .assert()
        .success();
}
