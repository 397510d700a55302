use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const GA_ID: &str = "20240101120000-abcdefg";

fn ga(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ga").unwrap();
    cmd.arg("--data").arg(dir.path()).env_remove("RUST_LOG");
    cmd
}

fn create_status(dir: &TempDir) {
    ga(dir)
        .args(["create", "Status", "--type", "select", "--id", GA_ID])
        .args(["-o", "Todo", "-o", "Done:5", "--custom"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created global attribute"))
        .stdout(predicate::str::contains(GA_ID));
}

#[test]
fn test_create_then_list() {
    let dir = TempDir::new().unwrap();
    create_status(&dir);

    assert!(dir
        .path()
        .join("storage")
        .join("ga")
        .join(format!("{}.json", GA_ID))
        .exists());

    ga(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Status"))
        .stdout(predicate::str::contains("memo"));
}

#[test]
fn test_naked_invocation_lists() {
    let dir = TempDir::new().unwrap();
    create_status(&dir);

    ga(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains(GA_ID));
}

#[test]
fn test_list_json() {
    let dir = TempDir::new().unwrap();
    create_status(&dir);

    let output = ga(&dir).args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());
    let metas: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let status = metas
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["gaId"] == GA_ID)
        .unwrap();
    assert_eq!(status["type"], "select");
    assert_eq!(status["isCustomAttr"], true);
    assert_eq!(status["options"][1]["color"], "5");
}

#[test]
fn test_show_and_delete() {
    let dir = TempDir::new().unwrap();
    create_status(&dir);

    ga(&dir)
        .args(["show", GA_ID])
        .assert()
        .success()
        .stdout(predicate::str::contains("type: select"))
        .stdout(predicate::str::contains("options: Todo, Done"))
        .stdout(predicate::str::contains("no bound blocks"));

    ga(&dir)
        .args(["delete", GA_ID])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted global attribute"));

    ga(&dir)
        .args(["show", GA_ID])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("Error:"));
}

#[test]
fn test_duplicate_custom_name_is_refused() {
    let dir = TempDir::new().unwrap();
    create_status(&dir);

    ga(&dir)
        .args(["create", "Status", "--custom"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(GA_ID));
}

#[test]
fn test_unknown_type_fails() {
    let dir = TempDir::new().unwrap();

    ga(&dir)
        .args(["create", "Odd", "--type", "hologram"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported key type"));
}

#[test]
fn test_builtins_cannot_be_deleted() {
    let dir = TempDir::new().unwrap();

    ga(&dir).args(["delete", "memo"]).assert().failure();
}

#[test]
fn test_config_reads_data_dir_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("globalattr.toml"), "single_line_save = true\n").unwrap();
    create_status(&dir);

    ga(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("single_line_save = true"));

    let raw = fs::read_to_string(
        dir.path()
            .join("storage")
            .join("ga")
            .join(format!("{}.json", GA_ID)),
    )
    .unwrap();
    assert!(!raw.contains('\n'));
}
