//! End-to-end tests for the `lifttrack` binary.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn lifttrack_cmd(db_path: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_lifttrack"));
    cmd.env_remove("LIFTTRACK_DATABASE_URL")
        .env_remove("LIFTTRACK_BUSY_TIMEOUT_MS")
        .env_remove("LIFTTRACK_POOL_SIZE")
        .env_remove("LIFTTRACK_LOG_DIR")
        .env("LIFTTRACK_LOG_LEVEL", "warn")
        .arg("--database-url")
        .arg(format!("sqlite:///{}", db_path.display()));
    cmd
}

#[test]
fn seed_with_dataset_file_reports_count() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("lifttrack.db");
    let data_path = dir.path().join("exercises.json");
    fs::write(
        &data_path,
        r#"[
            {"name": "Bench Press", "category": "Chest"},
            {"name": "Squat", "category": "Legs", "mechanics": "Compound"}
        ]"#,
    )
    .unwrap();

    lifttrack_cmd(&db_path)
        .arg("seed")
        .arg("--data")
        .arg(&data_path)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Successfully seeded 2 exercises"));
}

#[test]
fn seed_with_malformed_record_names_the_record() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("lifttrack.db");
    let data_path = dir.path().join("exercises.json");
    fs::write(
        &data_path,
        r#"[{"name": "Squat", "category": "Legs"}, {"name": "Lunge"}]"#,
    )
    .unwrap();

    lifttrack_cmd(&db_path)
        .arg("seed")
        .arg("--data")
        .arg(&data_path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("dataset record 1"))
        .stderr(predicate::str::contains("`category` is required"));
}

#[test]
fn seed_without_data_loads_bundled_catalog() {
    let dir = tempdir().unwrap();

    lifttrack_cmd(&dir.path().join("lifttrack.db"))
        .arg("seed")
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully seeded 24 exercises"));
}

#[test]
fn init_is_idempotent_across_runs() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("lifttrack.db");

    for _ in 0..2 {
        lifttrack_cmd(&db_path)
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("schema ready"));
    }

    lifttrack_cmd(&db_path).arg("seed").assert().success();
}

#[test]
fn unreachable_database_fails() {
    let dir = tempdir().unwrap();

    lifttrack_cmd(&dir.path().join("missing").join("lifttrack.db"))
        .arg("init")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unreachable"));
}
