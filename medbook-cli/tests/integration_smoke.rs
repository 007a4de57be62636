//! Smoke tests to verify command wiring

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn medbook() -> Command {
    let mut cmd = Command::cargo_bin("medbook").unwrap();
    cmd.env_remove("DATABASE_URL").env_remove("MEDBOOK_CONFIG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    medbook()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("migrate"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_serve_help() {
    medbook()
        .arg("serve")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--skip-migrations"))
        .stdout(predicate::str::contains("--bind"));
}

#[test]
fn test_config_show_reads_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[database]
url = "postgres://clinic@db/medbook"

[services.booking]
context_timeout_secs = 3
"#
    )
    .unwrap();

    medbook()
        .arg("--config")
        .arg(file.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("postgres://clinic@db/medbook"))
        .stdout(predicate::str::contains("context_timeout_secs = 3"));
}

#[test]
fn test_database_url_flag_overrides_file() {
    medbook()
        .arg("--database-url")
        .arg("postgres://override/medbook")
        .arg("config")
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("postgres://override/medbook"));
}

#[test]
fn test_config_show_hides_password() {
    medbook()
        .arg("--database-url")
        .arg("postgres://clinic:s3cret@db:5432/medbook")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("postgres://clinic:****@db:5432/medbook"))
        .stdout(predicate::str::contains("s3cret").not());
}

#[test]
fn test_invalid_config_fails() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[services.user]\ncontext_timeout_secs = 0").unwrap();

    medbook()
        .arg("--config")
        .arg(file.path())
        .arg("config")
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("context_timeout_secs"));
}

#[test]
fn test_missing_explicit_config_fails() {
    medbook()
        .arg("--config")
        .arg("/nonexistent/medbook.toml")
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}
