use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn cli() -> Command {
    let mut cmd = Command::new(cargo_bin!("e2c-gateway"));
    cmd.env_remove("E2C_TERMINAL_KEY")
        .env_remove("E2C_BASE_URL")
        .env_remove("CRYPTOPRO_BIN_DIR")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_check_types_prints_catalogue() {
    cli()
        .arg("check-types")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"code\": \"3DSHOLD\""))
        .stdout(predicate::str::contains("\"code\": \"NO\""));
}

#[test]
fn test_gateway_command_requires_terminal_key() {
    cli()
        .args(["create-client", "--client-id", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Terminal key must be defined"));
}

#[test]
fn test_missing_toolkit_fails() {
    let bin = tempfile::tempdir().unwrap();
    cli()
        .arg("containers")
        .arg("--bin-dir")
        .arg(bin.path())
        .assert()
        .failure();
}

#[test]
fn test_create_payment_rejects_non_positive_amount() {
    cli()
        .args([
            "--terminal-key",
            "0000000000000E2C",
            "create-payment",
            "--order-id",
            "1",
            "--card-id",
            "1",
            "--amount",
            "0",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Amount must be positive"));
}
