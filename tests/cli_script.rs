use std::path::Path;

use assert_cmd::Command;
use mockito::{Matcher, Server};
use predicates::str::contains;
use serde_json::{json, Value};
use tempfile::TempDir;

fn cli(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("intake_wizard_cli").unwrap();
    cmd.env("INTAKE_WIZARD_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("INTAKE_AUTH_TOKEN")
        .env_remove("INTAKE_WIZARD_INPUTS")
        .env_remove("INTAKE_API_URL");
    cmd
}

fn session_json(id: i64, step: u32) -> Value {
    json!({
        "id": id,
        "district": 1,
        "current_step": step,
        "status": "in_progress",
        "assets": [],
        "debts": []
    })
}

fn stored_state(home: &Path) -> Value {
    let raw = std::fs::read_to_string(home.join("state.json")).unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[test]
fn version_prints_build_summary() {
    let home = TempDir::new().unwrap();
    cli(home.path())
        .arg("version")
        .assert()
        .success()
        .stdout(contains("Intake Wizard"));
}

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();
    cli(home.path())
        .arg("help")
        .assert()
        .success()
        .stdout(contains("Usage: intake_wizard_cli"))
        .stdout(contains("reset"));
}

#[test]
fn unknown_command_fails() {
    let home = TempDir::new().unwrap();
    cli(home.path())
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(contains("unknown command"));
}

#[test]
fn scripted_run_creates_session_and_shows_validation() {
    let home = TempDir::new().unwrap();
    let mut server = Server::new();
    let create = server
        .mock("POST", "/api/intake/sessions/")
        .match_body(Matcher::Json(json!({ "district": 1, "current_step": 1 })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(json!({ "session": session_json(41, 1), "message": "created" }).to_string())
        .create();

    cli(home.path())
        .env("INTAKE_API_URL", format!("{}/api", server.url()))
        .env("INTAKE_WIZARD_INPUTS", "Continue|Save and exit")
        .assert()
        .success()
        .stdout(contains("Step 1 of 6: Your Information"))
        .stdout(contains("Last name: Please enter your last name"))
        .stdout(contains("Your progress is saved."));

    create.assert();
    assert_eq!(stored_state(home.path())["current_session_id"], json!(41));
}

#[test]
fn scripted_run_resumes_stored_session_with_token() {
    let home = TempDir::new().unwrap();
    let mut server = Server::new();
    let fetch = server
        .mock("GET", "/api/intake/sessions/7/")
        .match_header("authorization", "Token abc123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(session_json(7, 2).to_string())
        .create();

    std::fs::write(
        home.path().join("state.json"),
        json!({ "current_session_id": 7, "auth_token": "abc123" }).to_string(),
    )
    .unwrap();

    cli(home.path())
        .env("INTAKE_API_URL", format!("{}/api", server.url()))
        .env("INTAKE_WIZARD_INPUTS", "Save and exit")
        .assert()
        .success()
        .stdout(contains("Step 2 of 6: Income"));

    fetch.assert();
}

#[test]
fn failed_start_reports_friendly_error() {
    let home = TempDir::new().unwrap();
    let mut server = Server::new();
    server
        .mock("POST", "/api/intake/sessions/")
        .with_status(500)
        .with_body("Internal Server Error")
        .create();

    cli(home.path())
        .env("INTAKE_API_URL", format!("{}/api", server.url()))
        .env("INTAKE_WIZARD_INPUTS", "Save and exit")
        .assert()
        .failure()
        .stdout(contains("Unable to start your intake session. Please try again."));
}

#[test]
fn login_and_reset_update_stored_state() {
    let home = TempDir::new().unwrap();
    cli(home.path())
        .args(["login", "secret-token"])
        .assert()
        .success()
        .stdout(contains("Token saved."));
    assert_eq!(stored_state(home.path())["auth_token"], json!("secret-token"));

    std::fs::write(
        home.path().join("state.json"),
        json!({ "current_session_id": 9, "auth_token": "secret-token" }).to_string(),
    )
    .unwrap();
    cli(home.path()).arg("reset").assert().success();

    let state = stored_state(home.path());
    assert!(state.get("current_session_id").is_none());
    assert_eq!(state["auth_token"], json!("secret-token"));

    cli(home.path()).arg("logout").assert().success();
    assert!(stored_state(home.path()).get("auth_token").is_none());
}

#[test]
fn config_command_shows_environment_override() {
    let home = TempDir::new().unwrap();
    cli(home.path())
        .env("INTAKE_API_URL", "https://intake.example.test/api")
        .arg("config")
        .assert()
        .success()
        .stdout(contains("API: https://intake.example.test/api"))
        .stdout(contains("District: 1"));
}
