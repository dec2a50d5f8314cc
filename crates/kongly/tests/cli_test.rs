//! Integration tests for the `kongly` CLI binary.
//!
//! Argument parsing, signed links and exit codes run without any gateway;
//! resource commands run against a wiremock Admin API.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `kongly` binary with env isolation.
///
/// Clears all `KONGLY_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn kongly_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("kongly");
    cmd.env("HOME", "/tmp/kongly-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/kongly-cli-test-nonexistent")
        .env_remove("KONGLY_PROFILE")
        .env_remove("KONGLY_ADMIN")
        .env_remove("KONGLY_ADMIN_TOKEN")
        .env_remove("KONGLY_OUTPUT")
        .env_remove("KONGLY_INSECURE")
        .env_remove("KONGLY_TIMEOUT")
        .env_remove("KONGLY_LINK_SECRET")
        .env_remove("RUST_LOG");
    cmd
}

/// Run a prepared command off the async runtime so wiremock keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

const SIGNED: &str = "/f.tar.gz?st=w-CogTLIBF_HRxogvaJmDw&e=1700000000";

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn no_args_shows_help() {
    let output = kongly_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = String::from_utf8_lossy(&output.stderr);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn help_lists_resource_commands() {
    kongly_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("services")
            .and(predicate::str::contains("plugins"))
            .and(predicate::str::contains("targets"))
            .and(predicate::str::contains("link")),
    );
}

#[test]
fn version_flag() {
    kongly_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("kongly"));
}

#[test]
fn completions_bash() {
    kongly_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kongly"));
}

#[test]
fn unknown_subcommand_is_a_usage_error() {
    kongly_cmd().arg("apis").assert().code(2);
}

// ── Signed links ────────────────────────────────────────────────────

#[test]
fn link_sign_prints_the_signed_path() {
    kongly_cmd()
        .args(["link", "sign", "/f.tar.gz", "--expires", "1700000000"])
        .args(["--secret", "secret", "-o", "plain"])
        .assert()
        .success()
        .stdout(format!("{SIGNED}\n"));
}

#[test]
fn link_sign_prefixes_the_download_host() {
    kongly_cmd()
        .args(["link", "sign", "/f.tar.gz", "-e", "1700000000", "-o", "plain"])
        .args(["--base", "https://dl.example.com/"])
        .env("KONGLY_LINK_SECRET", "secret")
        .assert()
        .success()
        .stdout(format!("https://dl.example.com{SIGNED}\n"));
}

#[test]
fn link_sign_json_carries_token_and_expiry() {
    let output = kongly_cmd()
        .args(["link", "sign", "/nginx.tar.gz", "-e", "1523686533"])
        .args(["--secret", "salt", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["token"], "fRKSuqWCR0lJQwFwlK2Yow");
    assert_eq!(body["expires_at"], 1_523_686_533);
}

#[test]
fn link_sign_rejects_relative_paths() {
    kongly_cmd()
        .args(["link", "sign", "f.tar.gz", "--secret", "secret"])
        .assert()
        .code(2);
}

#[test]
fn link_sign_without_a_secret_fails() {
    kongly_cmd()
        .args(["link", "sign", "/f.tar.gz"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("link secret"));
}

#[test]
fn link_verify_accepts_a_fresh_link() {
    kongly_cmd()
        .args(["link", "verify", SIGNED, "--now", "1700000000", "--secret", "secret"])
        .args(["-o", "plain"])
        .assert()
        .success()
        .stdout("/f.tar.gz\n")
        .stderr(predicate::str::contains("Link valid"));
}

#[test]
fn link_verify_exit_codes() {
    // Expired, even though the signature is fine.
    kongly_cmd()
        .args(["link", "verify", SIGNED, "--now", "1700000001", "--secret", "secret"])
        .assert()
        .code(9);

    // Signed with a different secret.
    kongly_cmd()
        .args(["link", "verify", SIGNED, "--now", "1600000000", "--secret", "other"])
        .assert()
        .code(10);

    // No token at all.
    kongly_cmd()
        .args(["link", "verify", "/f.tar.gz?e=1700000000", "--secret", "secret"])
        .assert()
        .code(2);
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn resource_command_without_config_explains_setup() {
    kongly_cmd()
        .args(["services", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("config init"));
}

#[test]
fn unknown_profile_is_reported() {
    kongly_cmd()
        .args(["--profile", "staging", "services", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("staging"));
}

#[test]
fn targets_need_an_upstream() {
    kongly_cmd()
        .args(["--admin", "http://127.0.0.1:9", "targets", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("upstream"));
}

#[test]
fn plugin_scopes_are_mutually_exclusive() {
    kongly_cmd()
        .args(["plugins", "--service", "a", "--route", "b", "list"])
        .assert()
        .code(2);
}

#[test]
fn unreachable_gateway_is_a_connection_error() {
    kongly_cmd()
        .args(["--admin", "http://127.0.0.1:9", "--timeout", "2"])
        .args(["services", "get", "svc_a"])
        .assert()
        .code(7);
}

// ── Against a mock Admin API ────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn services_get_renders_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/svc_a"))
        .and(header("Kong-Admin-Token", "t0ken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "5cf0494f-ded9-470c-82ef-07059b1d5c8e",
            "name": "svc_a",
            "host": "a.internal",
            "port": 80,
            "created_at": 1_700_000_000
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = kongly_cmd();
    cmd.args(["--admin", &server.uri(), "--admin-token", "t0ken"])
        .args(["-o", "json", "services", "get", "svc_a"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{output:?}");
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["name"], "svc_a");
    assert_eq!(body["id"], "5cf0494f-ded9-470c-82ef-07059b1d5c8e");
    assert_eq!(body["created_at"], 1_700_000_000);
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_resource_exits_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/consumers/nobody"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not found" })))
        .mount(&server)
        .await;

    let mut cmd = kongly_cmd();
    cmd.args(["--admin", &server.uri(), "consumers", "get", "nobody"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("consumer 'nobody' not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn list_prints_keys_and_next_offset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/upstreams/up_a/targets/"))
        .and(query_param("size", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "a1b2c3d4-0000-4000-8000-000000000001", "target": "10.0.0.1:80", "weight": 100 },
                { "id": "a1b2c3d4-0000-4000-8000-000000000002", "target": "10.0.0.2:80", "weight": 50 }
            ],
            "offset": "pos-2",
            "next": "/upstreams/up_a/targets?offset=pos-2&size=2"
        })))
        .mount(&server)
        .await;

    let mut cmd = kongly_cmd();
    cmd.args(["--admin", &server.uri()])
        .args(["targets", "--upstream", "up_a", "list", "--size", "2"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("10.0.0.1:80") && stdout.contains("weight 50"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--offset pos-2"));
}

#[tokio::test(flavor = "multi_thread")]
async fn create_conflict_exits_six() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "name": "already exists with value 'svc_a'"
        })))
        .mount(&server)
        .await;

    let mut cmd = kongly_cmd();
    cmd.args(["--admin", &server.uri(), "services", "create"])
        .args(["--set", "name=svc_a", "--set", "host=a.internal"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(6));
    assert!(String::from_utf8_lossy(&output.stderr).contains("upsert"));
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_needs_confirmation_when_not_interactive() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut refused = kongly_cmd();
    refused
        .args(["--admin", &server.uri(), "routes", "delete", "r_users"])
        .write_stdin("");
    assert_eq!(run(refused).await.status.code(), Some(2));

    let mut confirmed = kongly_cmd();
    confirmed.args(["--admin", &server.uri(), "-y", "routes", "delete", "r_users"]);
    assert!(run(confirmed).await.status.success());
}

#[tokio::test(flavor = "multi_thread")]
async fn plugins_enabled_lists_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plugins/enabled"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "enabled_plugins": ["rate-limiting", "key-auth"]
        })))
        .mount(&server)
        .await;

    let mut cmd = kongly_cmd();
    cmd.args(["--admin", &server.uri(), "-o", "plain", "plugins", "enabled"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{output:?}");
    assert_eq!(String::from_utf8_lossy(&output.stdout), "rate-limiting\nkey-auth\n");
}
