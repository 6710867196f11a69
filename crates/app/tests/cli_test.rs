//! Integration tests for the `covenant` binary.
//!
//! Each test writes a harness directory into a temp dir. Tests that need an
//! API start a small HTTP server on a background thread.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::thread;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SUITE: &str = r#"
scenarios:
  - name: users_getAll_OK
    tags: ["@functional"]
    endpoint: users
    checks:
      - mode: is_array_with_min_size
        min: "{{minExpectedAllUsers}}"
      - mode: array_element_equality
        index: 0
        fixture: sampleUser.json
      - mode: node_absent
        path: "[0].city"

  - name: user_validUserId_OK
    tags: ["@functional"]
    endpoint: user
    path_params: { userId: "{{validUserId}}" }
    checks:
      - mode: full_equality
        fixture: "user_{{validUserId}}.json"

  - name: user_userIdNotFound_NotFound
    tags: ["@functional"]
    endpoint: user
    path_params: { userId: "9999999" }
    expect: { status: 404 }

  - name: city_cityUTF8_noUsers
    tags: ["@functional", "@utf8"]
    endpoint: city
    path_params: { city: "{{cityUTF8}}" }
    checks:
      - mode: is_empty

  - name: users_getAll_atLeastThousand
    tags: ["@volume"]
    endpoint: users
    checks:
      - mode: is_array_with_min_size
        min: 1000
"#;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

fn harness(host: Option<&str>, port: u16) -> TempDir {
    let dir = TempDir::new().unwrap();
    let host_line = host.map_or_else(String::new, |h| format!("      host: {h}\n"));
    let application = format!(
        "default_profile: local
base:
  path:
    users: /users
    user: /user/{{userId}}
    city: /city/{{city}}/users
profiles:
  local:
    server:
      scheme: http
{host_line}      port: {port}
"
    );
    write(dir.path(), "application.yml", &application);
    write(
        dir.path(),
        "data/local/test.properties",
        "validUserId=12\nminExpectedAllUsers=2\ncityUTF8=Kraków\n",
    );
    write(
        dir.path(),
        "data/local/response/sampleUser.json",
        r#"{"id":"1","name":"Ann"}"#,
    );
    write(
        dir.path(),
        "data/local/response/user_12.json",
        r#"{"name":"Zed","id":"12"}"#,
    );
    write(dir.path(), "suites/api.yml", SUITE);
    dir
}

fn respond(mut stream: TcpStream) {
    let mut head = Vec::new();
    let mut buf = [0_u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    let head = String::from_utf8_lossy(&head);
    let path = head.split_whitespace().nth(1).unwrap_or("/");

    let (status, body) = match path {
        "/users" => ("200 OK", r#"[{"id":"1","name":"Ann"},{"id":"2","name":"Bob"}]"#),
        "/user/12" => ("200 OK", r#"{"id":"12","name":"Zed"}"#),
        "/city/Krak%C3%B3w/users" => ("200 OK", "[]"),
        _ => ("404 Not Found", ""),
    };
    let content_type = if body.is_empty() {
        String::new()
    } else {
        "Content-Type: application/json\r\n".to_string()
    };
    let response = format!(
        "HTTP/1.1 {status}\r\n{content_type}Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
}

/// Starts a fake API and returns its port.
fn fake_api() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            thread::spawn(move || respond(stream));
        }
    });
    port
}

fn covenant(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("covenant").unwrap();
    for var in [
        "COVENANT_CONFIG_DIR",
        "COVENANT_PROFILE",
        "COVENANT_DATASET",
        "COVENANT_TIMEOUT_MS",
        "COVENANT_SERVER_SCHEME",
        "COVENANT_SERVER_HOST",
        "COVENANT_SERVER_PORT",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.arg("--config-dir").arg(config_dir);
    cmd
}

#[test]
fn test_missing_host_aborts_before_any_scenario() {
    let dir = harness(None, 8080);

    covenant(dir.path())
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "missing required key 'server.host' for profile 'local'",
        ));
}

#[test]
fn test_tag_filter_matching_nothing_passes() {
    // Port 9 is never contacted: no scenario is selected.
    let dir = harness(Some("127.0.0.1"), 9);

    covenant(dir.path())
        .args(["--tags", "@nothing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 scenarios: 0 passed, 0 failed"));
}

#[test]
fn test_invalid_tag_expression_is_startup_error() {
    let dir = harness(Some("127.0.0.1"), 9);

    covenant(dir.path())
        .args(["--tags", "@functional and"])
        .assert()
        .code(2);
}

#[test]
fn test_unknown_profile_is_startup_error() {
    let dir = harness(Some("127.0.0.1"), 9);

    covenant(dir.path())
        .args(["--profile", "prod"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("prod"));
}

#[test]
fn test_functional_scenarios_pass_against_api() {
    let port = fake_api();
    let dir = harness(Some("127.0.0.1"), port);

    covenant(dir.path())
        .args(["--tags", "@functional", "--parallel", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS  users_getAll_OK"))
        .stdout(predicate::str::contains("PASS  city_cityUTF8_noUsers"))
        .stdout(predicate::str::contains("4 scenarios: 4 passed, 0 failed"));
}

#[test]
fn test_failing_scenario_exits_one() {
    let port = fake_api();
    let dir = harness(Some("127.0.0.1"), port);

    covenant(dir.path())
        .args(["--tags", "@volume"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAIL  users_getAll_atLeastThousand"))
        .stdout(predicate::str::contains("IsArrayWithMinSize(1000)"));
}

#[test]
fn test_json_report() {
    let port = fake_api();
    let dir = harness(Some("127.0.0.1"), port);

    covenant(dir.path())
        .args(["--tags", "@utf8", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{"))
        .stdout(predicate::str::contains("\"name\": \"city_cityUTF8_noUsers\""))
        .stdout(predicate::str::contains("\"passed\": 1"));
}

#[test]
fn test_environment_overrides_host() {
    let port = fake_api();
    let dir = harness(Some("unreachable.invalid"), port);

    covenant(dir.path())
        .env("COVENANT_SERVER_HOST", "127.0.0.1")
        .args(["--tags", "@utf8"])
        .assert()
        .success();
}
