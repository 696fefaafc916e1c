use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::net::{TcpListener, TcpStream};
use std::process::{Child, Stdio};
use std::time::{Duration, Instant};
use tempfile::{tempdir, TempDir};

/// Isolated environment: no inherited identity and an empty config dir.
struct Env {
    config_dir: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            config_dir: tempdir().unwrap(),
        }
    }

    fn taskboard(&self) -> Command {
        let mut cmd = Command::cargo_bin("taskboard").unwrap();
        cmd.env("XDG_CONFIG_HOME", self.config_dir.path())
            .env("HOME", self.config_dir.path())
            .env_remove("TASKBOARD_SERVER")
            .env_remove("TASKBOARD_USER")
            .env_remove("TASKBOARD_NAME")
            .env_remove("TASKBOARD_EMAIL")
            .env_remove("TASKBOARD_BIND")
            .env_remove("TASKBOARD_DATABASE")
            .env_remove("TASKBOARD_DEBUG_LOG");
        cmd
    }
}

struct Server {
    child: Child,
    url: String,
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn start_server(env: &Env) -> Server {
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let addr = format!("127.0.0.1:{}", port);

    let child = std::process::Command::new(assert_cmd::cargo::cargo_bin("taskboard"))
        .args(["serve", "--bind", &addr])
        .env("XDG_CONFIG_HOME", env.config_dir.path())
        .env_remove("TASKBOARD_DATABASE")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    while TcpStream::connect(&addr).is_err() {
        assert!(Instant::now() < deadline, "server did not start");
        std::thread::sleep(Duration::from_millis(50));
    }

    Server {
        child,
        url: format!("http://{}", addr),
    }
}

fn parse_json_output(output: &[u8]) -> Value {
    serde_json::from_str(&String::from_utf8_lossy(output)).expect("Failed to parse JSON output")
}

fn run_ok(env: &Env, server: &Server, user: &str, args: &[&str]) -> Value {
    let output = env
        .taskboard()
        .args(["--server", &server.url, "--user", user])
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json = parse_json_output(&output);
    assert!(json["success"].as_bool().unwrap());
    json
}

fn column_titles(board: &Value, column: &str) -> Vec<String> {
    board["data"][column]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_completions() {
    Env::new()
        .taskboard()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("taskboard"));
}

#[test]
fn test_unauthenticated_list_is_empty() {
    let output = Env::new()
        .taskboard()
        .args(["--server", "http://127.0.0.1:1", "task", "list"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json = parse_json_output(&output);
    assert_eq!(json["data"]["ToDo"].as_array().unwrap().len(), 0);
    assert_eq!(json["data"]["Doing"].as_array().unwrap().len(), 0);
    assert_eq!(json["data"]["Done"].as_array().unwrap().len(), 0);
}

#[test]
fn test_unauthenticated_create_fails() {
    Env::new()
        .taskboard()
        .args(["--server", "http://127.0.0.1:1", "task", "create", "--title", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"success\":false"))
        .stderr(predicate::str::contains("Unauthorized"));
}

#[test]
fn test_unreachable_server_reports_error() {
    Env::new()
        .taskboard()
        .args(["--server", "http://127.0.0.1:1", "--user", "alice", "task", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"success\":false"));
}

#[test]
fn test_invalid_column_is_rejected_by_parser() {
    Env::new()
        .taskboard()
        .args(["task", "move", "--id", "1", "--to", "Later"])
        .assert()
        .failure();
}

#[cfg(not(feature = "sqlite"))]
#[test]
fn test_serve_database_requires_sqlite_feature() {
    let dir = tempdir().unwrap();
    let env = Env::new();
    env.taskboard()
        .args([
            "serve",
            "--bind",
            "127.0.0.1:0",
            "--database",
            dir.path().join("tasks.db").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sqlite"));
}

#[test]
fn test_task_lifecycle_against_server() {
    let env = Env::new();
    let server = start_server(&env);

    let created = run_ok(
        &env,
        &server,
        "alice",
        &[
            "task",
            "create",
            "--title",
            "Write report",
            "--description",
            "```checklist\n- [ ] outline\n- [ ] draft\n```",
            "--due-date",
            "2030-01-15",
        ],
    );
    let id = created["data"]["id"].as_str().unwrap().to_string();
    assert!(!id.starts_with("tmp-"));
    assert_eq!(created["data"]["dueDate"], "2030-01-15");

    run_ok(&env, &server, "alice", &["task", "move", "--id", &id, "--to", "Doing"]);
    let board = run_ok(&env, &server, "alice", &["task", "list"]);
    assert_eq!(column_titles(&board, "Doing"), vec!["Write report"]);
    assert!(column_titles(&board, "ToDo").is_empty());

    let checked = run_ok(
        &env,
        &server,
        "alice",
        &["task", "check", "--id", &id, "--index", "1"],
    );
    assert!(checked["data"]["description"]
        .as_str()
        .unwrap()
        .contains("- [x] draft"));

    let other = run_ok(&env, &server, "bob", &["task", "list"]);
    assert!(column_titles(&other, "Doing").is_empty());

    run_ok(&env, &server, "alice", &["task", "cancel", "--id", &id]);
    let canceled = run_ok(&env, &server, "alice", &["task", "canceled"]);
    assert_eq!(canceled["data"]["count"], 1);

    run_ok(&env, &server, "alice", &["task", "resume", "--id", &id]);
    let board = run_ok(&env, &server, "alice", &["task", "list"]);
    assert_eq!(column_titles(&board, "ToDo"), vec!["Write report"]);

    run_ok(&env, &server, "alice", &["task", "delete", "--id", &id]);
    let board = run_ok(&env, &server, "alice", &["task", "list"]);
    assert!(column_titles(&board, "ToDo").is_empty());
}

#[test]
fn test_rejected_move_reports_failure() {
    let env = Env::new();
    let server = start_server(&env);

    let created = run_ok(&env, &server, "alice", &["task", "create", "--title", "Mine"]);
    let id = created["data"]["id"].as_str().unwrap().to_string();

    env.taskboard()
        .args(["--server", &server.url, "--user", "bob"])
        .args(["task", "move", "--id", &id, "--to", "Done"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"success\":false"));

    let board = run_ok(&env, &server, "alice", &["task", "list"]);
    assert_eq!(column_titles(&board, "ToDo"), vec!["Mine"]);
}
