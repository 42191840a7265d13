//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn proctor() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("proctor").unwrap()
}

/// A command isolated from the developer's own config and credentials.
fn isolated(home: &TempDir) -> Command {
    let mut cmd = proctor();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env_remove("PROCTOR_BASE_URL")
        .env_remove("PROCTOR_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_commands() {
    proctor()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("take"))
        .stdout(predicate::str::contains("questions"))
        .stdout(predicate::str::contains("review"));
}

#[test]
fn version_flag() {
    proctor()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("proctor"));
}

#[test]
fn validate_sample_files() {
    proctor()
        .arg("validate")
        .arg("--questions")
        .arg("../../samples/questions.toml")
        .arg("--exam")
        .arg("../../samples/exam.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 questions"))
        .stdout(predicate::str::contains("Rust fundamentals"))
        .stdout(predicate::str::contains("All files valid"));
}

#[test]
fn validate_reports_warnings() {
    proctor()
        .arg("validate")
        .arg("--questions")
        .arg("../../samples/broken-questions.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("[question 1] WARNING: no correct choice marked"))
        .stdout(predicate::str::contains("2 warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    proctor()
        .arg("validate")
        .arg("--questions")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_requires_input() {
    proctor()
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to validate"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    isolated(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created proctor.toml"))
        .stdout(predicate::str::contains("Created authoring/questions.toml"))
        .stdout(predicate::str::contains("Created authoring/exam.toml"));

    assert!(dir.path().join("proctor.toml").exists());

    isolated(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists, skipping"));
}

#[test]
fn commands_require_login() {
    let dir = TempDir::new().unwrap();

    isolated(&dir)
        .arg("history")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not logged in"));
}

#[test]
fn logout_without_credentials() {
    let dir = TempDir::new().unwrap();

    isolated(&dir)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in"));
}

#[tokio::test(flavor = "multi_thread")]
async fn login_then_whoami_uses_stored_token() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": "SUCCESS",
            "data": {"access_token": "stored-token"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/me"))
        .and(wiremock::matchers::header("authorization", "Bearer stored-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": "SUCCESS",
            "data": {"id": 8, "username": "lin", "email": "lin@example.com"}
        })))
        .mount(&server)
        .await;

    isolated(&dir)
        .env("PROCTOR_BASE_URL", server.uri())
        .args(["login", "lin", "--password", "hunter22"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as lin (id 8)"));

    assert!(dir
        .path()
        .join(".config/proctor/credentials.json")
        .exists());

    isolated(&dir)
        .env("PROCTOR_BASE_URL", server.uri())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("lin (id 8)"))
        .stdout(predicate::str::contains("lin@example.com"));
}

#[tokio::test(flavor = "multi_thread")]
async fn take_exam_from_stdin() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let started = chrono::Utc::now();

    Mock::given(method("POST"))
        .and(path("/user/exam-attempts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": "SUCCESS",
            "data": {
                "id": 42,
                "exam_id": 7,
                "exam": {"id": 7, "title": "Pop quiz"},
                "started_at": started,
                "duration": 30,
                "list_question": [
                    {"id": 1, "content": "First?", "choices": [{"id": 11, "content": "a"}, {"id": 12, "content": "b"}]},
                    {"id": 2, "content": "Second?", "choices": [{"id": 21, "content": "a"}, {"id": 22, "content": "b"}]},
                    {"id": 3, "content": "Third?", "choices": [{"id": 31, "content": "a"}, {"id": 32, "content": "b"}]}
                ]
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/user/exam-attempts/42/answer"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"code": "SUCCESS"})),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/user/exam-attempts/42/submit"))
        .and(body_json(serde_json::json!({
            "list_answer": [
                {"question_id": 1, "choice_id": 11},
                {"question_id": 2, "choice_id": 22},
                {"question_id": 3, "choice_id": 32}
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"code": "SUCCESS"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user/exam-attempts/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": "SUCCESS",
            "data": {
                "id": 42,
                "exam": {"id": 7, "title": "Pop quiz"},
                "started_at": started,
                "finished_at": started,
                "duration": 30,
                "score": 2.0,
                "total_score": 3.0,
                "total_question": 3,
                "correct_question": 2,
                "wrong_question": 1
            }
        })))
        .mount(&server)
        .await;

    isolated(&dir)
        .env("PROCTOR_BASE_URL", server.uri())
        .env("PROCTOR_TOKEN", "tok")
        .args(["take", "7"])
        .write_stdin("1\nn\n2\nn\n2\nsubmit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pop quiz: 3 questions"))
        .stdout(predicate::str::contains("Submitted."))
        .stdout(predicate::str::contains("Score:    2.00/3.00 (66.7%)"))
        .stdout(predicate::str::contains("Correct:  2/3"));
}

#[tokio::test(flavor = "multi_thread")]
async fn take_reports_attempt_limit() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/user/exam-attempts"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "code": "no_more_turns",
            "message": "Bad request",
            "data": {"message": "You have used all 2 attempts"}
        })))
        .mount(&server)
        .await;

    isolated(&dir)
        .env("PROCTOR_BASE_URL", server.uri())
        .env("PROCTOR_TOKEN", "tok")
        .args(["take", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("You have used all 2 attempts"));
}
