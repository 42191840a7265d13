//! Exam session driven against a wiremock backend over real HTTP.

use std::sync::Arc;

use chrono::{Duration, Utc};
use proctor_client::{ApiClient, SessionContext};
use proctor_core::session::{InitError, SubmissionState};
use proctor_core::traits::AttemptBackend;
use proctor_core::{ExamSession, SubmitOutcome, SubmitTrigger};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend(server: &MockServer) -> Arc<dyn AttemptBackend> {
    Arc::new(ApiClient::new(SessionContext::authenticated(server.uri(), "tok")).unwrap())
}

async fn mount_attempt(server: &MockServer) {
    let started = Utc::now() - Duration::minutes(5);
    Mock::given(method("POST"))
        .and(path("/user/exam-attempts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": "SUCCESS",
            "data": {"id": 42, "exam_id": 7, "started_at": started, "duration": 30}
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user/exam-attempts/42/exams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": "SUCCESS",
            "data": {
                "id": 42,
                "exam_id": 7,
                "started_at": started,
                "duration": 30,
                "list_question": [
                    {"id": 1, "content": "A?", "choices": [{"id": 11}, {"id": 12}]},
                    {"id": 2, "content": "B?", "choices": [{"id": 21}, {"id": 22}]}
                ],
                "list_answer": [{"question_id": 2, "choice_id": 22}]
            }
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn resume_select_and_submit() {
    let server = MockServer::start().await;
    mount_attempt(&server).await;

    Mock::given(method("POST"))
        .and(path("/user/exam-attempts/42/answer"))
        .and(body_json(serde_json::json!({
            "list_answer": [{"question_id": 1, "choice_id": 11}]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"code": "SUCCESS"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/user/exam-attempts/42/submit"))
        .and(body_json(serde_json::json!({
            "list_answer": [
                {"question_id": 1, "choice_id": 11},
                {"question_id": 2, "choice_id": 22}
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"code": "SUCCESS"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = ExamSession::start(backend(&server), 7).await.unwrap();
    assert_eq!(session.selected(2).await, Some(22));
    let remaining = session.remaining_secs().await;
    assert!(remaining > 24 * 60 && remaining <= 25 * 60);

    session.select(1, 11).await.unwrap().settled().await;
    let outcome = session.submit(SubmitTrigger::Manual).await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Submitted(42));
    assert_eq!(session.state().await, SubmissionState::Submitted);
}

#[tokio::test]
async fn closed_attempt_counts_as_submitted() {
    let server = MockServer::start().await;
    mount_attempt(&server).await;

    Mock::given(method("POST"))
        .and(path("/user/exam-attempts/42/submit"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "code": "exam_submission_closed",
            "message": "This attempt has already been submitted"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = ExamSession::start(backend(&server), 7).await.unwrap();
    let outcome = session.submit(SubmitTrigger::Manual).await.unwrap();
    assert_eq!(outcome, SubmitOutcome::AlreadyClosed(42));
    assert!(outcome.shows_results());
}

#[tokio::test]
async fn attempt_limit_message_from_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/user/exam-attempts"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "code": "no_more_turns",
            "message": "Bad request",
            "data": {"current_attempts": 2, "max_attempts": 2}
        })))
        .mount(&server)
        .await;

    let err = ExamSession::start(backend(&server), 7).await.unwrap_err();
    match err {
        InitError::AttemptLimitReached { current, max, message } => {
            assert_eq!((current, max), (Some(2), Some(2)));
            assert_eq!(message, "you have used 2/2 attempts for this exam");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn failed_save_keeps_local_selection() {
    let server = MockServer::start().await;
    mount_attempt(&server).await;

    Mock::given(method("POST"))
        .and(path("/user/exam-attempts/42/answer"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let session = ExamSession::start(backend(&server), 7).await.unwrap();
    let status = session.select(1, 12).await.unwrap().settled().await;
    assert!(matches!(status, proctor_core::session::SaveStatus::Failed(_)));
    assert_eq!(session.selected(1).await, Some(12));
    assert_eq!(session.state().await, SubmissionState::InProgress);
}
