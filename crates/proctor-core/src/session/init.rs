//! Opening an attempt: create or resume, then make sure questions are loaded.

use thiserror::Error;

use crate::error::{ApiError, CODE_ALREADY_STARTED, CODE_NO_MORE_TURNS, CODE_OVERDUE};
use crate::model::{Attempt, AttemptId, ExamId};
use crate::traits::AttemptBackend;

/// Why an exam session could not start. All variants end the session.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("exam {0} was not found")]
    ExamNotFound(ExamId),

    #[error("{message}")]
    AttemptLimitReached {
        current: Option<u64>,
        max: Option<u64>,
        message: String,
    },

    #[error("the exam window has closed; a new attempt cannot start")]
    WindowClosed,

    #[error("another attempt is still in progress; finish it first")]
    AttemptInProgress,

    #[error("attempt {0} has no questions")]
    NoQuestions(AttemptId),

    /// The backend resumed an attempt that was already submitted.
    #[error("attempt {0} is already finished")]
    AlreadyFinished(AttemptId),

    #[error("could not start the exam: {0}")]
    Backend(#[source] ApiError),
}

impl InitError {
    /// Map a backend failure from the create-attempt call.
    pub fn from_api(exam_id: ExamId, err: ApiError) -> Self {
        if err.is_not_found() {
            return InitError::ExamNotFound(exam_id);
        }
        match err.code() {
            Some(CODE_NO_MORE_TURNS) => {
                let current = err.detail_u64("current_attempts");
                let max = err.detail_u64("max_attempts");
                let message = match (current, max) {
                    (Some(c), Some(m)) if !has_detail_message(&err) => {
                        format!("you have used {c}/{m} attempts for this exam")
                    }
                    _ => err.user_message(),
                };
                InitError::AttemptLimitReached {
                    current,
                    max,
                    message,
                }
            }
            Some(CODE_OVERDUE) => InitError::WindowClosed,
            Some(CODE_ALREADY_STARTED) => InitError::AttemptInProgress,
            _ => InitError::Backend(err),
        }
    }
}

fn has_detail_message(err: &ApiError) -> bool {
    matches!(
        err,
        ApiError::Rejected { details: Some(d), .. } if d.get("message").and_then(|m| m.as_str()).is_some()
    )
}

/// Create (or resume) the attempt for `exam_id` and make sure it carries its
/// questions, loading the attempt detail when the create response is thin.
pub async fn open_attempt(
    backend: &dyn AttemptBackend,
    exam_id: ExamId,
) -> Result<Attempt, InitError> {
    let mut attempt = backend
        .create_attempt(exam_id)
        .await
        .map_err(|e| InitError::from_api(exam_id, e))?;

    if attempt.list_question.is_empty() {
        tracing::debug!(attempt_id = attempt.id, "create response has no questions, loading detail");
        attempt = backend
            .attempt_detail(attempt.id)
            .await
            .map_err(InitError::Backend)?;
    }

    if attempt.is_finished() {
        return Err(InitError::AlreadyFinished(attempt.id));
    }
    if attempt.list_question.is_empty() {
        return Err(InitError::NoQuestions(attempt.id));
    }
    Ok(attempt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CODE_SUBMISSION_CLOSED;

    #[test]
    fn maps_known_codes() {
        assert!(matches!(
            InitError::from_api(1, ApiError::rejected(400, CODE_OVERDUE, "x")),
            InitError::WindowClosed
        ));
        assert!(matches!(
            InitError::from_api(1, ApiError::rejected(409, CODE_ALREADY_STARTED, "x")),
            InitError::AttemptInProgress
        ));
        assert!(matches!(
            InitError::from_api(5, ApiError::rejected(404, "x", "missing")),
            InitError::ExamNotFound(5)
        ));
        assert!(matches!(
            InitError::from_api(1, ApiError::rejected(400, CODE_SUBMISSION_CLOSED, "x")),
            InitError::Backend(_)
        ));
    }

    #[test]
    fn attempt_limit_message_from_counts() {
        let err = ApiError::Rejected {
            status: 400,
            code: CODE_NO_MORE_TURNS.into(),
            message: "Bad request".into(),
            details: Some(serde_json::json!({"current_attempts": 3, "max_attempts": 3})),
        };
        match InitError::from_api(1, err) {
            InitError::AttemptLimitReached { current, max, message } => {
                assert_eq!(current, Some(3));
                assert_eq!(max, Some(3));
                assert_eq!(message, "you have used 3/3 attempts for this exam");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn attempt_limit_prefers_backend_message() {
        let err = ApiError::Rejected {
            status: 400,
            code: CODE_NO_MORE_TURNS.into(),
            message: "Bad request".into(),
            details: Some(serde_json::json!({
                "message": "No attempts left",
                "current_attempts": 1,
                "max_attempts": 1
            })),
        };
        assert_eq!(InitError::from_api(1, err).to_string(), "No attempts left");
    }
}
