//! Backend error types.
//!
//! These represent failures when talking to the exam backend. They live in
//! `proctor-core` so the exam session can classify submit and start failures
//! by backend code without string matching.

use thiserror::Error;

/// Envelope code the backend uses for success.
pub const CODE_SUCCESS: &str = "SUCCESS";
/// The student has used all allowed attempts for the exam.
pub const CODE_NO_MORE_TURNS: &str = "no_more_turns";
/// The exam window has closed; no new attempt can start.
pub const CODE_OVERDUE: &str = "overdue_doing_exam";
/// Another attempt of this exam is still open.
pub const CODE_ALREADY_STARTED: &str = "exam_already_started";
/// The attempt was already submitted or its time is over.
pub const CODE_SUBMISSION_CLOSED: &str = "exam_submission_closed";
/// The exam does not exist.
pub const CODE_EXAM_NOT_FOUND: &str = "exam_not_found";
pub const CODE_NOT_FOUND: &str = "not_found";

/// Errors that can occur when calling the exam backend.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The backend answered with a non-success envelope.
    #[error("{message} (code {code}, HTTP {status})")]
    Rejected {
        status: u16,
        code: String,
        message: String,
        /// The envelope's `data` field, which carries extra context for some codes.
        details: Option<serde_json::Value>,
    },

    /// Missing or expired credentials.
    #[error("authentication failed: {0}")]
    Unauthorized(String),

    /// The resource does not exist and the backend sent no envelope.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Convenience constructor for a rejected envelope without details.
    pub fn rejected(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Rejected {
            status,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// The backend code, if the backend sent one.
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { code, .. } => Some(code),
            _ => None,
        }
    }

    /// `true` when the backend reports the attempt is already submitted or closed.
    pub fn is_submission_closed(&self) -> bool {
        self.code() == Some(CODE_SUBMISSION_CLOSED)
    }

    /// `true` for a missing resource, whether or not an envelope was sent.
    pub fn is_not_found(&self) -> bool {
        match self {
            ApiError::NotFound(_) => true,
            ApiError::Rejected { status, code, .. } => {
                *status == 404 || code == CODE_EXAM_NOT_FOUND || code == CODE_NOT_FOUND
            }
            _ => false,
        }
    }

    /// `true` for failures where nothing reached or came back from the backend.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Timeout(_) | ApiError::Network(_))
    }

    /// User-facing message, preferring `data.message` over the envelope message.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected {
                message, details, ..
            } => details
                .as_ref()
                .and_then(|d| d.get("message"))
                .and_then(|m| m.as_str())
                .filter(|m| !m.is_empty())
                .unwrap_or(message)
                .to_string(),
            other => other.to_string(),
        }
    }

    /// Reads an integer field from the envelope's `data`.
    pub fn detail_u64(&self, key: &str) -> Option<u64> {
        match self {
            ApiError::Rejected {
                details: Some(d), ..
            } => d.get(key).and_then(|v| v.as_u64()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_submission_closed() {
        let err = ApiError::rejected(400, CODE_SUBMISSION_CLOSED, "closed");
        assert!(err.is_submission_closed());
        assert!(!ApiError::Network("reset".into()).is_submission_closed());
    }

    #[test]
    fn user_message_prefers_data_message() {
        let err = ApiError::Rejected {
            status: 400,
            code: CODE_NO_MORE_TURNS.into(),
            message: "Bad request".into(),
            details: Some(serde_json::json!({"message": "2/2 attempts used", "max_attempts": 2})),
        };
        assert_eq!(err.user_message(), "2/2 attempts used");
        assert_eq!(err.detail_u64("max_attempts"), Some(2));
    }

    #[test]
    fn not_found_by_status_or_code() {
        assert!(ApiError::rejected(404, "whatever", "gone").is_not_found());
        assert!(ApiError::rejected(400, CODE_EXAM_NOT_FOUND, "gone").is_not_found());
        assert!(ApiError::NotFound("/user/exams/9".into()).is_not_found());
        assert!(!ApiError::rejected(400, CODE_OVERDUE, "late").is_not_found());
    }
}
