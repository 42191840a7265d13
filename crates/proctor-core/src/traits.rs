//! Backend trait for the exam-taking flow.
//!
//! Implemented by the HTTP client in `proctor-client` and by its in-memory
//! mock. The session controller only ever talks to the backend through this
//! trait.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::model::{Answer, Attempt, AttemptId, ExamId};

/// The attempt endpoints an exam session needs.
#[async_trait]
pub trait AttemptBackend: Send + Sync {
    /// Start a new attempt, or resume the open one, for `exam_id`.
    async fn create_attempt(&self, exam_id: ExamId) -> Result<Attempt, ApiError>;

    /// Full attempt with questions and recorded answers.
    async fn attempt_detail(&self, attempt_id: AttemptId) -> Result<Attempt, ApiError>;

    /// Best-effort persistence of a partial answer list.
    async fn save_answers(&self, attempt_id: AttemptId, answers: &[Answer]) -> Result<(), ApiError>;

    /// Final submission with one entry per question.
    async fn submit(&self, attempt_id: AttemptId, answers: &[Answer]) -> Result<(), ApiError>;

    /// Graded attempt, with per-choice correctness for review.
    async fn attempt_result(&self, attempt_id: AttemptId) -> Result<Attempt, ApiError>;
}
