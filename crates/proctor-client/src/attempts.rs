//! Exam attempt endpoints.

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use proctor_core::error::ApiError;
use proctor_core::model::{Answer, Attempt, AttemptId, ExamId, ListQuery, Page};
use proctor_core::traits::AttemptBackend;

use crate::api::ApiClient;

#[derive(Serialize)]
struct CreateAttemptBody {
    exam_id: ExamId,
}

#[derive(Serialize)]
struct AnswerListBody<'a> {
    list_answer: &'a [Answer],
}

impl ApiClient {
    /// Attempts of the current user, newest first.
    #[instrument(skip(self))]
    pub async fn list_attempts(&self, query: &ListQuery) -> Result<Page<Attempt>, ApiError> {
        let path = "/user/exam-attempts";
        let builder = self.request_with_query(Method::GET, path, query)?;
        self.send(builder, path).await?.into_page()
    }

    #[instrument(skip(self))]
    pub async fn delete_attempt(&self, attempt_id: AttemptId) -> Result<(), ApiError> {
        let path = format!("/user/exam-attempts/{attempt_id}");
        let builder = self.request(Method::DELETE, &path)?;
        self.send(builder, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl AttemptBackend for ApiClient {
    #[instrument(skip(self))]
    async fn create_attempt(&self, exam_id: ExamId) -> Result<Attempt, ApiError> {
        self.send_json(Method::POST, "/user/exam-attempts", &CreateAttemptBody { exam_id })
            .await?
            .into_data()
    }

    #[instrument(skip(self))]
    async fn attempt_detail(&self, attempt_id: AttemptId) -> Result<Attempt, ApiError> {
        let path = format!("/user/exam-attempts/{attempt_id}/exams");
        let builder = self.request(Method::GET, &path)?;
        self.send(builder, &path).await?.into_data()
    }

    #[instrument(skip(self, answers), fields(count = answers.len()))]
    async fn save_answers(&self, attempt_id: AttemptId, answers: &[Answer]) -> Result<(), ApiError> {
        let path = format!("/user/exam-attempts/{attempt_id}/answer");
        self.send_json(Method::POST, &path, &AnswerListBody { list_answer: answers })
            .await?;
        Ok(())
    }

    #[instrument(skip(self, answers), fields(count = answers.len()))]
    async fn submit(&self, attempt_id: AttemptId, answers: &[Answer]) -> Result<(), ApiError> {
        let path = format!("/user/exam-attempts/{attempt_id}/submit");
        self.send_json(Method::POST, &path, &AnswerListBody { list_answer: answers })
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn attempt_result(&self, attempt_id: AttemptId) -> Result<Attempt, ApiError> {
        let path = format!("/user/exam-attempts/{attempt_id}");
        let builder = self.request(Method::GET, &path)?;
        self.send(builder, &path).await?.into_data()
    }
}
