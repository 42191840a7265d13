//! Exam bank endpoints.

use reqwest::Method;
use tracing::instrument;

use proctor_core::error::ApiError;
use proctor_core::model::{Exam, ExamDraft, ExamId, ListQuery, Page};

use crate::api::ApiClient;

impl ApiClient {
    #[instrument(skip(self))]
    pub async fn list_exams(&self, query: &ListQuery) -> Result<Page<Exam>, ApiError> {
        let path = "/user/exams";
        let builder = self.request_with_query(Method::GET, path, query)?;
        self.send(builder, path).await?.into_page()
    }

    #[instrument(skip(self))]
    pub async fn get_exam(&self, exam_id: ExamId) -> Result<Exam, ApiError> {
        let path = format!("/user/exams/{exam_id}");
        let builder = self.request(Method::GET, &path)?;
        self.send(builder, &path).await?.into_data()
    }

    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create_exam(&self, draft: &ExamDraft) -> Result<Exam, ApiError> {
        self.send_json(Method::POST, "/user/exams", draft)
            .await?
            .into_data()
    }

    #[instrument(skip(self, draft))]
    pub async fn update_exam(&self, exam_id: ExamId, draft: &ExamDraft) -> Result<Exam, ApiError> {
        let path = format!("/user/exams/{exam_id}");
        self.send_json(Method::PUT, &path, draft).await?.into_data()
    }

    #[instrument(skip(self))]
    pub async fn delete_exam(&self, exam_id: ExamId) -> Result<(), ApiError> {
        let path = format!("/user/exams/{exam_id}");
        let builder = self.request(Method::DELETE, &path)?;
        self.send(builder, &path).await?;
        Ok(())
    }
}
