//! Question bank endpoints.

use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use proctor_core::error::ApiError;
use proctor_core::model::{ListQuery, Page, Question, QuestionDraft, QuestionId};

use crate::api::ApiClient;

#[derive(Serialize)]
struct CreateQuestionsBody<'a> {
    questions: &'a [QuestionDraft],
}

impl ApiClient {
    /// Search the bank. Combine with [`ListQuery::with_search`] to match
    /// content or tag.
    #[instrument(skip(self))]
    pub async fn list_questions(&self, query: &ListQuery) -> Result<Page<Question>, ApiError> {
        let path = "/user/questions";
        let builder = self.request_with_query(Method::GET, path, query)?;
        self.send(builder, path).await?.into_page()
    }

    #[instrument(skip(self))]
    pub async fn get_question(&self, question_id: QuestionId) -> Result<Question, ApiError> {
        let path = format!("/user/questions/{question_id}");
        let builder = self.request(Method::GET, &path)?;
        self.send(builder, &path).await?.into_data()
    }

    /// Upload a batch of questions. Returns whatever the backend echoes back,
    /// which may be nothing.
    #[instrument(skip(self, drafts), fields(count = drafts.len()))]
    pub async fn create_questions(&self, drafts: &[QuestionDraft]) -> Result<Vec<Question>, ApiError> {
        let decoded = self
            .send_json(
                Method::POST,
                "/user/questions",
                &CreateQuestionsBody { questions: drafts },
            )
            .await?;
        Ok(decoded.into_page::<Question>()?.rows)
    }

    #[instrument(skip(self, draft))]
    pub async fn update_question(
        &self,
        question_id: QuestionId,
        draft: &QuestionDraft,
    ) -> Result<Question, ApiError> {
        let path = format!("/user/questions/{question_id}");
        self.send_json(Method::PUT, &path, draft).await?.into_data()
    }

    #[instrument(skip(self))]
    pub async fn delete_question(&self, question_id: QuestionId) -> Result<(), ApiError> {
        let path = format!("/user/questions/{question_id}");
        let builder = self.request(Method::DELETE, &path)?;
        self.send(builder, &path).await?;
        Ok(())
    }
}
