//! Core data model types for proctor.
//!
//! These mirror the JSON shapes the exam backend sends and accepts. Field
//! names follow the wire format, including the backend's `lastest_start_time`
//! spelling, which is exposed in Rust as `latest_start_time`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub type AttemptId = i64;
pub type ExamId = i64;
pub type QuestionId = i64;
pub type ChoiceId = i64;
pub type UserId = i64;

/// One answer option of a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub id: ChoiceId,
    #[serde(default)]
    pub content: String,
    /// Only populated by the backend in review mode.
    #[serde(default)]
    pub is_correct: Option<bool>,
    /// The answer the backend has recorded for this attempt.
    #[serde(default)]
    pub is_selected: Option<bool>,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// A question, either from the bank or snapshotted into an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    /// Score override when the question is part of an exam.
    #[serde(default)]
    pub score_in_exam: Option<f64>,
    /// Display order inside an attempt.
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub by_ai: Option<bool>,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl Question {
    /// Whether `choice_id` is one of this question's choices.
    pub fn has_choice(&self, choice_id: ChoiceId) -> bool {
        self.choices.iter().any(|c| c.id == choice_id)
    }

    /// Score this question is worth, preferring the exam-specific value.
    pub fn effective_score(&self) -> Option<f64> {
        self.score_in_exam.or(self.score)
    }
}

/// A recorded answer. `choice_id == None` is a deliberate "no answer" and is
/// serialized as an explicit JSON `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: QuestionId,
    #[serde(default)]
    pub choice_id: Option<ChoiceId>,
}

impl Answer {
    pub fn new(question_id: QuestionId, choice_id: Option<ChoiceId>) -> Self {
        Self {
            question_id,
            choice_id,
        }
    }
}

/// The exam fields embedded in attempts and returned by the exam endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exam {
    pub id: ExamId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub note: Option<String>,
    /// Time limit in minutes.
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub earliest_start_time: Option<DateTime<Utc>>,
    #[serde(default, rename = "lastest_start_time")]
    pub latest_start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub max_attempt: Option<u32>,
    #[serde(default)]
    pub creator_id: Option<UserId>,
    #[serde(default)]
    pub total_question: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub list_question: Vec<Question>,
}

/// One student's instance of taking one exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub id: AttemptId,
    #[serde(default)]
    pub exam_id: Option<ExamId>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub exam: Option<Exam>,
    #[serde(default)]
    pub list_question: Vec<Question>,
    /// Answers the backend has already recorded for this attempt.
    #[serde(default)]
    pub list_answer: Vec<Answer>,
    pub started_at: DateTime<Utc>,
    /// Time limit in minutes, as issued by the backend.
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub total_score: Option<f64>,
    #[serde(default)]
    pub total_question: Option<u32>,
    #[serde(default)]
    pub correct_question: Option<u32>,
    #[serde(default)]
    pub wrong_question: Option<u32>,
}

impl Attempt {
    /// Server-issued end of the attempt: `started_at + duration`.
    pub fn deadline(&self) -> DateTime<Utc> {
        self.started_at + Duration::minutes(i64::from(self.duration))
    }

    /// Whole seconds left at `now`, never negative.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u64 {
        let left = (self.deadline() - now).num_seconds();
        u64::try_from(left).unwrap_or(0)
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    pub fn title(&self) -> &str {
        self.exam
            .as_ref()
            .map(|e| e.title.as_str())
            .filter(|t| !t.is_empty())
            .unwrap_or("Exam")
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.list_question.iter().find(|q| q.id == id)
    }
}

/// Authenticated user as returned by `GET /user/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

// ---------------------------------------------------------------------------
// Authoring payloads
// ---------------------------------------------------------------------------

/// A choice as written by a question author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceDraft {
    /// Present when updating an existing choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ChoiceId>,
    pub content: String,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub explanation: String,
}

/// A question as written by an author, before upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub content: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_points")]
    pub score: f64,
    #[serde(default = "default_question_type", rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub by_ai: bool,
    #[serde(default)]
    pub choices: Vec<ChoiceDraft>,
}

fn default_points() -> f64 {
    1.0
}

fn default_question_type() -> String {
    "single_choice".to_string()
}

/// Reference from an exam to a bank question with its weight in the exam.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExamQuestionRef {
    pub question_id: QuestionId,
    /// The backend validator only accepts integer scores.
    pub score: i64,
}

/// An exam as written by an author, before upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamDraft {
    pub title: String,
    /// Required by the backend but may be empty.
    #[serde(default)]
    pub note: String,
    pub duration: u32,
    pub earliest_start_time: DateTime<Utc>,
    #[serde(rename = "lastest_start_time")]
    pub latest_start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub max_attempt: Option<u32>,
    #[serde(default)]
    pub list_question: Vec<ExamQuestionRef>,
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Pagination metadata from list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub total_pages: u32,
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub meta: PageMeta,
}

/// Query parameters accepted by the list endpoints.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_current_user_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "sortBy", skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortOrder", skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earliest_start_time: Option<DateTime<Utc>>,
    #[serde(
        rename = "lastest_start_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub latest_start_time: Option<DateTime<Utc>>,
}

impl ListQuery {
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
            ..Default::default()
        }
    }

    /// Free-text search matches either content or tag, as the question bank does.
    pub fn with_search(mut self, term: &str) -> Self {
        let term = term.trim();
        if !term.is_empty() {
            self.content = Some(term.to_string());
            self.tag = Some(term.to_string());
        }
        self
    }

    pub fn mine(mut self) -> Self {
        self.is_current_user_only = Some(true);
        self
    }

    pub fn newest_first(mut self) -> Self {
        self.sort_by = Some("created_at".into());
        self.sort_order = Some("DESC".into());
        self
    }
}
