//! In-memory backend for testing exam sessions without a server.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use proctor_core::error::ApiError;
use proctor_core::model::{Answer, Attempt, AttemptId, Choice, ExamId, Question};
use proctor_core::traits::AttemptBackend;

/// A scripted [`AttemptBackend`].
///
/// Serves one attempt, records every save and submit, and replays queued
/// failures. With an empty queue every call succeeds.
pub struct MockBackend {
    attempt: Attempt,
    /// Returned by `create_attempt` instead of the attempt when set.
    create_error: Mutex<Option<ApiError>>,
    /// Strip questions from the create response to force a detail load.
    thin_create: bool,
    save_results: Mutex<VecDeque<Result<(), ApiError>>>,
    submit_results: Mutex<VecDeque<Result<(), ApiError>>>,
    submit_delay: Option<Duration>,
    saves: Mutex<Vec<Vec<Answer>>>,
    submissions: Mutex<Vec<Vec<Answer>>>,
    detail_calls: AtomicU32,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockBackend {
    pub fn new(attempt: Attempt) -> Self {
        Self {
            attempt,
            create_error: Mutex::new(None),
            thin_create: false,
            save_results: Mutex::new(VecDeque::new()),
            submit_results: Mutex::new(VecDeque::new()),
            submit_delay: None,
            saves: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
            detail_calls: AtomicU32::new(0),
        }
    }

    /// Fail attempt creation with `err`.
    pub fn with_create_error(self, err: ApiError) -> Self {
        *lock(&self.create_error) = Some(err);
        self
    }

    /// Answer `create_attempt` without questions.
    pub fn with_thin_create(mut self) -> Self {
        self.thin_create = true;
        self
    }

    /// Hold every submit for `delay` before answering.
    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = Some(delay);
        self
    }

    /// Queue the result of the next unscripted save.
    pub fn push_save_result(&self, result: Result<(), ApiError>) {
        lock(&self.save_results).push_back(result);
    }

    /// Queue the result of the next unscripted submit.
    pub fn push_submit_result(&self, result: Result<(), ApiError>) {
        lock(&self.submit_results).push_back(result);
    }

    /// Answer lists received by `save_answers`, in call order.
    pub fn saves(&self) -> Vec<Vec<Answer>> {
        lock(&self.saves).clone()
    }

    /// Answer lists received by `submit`, in call order.
    pub fn submissions(&self) -> Vec<Vec<Answer>> {
        lock(&self.submissions).clone()
    }

    pub fn submit_count(&self) -> usize {
        lock(&self.submissions).len()
    }

    pub fn detail_calls(&self) -> u32 {
        self.detail_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AttemptBackend for MockBackend {
    async fn create_attempt(&self, _exam_id: ExamId) -> Result<Attempt, ApiError> {
        if let Some(err) = lock(&self.create_error).clone() {
            return Err(err);
        }
        let mut attempt = self.attempt.clone();
        if self.thin_create {
            attempt.list_question.clear();
        }
        Ok(attempt)
    }

    async fn attempt_detail(&self, attempt_id: AttemptId) -> Result<Attempt, ApiError> {
        self.detail_calls.fetch_add(1, Ordering::Relaxed);
        if attempt_id != self.attempt.id {
            return Err(ApiError::NotFound(format!("/user/exam-attempts/{attempt_id}/exams")));
        }
        Ok(self.attempt.clone())
    }

    async fn save_answers(&self, _attempt_id: AttemptId, answers: &[Answer]) -> Result<(), ApiError> {
        lock(&self.saves).push(answers.to_vec());
        lock(&self.save_results).pop_front().unwrap_or(Ok(()))
    }

    async fn submit(&self, _attempt_id: AttemptId, answers: &[Answer]) -> Result<(), ApiError> {
        lock(&self.submissions).push(answers.to_vec());
        if let Some(delay) = self.submit_delay {
            tokio::time::sleep(delay).await;
        }
        lock(&self.submit_results).pop_front().unwrap_or(Ok(()))
    }

    async fn attempt_result(&self, attempt_id: AttemptId) -> Result<Attempt, ApiError> {
        if attempt_id != self.attempt.id {
            return Err(ApiError::NotFound(format!("/user/exam-attempts/{attempt_id}")));
        }
        Ok(self.attempt.clone())
    }
}

/// An attempt with `questions` questions, each with two choices.
///
/// Question `n` (1-based) has id `n` and choices `n * 10` and `n * 10 + 1`.
pub fn sample_attempt(questions: i64, duration_minutes: u32, started_at: DateTime<Utc>) -> Attempt {
    let list_question = (1..=questions)
        .map(|n| Question {
            id: n,
            content: format!("Question {n}"),
            description: None,
            score: Some(1.0),
            score_in_exam: None,
            order: Some(n),
            kind: Some("single_choice".into()),
            tags: None,
            by_ai: None,
            choices: (0..2)
                .map(|k| Choice {
                    id: n * 10 + k,
                    content: format!("Option {}", ['A', 'B'][k as usize]),
                    is_correct: None,
                    is_selected: None,
                    explanation: None,
                })
                .collect(),
        })
        .collect();

    Attempt {
        id: 1000,
        exam_id: Some(1),
        user_id: Some(1),
        exam: None,
        list_question,
        list_answer: Vec::new(),
        started_at,
        duration: duration_minutes,
        finished_at: None,
        score: None,
        total_score: None,
        total_question: None,
        correct_question: None,
        wrong_question: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_queued_results_then_succeeds() {
        let backend = MockBackend::new(sample_attempt(2, 10, Utc::now()));
        backend.push_submit_result(Err(ApiError::Network("reset".into())));

        assert!(backend.submit(1000, &[]).await.is_err());
        assert!(backend.submit(1000, &[]).await.is_ok());
        assert_eq!(backend.submit_count(), 2);
    }

    #[tokio::test]
    async fn thin_create_forces_detail() {
        let backend = MockBackend::new(sample_attempt(2, 10, Utc::now())).with_thin_create();
        let created = backend.create_attempt(1).await.unwrap();
        assert!(created.list_question.is_empty());
        let detail = backend.attempt_detail(created.id).await.unwrap();
        assert_eq!(detail.list_question.len(), 2);
        assert_eq!(backend.detail_calls(), 1);
    }

    #[test]
    fn sample_ids() {
        let attempt = sample_attempt(3, 10, Utc::now());
        assert_eq!(attempt.list_question[2].id, 3);
        assert_eq!(attempt.list_question[2].choices[1].id, 31);
    }
}
