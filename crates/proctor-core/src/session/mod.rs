//! Timed exam-taking session.
//!
//! [`ExamSession`] ties together the attempt loaded from the backend, the
//! local [`AnswerSheet`], the [`Countdown`] and the [`SubmissionGuard`].
//! Two activities share the session: the once-a-second timer task started by
//! [`ExamSession::spawn_timer`] and whatever drives selections and manual
//! submits. Both check the guard before acting. The state lock is never held
//! across a backend call.

mod answers;
mod cursor;
mod guard;
mod init;
mod timer;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::instrument;

use crate::error::ApiError;
use crate::model::{Answer, Attempt, AttemptId, ChoiceId, ExamId, Question, QuestionId};
use crate::traits::AttemptBackend;

pub use answers::{AnswerSheet, SelectError};
pub use cursor::QuestionCursor;
pub use guard::{SubmissionEvent, SubmissionGuard, SubmissionState};
pub use init::{open_attempt, InitError};
pub use timer::{format_clock, Countdown, Tick};

const TICK: Duration = Duration::from_secs(1);

/// What started a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    Manual,
    /// The countdown reached zero.
    Auto,
}

/// How a submit request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The backend accepted this submission.
    Submitted(AttemptId),
    /// The backend reported the attempt as already submitted or closed.
    /// Treated as success; the caller should show the results.
    AlreadyClosed(AttemptId),
    /// The guard refused the request because another submit is in flight or
    /// done. Nothing was sent.
    Ignored(SubmissionState),
}

impl SubmitOutcome {
    /// Whether the caller should move on to the results view.
    pub fn shows_results(&self) -> bool {
        matches!(
            self,
            SubmitOutcome::Submitted(_) | SubmitOutcome::AlreadyClosed(_)
        )
    }
}

/// A submit that failed. The guard is back to in-progress so it can be retried.
#[derive(Debug, Error)]
#[error("could not submit attempt {attempt_id}: {source}")]
pub struct SubmitError {
    pub attempt_id: AttemptId,
    pub trigger: SubmitTrigger,
    #[source]
    pub source: ApiError,
}

/// Result of the background save for one selection.
#[derive(Debug)]
pub enum SaveStatus {
    Saved,
    Failed(ApiError),
    /// The save task was cancelled before finishing.
    Aborted,
}

/// Handle to the best-effort save started by [`ExamSession::select`].
///
/// Dropping it lets the save finish in the background.
#[derive(Debug)]
pub struct SaveTicket {
    handle: JoinHandle<SaveStatus>,
}

impl SaveTicket {
    /// Wait for the save to finish.
    pub async fn settled(self) -> SaveStatus {
        self.handle.await.unwrap_or(SaveStatus::Aborted)
    }
}

/// Point-in-time view of a session for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub attempt_id: AttemptId,
    pub state: SubmissionState,
    pub remaining_secs: u64,
    pub answered: usize,
    pub total: usize,
    pub current_index: usize,
}

struct SessionState {
    answers: AnswerSheet,
    guard: SubmissionGuard,
    countdown: Countdown,
    cursor: QuestionCursor,
}

struct Shared {
    backend: Arc<dyn AttemptBackend>,
    attempt: Attempt,
    state: Mutex<SessionState>,
}

/// A student's live exam attempt. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ExamSession {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for ExamSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExamSession")
            .field("attempt_id", &self.shared.attempt.id)
            .finish_non_exhaustive()
    }
}

impl ExamSession {
    /// Start or resume the attempt for `exam_id`.
    pub async fn start(backend: Arc<dyn AttemptBackend>, exam_id: ExamId) -> Result<Self, InitError> {
        Self::start_at(backend, exam_id, Utc::now()).await
    }

    /// Like [`ExamSession::start`], computing remaining time as of `now`.
    #[instrument(skip(backend))]
    pub async fn start_at(
        backend: Arc<dyn AttemptBackend>,
        exam_id: ExamId,
        now: DateTime<Utc>,
    ) -> Result<Self, InitError> {
        let attempt = open_attempt(backend.as_ref(), exam_id).await?;
        Ok(Self::from_attempt(backend, attempt, now))
    }

    /// Build a session around an attempt that is already loaded.
    pub fn from_attempt(backend: Arc<dyn AttemptBackend>, attempt: Attempt, now: DateTime<Utc>) -> Self {
        let mut answers = AnswerSheet::new(&attempt.list_question);
        let restored = answers.restore(&attempt.list_answer);
        let countdown = Countdown::for_attempt(&attempt, now);
        tracing::info!(
            attempt_id = attempt.id,
            questions = answers.question_count(),
            restored,
            remaining_secs = countdown.remaining(),
            "exam session ready"
        );

        let state = SessionState {
            cursor: QuestionCursor::new(answers.question_count()),
            answers,
            guard: SubmissionGuard::new(),
            countdown,
        };
        Self {
            shared: Arc::new(Shared {
                backend,
                attempt,
                state: Mutex::new(state),
            }),
        }
    }

    pub fn attempt(&self) -> &Attempt {
        &self.shared.attempt
    }

    pub fn attempt_id(&self) -> AttemptId {
        self.shared.attempt.id
    }

    pub fn questions(&self) -> &[Question] {
        &self.shared.attempt.list_question
    }

    pub async fn state(&self) -> SubmissionState {
        self.shared.state.lock().await.guard.state()
    }

    pub async fn remaining_secs(&self) -> u64 {
        self.shared.state.lock().await.countdown.remaining()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let st = self.shared.state.lock().await;
        SessionSnapshot {
            attempt_id: self.attempt_id(),
            state: st.guard.state(),
            remaining_secs: st.countdown.remaining(),
            answered: st.answers.answered_count(),
            total: st.answers.question_count(),
            current_index: st.cursor.index(),
        }
    }

    pub async fn selected(&self, question_id: QuestionId) -> Option<ChoiceId> {
        self.shared.state.lock().await.answers.selected(question_id)
    }

    /// The answer list a submit would send right now.
    pub async fn payload(&self) -> Vec<Answer> {
        self.shared.state.lock().await.answers.payload()
    }

    /// The question under the cursor.
    pub async fn current_question(&self) -> Option<&Question> {
        let index = self.shared.state.lock().await.cursor.index();
        self.questions().get(index)
    }

    /// Move the cursor and return the new index.
    pub async fn navigate(&self, to: Navigate) -> usize {
        let mut st = self.shared.state.lock().await;
        match to {
            Navigate::Next => st.cursor.next(),
            Navigate::Previous => st.cursor.previous(),
            Navigate::To(i) => st.cursor.go_to(i),
        };
        st.cursor.index()
    }

    /// Record an answer locally and persist it in the background.
    ///
    /// The local map is updated before this returns. The save is best-effort:
    /// a failure is logged and never reported as an error here.
    pub async fn select(
        &self,
        question_id: QuestionId,
        choice_id: ChoiceId,
    ) -> Result<SaveTicket, SelectError> {
        {
            let mut st = self.shared.state.lock().await;
            let state = st.guard.state();
            if !state.accepts_answers() {
                return Err(SelectError::Locked(state));
            }
            st.answers.select(question_id, choice_id)?;
        }

        let backend = Arc::clone(&self.shared.backend);
        let attempt_id = self.attempt_id();
        let handle = tokio::spawn(async move {
            let answer = [Answer::new(question_id, Some(choice_id))];
            match backend.save_answers(attempt_id, &answer).await {
                Ok(()) => SaveStatus::Saved,
                Err(e) => {
                    tracing::warn!(attempt_id, question_id, choice_id, "failed to save answer: {e}");
                    SaveStatus::Failed(e)
                }
            }
        });
        Ok(SaveTicket { handle })
    }

    /// Submit the full answer set once.
    ///
    /// Concurrent calls are serialized by the guard: only the caller that
    /// moves it from in-progress to submitting reaches the backend; the rest
    /// get [`SubmitOutcome::Ignored`].
    #[instrument(skip(self), fields(attempt_id = self.attempt_id()))]
    pub async fn submit(&self, trigger: SubmitTrigger) -> Result<SubmitOutcome, SubmitError> {
        let payload = {
            let mut st = self.shared.state.lock().await;
            if !st.guard.try_begin() {
                let state = st.guard.state();
                tracing::debug!(%state, ?trigger, "submit ignored");
                return Ok(SubmitOutcome::Ignored(state));
            }
            st.answers.payload()
        };

        let attempt_id = self.attempt_id();
        tracing::info!(?trigger, entries = payload.len(), "submitting exam");
        let result = self.shared.backend.submit(attempt_id, &payload).await;

        let mut st = self.shared.state.lock().await;
        match result {
            Ok(()) => {
                st.guard.accept();
                st.countdown.finish();
                tracing::info!("exam submitted");
                Ok(SubmitOutcome::Submitted(attempt_id))
            }
            Err(e) if e.is_submission_closed() => {
                st.guard.accept();
                st.countdown.finish();
                tracing::info!("exam was already closed, treating as submitted");
                Ok(SubmitOutcome::AlreadyClosed(attempt_id))
            }
            Err(e) => {
                st.guard.fail();
                tracing::warn!(?trigger, "submit failed: {e}");
                Err(SubmitError {
                    attempt_id,
                    trigger,
                    source: e,
                })
            }
        }
    }

    /// Start the countdown task. Dropping the handle stops the countdown but
    /// leaves in-flight saves and submits alone.
    pub fn spawn_timer(&self) -> TimerHandle {
        let (tx, rx) = oneshot::channel();
        let task = tokio::spawn(run_timer(self.clone(), tx));
        TimerHandle {
            task,
            expired: Some(rx),
        }
    }
}

/// Cursor movement for [`ExamSession::navigate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigate {
    Next,
    Previous,
    To(usize),
}

/// Outcome of the automatic submission fired when time ran out.
pub type AutoSubmit = Result<SubmitOutcome, SubmitError>;

/// Owns the countdown task of a session.
///
/// Stopping or dropping the handle halts the countdown. An auto-submit that
/// already started keeps running and still settles the guard.
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
    expired: Option<oneshot::Receiver<AutoSubmit>>,
}

impl TimerHandle {
    /// Resolves with the auto-submit result once time runs out. Resolves to
    /// `None` if the timer stopped without expiring (the exam was submitted
    /// first), and never resolves again after that. Cancel-safe.
    pub async fn expired(&mut self) -> Option<AutoSubmit> {
        let Some(rx) = self.expired.as_mut() else {
            return std::future::pending().await;
        };
        let outcome = rx.await.ok();
        self.expired = None;
        outcome
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_timer(session: ExamSession, expired: oneshot::Sender<AutoSubmit>) {
    let mut interval = tokio::time::interval(TICK);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    interval.tick().await;

    loop {
        interval.tick().await;
        let tick = {
            let mut st = session.shared.state.lock().await;
            match st.guard.state() {
                SubmissionState::Submitted => return,
                // Frozen while a submit is in flight.
                SubmissionState::Submitting => continue,
                SubmissionState::InProgress => st.countdown.tick(),
            }
        };

        match tick {
            Tick::Running(_) => {}
            Tick::Idle => return,
            Tick::Expired => {
                tracing::info!(attempt_id = session.attempt_id(), "time is up, submitting");
                // Detached: stopping the timer must not cancel a submit in flight.
                tokio::spawn(async move {
                    let outcome = session.submit(SubmitTrigger::Auto).await;
                    let _ = expired.send(outcome);
                });
                return;
            }
        }
    }
}
