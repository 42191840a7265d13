//! Graded attempt helpers for the result and review views.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{Attempt, Choice, Question, UserId};

/// How a question was answered in a graded attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    Wrong,
    Unanswered,
}

/// The choice the student picked, if any.
pub fn selected_choice(question: &Question) -> Option<&Choice> {
    question.choices.iter().find(|c| c.is_selected == Some(true))
}

/// A question counts as correct when the selected choices are exactly the
/// correct ones, and there is at least one correct choice.
pub fn verdict(question: &Question) -> Verdict {
    let selected: Vec<_> = question
        .choices
        .iter()
        .filter(|c| c.is_selected == Some(true))
        .map(|c| c.id)
        .collect();
    if selected.is_empty() {
        return Verdict::Unanswered;
    }
    let correct: Vec<_> = question
        .choices
        .iter()
        .filter(|c| c.is_correct == Some(true))
        .map(|c| c.id)
        .collect();
    if !correct.is_empty() && selected == correct {
        Verdict::Correct
    } else {
        Verdict::Wrong
    }
}

/// Questions in display order. Questions without an order sort first, the
/// rest keep their relative position.
pub fn ordered_questions(attempt: &Attempt) -> Vec<&Question> {
    let mut questions: Vec<_> = attempt.list_question.iter().collect();
    questions.sort_by_key(|q| q.order.unwrap_or(0));
    questions
}

/// Score as a percentage of the maximum, when both are known.
pub fn score_percent(attempt: &Attempt) -> Option<f64> {
    match (attempt.score, attempt.total_score) {
        (Some(score), Some(total)) if total > 0.0 => Some(score / total * 100.0),
        _ => None,
    }
}

/// Whether `viewer` may open the per-question review of `attempt` at `now`.
///
/// Allowed for the exam's creator, for the student who finished the attempt,
/// and for anyone once the attempt is finished and the exam has closed.
pub fn can_review(attempt: &Attempt, viewer: Option<UserId>, now: DateTime<Utc>) -> bool {
    let Some(exam) = attempt.exam.as_ref() else {
        return false;
    };
    if viewer.is_some() && exam.creator_id == viewer {
        return true;
    }
    if !attempt.is_finished() {
        return false;
    }
    if viewer.is_some() && attempt.user_id == viewer {
        return true;
    }
    exam.latest_start_time.is_some_and(|closes| now >= closes)
}

/// Per-verdict counts, computed locally from the review data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VerdictTally {
    pub correct: u32,
    pub wrong: u32,
    pub unanswered: u32,
}

pub fn tally(attempt: &Attempt) -> VerdictTally {
    let mut t = VerdictTally::default();
    for q in &attempt.list_question {
        match verdict(q) {
            Verdict::Correct => t.correct += 1,
            Verdict::Wrong => t.wrong += 1,
            Verdict::Unanswered => t.unanswered += 1,
        }
    }
    t
}
