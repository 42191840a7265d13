//! Local answer map for an attempt.

use std::collections::HashMap;

use thiserror::Error;

use crate::model::{Answer, ChoiceId, Question, QuestionId};

/// Why a selection was refused locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("question {0} is not part of this attempt")]
    UnknownQuestion(QuestionId),

    #[error("choice {choice_id} does not belong to question {question_id}")]
    UnknownChoice {
        question_id: QuestionId,
        choice_id: ChoiceId,
    },

    #[error("answers are locked while the exam is {0}")]
    Locked(crate::session::SubmissionState),
}

/// The draft answers for every question of an attempt.
///
/// Holds at most one choice per question. The question order of the attempt
/// is kept so the submit payload lists questions the way the exam does.
#[derive(Debug, Clone, Default)]
pub struct AnswerSheet {
    order: Vec<QuestionId>,
    choices: HashMap<QuestionId, Vec<ChoiceId>>,
    selected: HashMap<QuestionId, ChoiceId>,
}

impl AnswerSheet {
    pub fn new(questions: &[Question]) -> Self {
        let mut order = Vec::with_capacity(questions.len());
        let mut choices = HashMap::with_capacity(questions.len());
        for q in questions {
            if choices.contains_key(&q.id) {
                continue;
            }
            order.push(q.id);
            choices.insert(q.id, q.choices.iter().map(|c| c.id).collect());
        }
        Self {
            order,
            choices,
            selected: HashMap::new(),
        }
    }

    /// Load answers the backend already recorded. Null choices and entries
    /// that do not match the attempt's questions are skipped.
    pub fn restore(&mut self, recorded: &[Answer]) -> usize {
        let mut restored = 0;
        for answer in recorded {
            let Some(choice_id) = answer.choice_id else {
                continue;
            };
            if self.validate(answer.question_id, choice_id).is_ok() {
                self.selected.insert(answer.question_id, choice_id);
                restored += 1;
            } else {
                tracing::debug!(
                    question_id = answer.question_id,
                    choice_id,
                    "ignoring recorded answer that does not match the attempt"
                );
            }
        }
        restored
    }

    fn validate(&self, question_id: QuestionId, choice_id: ChoiceId) -> Result<(), SelectError> {
        let choices = self
            .choices
            .get(&question_id)
            .ok_or(SelectError::UnknownQuestion(question_id))?;
        if !choices.contains(&choice_id) {
            return Err(SelectError::UnknownChoice {
                question_id,
                choice_id,
            });
        }
        Ok(())
    }

    /// Record `choice_id` as the answer to `question_id`, replacing any
    /// earlier choice. Returns `true` if the answer changed.
    pub fn select(&mut self, question_id: QuestionId, choice_id: ChoiceId) -> Result<bool, SelectError> {
        self.validate(question_id, choice_id)?;
        let previous = self.selected.insert(question_id, choice_id);
        Ok(previous != Some(choice_id))
    }

    pub fn selected(&self, question_id: QuestionId) -> Option<ChoiceId> {
        self.selected.get(&question_id).copied()
    }

    pub fn is_answered(&self, question_id: QuestionId) -> bool {
        self.selected.contains_key(&question_id)
    }

    pub fn answered_count(&self) -> usize {
        self.selected.len()
    }

    pub fn question_count(&self) -> usize {
        self.order.len()
    }

    /// One entry per question, in exam order, with `None` for unanswered.
    pub fn payload(&self) -> Vec<Answer> {
        self.order
            .iter()
            .map(|&q| Answer::new(q, self.selected(q)))
            .collect()
    }
}
