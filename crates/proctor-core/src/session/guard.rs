//! Submission guard: the state machine that keeps an attempt from being
//! submitted twice.

use std::fmt;

/// Where an attempt is in its submission lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    /// Answers may change and a submit may start.
    #[default]
    InProgress,
    /// A submit call is in flight.
    Submitting,
    /// Terminal.
    Submitted,
}

/// Inputs to the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionEvent {
    /// A manual or automatic submit was requested.
    Begin,
    /// The backend accepted the submission, or reported it already closed.
    Accepted,
    /// The submit call failed for any other reason.
    Failed,
}

impl SubmissionState {
    /// Pure transition function. `None` means the event is not allowed in
    /// this state and must be ignored by the caller.
    pub fn next(self, event: SubmissionEvent) -> Option<SubmissionState> {
        use SubmissionEvent::*;
        use SubmissionState::*;

        match (self, event) {
            (InProgress, Begin) => Some(Submitting),
            (Submitting, Accepted) => Some(Submitted),
            (Submitting, Failed) => Some(InProgress),
            _ => None,
        }
    }

    pub fn accepts_answers(self) -> bool {
        self == SubmissionState::InProgress
    }

    pub fn is_terminal(self) -> bool {
        self == SubmissionState::Submitted
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionState::InProgress => write!(f, "in progress"),
            SubmissionState::Submitting => write!(f, "submitting"),
            SubmissionState::Submitted => write!(f, "submitted"),
        }
    }
}

/// Holds the current [`SubmissionState`] and applies events to it.
#[derive(Debug, Default)]
pub struct SubmissionGuard {
    state: SubmissionState,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    /// Apply `event`. Returns `false` and leaves the state untouched when the
    /// transition is not allowed.
    pub fn apply(&mut self, event: SubmissionEvent) -> bool {
        match self.state.next(event) {
            Some(next) => {
                tracing::debug!(from = %self.state, to = %next, ?event, "submission transition");
                self.state = next;
                true
            }
            None => false,
        }
    }

    /// Claim the right to submit. Only one caller can win until the claim is
    /// released by [`SubmissionGuard::fail`].
    pub fn try_begin(&mut self) -> bool {
        self.apply(SubmissionEvent::Begin)
    }

    pub fn accept(&mut self) -> bool {
        self.apply(SubmissionEvent::Accepted)
    }

    pub fn fail(&mut self) -> bool {
        self.apply(SubmissionEvent::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SubmissionEvent::*;
    use SubmissionState::*;

    #[test]
    fn happy_path() {
        let mut guard = SubmissionGuard::new();
        assert_eq!(guard.state(), InProgress);
        assert!(guard.try_begin());
        assert_eq!(guard.state(), Submitting);
        assert!(guard.accept());
        assert_eq!(guard.state(), Submitted);
    }

    #[test]
    fn second_begin_is_rejected_while_submitting() {
        let mut guard = SubmissionGuard::new();
        assert!(guard.try_begin());
        assert!(!guard.try_begin());
        assert_eq!(guard.state(), Submitting);
    }

    #[test]
    fn failure_reopens_for_retry() {
        let mut guard = SubmissionGuard::new();
        guard.try_begin();
        assert!(guard.fail());
        assert_eq!(guard.state(), InProgress);
        assert!(guard.try_begin());
    }

    #[test]
    fn submitted_is_terminal() {
        for event in [Begin, Accepted, Failed] {
            assert_eq!(Submitted.next(event), None);
        }
        assert!(Submitted.is_terminal());
        assert!(!Submitted.accepts_answers());
    }

    #[test]
    fn results_only_arrive_while_submitting() {
        assert_eq!(InProgress.next(Accepted), None);
        assert_eq!(InProgress.next(Failed), None);
    }
}
