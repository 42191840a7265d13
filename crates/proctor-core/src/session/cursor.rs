//! Current-question navigation.

/// Index of the question on screen, clamped to `0..len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionCursor {
    index: usize,
    len: usize,
}

impl QuestionCursor {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.len
    }

    /// Jump to `index`. Out-of-range targets are ignored.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index < self.len {
            self.index = index;
            true
        } else {
            false
        }
    }

    pub fn next(&mut self) -> bool {
        self.go_to(self.index + 1)
    }

    pub fn previous(&mut self) -> bool {
        match self.index.checked_sub(1) {
            Some(i) => self.go_to(i),
            None => false,
        }
    }
}
