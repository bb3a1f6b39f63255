use serde::{Deserialize, Serialize};

use crate::validate::FieldErrors;

/// Forward-gated, freely-backward pointer into an ordered list of sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSequencer {
    index: usize,
    len: usize,
}

impl SectionSequencer {
    /// A form always has at least one section; `len` of zero is treated as one.
    pub fn new(len: usize) -> Self {
        Self {
            index: 0,
            len: len.max(1),
        }
    }

    pub fn at(index: usize, len: usize) -> Self {
        let mut sequencer = Self::new(len);
        sequencer.index = index.min(sequencer.len - 1);
        sequencer
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn section_count(&self) -> usize {
        self.len
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.len
    }

    /// Moves forward one section, capped at the last one. Returns the new index
    /// when it changed.
    pub fn advance(&mut self) -> Option<usize> {
        if self.is_last() {
            return None;
        }
        self.index += 1;
        Some(self.index)
    }

    /// Moves back one section, floored at zero.
    pub fn retreat(&mut self) -> Option<usize> {
        if self.is_first() {
            return None;
        }
        self.index -= 1;
        Some(self.index)
    }
}

/// Result of a `Next` or `Previous` transition.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Advanced { from: usize, to: usize },
    Retreated { from: usize, to: usize },
    /// Validation failed; the index did not change.
    Blocked(FieldErrors),
    /// The last section validated but there is nothing after it; use `SubmitFinal`.
    AtLastSection,
    AtFirstSection,
}

/// Result of the `SubmitFinal` transition.
#[derive(Debug, Clone, PartialEq)]
pub enum FinalCheck {
    Ready,
    Blocked(FieldErrors),
    NotOnLastSection { current: usize, last: usize },
    /// A submission is already in flight.
    InFlight,
}
