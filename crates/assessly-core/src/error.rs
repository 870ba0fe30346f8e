//! Assessment error types.
//!
//! Every variant is an expected, recoverable condition. The presentation
//! layer matches on these to decide what to tell the user; none of them
//! should ever terminate the process.

use thiserror::Error;

use crate::session::Phase;

/// Errors surfaced by bank creation and session transitions.
#[derive(Debug, Error)]
pub enum AssessmentError {
    /// Subject or difficulty was not chosen when a session was requested.
    #[error("selection incomplete: both subject and difficulty are required")]
    SelectionIncomplete,

    /// The difficulty string does not name a known level.
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),

    /// The chosen option does not exist on the current question.
    #[error("invalid selection '{input}': choose one of {option_count} options")]
    InvalidSelection { input: String, option_count: usize },

    /// Tried to move past a question that has no recorded answer.
    #[error("an answer is required for question {} before advancing", .index + 1)]
    AnswerRequired { index: usize },

    /// The action is not accepted in the session's current phase.
    #[error("cannot {action} while the assessment is {phase}")]
    InvalidTransition { action: &'static str, phase: Phase },

    /// A question record violates its invariants.
    #[error("invalid question {index}: {reason}")]
    InvalidQuestion { index: usize, reason: String },

    /// The bank provider failed to produce a bank.
    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}

impl AssessmentError {
    /// Returns `true` if the session state was left untouched by the failed
    /// action, so the adapter can simply re-prompt.
    pub fn leaves_state_unchanged(&self) -> bool {
        matches!(
            self,
            AssessmentError::InvalidSelection { .. }
                | AssessmentError::AnswerRequired { .. }
                | AssessmentError::InvalidTransition { .. }
        )
    }
}

/// Convenience alias used across the crate.
pub type AssessmentResult<T> = Result<T, AssessmentError>;
