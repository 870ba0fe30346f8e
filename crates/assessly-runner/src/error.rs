//! Runner error types.

use thiserror::Error;

use assessly_core::AssessmentError;

/// Errors returned when sending commands to a running session.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The session refused the command; its state is unchanged.
    #[error(transparent)]
    Rejected(#[from] AssessmentError),

    /// The driver task has stopped and can no longer take commands.
    #[error("session driver has stopped")]
    Stopped,
}

impl RunnerError {
    /// The underlying assessment error, if the session rejected the command.
    pub fn as_assessment(&self) -> Option<&AssessmentError> {
        match self {
            RunnerError::Rejected(e) => Some(e),
            RunnerError::Stopped => None,
        }
    }
}
