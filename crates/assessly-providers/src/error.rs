//! Provider error types.

use thiserror::Error;

use assessly_core::Difficulty;

/// Errors that can occur when a provider is asked for a bank.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider does not offer this subject at all.
    #[error("unknown subject '{subject}' (available: {available})")]
    UnknownSubject { subject: String, available: String },

    /// The subject exists but has no bank at the requested difficulty.
    #[error("no {difficulty} bank for subject '{subject}'")]
    BankNotFound {
        subject: String,
        difficulty: Difficulty,
    },

    /// The bank source directory could not be read.
    #[error("bank source unavailable: {0}")]
    SourceUnavailable(String),
}
