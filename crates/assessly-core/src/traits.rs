//! Core trait definitions for question bank providers.
//!
//! Implemented by the `assessly-providers` crate. The engine only ever talks
//! to a provider through this trait, so a real generator can replace the
//! built-in sample bank without touching session or scoring code.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{Difficulty, QuestionBank, Selection};

/// Source of question banks.
#[async_trait]
pub trait QuestionBankProvider: Send + Sync {
    /// Human-readable provider name (e.g. "builtin").
    fn name(&self) -> &str;

    /// Produce the bank for a confirmed subject and difficulty.
    async fn load(&self, selection: &Selection) -> anyhow::Result<QuestionBank>;

    /// Subjects this provider can serve.
    fn available_subjects(&self) -> Vec<SubjectInfo>;
}

/// A subject a provider offers, and at which difficulties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectInfo {
    /// Lowercase subject key (e.g. "chemistry").
    pub id: String,
    /// Display name (e.g. "Chemistry").
    pub name: String,
    pub difficulties: Vec<Difficulty>,
}
