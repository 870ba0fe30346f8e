//! assessly-core: assessment session state machine, scoring, and data model.
//!
//! This crate defines the question bank model, the session lifecycle, the
//! pure scoring function, and the provider trait that the rest of assessly
//! builds on.

pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod scoring;
pub mod session;
pub mod time;
pub mod traits;

pub use engine::AssessmentEngine;
pub use error::{AssessmentError, AssessmentResult};
pub use model::{Difficulty, Question, QuestionBank, Selection};
pub use scoring::{score, Answers, GradeBand, ScoreResult};
pub use session::{AssessmentSession, CompletionReason, Phase, SessionConfig};
