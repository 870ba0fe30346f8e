//! Core data model types for assessly.
//!
//! Questions and banks are immutable once constructed. Construction is the
//! only place their invariants are checked, so every `Question` in the system
//! has at least two options and a correct index that points at one of them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AssessmentError, AssessmentResult};

/// Minimum number of options a question must offer.
pub const MIN_OPTIONS: usize = 2;

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    prompt: String,
    options: Vec<String>,
    correct_index: usize,
    explanation: String,
}

impl Question {
    /// Build a question, checking the option count and correct index.
    ///
    /// `position` is only used to label the error.
    pub fn new(
        position: usize,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_index: usize,
        explanation: impl Into<String>,
    ) -> AssessmentResult<Self> {
        if options.len() < MIN_OPTIONS {
            return Err(AssessmentError::InvalidQuestion {
                index: position,
                reason: format!(
                    "needs at least {MIN_OPTIONS} options, found {}",
                    options.len()
                ),
            });
        }
        if correct_index >= options.len() {
            return Err(AssessmentError::InvalidQuestion {
                index: position,
                reason: format!(
                    "correct index {correct_index} is out of range for {} options",
                    options.len()
                ),
            });
        }
        Ok(Self {
            prompt: prompt.into(),
            options,
            correct_index,
            explanation: explanation.into(),
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// Text of the option at `index`, if it exists.
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }
}

/// Assessment difficulty levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "beginner"),
            Difficulty::Intermediate => write!(f, "intermediate"),
            Difficulty::Advanced => write!(f, "advanced"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = AssessmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" | "easy" => Ok(Difficulty::Beginner),
            "intermediate" | "medium" => Ok(Difficulty::Intermediate),
            "advanced" | "hard" => Ok(Difficulty::Advanced),
            other => Err(AssessmentError::UnknownDifficulty(other.to_string())),
        }
    }
}

/// A confirmed subject + difficulty pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    /// Subject key, lowercased (e.g. "physics").
    pub subject: String,
    pub difficulty: Difficulty,
}

impl Selection {
    /// Build a selection from raw user input.
    ///
    /// Blank subject or difficulty fails with `SelectionIncomplete` before the
    /// difficulty is parsed.
    pub fn from_input(subject: &str, difficulty: &str) -> AssessmentResult<Self> {
        let subject = subject.trim();
        let difficulty = difficulty.trim();
        if subject.is_empty() || difficulty.is_empty() {
            return Err(AssessmentError::SelectionIncomplete);
        }
        Ok(Self {
            subject: subject.to_lowercase(),
            difficulty: difficulty.parse()?,
        })
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.subject, self.difficulty)
    }
}

/// An ordered, immutable set of questions for one assessment attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionBank {
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    selection: Selection,
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(title: impl Into<String>, selection: Selection, questions: Vec<Question>) -> Self {
        Self {
            title: title.into(),
            description: None,
            selection,
            questions,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Letter label for an option index (`0` → `A`).
pub fn option_label(index: usize) -> String {
    if index < 26 {
        char::from(b'A' + index as u8).to_string()
    } else {
        (index + 1).to_string()
    }
}

/// Parse a user-entered option label into a zero-based index.
///
/// Accepts a single letter (`a`/`A`) or a one-based number. Anything else,
/// including zero, negative numbers and labels past the last option, is an
/// `InvalidSelection`.
pub fn parse_option_label(input: &str, option_count: usize) -> AssessmentResult<usize> {
    let trimmed = input.trim();
    let invalid = || AssessmentError::InvalidSelection {
        input: trimmed.to_string(),
        option_count,
    };

    let index = match trimmed.parse::<i64>() {
        Ok(n) if n >= 1 => (n - 1) as usize,
        Ok(_) => return Err(invalid()),
        Err(_) => {
            let mut chars = trimmed.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphabetic() => {
                    (c.to_ascii_uppercase() as u8 - b'A') as usize
                }
                _ => return Err(invalid()),
            }
        }
    };

    if index < option_count {
        Ok(index)
    } else {
        Err(invalid())
    }
}
