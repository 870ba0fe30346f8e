//! Built-in sample bank.
//!
//! Serves the same short mixed-science demo bank for every built-in subject
//! and difficulty, so assessly works with no bank files at all.

use async_trait::async_trait;

use assessly_core::model::{Difficulty, Question, QuestionBank, Selection};
use assessly_core::traits::{QuestionBankProvider, SubjectInfo};

use crate::error::ProviderError;

/// Subjects offered by the built-in provider, as `(id, display name)`.
pub const BUILTIN_SUBJECTS: [(&str, &str); 4] = [
    ("mathematics", "Mathematics"),
    ("physics", "Physics"),
    ("chemistry", "Chemistry"),
    ("biology", "Biology"),
];

/// `(prompt, options, correct, explanation)`
type SampleQuestion = (&'static str, [&'static str; 4], usize, &'static str);

const SAMPLE_QUESTIONS: [SampleQuestion; 3] = [
    (
        "What is the derivative of x² + 3x - 5?",
        ["2x + 3", "x² + 3", "2x - 5", "3x + 2"],
        0,
        "Using the power rule: d/dx(x²) = 2x, d/dx(3x) = 3, d/dx(-5) = 0",
    ),
    (
        "Which of the following represents simple harmonic motion?",
        [
            "x = A sin(ωt + φ)",
            "x = At + B",
            "x = Ae^(-t)",
            "x = A log(t)",
        ],
        0,
        "Simple harmonic motion follows the sinusoidal pattern x = A sin(ωt + φ)",
    ),
    (
        "What is the molecular formula for glucose?",
        ["C₆H₁₂O₆", "C₆H₆O₆", "C₅H₁₀O₅", "C₁₂H₂₂O₁₁"],
        0,
        "Glucose has 6 carbon atoms, 12 hydrogen atoms, and 6 oxygen atoms",
    ),
];

/// Provider backed by the compiled-in sample questions.
pub struct BuiltinProvider;

impl BuiltinProvider {
    /// Build the sample bank for `selection`, without checking the subject.
    pub fn sample_bank(selection: &Selection) -> QuestionBank {
        let questions = SAMPLE_QUESTIONS
            .iter()
            .enumerate()
            .filter_map(|(i, (prompt, options, correct, explanation))| {
                Question::new(
                    i,
                    *prompt,
                    options.iter().map(|o| o.to_string()).collect(),
                    *correct,
                    *explanation,
                )
                .ok()
            })
            .collect();

        let name = BUILTIN_SUBJECTS
            .iter()
            .find(|(id, _)| *id == selection.subject)
            .map(|(_, name)| *name)
            .unwrap_or("Sample");

        QuestionBank::new(
            format!("{name} sample assessment"),
            selection.clone(),
            questions,
        )
    }
}

#[async_trait]
impl QuestionBankProvider for BuiltinProvider {
    fn name(&self) -> &str {
        "builtin"
    }

    async fn load(&self, selection: &Selection) -> anyhow::Result<QuestionBank> {
        if !BUILTIN_SUBJECTS
            .iter()
            .any(|(id, _)| *id == selection.subject)
        {
            return Err(ProviderError::UnknownSubject {
                subject: selection.subject.clone(),
                available: BUILTIN_SUBJECTS
                    .iter()
                    .map(|(id, _)| *id)
                    .collect::<Vec<_>>()
                    .join(", "),
            }
            .into());
        }
        tracing::debug!(
            "serving the built-in sample bank for {selection}; bank files give subject-specific questions"
        );
        Ok(Self::sample_bank(selection))
    }

    fn available_subjects(&self) -> Vec<SubjectInfo> {
        BUILTIN_SUBJECTS
            .iter()
            .map(|(id, name)| SubjectInfo {
                id: id.to_string(),
                name: name.to_string(),
                difficulties: Difficulty::ALL.to_vec(),
            })
            .collect()
    }
}
