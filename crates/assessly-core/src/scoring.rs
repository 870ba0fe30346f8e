//! Scoring of a finished attempt.
//!
//! `score` is a pure function of the bank and the answer map. The session
//! calls it exactly once when it completes and caches the result.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::QuestionBank;

/// Sparse answer map: question index → chosen option index.
pub type Answers = BTreeMap<usize, usize>;

/// Outcome for one question, in bank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    /// The option the user picked, if any.
    pub selected: Option<usize>,
    pub correct: usize,
    pub is_correct: bool,
}

/// Result of scoring a completed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub correct_count: usize,
    pub total_count: usize,
    /// Rounded to the nearest integer, half up. Zero for an empty bank.
    pub percentage: u8,
    pub per_question: Vec<QuestionOutcome>,
}

impl ScoreResult {
    /// The result of an attempt over a bank with no questions.
    pub fn empty() -> Self {
        Self {
            correct_count: 0,
            total_count: 0,
            percentage: 0,
            per_question: Vec::new(),
        }
    }

    pub fn band(&self) -> GradeBand {
        GradeBand::for_percentage(self.percentage)
    }
}

/// Score `answers` against `bank`.
///
/// Unanswered questions count as incorrect. Answers for indices past the end
/// of the bank are ignored.
pub fn score(bank: &QuestionBank, answers: &Answers) -> ScoreResult {
    let per_question: Vec<QuestionOutcome> = bank
        .questions()
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let selected = answers.get(&i).copied();
            QuestionOutcome {
                selected,
                correct: q.correct_index(),
                is_correct: selected == Some(q.correct_index()),
            }
        })
        .collect();

    let correct_count = per_question.iter().filter(|o| o.is_correct).count();
    let total_count = per_question.len();

    ScoreResult {
        correct_count,
        total_count,
        percentage: percentage(correct_count, total_count),
        per_question,
    }
}

/// `round(100 * correct / total)` in integer arithmetic, with `total == 0`
/// yielding 0.
pub fn percentage(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total);
    ((200 * correct + total) / (2 * total)) as u8
}

/// Coarse performance bands used when presenting a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GradeBand {
    Excellent,
    Good,
    NeedsWork,
}

impl GradeBand {
    pub fn for_percentage(percentage: u8) -> Self {
        if percentage >= 90 {
            GradeBand::Excellent
        } else if percentage >= 75 {
            GradeBand::Good
        } else {
            GradeBand::NeedsWork
        }
    }
}

impl fmt::Display for GradeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradeBand::Excellent => write!(f, "excellent"),
            GradeBand::Good => write!(f, "good"),
            GradeBand::NeedsWork => write!(f, "needs work"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Question, Selection};

    fn bank(correct: &[usize]) -> QuestionBank {
        let questions = correct
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                Question::new(
                    i,
                    format!("question {i}"),
                    vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    c,
                    "",
                )
                .unwrap()
            })
            .collect();
        QuestionBank::new(
            "test",
            Selection::from_input("math", "beginner").unwrap(),
            questions,
        )
    }

    fn answers(pairs: &[(usize, usize)]) -> Answers {
        pairs.iter().copied().collect()
    }

    #[test]
    fn two_of_three_rounds_to_67() {
        let b = bank(&[0, 0, 0]);
        let result = score(&b, &answers(&[(0, 0), (1, 1), (2, 0)]));
        assert_eq!(result.correct_count, 2);
        assert_eq!(result.total_count, 3);
        assert_eq!(result.percentage, 67);
        assert!(!result.per_question[1].is_correct);
        assert_eq!(result.per_question[1].selected, Some(1));
    }

    #[test]
    fn total_count_matches_bank_length() {
        for n in 0..6 {
            let b = bank(&vec![1; n]);
            assert_eq!(score(&b, &Answers::new()).total_count, n);
        }
    }

    #[test]
    fn no_answers_scores_zero() {
        let b = bank(&[2, 1, 0, 3]);
        let result = score(&b, &Answers::new());
        assert_eq!(result.correct_count, 0);
        assert_eq!(result.percentage, 0);
        assert!(result.per_question.iter().all(|o| o.selected.is_none()));
    }

    #[test]
    fn all_correct_is_100() {
        let correct = [3, 1, 0, 2, 2];
        let b = bank(&correct);
        let a: Answers = correct.iter().copied().enumerate().collect();
        assert_eq!(score(&b, &a).percentage, 100);
    }

    #[test]
    fn score_is_pure() {
        let b = bank(&[0, 1, 2]);
        let a = answers(&[(0, 0), (2, 1)]);
        assert_eq!(score(&b, &a), score(&b, &a));
    }

    #[test]
    fn empty_bank_guards_division() {
        let b = bank(&[]);
        assert_eq!(score(&b, &Answers::new()), ScoreResult::empty());
    }

    #[test]
    fn answers_past_bank_are_ignored() {
        let b = bank(&[0]);
        let result = score(&b, &answers(&[(0, 0), (5, 0)]));
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.total_count, 1);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(1, 8), 13); // 12.5
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn grade_bands() {
        assert_eq!(GradeBand::for_percentage(90), GradeBand::Excellent);
        assert_eq!(GradeBand::for_percentage(89), GradeBand::Good);
        assert_eq!(GradeBand::for_percentage(75), GradeBand::Good);
        assert_eq!(GradeBand::for_percentage(74), GradeBand::NeedsWork);
    }
}
