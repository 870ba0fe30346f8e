//! Assessment reports with JSON persistence and history loading.
//!
//! A report is the finished record of one attempt. Reports are written once
//! and only ever read back for the history listing; an in-progress session is
//! never stored.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Difficulty, QuestionBank};
use crate::scoring::{GradeBand, ScoreResult};
use crate::session::{AssessmentSession, CompletionReason};

/// A complete assessment report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the bank that was attempted.
    pub bank: BankSummary,
    /// Configured countdown length in seconds.
    pub duration_secs: u32,
    /// Seconds taken off the countdown.
    pub time_taken_secs: u32,
    /// How the attempt ended.
    pub completion: CompletionReason,
    pub score: ScoreResult,
    pub band: GradeBand,
    /// Per-question review rows, in bank order.
    pub review: Vec<ReviewItem>,
}

/// Summary of a bank (without the full question list).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankSummary {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub subject: String,
    pub difficulty: Difficulty,
    pub question_count: usize,
}

/// One reviewed question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewItem {
    /// One-based question number.
    pub number: usize,
    pub prompt: String,
    pub options: Vec<String>,
    pub selected: Option<usize>,
    pub correct: usize,
    pub is_correct: bool,
    pub explanation: String,
}

impl ReviewItem {
    /// Text of the chosen option, if one was chosen.
    pub fn selected_text(&self) -> Option<&str> {
        self.selected
            .and_then(|i| self.options.get(i))
            .map(String::as_str)
    }

    pub fn correct_text(&self) -> &str {
        self.options
            .get(self.correct)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// Pair each question with its scored outcome.
pub fn review_items(bank: &QuestionBank, score: &ScoreResult) -> Vec<ReviewItem> {
    bank.questions()
        .iter()
        .zip(&score.per_question)
        .enumerate()
        .map(|(i, (q, outcome))| ReviewItem {
            number: i + 1,
            prompt: q.prompt().to_string(),
            options: q.options().to_vec(),
            selected: outcome.selected,
            correct: outcome.correct,
            is_correct: outcome.is_correct,
            explanation: q.explanation().to_string(),
        })
        .collect()
}

impl AssessmentReport {
    /// Build a report from a completed session.
    pub fn from_session(session: &AssessmentSession) -> Result<Self> {
        let (Some(score), Some(completion)) = (session.result(), session.completion()) else {
            anyhow::bail!(
                "cannot report on an assessment that is {}",
                session.phase()
            );
        };
        let bank = session.bank();

        Ok(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            bank: BankSummary {
                title: bank.title().to_string(),
                description: bank.description().map(str::to_string),
                subject: bank.selection().subject.clone(),
                difficulty: bank.selection().difficulty,
                question_count: bank.len(),
            },
            duration_secs: session.config().duration_secs,
            time_taken_secs: session.elapsed_secs(),
            completion,
            score: score.clone(),
            band: score.band(),
            review: review_items(bank, score),
        })
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AssessmentReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}

/// Load every report in `dir`, newest first.
///
/// A missing directory is an empty history. Files that are not valid reports
/// are skipped with a warning.
pub fn load_history(dir: &Path) -> Result<Vec<AssessmentReport>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut reports = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            match AssessmentReport::load_json(&path) {
                Ok(report) => reports.push(report),
                Err(e) => tracing::warn!("skipping {}: {:#}", path.display(), e),
            }
        }
    }

    reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::model::{Question, Selection};
    use crate::session::SessionConfig;

    fn completed_session(answers: &[usize]) -> AssessmentSession {
        let questions = (0..3)
            .map(|i| {
                Question::new(
                    i,
                    format!("question {i}"),
                    vec!["right".into(), "wrong".into()],
                    0,
                    format!("explanation {i}"),
                )
                .unwrap()
            })
            .collect();
        let bank = QuestionBank::new(
            "Mixed sample",
            Selection::from_input("physics", "advanced").unwrap(),
            questions,
        )
        .with_description("Oscillations and waves");
        let mut session = AssessmentSession::new(Arc::new(bank), SessionConfig::default());
        session.start().unwrap();
        for &a in answers {
            session.tick();
            session.select_answer(a).unwrap();
            session.advance().unwrap();
        }
        session
    }

    #[test]
    fn report_from_completed_session() {
        let session = completed_session(&[0, 1, 0]);
        let report = AssessmentReport::from_session(&session).unwrap();

        assert_eq!(report.bank.subject, "physics");
        assert_eq!(
            report.bank.description.as_deref(),
            Some("Oscillations and waves")
        );
        assert_eq!(report.bank.question_count, 3);
        assert_eq!(report.time_taken_secs, 3);
        assert_eq!(report.completion, CompletionReason::Finished);
        assert_eq!(report.score.percentage, 67);
        assert_eq!(report.band, GradeBand::NeedsWork);
        assert_eq!(report.review.len(), 3);
        assert_eq!(report.review[1].selected_text(), Some("wrong"));
        assert_eq!(report.review[1].correct_text(), "right");
        assert_eq!(report.review[1].number, 2);
    }

    #[test]
    fn report_requires_completion() {
        let session = completed_session(&[0]);
        let err = AssessmentReport::from_session(&session).unwrap_err();
        assert!(err.to_string().contains("active"));
    }

    #[test]
    fn json_roundtrip() {
        let report = AssessmentReport::from_session(&completed_session(&[0, 0, 0])).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        report.save_json(&path).unwrap();
        let loaded = AssessmentReport::load_json(&path).unwrap();

        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.score, report.score);
        assert_eq!(loaded.review.len(), 3);
        assert_eq!(loaded.bank.description, report.bank.description);
    }

    #[test]
    fn history_is_newest_first_and_skips_junk() {
        let dir = tempfile::tempdir().unwrap();
        let mut older = AssessmentReport::from_session(&completed_session(&[1, 1, 1])).unwrap();
        older.created_at = Utc::now() - chrono::Duration::days(2);
        let newer = AssessmentReport::from_session(&completed_session(&[0, 0, 0])).unwrap();

        older.save_json(&dir.path().join("a.json")).unwrap();
        newer.save_json(&dir.path().join("b.json")).unwrap();
        std::fs::write(dir.path().join("c.json"), "{ not a report").unwrap();

        let history = load_history(dir.path()).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, newer.id);
        assert_eq!(history[1].score.percentage, 0);
    }

    #[test]
    fn missing_history_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let history = load_history(&dir.path().join("nothing-here")).unwrap();
        assert!(history.is_empty());
    }
}
