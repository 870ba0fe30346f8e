//! The assessment session state machine.
//!
//! ```text
//!   Idle ──start──▶ Active ◀──resume── Paused
//!                    │  └────pause────────▲
//!                    │
//!    advance (last) / complete / time expired
//!                    ▼
//!                Completed ──restart──▶ (new Idle session)
//! ```
//!
//! A failed transition never changes state. The score is computed once, on
//! the transition into `Completed`, and cached.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{AssessmentError, AssessmentResult};
use crate::model::{option_label, Question, QuestionBank};
use crate::scoring::{score, Answers, ScoreResult};
use crate::time::DEFAULT_DURATION_SECS;

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Active,
    Paused,
    Completed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Active => write!(f, "active"),
            Phase::Paused => write!(f, "paused"),
            Phase::Completed => write!(f, "completed"),
        }
    }
}

/// Why a session reached `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionReason {
    /// Advanced past the last question.
    Finished,
    /// Submitted early with `complete()`.
    Submitted,
    /// The countdown reached zero.
    TimeExpired,
    /// The bank had no questions.
    EmptyBank,
}

impl fmt::Display for CompletionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionReason::Finished => write!(f, "finished"),
            CompletionReason::Submitted => write!(f, "submitted"),
            CompletionReason::TimeExpired => write!(f, "time expired"),
            CompletionReason::EmptyBank => write!(f, "empty bank"),
        }
    }
}

/// Per-session policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Countdown length in seconds.
    pub duration_secs: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_DURATION_SECS,
        }
    }
}

/// What `advance()` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the question at this index.
    Moved(usize),
    /// That was the last question; the session is now completed.
    Completed,
}

/// What a countdown tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The session was not active; nothing changed.
    Ignored,
    /// One second was taken off the clock.
    Counted { remaining_secs: u32 },
    /// The clock hit zero and the session completed.
    Expired,
}

/// Read-only view of a session for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub current_index: usize,
    pub question_count: usize,
    /// See [`AssessmentSession::progress_percent`].
    pub progress_percent: u8,
    pub remaining_secs: u32,
    pub answered: usize,
    /// Option recorded for the current question, if any.
    pub selected: Option<usize>,
    pub completion: Option<CompletionReason>,
    pub result: Option<ScoreResult>,
}

/// One attempt at a question bank.
#[derive(Debug, Clone)]
pub struct AssessmentSession {
    bank: Arc<QuestionBank>,
    config: SessionConfig,
    phase: Phase,
    current_index: usize,
    answers: Answers,
    remaining_secs: u32,
    completion: Option<CompletionReason>,
    result: Option<ScoreResult>,
}

impl AssessmentSession {
    /// Create an idle session over `bank`.
    pub fn new(bank: Arc<QuestionBank>, config: SessionConfig) -> Self {
        Self {
            bank,
            config,
            phase: Phase::Idle,
            current_index: 0,
            answers: Answers::new(),
            remaining_secs: config.duration_secs,
            completion: None,
            result: None,
        }
    }

    pub fn bank(&self) -> &Arc<QuestionBank> {
        &self.bank
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Seconds taken off the clock so far.
    pub fn elapsed_secs(&self) -> u32 {
        self.config.duration_secs.saturating_sub(self.remaining_secs)
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn answer_for(&self, index: usize) -> Option<usize> {
        self.answers.get(&index).copied()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.bank.get(self.current_index)
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.bank.len()
    }

    /// Position through the bank as a rounded percentage, counting the
    /// current question as reached.
    pub fn progress_percent(&self) -> u8 {
        if self.bank.is_empty() {
            return 0;
        }
        let reached = (self.current_index + 1).min(self.bank.len());
        crate::scoring::percentage(reached, self.bank.len())
    }

    pub fn completion(&self) -> Option<CompletionReason> {
        self.completion
    }

    /// The cached score, present once the session is completed.
    pub fn result(&self) -> Option<&ScoreResult> {
        self.result.as_ref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            current_index: self.current_index,
            question_count: self.bank.len(),
            progress_percent: self.progress_percent(),
            remaining_secs: self.remaining_secs,
            answered: self.answers.len(),
            selected: self.answer_for(self.current_index),
            completion: self.completion,
            result: self.result.clone(),
        }
    }

    /// `Idle → Active`. An empty bank goes straight to `Completed`.
    pub fn start(&mut self) -> AssessmentResult<()> {
        self.require(Phase::Idle, "start")?;

        self.current_index = 0;
        self.answers.clear();
        self.remaining_secs = self.config.duration_secs;
        self.phase = Phase::Active;
        tracing::info!(
            bank = self.bank.title(),
            questions = self.bank.len(),
            duration_secs = self.config.duration_secs,
            "assessment started"
        );

        if self.bank.is_empty() {
            tracing::warn!(bank = self.bank.title(), "bank has no questions");
            self.finish(CompletionReason::EmptyBank);
        } else if self.remaining_secs == 0 {
            self.finish(CompletionReason::TimeExpired);
        }
        Ok(())
    }

    /// Record `option` for the current question, replacing any earlier pick.
    pub fn select_answer(&mut self, option: usize) -> AssessmentResult<()> {
        self.require(Phase::Active, "select an answer")?;

        let option_count = self
            .current_question()
            .map(Question::option_count)
            .unwrap_or(0);
        if option >= option_count {
            return Err(AssessmentError::InvalidSelection {
                input: option_label(option),
                option_count,
            });
        }

        self.answers.insert(self.current_index, option);
        tracing::debug!(question = self.current_index, option, "answer recorded");
        Ok(())
    }

    /// Move to the next question, or complete from the last one.
    pub fn advance(&mut self) -> AssessmentResult<Advance> {
        self.require(Phase::Active, "advance")?;

        if !self.answers.contains_key(&self.current_index) {
            return Err(AssessmentError::AnswerRequired {
                index: self.current_index,
            });
        }

        if self.is_last_question() {
            self.finish(CompletionReason::Finished);
            Ok(Advance::Completed)
        } else {
            self.current_index += 1;
            tracing::debug!(question = self.current_index, "advanced");
            Ok(Advance::Moved(self.current_index))
        }
    }

    /// Submit early. Accepted while active or paused.
    pub fn complete(&mut self) -> AssessmentResult<&ScoreResult> {
        match self.phase {
            Phase::Active | Phase::Paused => {
                self.finish(CompletionReason::Submitted);
                Ok(self.result.get_or_insert_with(ScoreResult::empty))
            }
            phase => Err(AssessmentError::InvalidTransition {
                action: "complete",
                phase,
            }),
        }
    }

    /// `Active → Paused`.
    pub fn pause(&mut self) -> AssessmentResult<()> {
        self.require(Phase::Active, "pause")?;
        self.phase = Phase::Paused;
        tracing::debug!(remaining_secs = self.remaining_secs, "paused");
        Ok(())
    }

    /// `Paused → Active`.
    pub fn resume(&mut self) -> AssessmentResult<()> {
        self.require(Phase::Paused, "resume")?;
        self.phase = Phase::Active;
        tracing::debug!(remaining_secs = self.remaining_secs, "resumed");
        Ok(())
    }

    /// Take one second off the clock. Only counts while active; the tick that
    /// reaches zero completes the session and every later tick is ignored.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != Phase::Active {
            return TickOutcome::Ignored;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.finish(CompletionReason::TimeExpired);
            TickOutcome::Expired
        } else {
            TickOutcome::Counted {
                remaining_secs: self.remaining_secs,
            }
        }
    }

    /// Discard this attempt and return a fresh idle session over the same bank.
    pub fn restart(self) -> AssessmentSession {
        AssessmentSession::new(self.bank, self.config)
    }

    /// Discard this attempt and return a fresh idle session over `bank`.
    pub fn restart_with(self, bank: Arc<QuestionBank>) -> AssessmentSession {
        AssessmentSession::new(bank, self.config)
    }

    fn require(&self, phase: Phase, action: &'static str) -> AssessmentResult<()> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(AssessmentError::InvalidTransition {
                action,
                phase: self.phase,
            })
        }
    }

    fn finish(&mut self, reason: CompletionReason) {
        if self.phase == Phase::Completed {
            return;
        }
        let result = score(&self.bank, &self.answers);
        tracing::info!(
            reason = %reason,
            correct = result.correct_count,
            total = result.total_count,
            percentage = result.percentage,
            "assessment completed"
        );
        self.phase = Phase::Completed;
        self.completion = Some(reason);
        self.result = Some(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Selection;

    fn bank(correct: &[usize]) -> Arc<QuestionBank> {
        let questions = correct
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                Question::new(
                    i,
                    format!("question {i}"),
                    vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    c,
                    format!("because {i}"),
                )
                .unwrap()
            })
            .collect();
        Arc::new(QuestionBank::new(
            "sample",
            Selection::from_input("physics", "advanced").unwrap(),
            questions,
        ))
    }

    fn started(correct: &[usize]) -> AssessmentSession {
        let mut s = AssessmentSession::new(bank(correct), SessionConfig::default());
        s.start().unwrap();
        s
    }

    #[test]
    fn new_session_is_idle() {
        let s = AssessmentSession::new(bank(&[0]), SessionConfig::default());
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.remaining_secs(), 600);
        assert!(s.result().is_none());
    }

    #[test]
    fn start_resets_progress() {
        let s = started(&[0, 0]);
        assert_eq!(s.phase(), Phase::Active);
        assert_eq!(s.current_index(), 0);
        assert!(s.answers().is_empty());
        assert_eq!(s.remaining_secs(), 600);
    }

    #[test]
    fn start_twice_is_rejected() {
        let mut s = started(&[0]);
        let err = s.start().unwrap_err();
        assert!(matches!(
            err,
            AssessmentError::InvalidTransition {
                action: "start",
                phase: Phase::Active
            }
        ));
    }

    #[test]
    fn select_overwrites_without_advancing() {
        let mut s = started(&[0, 0]);
        s.select_answer(2).unwrap();
        s.select_answer(1).unwrap();
        assert_eq!(s.answer_for(0), Some(1));
        assert_eq!(s.current_index(), 0);
    }

    #[test]
    fn out_of_range_selection_leaves_answers_unchanged() {
        let mut s = started(&[0, 0]);
        s.select_answer(3).unwrap();
        let err = s.select_answer(4).unwrap_err();
        assert!(matches!(
            err,
            AssessmentError::InvalidSelection { option_count: 4, .. }
        ));
        assert_eq!(s.answer_for(0), Some(3));
        assert_eq!(s.answers().len(), 1);
    }

    #[test]
    fn advance_without_answer_is_rejected() {
        let mut s = started(&[0, 0, 0]);
        let err = s.advance().unwrap_err();
        assert!(matches!(err, AssessmentError::AnswerRequired { index: 0 }));
        assert_eq!(s.current_index(), 0);

        s.select_answer(0).unwrap();
        assert_eq!(s.advance().unwrap(), Advance::Moved(1));
        assert!(matches!(
            s.advance(),
            Err(AssessmentError::AnswerRequired { index: 1 })
        ));
        assert_eq!(s.current_index(), 1);
    }

    #[test]
    fn advancing_past_last_question_completes() {
        let mut s = started(&[0, 0, 0]);
        for answer in [0, 1, 0] {
            s.select_answer(answer).unwrap();
            s.advance().unwrap();
        }
        assert_eq!(s.phase(), Phase::Completed);
        assert_eq!(s.completion(), Some(CompletionReason::Finished));
        let result = s.result().unwrap();
        assert_eq!(result.correct_count, 2);
        assert_eq!(result.total_count, 3);
        assert_eq!(result.percentage, 67);
    }

    #[test]
    fn completed_session_rejects_everything_but_restart() {
        let mut s = started(&[0]);
        s.select_answer(0).unwrap();
        assert_eq!(s.advance().unwrap(), Advance::Completed);

        assert!(s.select_answer(0).is_err());
        assert!(s.advance().is_err());
        assert!(s.pause().is_err());
        assert!(s.resume().is_err());
        assert!(s.complete().is_err());
        assert!(s.start().is_err());
        assert_eq!(s.tick(), TickOutcome::Ignored);

        let fresh = s.restart();
        assert_eq!(fresh.phase(), Phase::Idle);
        assert!(fresh.answers().is_empty());
        assert!(fresh.result().is_none());
    }

    #[test]
    fn restart_with_swaps_bank() {
        let s = started(&[0]);
        let fresh = s.restart_with(bank(&[1, 1]));
        assert_eq!(fresh.bank().len(), 2);
        assert_eq!(fresh.phase(), Phase::Idle);
    }

    #[test]
    fn complete_submits_early_and_caches_score() {
        let mut s = started(&[0, 0, 0]);
        s.select_answer(0).unwrap();
        let result = s.complete().unwrap().clone();
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.percentage, 33);
        assert_eq!(s.completion(), Some(CompletionReason::Submitted));
        assert_eq!(s.result(), Some(&result));
    }

    #[test]
    fn complete_from_paused() {
        let mut s = started(&[0, 0]);
        s.pause().unwrap();
        s.complete().unwrap();
        assert_eq!(s.phase(), Phase::Completed);
    }

    #[test]
    fn empty_bank_completes_on_start() {
        let s = started(&[]);
        assert_eq!(s.phase(), Phase::Completed);
        assert_eq!(s.completion(), Some(CompletionReason::EmptyBank));
        assert_eq!(s.result(), Some(&ScoreResult::empty()));
    }

    #[test]
    fn pause_freezes_countdown() {
        let mut s = started(&[0]);
        for _ in 0..50 {
            s.tick();
        }
        assert_eq!(s.remaining_secs(), 550);

        s.pause().unwrap();
        for _ in 0..10 {
            assert_eq!(s.tick(), TickOutcome::Ignored);
        }
        s.resume().unwrap();
        assert_eq!(s.remaining_secs(), 550);
        assert_eq!(
            s.tick(),
            TickOutcome::Counted {
                remaining_secs: 549
            }
        );
    }

    #[test]
    fn paused_session_rejects_answers() {
        let mut s = started(&[0]);
        s.pause().unwrap();
        assert!(matches!(
            s.select_answer(0),
            Err(AssessmentError::InvalidTransition { phase: Phase::Paused, .. })
        ));
        assert!(s.pause().is_err());
    }

    #[test]
    fn countdown_expiry_completes_exactly_once() {
        let mut s = started(&[0, 0, 0]);
        s.select_answer(0).unwrap();
        s.advance().unwrap();
        s.select_answer(0).unwrap();

        let mut expired = 0;
        for _ in 0..600 {
            if s.tick() == TickOutcome::Expired {
                expired += 1;
            }
        }
        assert_eq!(expired, 1);
        assert_eq!(s.phase(), Phase::Completed);
        assert_eq!(s.completion(), Some(CompletionReason::TimeExpired));
        assert_eq!(s.remaining_secs(), 0);

        // answered-but-not-advanced still counts; the third is unanswered
        let result = s.result().unwrap();
        assert_eq!(result.correct_count, 2);
        assert_eq!(result.per_question[2].selected, None);

        assert_eq!(s.tick(), TickOutcome::Ignored);
    }

    #[test]
    fn zero_duration_expires_on_start() {
        let mut s = AssessmentSession::new(bank(&[0]), SessionConfig { duration_secs: 0 });
        s.start().unwrap();
        assert_eq!(s.completion(), Some(CompletionReason::TimeExpired));
    }

    #[test]
    fn progress_and_snapshot() {
        let mut s = started(&[0, 0, 0, 0]);
        assert_eq!(s.progress_percent(), 25);
        s.select_answer(2).unwrap();
        let snap = s.snapshot();
        assert_eq!(snap.phase, Phase::Active);
        assert_eq!(snap.question_count, 4);
        assert_eq!(snap.progress_percent, 25);
        assert_eq!(snap.selected, Some(2));
        assert_eq!(snap.answered, 1);
        assert!(snap.result.is_none());
        s.advance().unwrap();
        assert_eq!(s.progress_percent(), 50);
        assert_eq!(s.snapshot().selected, None);
    }

    #[test]
    fn elapsed_tracks_ticks() {
        let mut s = started(&[0]);
        s.tick();
        s.tick();
        assert_eq!(s.elapsed_secs(), 2);
    }
}
