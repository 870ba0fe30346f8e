//! Session factory.
//!
//! Validates the subject/difficulty selection, asks the configured provider
//! for a bank, and wraps it in an idle session.

use std::sync::Arc;

use anyhow::Context;

use crate::error::AssessmentResult;
use crate::model::Selection;
use crate::session::{AssessmentSession, SessionConfig};
use crate::traits::{QuestionBankProvider, SubjectInfo};

/// Creates sessions over banks from a single provider.
pub struct AssessmentEngine {
    provider: Arc<dyn QuestionBankProvider>,
    config: SessionConfig,
}

impl AssessmentEngine {
    pub fn new(provider: Arc<dyn QuestionBankProvider>, config: SessionConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn available_subjects(&self) -> Vec<SubjectInfo> {
        self.provider.available_subjects()
    }

    /// Create an idle session from raw subject and difficulty input.
    ///
    /// Fails with `SelectionIncomplete` if either is blank; the provider is
    /// not consulted in that case.
    pub async fn create_session(
        &self,
        subject: &str,
        difficulty: &str,
    ) -> AssessmentResult<AssessmentSession> {
        let selection = Selection::from_input(subject, difficulty)?;
        self.create_session_for(&selection).await
    }

    /// Create an idle session for an already validated selection.
    pub async fn create_session_for(
        &self,
        selection: &Selection,
    ) -> AssessmentResult<AssessmentSession> {
        let bank = self
            .provider
            .load(selection)
            .await
            .with_context(|| format!("failed to load a bank for {selection}"))?;
        tracing::debug!(
            provider = self.provider.name(),
            bank = bank.title(),
            questions = bank.len(),
            "bank loaded"
        );
        Ok(AssessmentSession::new(Arc::new(bank), self.config))
    }

    /// Discard `session` and return a fresh idle one over a newly requested
    /// bank for the same selection.
    pub async fn restart(&self, session: AssessmentSession) -> AssessmentResult<AssessmentSession> {
        let selection = session.bank().selection().clone();
        let fresh = self.create_session_for(&selection).await?;
        Ok(session.restart_with(Arc::clone(fresh.bank())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use crate::error::AssessmentError;
    use crate::model::{Difficulty, Question, QuestionBank};
    use crate::session::Phase;

    struct CountingProvider {
        calls: AtomicU32,
        fail: bool,
    }

    impl CountingProvider {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl QuestionBankProvider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        async fn load(&self, selection: &Selection) -> anyhow::Result<QuestionBank> {
            let call = self.calls.fetch_add(1, Ordering::Relaxed);
            if self.fail {
                anyhow::bail!("no bank for {}", selection.subject);
            }
            let q = Question::new(
                0,
                format!("call {call}"),
                vec!["yes".into(), "no".into()],
                0,
                "",
            )?;
            Ok(QuestionBank::new("counted", selection.clone(), vec![q]))
        }

        fn available_subjects(&self) -> Vec<SubjectInfo> {
            vec![SubjectInfo {
                id: "physics".into(),
                name: "Physics".into(),
                difficulties: Difficulty::ALL.to_vec(),
            }]
        }
    }

    fn engine(provider: Arc<CountingProvider>) -> AssessmentEngine {
        AssessmentEngine::new(provider, SessionConfig { duration_secs: 120 })
    }

    #[tokio::test]
    async fn blank_subject_is_selection_incomplete() {
        let provider = Arc::new(CountingProvider::new(false));
        let engine = engine(Arc::clone(&provider));

        let err = engine.create_session("", "advanced").await.unwrap_err();
        assert!(matches!(err, AssessmentError::SelectionIncomplete));
        assert_eq!(provider.calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn creates_idle_session_with_configured_duration() {
        let provider = Arc::new(CountingProvider::new(false));
        let engine = engine(Arc::clone(&provider));

        let session = engine.create_session("Physics", "advanced").await.unwrap();
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.remaining_secs(), 120);
        assert_eq!(session.bank().selection().subject, "physics");
        assert_eq!(provider.calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn provider_failure_is_wrapped() {
        let engine = engine(Arc::new(CountingProvider::new(true)));
        let err = engine.create_session("physics", "beginner").await.unwrap_err();
        assert!(matches!(err, AssessmentError::Provider(_)));
        assert!(format!("{err:#}").contains("failed to load a bank"));
    }

    #[tokio::test]
    async fn restart_requests_a_new_bank() {
        let provider = Arc::new(CountingProvider::new(false));
        let engine = engine(Arc::clone(&provider));

        let mut session = engine.create_session("physics", "beginner").await.unwrap();
        session.start().unwrap();
        session.complete().unwrap();

        let fresh = engine.restart(session).await.unwrap();
        assert_eq!(fresh.phase(), Phase::Idle);
        assert_eq!(fresh.bank().questions()[0].prompt(), "call 1");
        assert_eq!(provider.calls.load(Ordering::Relaxed), 2);
    }
}
