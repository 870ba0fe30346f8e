//! Mock provider for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use assessly_core::model::{Difficulty, QuestionBank, Selection};
use assessly_core::traits::{QuestionBankProvider, SubjectInfo};

use crate::error::ProviderError;

/// A mock bank provider for testing sessions without bank files.
///
/// Serves banks keyed by subject, re-labelled with the requested selection.
pub struct MockProvider {
    /// Map of subject → bank.
    banks: HashMap<String, QuestionBank>,
    /// Bank served for any subject not in `banks`.
    fallback: Option<QuestionBank>,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last selection received.
    last_selection: Mutex<Option<Selection>>,
}

impl MockProvider {
    /// Create a new mock provider with the given subject→bank mappings.
    pub fn new(banks: HashMap<String, QuestionBank>) -> Self {
        Self {
            banks,
            fallback: None,
            call_count: AtomicU32::new(0),
            last_selection: Mutex::new(None),
        }
    }

    /// Create a mock that always serves the same bank.
    pub fn with_fixed_bank(bank: QuestionBank) -> Self {
        Self {
            banks: HashMap::new(),
            fallback: Some(bank),
            call_count: AtomicU32::new(0),
            last_selection: Mutex::new(None),
        }
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last selection requested from this provider.
    pub fn last_selection(&self) -> Option<Selection> {
        self.last_selection
            .lock()
            .map(|s| s.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl QuestionBankProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn load(&self, selection: &Selection) -> anyhow::Result<QuestionBank> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_selection.lock() {
            *last = Some(selection.clone());
        }

        let bank = self
            .banks
            .get(&selection.subject)
            .or(self.fallback.as_ref())
            .ok_or_else(|| ProviderError::UnknownSubject {
                subject: selection.subject.clone(),
                available: self.banks.keys().cloned().collect::<Vec<_>>().join(", "),
            })?;

        let relabelled = QuestionBank::new(
            bank.title(),
            selection.clone(),
            bank.questions().to_vec(),
        );
        Ok(match bank.description() {
            Some(description) => relabelled.with_description(description),
            None => relabelled,
        })
    }

    fn available_subjects(&self) -> Vec<SubjectInfo> {
        let mut subjects: Vec<SubjectInfo> = self
            .banks
            .keys()
            .map(|id| SubjectInfo {
                id: id.clone(),
                name: id.clone(),
                difficulties: Difficulty::ALL.to_vec(),
            })
            .collect();
        subjects.sort_by(|a, b| a.id.cmp(&b.id));
        subjects
    }
}
