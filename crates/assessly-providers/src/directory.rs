//! Provider backed by a directory of TOML bank files.
//!
//! The directory is indexed once when the provider is opened. Each `load`
//! re-reads the matching file, so edits show up on the next attempt.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

use assessly_core::model::{Difficulty, QuestionBank, Selection};
use assessly_core::parser;
use assessly_core::traits::{QuestionBankProvider, SubjectInfo};

use crate::error::ProviderError;

/// Serves banks from `*.toml` files under a directory.
pub struct DirectoryProvider {
    root: PathBuf,
    index: BTreeMap<(String, Difficulty), IndexedBank>,
}

#[derive(Debug, Clone)]
struct IndexedBank {
    path: PathBuf,
    title: String,
}

impl DirectoryProvider {
    /// Index every bank file under `root`.
    ///
    /// When two files claim the same subject and difficulty, the first one in
    /// path order wins and the other is skipped with a warning.
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(ProviderError::SourceUnavailable(format!(
                "not a directory: {}",
                root.display()
            ))
            .into());
        }

        let mut index: BTreeMap<(String, Difficulty), IndexedBank> = BTreeMap::new();
        for path in parser::find_bank_files(root)? {
            let bank = match parser::parse_bank(&path) {
                Ok(bank) => bank,
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                    continue;
                }
            };
            let key = (
                bank.selection().subject.clone(),
                bank.selection().difficulty,
            );
            if let Some(existing) = index.get(&key) {
                tracing::warn!(
                    "skipping {}: {} already provides {}",
                    path.display(),
                    existing.path.display(),
                    bank.selection()
                );
                continue;
            }
            index.insert(
                key,
                IndexedBank {
                    path,
                    title: bank.title().to_string(),
                },
            );
        }

        tracing::info!(
            root = %root.display(),
            banks = index.len(),
            "indexed bank directory"
        );
        Ok(Self {
            root: root.to_path_buf(),
            index,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of indexed banks.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Title of the bank indexed for `selection`, if any.
    pub fn title_for(&self, selection: &Selection) -> Option<&str> {
        self.index
            .get(&(selection.subject.clone(), selection.difficulty))
            .map(|b| b.title.as_str())
    }
}

#[async_trait]
impl QuestionBankProvider for DirectoryProvider {
    fn name(&self) -> &str {
        "directory"
    }

    async fn load(&self, selection: &Selection) -> anyhow::Result<QuestionBank> {
        let key = (selection.subject.clone(), selection.difficulty);
        let Some(entry) = self.index.get(&key) else {
            if self.index.keys().any(|(s, _)| *s == selection.subject) {
                return Err(ProviderError::BankNotFound {
                    subject: selection.subject.clone(),
                    difficulty: selection.difficulty,
                }
                .into());
            }
            let mut available: Vec<&str> =
                self.index.keys().map(|(s, _)| s.as_str()).collect();
            available.dedup();
            return Err(ProviderError::UnknownSubject {
                subject: selection.subject.clone(),
                available: available.join(", "),
            }
            .into());
        };

        let content = tokio::fs::read_to_string(&entry.path)
            .await
            .with_context(|| format!("failed to read bank file: {}", entry.path.display()))?;
        let bank = parser::parse_bank_str(&content, &entry.path)?;

        // the file may have been edited to a different selection since indexing
        if bank.selection() != selection {
            anyhow::bail!(
                "{} now provides {} instead of {}",
                entry.path.display(),
                bank.selection(),
                selection
            );
        }
        Ok(bank)
    }

    fn available_subjects(&self) -> Vec<SubjectInfo> {
        let mut subjects: BTreeMap<&str, Vec<Difficulty>> = BTreeMap::new();
        for (subject, difficulty) in self.index.keys() {
            subjects.entry(subject).or_default().push(*difficulty);
        }
        subjects
            .into_iter()
            .map(|(id, difficulties)| SubjectInfo {
                id: id.to_string(),
                name: display_name(id),
                difficulties,
            })
            .collect()
    }
}

fn display_name(id: &str) -> String {
    id.split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
