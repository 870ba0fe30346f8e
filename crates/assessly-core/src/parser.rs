//! TOML question bank parser.
//!
//! Loads banks from TOML files and directories, and lints them.
//!
//! ```toml
//! [bank]
//! subject = "physics"
//! difficulty = "advanced"
//! title = "Oscillations"
//!
//! [[questions]]
//! prompt = "Which of the following represents simple harmonic motion?"
//! options = ["x = A sin(ωt + φ)", "x = At + B"]
//! correct = 0
//! explanation = "SHM follows a sinusoidal pattern."
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Question, QuestionBank, Selection};

/// Intermediate TOML structure for parsing bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    bank: TomlBankHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    subject: String,
    difficulty: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    prompt: String,
    options: Vec<String>,
    correct: usize,
    #[serde(default)]
    explanation: String,
}

/// Parse a single TOML file into a `QuestionBank`.
pub fn parse_bank(path: &Path) -> Result<QuestionBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bank file: {}", path.display()))?;

    parse_bank_str(&content, path)
}

/// Parse a TOML string into a `QuestionBank` (useful for testing).
pub fn parse_bank_str(content: &str, source_path: &Path) -> Result<QuestionBank> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let selection = Selection::from_input(&parsed.bank.subject, &parsed.bank.difficulty)
        .with_context(|| format!("invalid [bank] header in {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .enumerate()
        .map(|(i, q)| {
            Question::new(i, q.prompt, q.options, q.correct, q.explanation)
                .with_context(|| format!("in {}", source_path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let title = parsed.bank.title.unwrap_or_else(|| {
        format!("{} ({})", capitalize(&selection.subject), selection.difficulty)
    });

    let bank = QuestionBank::new(title, selection, questions);
    Ok(match parsed.bank.description {
        Some(description) if !description.trim().is_empty() => {
            bank.with_description(description)
        }
        _ => bank,
    })
}

/// Recursively list `.toml` files under a directory, in path order.
pub fn find_bank_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            files.extend(find_bank_files(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            files.push(path);
        }
    }
    Ok(files)
}

/// Recursively load all `.toml` bank files from a directory.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<QuestionBank>> {
    let mut banks = Vec::new();
    for path in find_bank_files(dir)? {
        match parse_bank(&path) {
            Ok(bank) => banks.push(bank),
            Err(e) => {
                tracing::warn!("skipping {}: {:#}", path.display(), e);
            }
        }
    }
    Ok(banks)
}

/// A warning from bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Zero-based question position (if applicable).
    pub question: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Lint a bank for issues that parse fine but make a poor assessment.
pub fn validate_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if bank.is_empty() {
        warnings.push(ValidationWarning {
            question: None,
            message: "bank has no questions; sessions will complete immediately".into(),
        });
    }

    let mut seen_prompts = HashSet::new();
    for (i, q) in bank.questions().iter().enumerate() {
        let prompt = q.prompt().trim();
        if prompt.is_empty() {
            warnings.push(ValidationWarning {
                question: Some(i),
                message: "prompt is empty".into(),
            });
        } else if !seen_prompts.insert(prompt.to_lowercase()) {
            warnings.push(ValidationWarning {
                question: Some(i),
                message: format!("duplicate prompt: {prompt}"),
            });
        }

        if q.explanation().trim().is_empty() {
            warnings.push(ValidationWarning {
                question: Some(i),
                message: "no explanation provided".into(),
            });
        }

        let mut seen_options = HashSet::new();
        for option in q.options() {
            if !seen_options.insert(option.trim()) {
                warnings.push(ValidationWarning {
                    question: Some(i),
                    message: format!("duplicate option: {}", option.trim()),
                });
            }
        }
    }

    warnings
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[bank]
subject = "Chemistry"
difficulty = "intermediate"
title = "Organic basics"

[[questions]]
prompt = "What is the molecular formula for glucose?"
options = ["C6H12O6", "C6H6O6", "C5H10O5", "C12H22O11"]
correct = 0
explanation = "Glucose has 6 carbon, 12 hydrogen and 6 oxygen atoms."

[[questions]]
prompt = "Which element has atomic number 6?"
options = ["Oxygen", "Carbon"]
correct = 1
explanation = "Carbon has six protons."
"#;

    #[test]
    fn parse_valid_toml() {
        let bank = parse_bank_str(VALID_TOML, &PathBuf::from("chem.toml")).unwrap();
        assert_eq!(bank.title(), "Organic basics");
        assert_eq!(bank.selection().subject, "chemistry");
        assert_eq!(bank.selection().difficulty, Difficulty::Intermediate);
        assert_eq!(bank.len(), 2);
        assert_eq!(bank.questions()[1].correct_index(), 1);
        assert!(validate_bank(&bank).is_empty());
    }

    #[test]
    fn missing_title_is_derived() {
        let toml = r#"
[bank]
subject = "biology"
difficulty = "beginner"
"#;
        let bank = parse_bank_str(toml, &PathBuf::from("bio.toml")).unwrap();
        assert_eq!(bank.title(), "Biology (beginner)");
        assert_eq!(bank.description(), None);
        assert!(bank.is_empty());
    }

    #[test]
    fn description_is_kept() {
        let toml = r#"
[bank]
subject = "physics"
difficulty = "beginner"
description = "Forces and motion"
"#;
        let bank = parse_bank_str(toml, &PathBuf::from("phys.toml")).unwrap();
        assert_eq!(bank.description(), Some("Forces and motion"));

        let blank = toml.replace("Forces and motion", "  ");
        let bank = parse_bank_str(&blank, &PathBuf::from("phys.toml")).unwrap();
        assert_eq!(bank.description(), None);
    }

    #[test]
    fn out_of_range_correct_is_rejected() {
        let toml = r#"
[bank]
subject = "math"
difficulty = "beginner"

[[questions]]
prompt = "2 + 2?"
options = ["4", "5"]
correct = 2
"#;
        let err = parse_bank_str(toml, &PathBuf::from("bad.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("out of range"));
    }

    #[test]
    fn blank_subject_is_rejected() {
        let toml = r#"
[bank]
subject = ""
difficulty = "beginner"
"#;
        let err = parse_bank_str(toml, &PathBuf::from("blank.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("selection incomplete"));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_bank_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn validate_flags_duplicates_and_missing_explanations() {
        let toml = r#"
[bank]
subject = "math"
difficulty = "beginner"

[[questions]]
prompt = "Pick one"
options = ["x", "x"]
correct = 0

[[questions]]
prompt = "pick one"
options = ["a", "b"]
correct = 1
explanation = "b"
"#;
        let bank = parse_bank_str(toml, &PathBuf::from("dupes.toml")).unwrap();
        let warnings = validate_bank(&bank);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate option")));
        assert!(warnings
            .iter()
            .any(|w| w.question == Some(1) && w.message.contains("duplicate prompt")));
        assert!(warnings
            .iter()
            .any(|w| w.question == Some(0) && w.message.contains("no explanation")));
    }

    #[test]
    fn validate_empty_bank() {
        let bank = QuestionBank::new(
            "empty",
            Selection::from_input("math", "beginner").unwrap(),
            vec![],
        );
        let warnings = validate_bank(&bank);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].question.is_none());
    }

    #[test]
    fn load_directory_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("chem.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not = [toml").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(
            nested.join("bio.toml"),
            "[bank]\nsubject = \"biology\"\ndifficulty = \"advanced\"\n",
        )
        .unwrap();

        let banks = load_bank_directory(dir.path()).unwrap();
        assert_eq!(banks.len(), 2);
        assert!(banks.iter().any(|b| b.selection().subject == "chemistry"));
        assert!(banks.iter().any(|b| b.selection().subject == "biology"));
    }

    #[test]
    fn load_directory_requires_directory() {
        assert!(load_bank_directory(Path::new("definitely/not/here")).is_err());
    }
}
