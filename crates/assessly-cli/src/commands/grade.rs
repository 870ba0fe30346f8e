//! The `assessly grade` command.
//!
//! Runs a whole attempt from a list of answers, through the same session
//! transitions the interactive prompt uses, without a countdown.

use std::path::PathBuf;

use anyhow::{Context, Result};

use assessly_core::model::parse_option_label;
use assessly_core::report::AssessmentReport;
use assessly_core::session::{Advance, AssessmentSession, Phase};
use assessly_providers::load_config_from;

use super::{build_engine, print_results, resolve_selection, save_report, SaveOptions};

pub struct GradeArgs {
    pub subject: Option<String>,
    pub difficulty: Option<String>,
    pub answers: String,
    pub save: SaveOptions,
    pub config: Option<PathBuf>,
}

pub async fn execute(args: GradeArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;
    let (subject, difficulty) = resolve_selection(args.subject, args.difficulty, &config);

    let engine = build_engine(&config)?;
    let mut session = engine.create_session(&subject, &difficulty).await?;

    let labels = split_answers(&args.answers);
    anyhow::ensure!(
        labels.len() <= session.bank().len(),
        "{} answers given for {} questions",
        labels.len(),
        session.bank().len()
    );

    apply_answers(&mut session, &labels)?;

    let report = AssessmentReport::from_session(&session)?;
    print_results(&report);
    save_report(&report, &args.save, &config)?;
    Ok(())
}

fn split_answers(answers: &str) -> Vec<&str> {
    if answers.trim().is_empty() {
        return Vec::new();
    }
    answers.split(',').map(str::trim).collect()
}

/// Answer questions in order. Running out of answers before the last question
/// submits the attempt with the rest unanswered.
fn apply_answers(session: &mut AssessmentSession, labels: &[&str]) -> Result<()> {
    session.start()?;

    for (i, label) in labels.iter().enumerate() {
        if session.phase() != Phase::Active {
            break;
        }
        let option_count = session
            .current_question()
            .map(|q| q.option_count())
            .unwrap_or_default();
        let option = parse_option_label(label, option_count)
            .with_context(|| format!("answer {} is not valid", i + 1))?;
        session.select_answer(option)?;
        if let Advance::Completed = session.advance()? {
            break;
        }
    }

    if session.phase() == Phase::Active {
        session.complete()?;
    }
    Ok(())
}
