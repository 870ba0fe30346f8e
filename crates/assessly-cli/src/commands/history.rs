//! The `assessly history` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use assessly_core::report::{load_history, AssessmentReport};
use assessly_core::time::format_clock;
use assessly_providers::load_config_from;

pub fn execute(dir: Option<PathBuf>, limit: usize, config_path: Option<PathBuf>) -> Result<()> {
    let dir = match dir {
        Some(dir) => dir,
        None => load_config_from(config_path.as_deref())?.output_dir,
    };

    let reports = load_history(&dir)?;
    if reports.is_empty() {
        println!("No saved assessments in {}", dir.display());
        return Ok(());
    }

    println!("{}", history_table(&reports[..limit.min(reports.len())]));
    if reports.len() > limit {
        println!("({} older assessments not shown)", reports.len() - limit);
    }
    Ok(())
}

fn history_table(reports: &[AssessmentReport]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Date",
        "Subject",
        "Difficulty",
        "Score",
        "Band",
        "Time",
        "Ended",
    ]);

    for report in reports {
        table.add_row(vec![
            Cell::new(report.created_at.format("%Y-%m-%d %H:%M")),
            Cell::new(&report.bank.subject),
            Cell::new(report.bank.difficulty),
            Cell::new(format!(
                "{}/{} ({}%)",
                report.score.correct_count, report.score.total_count, report.score.percentage
            )),
            Cell::new(report.band),
            Cell::new(format_clock(report.time_taken_secs)),
            Cell::new(report.completion),
        ]);
    }
    table
}
