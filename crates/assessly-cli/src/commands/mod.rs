//! Subcommand implementations and the helpers they share.

pub mod grade;
pub mod history;
pub mod init;
pub mod list_subjects;
pub mod take;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::Result;

use assessly_core::model::option_label;
use assessly_core::report::AssessmentReport;
use assessly_core::time::format_clock;
use assessly_core::AssessmentEngine;
use assessly_providers::{create_provider, AssesslyConfig};
use assessly_report::write_html_report;

/// Where and how a finished report is written.
pub struct SaveOptions {
    pub output: Option<PathBuf>,
    pub format: String,
    pub no_save: bool,
}

/// Fill in subject and difficulty from config defaults.
///
/// Missing values stay blank so the session factory reports the selection as
/// incomplete.
pub fn resolve_selection(
    subject: Option<String>,
    difficulty: Option<String>,
    config: &AssesslyConfig,
) -> (String, String) {
    (
        subject
            .or_else(|| config.default_subject.clone())
            .unwrap_or_default(),
        difficulty
            .or_else(|| config.default_difficulty.clone())
            .unwrap_or_default(),
    )
}

pub fn build_engine(config: &AssesslyConfig) -> Result<AssessmentEngine> {
    let provider = create_provider(&config.bank_source)?;
    Ok(AssessmentEngine::new(provider, config.session_config()))
}

/// Print the results view for a finished attempt.
pub fn print_results(report: &AssessmentReport) {
    println!();
    println!("Results: {}", report.bank.title);
    println!(
        "Score: {}/{} ({}%) - {}",
        report.score.correct_count, report.score.total_count, report.score.percentage, report.band
    );
    println!(
        "Time taken: {} of {}",
        format_clock(report.time_taken_secs),
        format_clock(report.duration_secs)
    );
    println!("Ended: {}", report.completion);

    if report.review.is_empty() {
        return;
    }
    println!("\nReview:");
    for item in &report.review {
        let mark = if item.is_correct { "correct" } else { "wrong" };
        println!("  {}. {} [{mark}]", item.number, item.prompt);
        match item.selected {
            Some(i) => println!(
                "     Your answer: {}) {}",
                option_label(i),
                item.selected_text().unwrap_or_default()
            ),
            None => println!("     Your answer: (none)"),
        }
        if !item.is_correct {
            println!(
                "     Correct answer: {}) {}",
                option_label(item.correct),
                item.correct_text()
            );
        }
        if !item.explanation.is_empty() {
            println!("     {}", item.explanation);
        }
    }
}

/// Write the report in every requested format. Returns the written paths.
pub fn save_report(
    report: &AssessmentReport,
    options: &SaveOptions,
    config: &AssesslyConfig,
) -> Result<Vec<PathBuf>> {
    if options.no_save {
        return Ok(Vec::new());
    }
    let output = options.output.as_deref().unwrap_or(&config.output_dir);
    std::fs::create_dir_all(output)?;

    let formats: Vec<&str> = if options.format == "all" {
        vec!["json", "html"]
    } else {
        options.format.split(',').map(str::trim).collect()
    };

    let mut written = Vec::new();
    for fmt in formats {
        match fmt {
            "json" => {
                let path = report_path(output, report, "json");
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
                written.push(path);
            }
            "html" => {
                let path = report_path(output, report, "html");
                write_html_report(report, &path)?;
                eprintln!("HTML report: {}", path.display());
                written.push(path);
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }
    Ok(written)
}

fn report_path(dir: &Path, report: &AssessmentReport, ext: &str) -> PathBuf {
    let timestamp = report.created_at.format("%Y-%m-%dT%H%M%S");
    let short_id = report.id.simple().to_string();
    dir.join(format!(
        "assessment-{timestamp}-{}.{ext}",
        &short_id[..8.min(short_id.len())]
    ))
}
