//! HTML result page generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::Path;

use assessly_core::model::option_label;
use assessly_core::report::{AssessmentReport, ReviewItem};
use assessly_core::scoring::GradeBand;
use assessly_core::time::format_clock;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn band_class(band: GradeBand) -> &'static str {
    match band {
        GradeBand::Excellent => "excellent",
        GradeBand::Good => "good",
        GradeBand::NeedsWork => "needs-work",
    }
}

/// Generate an HTML results page from an assessment report.
pub fn generate_html(report: &AssessmentReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>Assessment results: {}</title>\n",
        html_escape(&report.bank.title)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>Assessment results</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">{} | {} ({}) | {} questions | {}</p>\n",
        html_escape(&report.bank.title),
        html_escape(&report.bank.subject),
        report.bank.difficulty,
        report.bank.question_count,
        format_timestamp(&report.created_at)
    ));
    if let Some(description) = &report.bank.description {
        html.push_str(&format!(
            "<p class=\"description\">{}</p>\n",
            html_escape(description)
        ));
    }
    html.push_str("</header>\n");

    // Score summary
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str(&format!(
        "<div class=\"score {}\"><span class=\"percentage\">{}%</span><span class=\"band\">{}</span></div>\n",
        band_class(report.band),
        report.score.percentage,
        report.band
    ));
    html.push_str(&generate_score_bar(report.score.percentage, report.band));
    html.push_str("<table class=\"summary\">\n<tbody>\n");
    html.push_str(&format!(
        "<tr><th>Correct</th><td>{} of {}</td></tr>\n",
        report.score.correct_count, report.score.total_count
    ));
    html.push_str(&format!(
        "<tr><th>Time taken</th><td>{} of {}</td></tr>\n",
        format_clock(report.time_taken_secs),
        format_clock(report.duration_secs)
    ));
    html.push_str(&format!(
        "<tr><th>Ended</th><td>{}</td></tr>\n",
        report.completion
    ));
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Per-question review
    html.push_str("<section class=\"review\">\n");
    html.push_str("<h2>Review</h2>\n");
    html.push_str(
        "<label><input type=\"checkbox\" id=\"missed-only\" onchange=\"toggleMissed(this.checked)\"> Show missed questions only</label>\n",
    );
    for item in &report.review {
        html.push_str(&render_review_item(item));
    }
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

fn render_review_item(item: &ReviewItem) -> String {
    let class = if item.is_correct { "pass" } else { "fail" };
    let mut out = format!(
        "<article class=\"question {class}\">\n<h3>{}. {}</h3>\n<ol type=\"A\">\n",
        item.number,
        html_escape(&item.prompt)
    );

    for (i, option) in item.options.iter().enumerate() {
        let mut marks = Vec::new();
        if i == item.correct {
            marks.push("correct");
        }
        if item.selected == Some(i) {
            marks.push("chosen");
        }
        out.push_str(&format!(
            "<li class=\"{}\">{}</li>\n",
            marks.join(" "),
            html_escape(option)
        ));
    }
    out.push_str("</ol>\n");

    let answer = match item.selected {
        Some(i) => format!(
            "Your answer: {} ({})",
            option_label(i),
            html_escape(item.selected_text().unwrap_or_default())
        ),
        None => "Not answered".to_string(),
    };
    out.push_str(&format!("<p class=\"answer\">{answer}</p>\n"));
    if !item.is_correct {
        out.push_str(&format!(
            "<p class=\"answer\">Correct answer: {} ({})</p>\n",
            option_label(item.correct),
            html_escape(item.correct_text())
        ));
    }
    if !item.explanation.is_empty() {
        out.push_str(&format!(
            "<p class=\"explanation\">{}</p>\n",
            html_escape(&item.explanation)
        ));
    }
    out.push_str("</article>\n");
    out
}

fn generate_score_bar(percentage: u8, band: GradeBand) -> String {
    let bar_height = 24;
    let max_width = 400;
    let width = usize::from(percentage.min(100)) * max_width / 100;

    let color = match band {
        GradeBand::Excellent => "#22c55e",
        GradeBand::Good => "#eab308",
        GradeBand::NeedsWork => "#ef4444",
    };

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        max_width + 60,
        bar_height
    );
    svg.push_str(&format!(
        "  <rect x=\"0\" y=\"0\" width=\"{max_width}\" height=\"{bar_height}\" fill=\"var(--border)\" rx=\"4\"/>\n"
    ));
    svg.push_str(&format!(
        "  <rect x=\"0\" y=\"0\" width=\"{width}\" height=\"{bar_height}\" fill=\"{color}\" rx=\"4\"/>\n"
    ));
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}%</text>\n",
        max_width + 8,
        bar_height / 2,
        percentage
    ));
    svg.push_str("</svg>\n");
    svg
}

/// Write an HTML results page to a file.
pub fn write_html_report(report: &AssessmentReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); max-width: 56rem; }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.description { margin-top: 0.25rem; }
.score { display: flex; align-items: baseline; gap: 1rem; margin: 1rem 0; }
.percentage { font-size: 3rem; font-weight: bold; }
.band { text-transform: capitalize; }
.excellent .percentage { color: #16a34a; }
.good .percentage { color: #ca8a04; }
.needs-work .percentage { color: #dc2626; }
table { border-collapse: collapse; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.question { border: 1px solid var(--border); border-radius: 8px; padding: 0 1rem; margin: 1rem 0; }
.question.pass { border-left: 6px solid #22c55e; }
.question.fail { border-left: 6px solid #ef4444; }
li.correct { background: var(--pass); }
li.chosen:not(.correct) { background: var(--fail); }
.explanation { color: #6b7280; font-style: italic; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function toggleMissed(only) {
  document.querySelectorAll('.question.pass').forEach(q => {
    q.style.display = only ? 'none' : '';
  });
}
"#;
