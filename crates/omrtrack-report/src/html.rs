//! HTML result-sheet generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::Result;
use std::path::Path;

use omrtrack_core::report::GradeReport;
use omrtrack_core::results::Outcome;
use omrtrack_core::statistics::SubjectBreakdown;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn outcome_mark(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Correct => "\u{2713}",
        Outcome::Incorrect => "\u{2717}",
        Outcome::Unanswered => "\u{2014}",
    }
}

/// Generate an HTML result sheet from a graded-test report.
pub fn generate_html(report: &GradeReport) -> String {
    let s = &report.summary;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>omrtrack result — {}</title>\n",
        html_escape(&s.name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&s.name)));
    html.push_str(&format!(
        "<p class=\"meta\">{} questions | taken {}</p>\n",
        s.total_questions,
        s.date.format("%Y-%m-%d %H:%M UTC")
    ));
    html.push_str("</header>\n");

    // Score card
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str(&format!(
        "<div class=\"score status--{}\">Score: <strong>{}</strong></div>\n",
        report.band().as_str(),
        s.score
    ));
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Correct</th><th>Incorrect</th><th>Unanswered</th><th>Total</th></tr></thead>\n");
    html.push_str(&format!(
        "<tbody><tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr></tbody>\n",
        s.correct_count, s.incorrect_count, s.unanswered_count, s.total_questions
    ));
    html.push_str("</table>\n");

    if !report.breakdown.is_empty() {
        html.push_str(&generate_subject_chart(&report.breakdown));
    }
    html.push_str("</section>\n");

    // Subject analysis
    html.push_str("<section class=\"subjects\">\n");
    html.push_str("<h2>Subject analysis</h2>\n");
    html.push_str("<table>\n");
    html.push_str("<thead><tr><th>Subject</th><th>Correct</th><th>Incorrect</th><th>Unanswered</th><th>Total</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for b in &report.breakdown {
        html.push_str(&format!(
            "<tr><td><span class=\"subject-tag {}\">{}</span></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            b.subject,
            b.subject.to_string().to_uppercase(),
            b.correct,
            b.incorrect,
            b.unanswered,
            b.total
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Per-question breakdown
    html.push_str("<section class=\"breakdown\">\n");
    html.push_str("<h2>Questions</h2>\n");
    html.push_str("<div class=\"grid\">\n");
    for line in report.question_lines() {
        html.push_str(&format!(
            "<div class=\"question-result {}\" title=\"yours: {} / key: {}\">{} {}</div>\n",
            line.outcome,
            html_escape(line.given.as_deref().unwrap_or("-")),
            html_escape(line.expected.as_deref().unwrap_or("-")),
            line.label,
            outcome_mark(line.outcome)
        ));
    }
    html.push_str("</div>\n");
    html.push_str("</section>\n");

    // Mistakes
    if !report.mistakes.is_empty() {
        html.push_str("<section class=\"mistakes\">\n");
        html.push_str("<h2>Mistakes to review</h2>\n");
        html.push_str("<table class=\"results-table\" id=\"mistakes\">\n");
        html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Question</th><th onclick=\"sortTable(1)\">Subject</th><th onclick=\"sortTable(2)\">Yours</th><th onclick=\"sortTable(3)\">Correct</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for m in &report.mistakes {
            html.push_str(&format!(
                "<tr><td>Q{}</td><td>{}</td><td class=\"incorrect\">{}</td><td class=\"correct\">{}</td></tr>\n",
                m.question_id,
                m.subject,
                html_escape(m.user_answer.as_str()),
                html_escape(m.correct_answer.as_str())
            ));
        }
        html.push_str("</tbody></table>\n");
        html.push_str("</section>\n");
    }

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

/// Write an HTML result sheet to a file.
pub fn write_html_report(report: &GradeReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

/// Horizontal bars of per-subject accuracy.
fn generate_subject_chart(breakdown: &[SubjectBreakdown]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 120;

    let total_height = breakdown.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, row) in breakdown.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let accuracy = row.accuracy();
        let width = (accuracy / 100.0 * max_width as f64) as usize;

        let color = if accuracy >= 80.0 {
            "#22c55e"
        } else if accuracy >= 50.0 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            row.subject
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.1}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            accuracy
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; --skip: #f3f4f6; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; --skip: #1f2937; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.score { font-size: 1.5rem; padding: 1rem; border-radius: 8px; display: inline-block; }
.status--success { background: var(--pass); }
.status--warning { background: #fef9c3; }
.status--error { background: var(--fail); }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(5rem, 1fr)); gap: 0.5rem; }
.question-result { padding: 0.5rem; border-radius: 6px; text-align: center; }
.correct { background: var(--pass); }
.incorrect { background: var(--fail); }
.unanswered { background: var(--skip); }
.subject-tag { font-weight: bold; font-size: 0.8rem; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('mistakes');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    return asc ? va.localeCompare(vb, undefined, {numeric: true}) : vb.localeCompare(va, undefined, {numeric: true});
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
