//! The `omrtrack grade` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use comfy_table::{Cell, Table};

use omrtrack_core::config::OmrtrackConfig;
use omrtrack_core::engine::GradedTest;
use omrtrack_core::parser::{parse_mark_sheet, parse_test_config};
use omrtrack_core::report::GradeReport;
use omrtrack_core::session::Session;
use omrtrack_report::html::write_html_report;

use super::{open_history, save_history, OutputFormat};

pub fn execute(
    config: &OmrtrackConfig,
    test_path: PathBuf,
    answers_path: PathBuf,
    key_path: PathBuf,
    format: OutputFormat,
    output: Option<PathBuf>,
    no_save: bool,
) -> Result<()> {
    let test = parse_test_config(&test_path)?;
    let answers = parse_mark_sheet(&answers_path)?;
    let key = parse_mark_sheet(&key_path)?;
    tracing::debug!(
        test = %test.name,
        answers = answers.len(),
        key = key.len(),
        "loaded sheets"
    );

    let mut session = Session::start(test, config.capture_policy())?;
    for (id, mark) in &answers {
        session
            .record_answer(*id, mark)
            .with_context(|| format!("in {}", answers_path.display()))?;
    }
    session.submit_answers();
    for (id, mark) in &key {
        session
            .record_answer_key_entry(*id, mark)
            .with_context(|| format!("in {}", key_path.display()))?;
    }

    let graded = session.grade(Utc::now())?;
    let report = GradeReport::new(
        &graded,
        session.questions(),
        session.answers(),
        session.answer_key(),
    );

    // Render everything first so a failed write leaves history untouched.
    if let Some(path) = &output {
        report.save_json(path)?;
        eprintln!("Report saved to: {}", path.display());
    }
    render(config, &report, format)?;

    if !no_save {
        record(config, &graded)?;
    }

    Ok(())
}

/// Print or write a report in the requested format.
pub(crate) fn render(
    config: &OmrtrackConfig,
    report: &GradeReport,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Markdown => {
            println!("{}", report.to_markdown());
        }
        OutputFormat::Html => {
            let timestamp = report.summary.date.format("%Y-%m-%dT%H%M%S");
            let path = config
                .output_dir
                .join(format!("result-{timestamp}-{}.html", report.summary.id));
            write_html_report(report, &path)?;
            print_result(report);
            eprintln!("HTML report: {}", path.display());
        }
        OutputFormat::Text => print_result(report),
    }
    Ok(())
}

/// Append a graded test to the configured history file.
pub(crate) fn record(config: &OmrtrackConfig, graded: &GradedTest) -> Result<()> {
    let mut store = open_history(config)?;
    store.record(graded)?;
    save_history(config, &store)?;
    eprintln!("Recorded in {}", config.history_path.display());
    Ok(())
}

/// Print the score line, subject table and mistakes of a graded test.
pub(crate) fn print_result(report: &GradeReport) {
    let s = &report.summary;
    println!("{}", s.name);
    println!(
        "Score: {} ({} correct, {} incorrect, {} unanswered of {})",
        s.score, s.correct_count, s.incorrect_count, s.unanswered_count, s.total_questions
    );

    let mut table = Table::new();
    table.set_header(vec!["Subject", "Correct", "Incorrect", "Unanswered", "Accuracy"]);
    for b in &report.breakdown {
        table.add_row(vec![
            Cell::new(b.subject),
            Cell::new(b.correct),
            Cell::new(b.incorrect),
            Cell::new(b.unanswered),
            Cell::new(format!("{:.1}%", b.accuracy())),
        ]);
    }
    println!("\n{table}");

    if !report.mistakes.is_empty() {
        println!("\nMistakes:");
        for m in &report.mistakes {
            println!(
                "  Q{} ({}) yours {} / correct {}",
                m.question_id, m.subject, m.user_answer, m.correct_answer
            );
        }
    }
}
