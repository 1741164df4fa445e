//! The `omrtrack history` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use omrtrack_core::config::OmrtrackConfig;
use omrtrack_core::statistics::ScoreBand;

use super::open_history;

pub fn execute(config: &OmrtrackConfig) -> Result<()> {
    let store = open_history(config)?;

    if let Some(profile) = &store.profile {
        let days = profile.days_until_exam(chrono::Local::now().date_naive());
        println!(
            "{} | target {} | {} day(s) to exam ({})",
            profile.name, profile.target_score, days, profile.exam_date
        );
    }

    if store.tests().is_empty() {
        println!("No tests recorded yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Date",
        "Test",
        "Score",
        "Correct",
        "Incorrect",
        "Unanswered",
        "Band",
    ]);
    for t in store.tests() {
        table.add_row(vec![
            Cell::new(t.date.format("%Y-%m-%d %H:%M")),
            Cell::new(&t.name),
            Cell::new(t.score),
            Cell::new(t.correct_count),
            Cell::new(t.incorrect_count),
            Cell::new(t.unanswered_count),
            Cell::new(ScoreBand::for_score(t.score).as_str()),
        ]);
    }
    println!("{table}");

    let stats = store.dashboard();
    println!(
        "\nTests: {} | Average: {} | Best: {} | Mistakes: {} ({} to review)",
        stats.total_tests,
        stats.average_score,
        stats
            .best_score
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string()),
        stats.total_mistakes,
        stats.unreviewed_mistakes
    );

    Ok(())
}
