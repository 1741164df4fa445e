//! The `omrtrack mistakes` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use omrtrack_core::config::OmrtrackConfig;
use omrtrack_core::model::Subject;

use super::open_history;

pub fn execute(config: &OmrtrackConfig, subject: Option<Subject>, unreviewed: bool) -> Result<()> {
    let store = open_history(config)?;
    let mistakes: Vec<_> = store
        .mistakes_by_subject(subject)
        .into_iter()
        .filter(|m| !unreviewed || !m.reviewed)
        .collect();

    if mistakes.is_empty() {
        println!("No mistakes to show.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Id", "Test", "Question", "Subject", "Yours", "Correct", "Reviewed",
    ]);
    for m in &mistakes {
        table.add_row(vec![
            Cell::new(m.id),
            Cell::new(&m.test_name),
            Cell::new(format!("Q{} (#{})", m.question_id, m.display_number)),
            Cell::new(m.subject),
            Cell::new(&m.user_answer),
            Cell::new(&m.correct_answer),
            Cell::new(if m.reviewed { "yes" } else { "no" }),
        ]);
    }
    println!("{table}");
    println!("{} mistake(s)", mistakes.len());

    Ok(())
}
