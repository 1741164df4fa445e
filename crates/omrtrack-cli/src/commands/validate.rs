//! The `omrtrack validate` command.

use std::path::PathBuf;

use anyhow::Result;

use omrtrack_core::builder::build_test;
use omrtrack_core::model::Subject;
use omrtrack_core::parser::{parse_test_config, validate_test_config};

pub fn execute(test_path: PathBuf) -> Result<()> {
    let config = parse_test_config(&test_path)?;
    let questions = build_test(&config)?;

    println!(
        "Test: {} ({} questions, {} min)",
        config.name,
        questions.len(),
        config.duration_minutes
    );
    for subject in Subject::ALL {
        let count = config.counts.get(subject);
        if count > 0 {
            println!("  {subject}: {count}");
        }
    }

    let warnings = validate_test_config(&config);
    for w in &warnings {
        println!("  WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Test definition valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
