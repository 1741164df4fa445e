//! The `omrtrack habits` commands.

use anyhow::Result;

use omrtrack_core::config::OmrtrackConfig;
use omrtrack_core::progress::{HabitTracker, MOCK_WEEKS, STUDY_DAYS};

use super::{open_history, save_history};

fn marks(flags: &[bool]) -> String {
    flags
        .iter()
        .map(|done| if *done { "x" } else { "." })
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_habits(habits: &HabitTracker) {
    println!(
        "Study days:  {}  ({}/{STUDY_DAYS})",
        marks(&habits.daily_study),
        habits.study_days()
    );
    println!(
        "Mock tests:  {}  ({}/{MOCK_WEEKS})",
        marks(&habits.mock_tests),
        habits.mock_weeks()
    );
}

pub fn show(config: &OmrtrackConfig) -> Result<()> {
    let store = open_history(config)?;
    print_habits(&store.habits);
    Ok(())
}

/// Mark a 1-based day of the week as studied.
pub fn study(config: &OmrtrackConfig, day: u32, undo: bool) -> Result<()> {
    let mut store = open_history(config)?;
    store
        .habits
        .set_study_day(day.saturating_sub(1) as usize, !undo)?;
    save_history(config, &store)?;
    print_habits(&store.habits);
    Ok(())
}

/// Mark a 1-based week as having had a mock test.
pub fn mock(config: &OmrtrackConfig, week: u32, undo: bool) -> Result<()> {
    let mut store = open_history(config)?;
    store
        .habits
        .set_mock_week(week.saturating_sub(1) as usize, !undo)?;
    save_history(config, &store)?;
    print_habits(&store.habits);
    Ok(())
}

pub fn reset(config: &OmrtrackConfig) -> Result<()> {
    let mut store = open_history(config)?;
    store.habits.reset();
    save_history(config, &store)?;
    println!("Habits cleared.");
    Ok(())
}
