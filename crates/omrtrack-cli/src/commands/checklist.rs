//! The `omrtrack checklist` commands.

use anyhow::Result;

use omrtrack_core::config::OmrtrackConfig;
use omrtrack_core::model::Subject;

use super::{open_history, save_history};

pub fn show(config: &OmrtrackConfig) -> Result<()> {
    let store = open_history(config)?;
    for subject in Subject::ALL {
        let items = store.checklist.items(subject);
        let ticked: Vec<String> = items
            .iter()
            .enumerate()
            .filter(|(_, done)| **done)
            .map(|(i, _)| (i + 1).to_string())
            .collect();
        println!(
            "{subject}: {} done{}",
            ticked.len(),
            if ticked.is_empty() {
                String::new()
            } else {
                format!(" (items {})", ticked.join(", "))
            }
        );
    }
    Ok(())
}

/// Tick a 1-based checklist item, or untick it with `undo`.
pub fn set(config: &OmrtrackConfig, subject: Subject, item: u32, undo: bool) -> Result<()> {
    let mut store = open_history(config)?;
    let index = item.saturating_sub(1) as usize;
    store.checklist.set(subject, index, !undo)?;
    save_history(config, &store)?;
    println!(
        "{subject} item {item} {}. {} done.",
        if undo { "unticked" } else { "ticked" },
        store.checklist.completed(subject)
    );
    Ok(())
}
