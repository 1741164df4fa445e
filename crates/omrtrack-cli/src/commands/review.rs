//! The `omrtrack review` command.

use anyhow::Result;

use omrtrack_core::config::OmrtrackConfig;
use omrtrack_core::results::MistakeId;

use super::{open_history, save_history};

pub fn execute(config: &OmrtrackConfig, id: MistakeId, undo: bool) -> Result<()> {
    let mut store = open_history(config)?;
    store.set_reviewed(id, !undo)?;
    save_history(config, &store)?;

    let stats = store.dashboard();
    println!(
        "{id} marked as {}. {} mistake(s) left to review.",
        if undo { "not reviewed" } else { "reviewed" },
        stats.unreviewed_mistakes
    );
    Ok(())
}
