pub mod checklist;
pub mod grade;
pub mod habits;
pub mod history;
pub mod init;
pub mod mistakes;
pub mod profile;
pub mod report;
pub mod review;
pub mod take;
pub mod timer;
pub mod validate;

use anyhow::Result;
use clap::ValueEnum;

use omrtrack_core::config::OmrtrackConfig;
use omrtrack_core::history::HistoryStore;

/// How a graded test is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    #[value(alias = "md")]
    Markdown,
    Html,
}

/// Load the history store named by the config.
pub(crate) fn open_history(config: &OmrtrackConfig) -> Result<HistoryStore> {
    HistoryStore::load_or_default(&config.history_path)
}

/// Persist the history store back to the configured path.
pub(crate) fn save_history(config: &OmrtrackConfig, store: &HistoryStore) -> Result<()> {
    store.save_json(&config.history_path)
}
