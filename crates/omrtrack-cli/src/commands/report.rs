//! The `omrtrack report` command: re-render a saved JSON report.

use std::path::PathBuf;

use anyhow::Result;

use omrtrack_core::config::OmrtrackConfig;
use omrtrack_core::report::GradeReport;

use super::grade::render;
use super::OutputFormat;

pub fn execute(config: &OmrtrackConfig, path: PathBuf, format: OutputFormat) -> Result<()> {
    let report = GradeReport::load_json(&path)?;
    render(config, &report, format)
}
