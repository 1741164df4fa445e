//! TOML test definitions and mark sheets.
//!
//! A test definition:
//!
//! ```toml
//! [test]
//! name = "Full mock 3"
//! duration_minutes = 200
//!
//! [test.questions]
//! physics = 45
//! chemistry = 45
//! biology = 90
//! ```
//!
//! A mark sheet (learner answers or answer key):
//!
//! ```toml
//! [marks]
//! 1 = "A"
//! 2 = "C"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{QuestionId, Subject, SubjectCounts, TestConfig};

#[derive(Debug, Deserialize)]
struct TomlTestFile {
    test: TomlTest,
}

#[derive(Debug, Deserialize)]
struct TomlTest {
    name: String,
    duration_minutes: u32,
    #[serde(default)]
    questions: SubjectCounts,
}

#[derive(Debug, Deserialize)]
struct TomlMarkSheet {
    #[serde(default)]
    marks: BTreeMap<String, String>,
}

/// Parse a test definition file.
pub fn parse_test_config(path: &Path) -> Result<TestConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read test file: {}", path.display()))?;
    parse_test_config_str(&content, path)
}

/// Parse a test definition from a string.
pub fn parse_test_config_str(content: &str, source_path: &Path) -> Result<TestConfig> {
    let parsed: TomlTestFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;
    Ok(TestConfig {
        name: parsed.test.name,
        duration_minutes: parsed.test.duration_minutes,
        counts: parsed.test.questions,
    })
}

/// Parse a mark sheet file into raw, not yet validated marks.
pub fn parse_mark_sheet(path: &Path) -> Result<BTreeMap<QuestionId, String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read mark sheet: {}", path.display()))?;
    parse_mark_sheet_str(&content, path)
}

/// Parse a mark sheet from a string. Keys may be written `3` or `Q3`.
pub fn parse_mark_sheet_str(
    content: &str,
    source_path: &Path,
) -> Result<BTreeMap<QuestionId, String>> {
    let parsed: TomlMarkSheet = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;
    parsed
        .marks
        .into_iter()
        .map(|(key, mark)| {
            let id = key
                .parse::<QuestionId>()
                .map_err(|e| anyhow::anyhow!("{}: {e}", source_path.display()))?;
            Ok((id, mark))
        })
        .collect()
}

/// A non-fatal issue with a test definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub message: String,
}

/// Seconds per question below which a test is flagged as rushed.
const MIN_SECS_PER_QUESTION: u64 = 30;

/// Check a test definition for suspicious but legal settings.
pub fn validate_test_config(config: &TestConfig) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    let total = config.total_questions();
    if total > 0 {
        for subject in Subject::ALL {
            if config.counts.get(subject) == 0 {
                warnings.push(ConfigWarning {
                    message: format!("no {subject} questions"),
                });
            }
        }

        if config.duration_secs() < u64::from(total) * MIN_SECS_PER_QUESTION {
            warnings.push(ConfigWarning {
                message: format!(
                    "{} minute(s) for {total} questions is under {MIN_SECS_PER_QUESTION}s per question",
                    config.duration_minutes
                ),
            });
        }
    }

    warnings
}
