//! Long-lived history of graded tests and mistakes, persisted as JSON.
//!
//! Both lists are append-only. The one permitted mutation is flipping the
//! `reviewed` flag on a mistake.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::GradedTest;
use crate::error::CoreError;
use crate::model::Subject;
use crate::profile::LearnerProfile;
use crate::progress::{HabitTracker, StudyChecklist};
use crate::results::{MistakeId, MistakeRecord, TestResultSummary};
use crate::statistics::{compute_dashboard, DashboardStats};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryStore {
    #[serde(default)]
    pub profile: Option<LearnerProfile>,
    #[serde(default)]
    pub checklist: StudyChecklist,
    #[serde(default)]
    pub habits: HabitTracker,
    #[serde(default)]
    tests: Vec<TestResultSummary>,
    #[serde(default)]
    mistakes: Vec<MistakeRecord>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save the store as pretty-printed JSON, creating parent directories.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize history")?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write history to {}", path.display()))?;
        tracing::debug!(path = %path.display(), tests = self.tests.len(), "history saved");
        Ok(())
    }

    /// Load a store from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read history from {}", path.display()))?;
        let store: HistoryStore = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse history JSON: {}", path.display()))?;
        Ok(store)
    }

    /// Load a store, starting empty if the file does not exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_json(path)
        } else {
            tracing::debug!(path = %path.display(), "no history file, starting fresh");
            Ok(Self::default())
        }
    }

    pub fn tests(&self) -> &[TestResultSummary] {
        &self.tests
    }

    pub fn mistakes(&self) -> &[MistakeRecord] {
        &self.mistakes
    }

    /// Append a test summary. A test id may only be recorded once.
    pub fn append_summary(&mut self, summary: TestResultSummary) -> Result<(), CoreError> {
        if self.tests.iter().any(|t| t.id == summary.id) {
            return Err(CoreError::DuplicateTest(summary.id));
        }
        self.tests.push(summary);
        Ok(())
    }

    /// Append a batch of mistakes, skipping any id already present.
    pub fn append_mistakes(&mut self, mistakes: impl IntoIterator<Item = MistakeRecord>) -> usize {
        let mut added = 0;
        for mistake in mistakes {
            if self.mistakes.iter().any(|m| m.id == mistake.id) {
                tracing::warn!(id = %mistake.id, "skipping duplicate mistake");
                continue;
            }
            self.mistakes.push(mistake);
            added += 1;
        }
        added
    }

    /// Append the summary and mistakes of a graded test together.
    pub fn record(&mut self, graded: &GradedTest) -> Result<(), CoreError> {
        self.append_summary(graded.summary.clone())?;
        self.append_mistakes(graded.mistakes.iter().cloned());
        Ok(())
    }

    /// Mistakes in insertion order, optionally restricted to one subject.
    pub fn mistakes_by_subject(&self, subject: Option<Subject>) -> Vec<&MistakeRecord> {
        self.mistakes
            .iter()
            .filter(|m| subject.is_none() || subject == Some(m.subject))
            .collect()
    }

    pub fn mistake(&self, id: MistakeId) -> Option<&MistakeRecord> {
        self.mistakes.iter().find(|m| m.id == id)
    }

    /// Set the reviewed flag on one mistake.
    pub fn set_reviewed(&mut self, id: MistakeId, reviewed: bool) -> Result<(), CoreError> {
        let mistake = self
            .mistakes
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| CoreError::MistakeNotFound(id.to_string()))?;
        mistake.reviewed = reviewed;
        tracing::info!(
            %id,
            reviewed,
            "mistake marked as {}",
            if reviewed { "reviewed" } else { "not reviewed" }
        );
        Ok(())
    }

    /// Flip the reviewed flag, returning its new value.
    pub fn toggle_reviewed(&mut self, id: MistakeId) -> Result<bool, CoreError> {
        let current = self
            .mistake(id)
            .map(|m| m.reviewed)
            .ok_or_else(|| CoreError::MistakeNotFound(id.to_string()))?;
        self.set_reviewed(id, !current)?;
        Ok(!current)
    }

    pub fn dashboard(&self) -> DashboardStats {
        compute_dashboard(&self.tests, &self.mistakes)
    }
}
