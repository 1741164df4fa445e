//! Syllabus checklist and weekly study habits.
//!
//! Both are plain flags the learner ticks off; they live in the history
//! store next to the profile.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::Subject;

/// Highest number of checklist items tracked per subject.
pub const MAX_CHECKLIST_ITEMS: usize = 100;
/// Days in a study week.
pub const STUDY_DAYS: usize = 7;
/// Weeks of mock tests tracked per month.
pub const MOCK_WEEKS: usize = 4;

/// Per-subject syllabus items, ticked off by position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyChecklist {
    #[serde(default)]
    physics: Vec<bool>,
    #[serde(default)]
    chemistry: Vec<bool>,
    #[serde(default)]
    biology: Vec<bool>,
}

impl StudyChecklist {
    /// Flags for one subject; items never touched are absent from the tail.
    pub fn items(&self, subject: Subject) -> &[bool] {
        match subject {
            Subject::Physics => &self.physics,
            Subject::Chemistry => &self.chemistry,
            Subject::Biology => &self.biology,
        }
    }

    fn items_mut(&mut self, subject: Subject) -> &mut Vec<bool> {
        match subject {
            Subject::Physics => &mut self.physics,
            Subject::Chemistry => &mut self.chemistry,
            Subject::Biology => &mut self.biology,
        }
    }

    /// Tick or untick the item at a zero-based `index`.
    pub fn set(&mut self, subject: Subject, index: usize, done: bool) -> Result<(), CoreError> {
        if index >= MAX_CHECKLIST_ITEMS {
            return Err(CoreError::Validation(format!(
                "checklist item {} is out of range (1-{MAX_CHECKLIST_ITEMS})",
                index + 1
            )));
        }
        let items = self.items_mut(subject);
        if items.len() <= index {
            items.resize(index + 1, false);
        }
        items[index] = done;
        tracing::debug!(%subject, index, done, "checklist updated");
        Ok(())
    }

    pub fn is_done(&self, subject: Subject, index: usize) -> bool {
        self.items(subject).get(index).copied().unwrap_or(false)
    }

    /// Number of ticked items for a subject.
    pub fn completed(&self, subject: Subject) -> usize {
        self.items(subject).iter().filter(|done| **done).count()
    }
}

/// Daily study and weekly mock-test flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitTracker {
    #[serde(default)]
    pub daily_study: [bool; STUDY_DAYS],
    #[serde(default)]
    pub mock_tests: [bool; MOCK_WEEKS],
}

impl HabitTracker {
    /// Mark a zero-based day of the week as studied.
    pub fn set_study_day(&mut self, day: usize, done: bool) -> Result<(), CoreError> {
        let slot = self.daily_study.get_mut(day).ok_or_else(|| {
            CoreError::Validation(format!("study day {} is out of range (1-{STUDY_DAYS})", day + 1))
        })?;
        *slot = done;
        Ok(())
    }

    /// Mark a zero-based week as having had a mock test.
    pub fn set_mock_week(&mut self, week: usize, done: bool) -> Result<(), CoreError> {
        let slot = self.mock_tests.get_mut(week).ok_or_else(|| {
            CoreError::Validation(format!("mock week {} is out of range (1-{MOCK_WEEKS})", week + 1))
        })?;
        *slot = done;
        Ok(())
    }

    pub fn study_days(&self) -> usize {
        self.daily_study.iter().filter(|d| **d).count()
    }

    pub fn mock_weeks(&self) -> usize {
        self.mock_tests.iter().filter(|w| **w).count()
    }

    /// Clear every flag for a new cycle.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
