//! Learner profile.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Target score assumed when none is given.
pub const DEFAULT_TARGET_SCORE: u32 = 650;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerProfile {
    pub name: String,
    pub age: u32,
    pub exam_date: NaiveDate,
    #[serde(default = "default_target")]
    pub target_score: u32,
}

fn default_target() -> u32 {
    DEFAULT_TARGET_SCORE
}

impl LearnerProfile {
    /// Build a profile, requiring every field to be filled in.
    pub fn new(
        name: &str,
        age: u32,
        exam_date: NaiveDate,
        target_score: u32,
    ) -> Result<Self, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("name is required".into()));
        }
        if age == 0 {
            return Err(CoreError::Validation("age is required".into()));
        }
        if target_score == 0 {
            return Err(CoreError::Validation("target score is required".into()));
        }
        Ok(Self {
            name: name.to_string(),
            age,
            exam_date,
            target_score,
        })
    }

    /// Whole days from `today` until the exam; negative once it has passed.
    pub fn days_until_exam(&self, today: NaiveDate) -> i64 {
        (self.exam_date - today).num_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn all_fields_required() {
        assert!(LearnerProfile::new(" ", 17, date(2027, 5, 2), 650).is_err());
        assert!(LearnerProfile::new("Asha", 0, date(2027, 5, 2), 650).is_err());
        assert!(LearnerProfile::new("Asha", 17, date(2027, 5, 2), 0).is_err());
        let p = LearnerProfile::new("  Asha ", 17, date(2027, 5, 2), 650).unwrap();
        assert_eq!(p.name, "Asha");
    }

    #[test]
    fn countdown_in_days() {
        let p = LearnerProfile::new("Asha", 17, date(2027, 5, 2), 650).unwrap();
        assert_eq!(p.days_until_exam(date(2027, 4, 30)), 2);
        assert_eq!(p.days_until_exam(date(2027, 5, 3)), -1);
    }

    #[test]
    fn target_defaults_when_missing() {
        let p: LearnerProfile =
            serde_json::from_str(r#"{"name":"A","age":18,"exam_date":"2027-05-02"}"#).unwrap();
        assert_eq!(p.target_score, DEFAULT_TARGET_SCORE);
    }
}
