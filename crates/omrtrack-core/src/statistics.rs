//! Per-subject breakdowns and dashboard aggregates.

use serde::{Deserialize, Serialize};

use crate::model::{QuestionSet, Subject};
use crate::results::{MistakeRecord, Outcome, ResultSet, TestResultSummary};

/// Outcome counts for one subject block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectBreakdown {
    pub subject: Subject,
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub unanswered: usize,
}

impl SubjectBreakdown {
    /// Share of the block answered correctly, in percent.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64 * 100.0
        }
    }
}

/// Outcome counts per subject, in canonical order, skipping empty blocks.
pub fn subject_breakdown(questions: &QuestionSet, results: &ResultSet) -> Vec<SubjectBreakdown> {
    Subject::ALL
        .iter()
        .filter_map(|&subject| {
            let mut row = SubjectBreakdown {
                subject,
                total: 0,
                correct: 0,
                incorrect: 0,
                unanswered: 0,
            };
            for question in questions.by_subject(subject) {
                row.total += 1;
                match results.outcome(question.id) {
                    Some(Outcome::Correct) => row.correct += 1,
                    Some(Outcome::Incorrect) => row.incorrect += 1,
                    Some(Outcome::Unanswered) | None => row.unanswered += 1,
                }
            }
            (row.total > 0).then_some(row)
        })
        .collect()
}

/// Percentage of the sheet filled in so far.
pub fn answered_progress(answered: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        answered as f64 / total as f64 * 100.0
    }
}

/// Coarse rating of a test score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Success,
    Warning,
    Error,
}

impl ScoreBand {
    pub fn for_score(score: i64) -> Self {
        if score >= 400 {
            ScoreBand::Success
        } else if score >= 200 {
            ScoreBand::Warning
        } else {
            ScoreBand::Error
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreBand::Success => "success",
            ScoreBand::Warning => "warning",
            ScoreBand::Error => "error",
        }
    }
}

/// Headline numbers across all recorded tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_tests: usize,
    /// Mean score rounded half up; zero when no tests are recorded.
    pub average_score: i64,
    pub best_score: Option<i64>,
    pub total_mistakes: usize,
    pub unreviewed_mistakes: usize,
}

pub fn compute_dashboard(tests: &[TestResultSummary], mistakes: &[MistakeRecord]) -> DashboardStats {
    let average_score = if tests.is_empty() {
        0
    } else {
        let sum: i64 = tests.iter().map(|t| t.score).sum();
        (sum as f64 / tests.len() as f64 + 0.5).floor() as i64
    };

    DashboardStats {
        total_tests: tests.len(),
        average_score,
        best_score: tests.iter().map(|t| t.score).max(),
        total_mistakes: mistakes.len(),
        unreviewed_mistakes: mistakes.iter().filter(|m| !m.reviewed).count(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::builder::build_test;
    use crate::model::{QuestionId, SubjectCounts, TestConfig};

    fn summary(score: i64) -> TestResultSummary {
        TestResultSummary {
            id: Uuid::new_v4(),
            name: "t".into(),
            date: Utc::now(),
            score,
            correct_count: 0,
            incorrect_count: 0,
            unanswered_count: 0,
            total_questions: 1,
        }
    }

    #[test]
    fn breakdown_skips_empty_subjects() {
        let questions =
            build_test(&TestConfig::new("B", 10, SubjectCounts::new(2, 0, 1))).unwrap();
        let mut results = ResultSet::default();
        results.correct.insert(QuestionId(1));
        results.incorrect.insert(QuestionId(2));
        results.unanswered.insert(QuestionId(3));

        let rows = subject_breakdown(&questions, &results);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].subject, Subject::Physics);
        assert_eq!((rows[0].correct, rows[0].incorrect, rows[0].total), (1, 1, 2));
        assert_eq!(rows[1].subject, Subject::Biology);
        assert_eq!(rows[1].unanswered, 1);
        assert!((rows[0].accuracy() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn score_bands() {
        assert_eq!(ScoreBand::for_score(400), ScoreBand::Success);
        assert_eq!(ScoreBand::for_score(399), ScoreBand::Warning);
        assert_eq!(ScoreBand::for_score(200), ScoreBand::Warning);
        assert_eq!(ScoreBand::for_score(-3), ScoreBand::Error);
    }

    #[test]
    fn dashboard_average_rounds_half_up() {
        let stats = compute_dashboard(&[summary(3), summary(4)], &[]);
        assert_eq!(stats.average_score, 4);
        let stats = compute_dashboard(&[summary(-3), summary(-2)], &[]);
        assert_eq!(stats.average_score, -2);
        assert_eq!(stats.best_score, Some(-2));
    }

    #[test]
    fn dashboard_empty_history() {
        let stats = compute_dashboard(&[], &[]);
        assert_eq!(stats, DashboardStats::default());
    }

    #[test]
    fn progress_percentage() {
        assert_eq!(answered_progress(0, 0), 0.0);
        assert!((answered_progress(1, 4) - 25.0).abs() < f64::EPSILON);
    }
}
