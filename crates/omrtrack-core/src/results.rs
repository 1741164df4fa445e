//! Grading output types: per-question classification, mistake records, and
//! test summaries.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{OptionToken, QuestionId, Subject};

/// Classification of one question after grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Correct,
    Incorrect,
    Unanswered,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Correct => write!(f, "correct"),
            Outcome::Incorrect => write!(f, "incorrect"),
            Outcome::Unanswered => write!(f, "unanswered"),
        }
    }
}

/// Partition of a question set into correct, incorrect, and unanswered ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    pub correct: BTreeSet<QuestionId>,
    pub incorrect: BTreeSet<QuestionId>,
    pub unanswered: BTreeSet<QuestionId>,
}

impl ResultSet {
    pub(crate) fn insert(&mut self, id: QuestionId, outcome: Outcome) {
        match outcome {
            Outcome::Correct => self.correct.insert(id),
            Outcome::Incorrect => self.incorrect.insert(id),
            Outcome::Unanswered => self.unanswered.insert(id),
        };
    }

    pub fn outcome(&self, id: QuestionId) -> Option<Outcome> {
        if self.correct.contains(&id) {
            Some(Outcome::Correct)
        } else if self.incorrect.contains(&id) {
            Some(Outcome::Incorrect)
        } else if self.unanswered.contains(&id) {
            Some(Outcome::Unanswered)
        } else {
            None
        }
    }

    pub fn correct_count(&self) -> usize {
        self.correct.len()
    }

    pub fn incorrect_count(&self) -> usize {
        self.incorrect.len()
    }

    pub fn unanswered_count(&self) -> usize {
        self.unanswered.len()
    }

    pub fn total(&self) -> usize {
        self.correct.len() + self.incorrect.len() + self.unanswered.len()
    }
}

/// Identifier of a mistake: the graded test it came from plus the question.
///
/// The engine emits at most one mistake per question per test, so the pair
/// is unique as long as test ids are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MistakeId {
    pub test_id: Uuid,
    pub question_id: QuestionId,
}

impl fmt::Display for MistakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.test_id, self.question_id)
    }
}

impl FromStr for MistakeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (test, question) = s
            .trim()
            .rsplit_once(':')
            .ok_or_else(|| format!("invalid mistake id '{s}', expected <test-id>:<question>"))?;
        let test_id = Uuid::parse_str(test).map_err(|e| format!("invalid test id '{test}': {e}"))?;
        let question_id = question.parse::<QuestionId>()?;
        Ok(MistakeId {
            test_id,
            question_id,
        })
    }
}

/// One incorrectly answered question, kept for later review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MistakeRecord {
    pub id: MistakeId,
    pub question_id: QuestionId,
    pub subject: Subject,
    /// Position within the subject block, as printed on the sheet.
    #[serde(default)]
    pub display_number: u32,
    pub user_answer: OptionToken,
    pub correct_answer: OptionToken,
    pub created_at: DateTime<Utc>,
    /// The only field mutated after creation.
    #[serde(default)]
    pub reviewed: bool,
    pub test_name: String,
}

/// Final tally of one completed test. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResultSummary {
    pub id: Uuid,
    pub name: String,
    pub date: DateTime<Utc>,
    /// May be negative.
    pub score: i64,
    pub correct_count: usize,
    pub incorrect_count: usize,
    pub unanswered_count: usize,
    pub total_questions: usize,
}
