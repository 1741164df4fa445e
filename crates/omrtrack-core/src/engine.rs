//! Scoring engine.
//!
//! Grading is a pure function of the question set, the learner's marks, and
//! the answer key. Each question lands in exactly one bucket of the
//! [`ResultSet`]; every incorrect answer yields one [`MistakeRecord`]. The
//! engine never persists anything, callers append the outputs to history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::model::{AnswerMap, QuestionId, QuestionSet};
use crate::results::{MistakeId, MistakeRecord, Outcome, ResultSet, TestResultSummary};

/// Marks awarded for a correct answer.
pub const SCORE_CORRECT: i64 = 4;
/// Marks awarded for an incorrect answer.
pub const SCORE_INCORRECT: i64 = -1;

/// Metadata of the test being graded, stamped onto its outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestMeta {
    /// Identifier of this graded test.
    pub id: Uuid,
    pub name: String,
    pub taken_at: DateTime<Utc>,
}

impl TestMeta {
    /// Metadata for a test graded now, with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self::at(name, Utc::now())
    }

    pub fn at(name: impl Into<String>, taken_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            taken_at,
        }
    }
}

/// Output of [`score`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grade {
    pub results: ResultSet,
    pub score: i64,
    pub mistakes: Vec<MistakeRecord>,
}

/// Output of [`grade_test`]: the grade plus its history summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedTest {
    pub results: ResultSet,
    pub score: i64,
    pub mistakes: Vec<MistakeRecord>,
    pub summary: TestResultSummary,
}

/// Fixed marking rule: +4 per correct, -1 per incorrect, 0 per unanswered.
pub fn compute_score(correct: usize, incorrect: usize) -> i64 {
    SCORE_CORRECT * correct as i64 + SCORE_INCORRECT * incorrect as i64
}

/// Check that every question has an answer-key entry.
pub fn validate_answer_key_complete(
    questions: &QuestionSet,
    answer_key: &AnswerMap,
) -> Result<(), CoreError> {
    let missing: Vec<QuestionId> = questions
        .ids()
        .filter(|id| !answer_key.contains(*id))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::IncompleteAnswerKey { missing })
    }
}

/// Classify a single question.
///
/// Any submitted token that differs from the key, including tokens outside
/// A-D, counts as incorrect. A missing key entry never matches.
pub fn classify(id: QuestionId, answers: &AnswerMap, answer_key: &AnswerMap) -> Outcome {
    match answers.get(id) {
        None => Outcome::Unanswered,
        Some(given) if answer_key.get(id) == Some(given) => Outcome::Correct,
        Some(_) => Outcome::Incorrect,
    }
}

/// Grade a question set. Assumes a complete answer key.
pub fn score(
    questions: &QuestionSet,
    answers: &AnswerMap,
    answer_key: &AnswerMap,
    meta: &TestMeta,
) -> Grade {
    let mut results = ResultSet::default();
    let mut mistakes = Vec::new();

    for question in questions {
        let outcome = classify(question.id, answers, answer_key);
        results.insert(question.id, outcome);

        if outcome != Outcome::Incorrect {
            continue;
        }
        let (Some(user_answer), Some(correct_answer)) =
            (answers.get(question.id), answer_key.get(question.id))
        else {
            // Incorrect only because the key entry is absent; nothing to record.
            continue;
        };
        mistakes.push(MistakeRecord {
            id: MistakeId {
                test_id: meta.id,
                question_id: question.id,
            },
            question_id: question.id,
            subject: question.subject,
            display_number: question.display_number,
            user_answer: user_answer.clone(),
            correct_answer: correct_answer.clone(),
            created_at: meta.taken_at,
            reviewed: false,
            test_name: meta.name.clone(),
        });
    }

    let score = compute_score(results.correct_count(), results.incorrect_count());

    Grade {
        results,
        score,
        mistakes,
    }
}

/// Validate the key, grade, and build the history summary.
///
/// Either the whole question set is graded or nothing is.
pub fn grade_test(
    questions: &QuestionSet,
    answers: &AnswerMap,
    answer_key: &AnswerMap,
    meta: &TestMeta,
) -> Result<GradedTest, CoreError> {
    validate_answer_key_complete(questions, answer_key)?;

    let Grade {
        results,
        score,
        mistakes,
    } = score(questions, answers, answer_key, meta);

    let summary = TestResultSummary {
        id: meta.id,
        name: meta.name.clone(),
        date: meta.taken_at,
        score,
        correct_count: results.correct_count(),
        incorrect_count: results.incorrect_count(),
        unanswered_count: results.unanswered_count(),
        total_questions: questions.len(),
    };

    tracing::info!(
        test = %meta.name,
        score,
        correct = summary.correct_count,
        incorrect = summary.incorrect_count,
        unanswered = summary.unanswered_count,
        "graded test"
    );

    Ok(GradedTest {
        results,
        score,
        mistakes,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::builder::build_test;
    use crate::model::{CapturePolicy, OptionToken, Subject, SubjectCounts, TestConfig};

    fn marks(pairs: &[(u32, &str)]) -> AnswerMap {
        pairs
            .iter()
            .map(|(id, tok)| {
                (
                    QuestionId(*id),
                    OptionToken::capture(tok, CapturePolicy::Permissive).unwrap(),
                )
            })
            .collect()
    }

    fn sheet(physics: u32, chemistry: u32, biology: u32) -> QuestionSet {
        build_test(&TestConfig::new(
            "Mock",
            60,
            SubjectCounts::new(physics, chemistry, biology),
        ))
        .unwrap()
    }

    fn ids(raw: &[u32]) -> BTreeSet<QuestionId> {
        raw.iter().copied().map(QuestionId).collect()
    }

    #[test]
    fn worked_example() {
        let questions = sheet(2, 1, 0);
        let answers = marks(&[(1, "A"), (2, "B")]);
        let key = marks(&[(1, "A"), (2, "C"), (3, "D")]);
        let meta = TestMeta::new("Mock");

        let graded = grade_test(&questions, &answers, &key, &meta).unwrap();
        assert_eq!(graded.results.correct, ids(&[1]));
        assert_eq!(graded.results.incorrect, ids(&[2]));
        assert_eq!(graded.results.unanswered, ids(&[3]));
        assert_eq!(graded.score, 3);

        assert_eq!(graded.mistakes.len(), 1);
        let mistake = &graded.mistakes[0];
        assert_eq!(mistake.question_id, QuestionId(2));
        assert_eq!(mistake.subject, Subject::Physics);
        assert_eq!(mistake.user_answer.as_str(), "B");
        assert_eq!(mistake.correct_answer.as_str(), "C");
        assert_eq!(mistake.test_name, "Mock");
        assert!(!mistake.reviewed);

        assert_eq!(graded.summary.total_questions, 3);
        assert_eq!(graded.summary.score, 3);
        assert_eq!(graded.summary.id, meta.id);
    }

    #[test]
    fn score_can_go_negative() {
        let questions = sheet(5, 0, 0);
        let answers = marks(&[(1, "B"), (2, "B"), (3, "B"), (4, "B"), (5, "B")]);
        let key = marks(&[(1, "A"), (2, "A"), (3, "A"), (4, "A"), (5, "A")]);
        let grade = score(&questions, &answers, &key, &TestMeta::new("Neg"));
        assert_eq!(grade.score, -5);
        assert_eq!(grade.mistakes.len(), 5);
    }

    #[test]
    fn results_partition_question_ids() {
        let questions = sheet(3, 3, 3);
        let answers = marks(&[(1, "A"), (2, "C"), (4, "D"), (5, "A"), (9, "B")]);
        let key = marks(&[
            (1, "A"),
            (2, "B"),
            (3, "C"),
            (4, "D"),
            (5, "B"),
            (6, "A"),
            (7, "A"),
            (8, "A"),
            (9, "B"),
        ]);
        let grade = score(&questions, &answers, &key, &TestMeta::new("P"));
        let r = &grade.results;

        let all: BTreeSet<QuestionId> = questions.ids().collect();
        let union: BTreeSet<QuestionId> = r
            .correct
            .union(&r.incorrect)
            .chain(r.unanswered.iter())
            .copied()
            .collect();
        assert_eq!(union, all);
        assert_eq!(r.total(), questions.len());
        assert!(r.correct.is_disjoint(&r.incorrect));
        assert!(r.correct.is_disjoint(&r.unanswered));
        assert!(r.incorrect.is_disjoint(&r.unanswered));

        assert_eq!(
            grade.score,
            4 * r.correct_count() as i64 - r.incorrect_count() as i64
        );
        assert_eq!(grade.mistakes.len(), r.incorrect_count());
    }

    #[test]
    fn grading_is_deterministic() {
        let questions = sheet(2, 2, 2);
        let answers = marks(&[(1, "A"), (3, "B"), (6, "D")]);
        let key = marks(&[(1, "A"), (2, "A"), (3, "C"), (4, "D"), (5, "A"), (6, "D")]);
        let meta = TestMeta::new("Det");
        let first = score(&questions, &answers, &key, &meta);
        let second = score(&questions, &answers, &key, &meta);
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_tokens_grade_as_incorrect() {
        let questions = sheet(1, 0, 0);
        let answers = marks(&[(1, "E")]);
        let key = marks(&[(1, "A")]);
        let grade = score(&questions, &answers, &key, &TestMeta::new("Loose"));
        assert_eq!(grade.results.incorrect, ids(&[1]));
        assert_eq!(grade.mistakes[0].user_answer.as_str(), "E");
    }

    #[test]
    fn matching_is_exact() {
        let questions = sheet(1, 0, 0);
        let answers = marks(&[(1, "a")]);
        let key = marks(&[(1, "A")]);
        let grade = score(&questions, &answers, &key, &TestMeta::new("Case"));
        assert_eq!(grade.results.incorrect, ids(&[1]));
    }

    #[test]
    fn incomplete_key_blocks_grading() {
        let questions = sheet(2, 2, 0);
        let key = marks(&[(1, "A"), (3, "C")]);
        let err = grade_test(&questions, &AnswerMap::new(), &key, &TestMeta::new("X"))
            .unwrap_err();
        assert_eq!(err.missing_ids(), &[QuestionId(2), QuestionId(4)]);
    }

    #[test]
    fn blank_sheet_scores_zero() {
        let questions = sheet(0, 0, 4);
        let key = marks(&[(1, "A"), (2, "B"), (3, "C"), (4, "D")]);
        let graded = grade_test(&questions, &AnswerMap::new(), &key, &TestMeta::new("Z")).unwrap();
        assert_eq!(graded.score, 0);
        assert_eq!(graded.summary.unanswered_count, 4);
        assert!(graded.mistakes.is_empty());
    }

    #[test]
    fn mistake_ids_are_unique_within_a_test() {
        let questions = sheet(3, 0, 0);
        let answers = marks(&[(1, "B"), (2, "B"), (3, "B")]);
        let key = marks(&[(1, "A"), (2, "A"), (3, "A")]);
        let grade = score(&questions, &answers, &key, &TestMeta::new("U"));
        let unique: BTreeSet<String> = grade.mistakes.iter().map(|m| m.id.to_string()).collect();
        assert_eq!(unique.len(), 3);
    }
}
