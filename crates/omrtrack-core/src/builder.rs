//! Test builder: turns a subject-count configuration into a bubble sheet.
//!
//! The layout is fully deterministic. Subject blocks always appear in the
//! order physics, chemistry, biology (empty blocks are simply skipped), ids
//! run 1..=N across the whole sheet, and display numbers restart at 1 in
//! each block. The answer-key view relies on this to line up with the
//! question view.

use crate::error::CoreError;
use crate::model::{Question, QuestionId, QuestionSet, Subject, TestConfig};

/// Check that a configuration can start a session.
pub fn validate_config(config: &TestConfig) -> Result<(), CoreError> {
    if config.name.trim().is_empty() {
        return Err(CoreError::Validation("test name is required".into()));
    }
    if config.duration_minutes == 0 {
        return Err(CoreError::Validation(
            "duration must be at least 1 minute".into(),
        ));
    }
    if config.total_questions() == 0 {
        return Err(CoreError::Validation(
            "add at least one question".into(),
        ));
    }
    Ok(())
}

/// Generate the ordered question set for a test.
pub fn build_test(config: &TestConfig) -> Result<QuestionSet, CoreError> {
    validate_config(config)?;

    let mut questions = Vec::with_capacity(config.total_questions() as usize);
    let mut next_id = 1u32;

    for subject in Subject::ALL {
        for display_number in 1..=config.counts.get(subject) {
            questions.push(Question {
                id: QuestionId(next_id),
                subject,
                display_number,
            });
            next_id += 1;
        }
    }

    tracing::debug!(
        test = %config.name,
        questions = questions.len(),
        "built question set"
    );

    Ok(QuestionSet::from_vec(questions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SubjectCounts;

    fn config(physics: u32, chemistry: u32, biology: u32) -> TestConfig {
        TestConfig::new("Mock", 180, SubjectCounts::new(physics, chemistry, biology))
    }

    #[test]
    fn ids_are_dense_across_subject_blocks() {
        let set = build_test(&config(2, 1, 0)).unwrap();
        let ids: Vec<u32> = set.ids().map(|id| id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        let subjects: Vec<Subject> = set.iter().map(|q| q.subject).collect();
        assert_eq!(
            subjects,
            vec![Subject::Physics, Subject::Physics, Subject::Chemistry]
        );
    }

    #[test]
    fn display_numbers_restart_per_subject() {
        let set = build_test(&config(3, 2, 4)).unwrap();
        for subject in Subject::ALL {
            let numbers: Vec<u32> = set.by_subject(subject).map(|q| q.display_number).collect();
            let expected: Vec<u32> = (1..=config(3, 2, 4).counts.get(subject)).collect();
            assert_eq!(numbers, expected, "display numbers for {subject}");
        }
    }

    #[test]
    fn blocks_are_contiguous_in_canonical_order() {
        let set = build_test(&config(0, 3, 2)).unwrap();
        assert_eq!(set.len(), 5);
        assert_eq!(set.as_slice()[0].subject, Subject::Chemistry);
        assert_eq!(set.as_slice()[0].id, QuestionId(1));
        assert_eq!(set.as_slice()[3].subject, Subject::Biology);
        assert_eq!(set.as_slice()[3].display_number, 1);
        assert_eq!(set.as_slice()[3].id, QuestionId(4));
    }

    #[test]
    fn same_config_builds_same_sheet() {
        let a = build_test(&config(4, 4, 4)).unwrap();
        let b = build_test(&config(4, 4, 4)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn every_size_yields_exact_count() {
        for p in 0..4 {
            for c in 0..4 {
                for b in 0..4 {
                    let cfg = config(p, c, b);
                    if p + c + b == 0 {
                        assert!(build_test(&cfg).is_err());
                        continue;
                    }
                    let set = build_test(&cfg).unwrap();
                    assert_eq!(set.len() as u32, p + c + b);
                    let last = set.as_slice().last().unwrap();
                    assert_eq!(last.id, QuestionId(p + c + b));
                }
            }
        }
    }

    #[test]
    fn zero_questions_is_a_validation_error() {
        let err = build_test(&config(0, 0, 0)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn blank_name_and_zero_duration_rejected() {
        let mut cfg = config(1, 0, 0);
        cfg.name = "   ".into();
        assert!(matches!(build_test(&cfg), Err(CoreError::Validation(_))));

        let mut cfg = config(1, 0, 0);
        cfg.duration_minutes = 0;
        assert!(matches!(build_test(&cfg), Err(CoreError::Validation(_))));
    }

    #[test]
    fn lookup_by_id() {
        let set = build_test(&config(2, 2, 0)).unwrap();
        assert_eq!(set.get(QuestionId(3)).unwrap().subject, Subject::Chemistry);
        assert!(set.get(QuestionId(0)).is_none());
        assert!(set.get(QuestionId(5)).is_none());
    }
}
