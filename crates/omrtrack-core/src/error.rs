//! Core error types.
//!
//! Every variant is recoverable: the presentation layer reports the message
//! and re-prompts the learner. Nothing here is fatal to the process.

use thiserror::Error;

use crate::model::QuestionId;

/// Errors raised by the test builder, answer capture, session, and history store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The test configuration is malformed or has no questions.
    #[error("invalid test configuration: {0}")]
    Validation(String),

    /// Grading was requested before every question had an answer-key entry.
    #[error("answer key incomplete, missing: {}", format_ids(.missing))]
    IncompleteAnswerKey { missing: Vec<QuestionId> },

    /// A mark outside the accepted option set was captured in strict mode,
    /// or an empty mark was captured in any mode.
    #[error("invalid option token '{token}' (expected one of A, B, C, D)")]
    InvalidOptionToken { token: String },

    /// A mark was recorded against a question that is not part of the session.
    #[error("unknown question {0}")]
    UnknownQuestion(QuestionId),

    /// The session is not in the phase the operation requires.
    #[error("cannot {action} while session is {phase}")]
    WrongPhase {
        action: &'static str,
        phase: &'static str,
    },

    /// A summary with this test id is already stored.
    #[error("test {0} is already recorded in history")]
    DuplicateTest(uuid::Uuid),

    /// No mistake with this id exists in the history store.
    #[error("mistake not found: {0}")]
    MistakeNotFound(String),
}

impl CoreError {
    /// Question ids missing from the answer key, if this is an incomplete-key error.
    pub fn missing_ids(&self) -> &[QuestionId] {
        match self {
            CoreError::IncompleteAnswerKey { missing } => missing,
            _ => &[],
        }
    }
}

fn format_ids(ids: &[QuestionId]) -> String {
    ids.iter()
        .map(|id| format!("Q{id}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_key_lists_question_numbers() {
        let err = CoreError::IncompleteAnswerKey {
            missing: vec![QuestionId(2), QuestionId(5)],
        };
        assert_eq!(err.to_string(), "answer key incomplete, missing: Q2, Q5");
        assert_eq!(err.missing_ids(), &[QuestionId(2), QuestionId(5)]);
    }

    #[test]
    fn other_errors_have_no_missing_ids() {
        let err = CoreError::Validation("no questions".into());
        assert!(err.missing_ids().is_empty());
    }
}
