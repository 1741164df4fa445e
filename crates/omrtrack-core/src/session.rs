//! An owned practice-test session.
//!
//! The session holds everything that lives only for one sitting: the
//! configuration, the generated question set, the learner's marks, the
//! answer key, the last grade, and the test countdown. It moves through
//! three phases:
//!
//! ```text
//! Answering --submit_answers--> AwaitingKey --grade--> Graded
//! ```
//!
//! Submission happens either manually or when the countdown expires; both
//! paths converge on a single transition. Once the clock has run out the
//! session reports [`Phase::AwaitingKey`] and refuses further answers, even
//! before the owner reacts to the expiry signal.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::builder::build_test;
use crate::engine::{grade_test, GradedTest, TestMeta};
use crate::error::CoreError;
use crate::model::{AnswerMap, CapturePolicy, OptionToken, QuestionId, QuestionSet, TestConfig};
use crate::results::ResultSet;
use crate::timer::{start_countdown, CountdownHandle};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// The learner is filling in the sheet; the countdown may be running.
    Answering,
    /// Answers are locked; the answer key is being entered.
    AwaitingKey,
    /// Results have been computed at least once.
    Graded,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Answering => "answering",
            Phase::AwaitingKey => "awaiting key",
            Phase::Graded => "graded",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sitting of a practice test.
#[derive(Debug)]
pub struct Session {
    config: TestConfig,
    questions: QuestionSet,
    answers: AnswerMap,
    answer_key: AnswerMap,
    results: Option<ResultSet>,
    policy: CapturePolicy,
    phase: Phase,
    countdown: Option<CountdownHandle>,
    time_remaining: Arc<AtomicU64>,
    time_up: Arc<AtomicBool>,
}

impl Session {
    /// Build the question set and open a session in the answering phase.
    pub fn start(config: TestConfig, policy: CapturePolicy) -> Result<Self, CoreError> {
        let questions = build_test(&config)?;
        let time_remaining = Arc::new(AtomicU64::new(config.duration_secs()));

        tracing::info!(
            test = %config.name,
            questions = questions.len(),
            duration_minutes = config.duration_minutes,
            "session started"
        );

        Ok(Self {
            config,
            questions,
            answers: AnswerMap::new(),
            answer_key: AnswerMap::new(),
            results: None,
            policy,
            phase: Phase::Answering,
            countdown: None,
            time_remaining,
            time_up: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn answer_key(&self) -> &AnswerMap {
        &self.answer_key
    }

    /// The most recent grade, if any.
    pub fn results(&self) -> Option<&ResultSet> {
        self.results.as_ref()
    }

    pub fn phase(&self) -> Phase {
        if self.phase == Phase::Answering && self.is_time_up() {
            Phase::AwaitingKey
        } else {
            self.phase
        }
    }

    pub fn policy(&self) -> CapturePolicy {
        self.policy
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// Seconds left on the test clock.
    pub fn time_remaining(&self) -> u64 {
        self.time_remaining.load(Ordering::SeqCst)
    }

    /// Whether the test countdown has run out.
    pub fn is_time_up(&self) -> bool {
        self.time_up.load(Ordering::SeqCst)
    }

    pub fn is_timer_active(&self) -> bool {
        self.countdown.as_ref().is_some_and(CountdownHandle::is_active)
    }

    /// Questions that still lack an answer-key entry, in sheet order.
    pub fn missing_key_entries(&self) -> Vec<QuestionId> {
        self.questions
            .ids()
            .filter(|id| !self.answer_key.contains(*id))
            .collect()
    }

    /// Record (or change) the learner's mark for a question.
    pub fn record_answer(
        &mut self,
        id: QuestionId,
        raw: &str,
    ) -> Result<Option<OptionToken>, CoreError> {
        self.apply_expiry();
        self.require_phase(Phase::Answering, "record an answer")?;
        let token = self.capture(id, raw)?;
        Ok(self.answers.record(id, token))
    }

    /// Record (or change) the answer-key entry for a question.
    pub fn record_answer_key_entry(
        &mut self,
        id: QuestionId,
        raw: &str,
    ) -> Result<Option<OptionToken>, CoreError> {
        self.apply_expiry();
        self.require_phase(Phase::AwaitingKey, "record an answer-key entry")?;
        let token = self.capture(id, raw)?;
        Ok(self.answer_key.record(id, token))
    }

    /// Start the test countdown from the time remaining.
    ///
    /// Returns `None` without side effects if a countdown is already running
    /// or the answering phase is over. The receiver resolves when the clock
    /// runs out; the owner should then call [`Session::submit_answers`].
    pub fn start_timer<F>(&mut self, mut on_tick: F) -> Option<oneshot::Receiver<()>>
    where
        F: FnMut(u64) + Send + 'static,
    {
        self.apply_expiry();
        if self.phase != Phase::Answering || self.is_timer_active() {
            return None;
        }
        if let Some(mut stale) = self.countdown.take() {
            stale.cancel();
        }

        let (expired_tx, expired_rx) = oneshot::channel();
        let remaining = Arc::clone(&self.time_remaining);
        let time_up = Arc::clone(&self.time_up);
        self.countdown = Some(start_countdown(
            self.time_remaining(),
            move |secs| {
                remaining.store(secs, Ordering::SeqCst);
                on_tick(secs);
            },
            move || {
                tracing::info!("test time is up");
                time_up.store(true, Ordering::SeqCst);
                let _ = expired_tx.send(());
            },
        ));
        Some(expired_rx)
    }

    /// Lock the learner's answers and move on to answer-key entry.
    ///
    /// Returns `false` if answers were already submitted, including when an
    /// earlier call already applied an expired clock.
    pub fn submit_answers(&mut self) -> bool {
        if self.phase != Phase::Answering {
            return false;
        }
        self.stop_timer();
        self.phase = Phase::AwaitingKey;
        tracing::info!(
            answered = self.answers.len(),
            total = self.questions.len(),
            "answers submitted"
        );
        true
    }

    /// Grade the sheet against the answer key.
    ///
    /// Fails with [`CoreError::IncompleteAnswerKey`] if any question lacks a
    /// key entry, leaving the session unchanged. Grading again recomputes
    /// the results from scratch.
    pub fn grade(&mut self, taken_at: DateTime<Utc>) -> Result<GradedTest, CoreError> {
        self.apply_expiry();
        if self.phase == Phase::Answering {
            return Err(self.wrong_phase("grade"));
        }
        let meta = TestMeta::at(self.config.name.clone(), taken_at);
        let graded = grade_test(&self.questions, &self.answers, &self.answer_key, &meta)?;
        self.results = Some(graded.results.clone());
        self.phase = Phase::Graded;
        Ok(graded)
    }

    /// Cancel the countdown and discard every mark and result.
    pub fn reset(&mut self) {
        self.stop_timer();
        self.answers.clear();
        self.answer_key.clear();
        self.results = None;
        self.phase = Phase::Answering;
        self.time_up.store(false, Ordering::SeqCst);
        self.time_remaining
            .store(self.config.duration_secs(), Ordering::SeqCst);
        tracing::info!(test = %self.config.name, "session reset");
    }

    fn stop_timer(&mut self) {
        if let Some(mut countdown) = self.countdown.take() {
            countdown.cancel();
        }
    }

    /// Submit on behalf of an expired countdown that nobody has acted on yet.
    fn apply_expiry(&mut self) {
        if self.phase == Phase::Answering && self.is_time_up() {
            self.submit_answers();
        }
    }

    fn capture(&self, id: QuestionId, raw: &str) -> Result<OptionToken, CoreError> {
        if !self.questions.contains(id) {
            return Err(CoreError::UnknownQuestion(id));
        }
        let token = OptionToken::capture(raw, self.policy)?;
        if !token.is_standard() {
            tracing::warn!(question = %id, %token, "accepted mark outside A-D");
        }
        Ok(token)
    }

    fn require_phase(&self, phase: Phase, action: &'static str) -> Result<(), CoreError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(self.wrong_phase(action))
        }
    }

    fn wrong_phase(&self, action: &'static str) -> CoreError {
        CoreError::WrongPhase {
            action,
            phase: self.phase.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::model::SubjectCounts;
    use crate::results::Outcome;
    use tokio::time::sleep;

    fn session(physics: u32, chemistry: u32, biology: u32) -> Session {
        Session::start(
            TestConfig::new(
                "Mock",
                1,
                SubjectCounts::new(physics, chemistry, biology),
            ),
            CapturePolicy::Permissive,
        )
        .unwrap()
    }

    #[test]
    fn start_rejects_empty_test() {
        let err = Session::start(
            TestConfig::new("Empty", 10, SubjectCounts::default()),
            CapturePolicy::Permissive,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn full_lifecycle_matches_worked_example() {
        let mut s = session(2, 1, 0);
        s.record_answer(QuestionId(1), "A").unwrap();
        s.record_answer(QuestionId(2), "D").unwrap();
        assert_eq!(
            s.record_answer(QuestionId(2), "B").unwrap().unwrap().as_str(),
            "D"
        );
        assert_eq!(s.answered_count(), 2);

        assert!(s.submit_answers());
        assert_eq!(s.phase(), Phase::AwaitingKey);

        s.record_answer_key_entry(QuestionId(1), "A").unwrap();
        s.record_answer_key_entry(QuestionId(2), "C").unwrap();
        let err = s.grade(Utc::now()).unwrap_err();
        assert_eq!(err.missing_ids(), &[QuestionId(3)]);
        assert_eq!(s.phase(), Phase::AwaitingKey);

        s.record_answer_key_entry(QuestionId(3), "D").unwrap();
        let graded = s.grade(Utc::now()).unwrap();
        assert_eq!(graded.score, 3);
        assert_eq!(s.phase(), Phase::Graded);
        let results = s.results().unwrap();
        assert_eq!(results.outcome(QuestionId(3)), Some(Outcome::Unanswered));
    }

    #[test]
    fn marks_are_phase_gated() {
        let mut s = session(1, 0, 0);
        assert!(matches!(
            s.record_answer_key_entry(QuestionId(1), "A"),
            Err(CoreError::WrongPhase { .. })
        ));
        assert!(matches!(s.grade(Utc::now()), Err(CoreError::WrongPhase { .. })));
        s.submit_answers();
        assert!(matches!(
            s.record_answer(QuestionId(1), "A"),
            Err(CoreError::WrongPhase { .. })
        ));
    }

    #[test]
    fn unknown_question_rejected() {
        let mut s = session(2, 0, 0);
        assert_eq!(
            s.record_answer(QuestionId(3), "A").unwrap_err(),
            CoreError::UnknownQuestion(QuestionId(3))
        );
    }

    #[test]
    fn strict_policy_rejects_bad_tokens_at_capture() {
        let mut s = Session::start(
            TestConfig::new("Strict", 5, SubjectCounts::new(1, 0, 0)),
            CapturePolicy::Strict,
        )
        .unwrap();
        assert!(matches!(
            s.record_answer(QuestionId(1), "E"),
            Err(CoreError::InvalidOptionToken { .. })
        ));
        assert!(s.answers().is_empty());
    }

    #[test]
    fn submit_transitions_only_once() {
        let mut s = session(1, 0, 0);
        assert!(s.submit_answers());
        assert!(!s.submit_answers());
    }

    #[test]
    fn regrade_recomputes_results() {
        let mut s = session(1, 1, 0);
        s.record_answer(QuestionId(1), "A").unwrap();
        s.submit_answers();
        s.record_answer_key_entry(QuestionId(1), "A").unwrap();
        s.record_answer_key_entry(QuestionId(2), "B").unwrap();
        let first = s.grade(Utc::now()).unwrap();
        let second = s.grade(Utc::now()).unwrap();
        assert_eq!(first.results, second.results);
        assert_eq!(first.score, second.score);
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_signals_submission() {
        let mut s = session(1, 0, 0);
        let expired = s.start_timer(|_| {}).unwrap();
        assert!(s.start_timer(|_| {}).is_none(), "second timer must be a no-op");

        expired.await.unwrap();
        assert_eq!(s.time_remaining(), 0);
        assert!(!s.is_timer_active());
        assert!(s.is_time_up());
        assert_eq!(s.phase(), Phase::AwaitingKey);
        assert!(s.submit_answers());
        assert!(!s.submit_answers());
        assert!(s.start_timer(|_| {}).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn answers_lock_once_time_is_up() {
        let mut s = session(2, 0, 0);
        s.record_answer(QuestionId(1), "A").unwrap();
        let expired = s.start_timer(|_| {}).unwrap();
        expired.await.unwrap();

        assert!(matches!(
            s.record_answer(QuestionId(2), "B"),
            Err(CoreError::WrongPhase { .. })
        ));
        assert!(!s.answers().contains(QuestionId(2)));
        assert!(s.start_timer(|_| {}).is_none());
        // The expiry already performed the one submission.
        assert!(!s.submit_answers());

        s.record_answer_key_entry(QuestionId(1), "A").unwrap();
        s.record_answer_key_entry(QuestionId(2), "B").unwrap();
        assert_eq!(s.grade(Utc::now()).unwrap().score, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_session_can_be_graded_directly() {
        let mut s = session(1, 0, 0);
        let expired = s.start_timer(|_| {}).unwrap();
        expired.await.unwrap();
        // Key entry is accepted without an explicit submit.
        s.record_answer_key_entry(QuestionId(1), "C").unwrap();
        let graded = s.grade(Utc::now()).unwrap();
        assert_eq!(graded.summary.unanswered_count, 1);
        assert_eq!(s.phase(), Phase::Graded);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_clears_expiry() {
        let mut s = session(1, 0, 0);
        let expired = s.start_timer(|_| {}).unwrap();
        expired.await.unwrap();
        s.reset();
        assert!(!s.is_time_up());
        assert_eq!(s.phase(), Phase::Answering);
        s.record_answer(QuestionId(1), "A").unwrap();
        assert!(s.start_timer(|_| {}).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn manual_submit_stops_the_clock() {
        let mut s = session(1, 0, 0);
        let expired = s.start_timer(|_| {}).unwrap();
        sleep(Duration::from_millis(10_500)).await;
        assert_eq!(s.time_remaining(), 50);

        assert!(s.submit_answers());
        assert!(!s.is_timer_active());
        sleep(Duration::from_secs(120)).await;
        assert_eq!(s.time_remaining(), 50);
        // The cancelled countdown drops its sender without firing.
        assert!(expired.await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_tears_down_countdown() {
        let mut s = session(2, 0, 0);
        let ticks = Arc::new(AtomicU64::new(0));
        let t = Arc::clone(&ticks);
        s.start_timer(move |_| {
            t.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        s.record_answer(QuestionId(1), "A").unwrap();

        sleep(Duration::from_millis(2500)).await;
        s.reset();
        sleep(Duration::from_secs(10)).await;

        assert_eq!(ticks.load(Ordering::SeqCst), 2);
        assert_eq!(s.time_remaining(), 60);
        assert!(s.answers().is_empty());
        assert_eq!(s.phase(), Phase::Answering);

        let restarted = Arc::new(AtomicU64::new(0));
        let r = Arc::clone(&restarted);
        s.start_timer(move |_| {
            r.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
        assert_eq!(restarted.load(Ordering::SeqCst), 1);
    }
}
