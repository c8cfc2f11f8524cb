//! The quiz session state machine.
//!
//! A `QuizSession` owns the question list, the current position, the
//! collected answers and the countdown. It never schedules anything on its
//! own: the caller drives it with user operations and a 1 Hz [`tick`].
//!
//! ```text
//! Active --submit accepted / timer expiry--> Submitting --> Completed
//! Active --abort before progress-----------> Aborted
//! ```
//!
//! [`tick`]: QuizSession::tick

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{Rejection, SessionError};
use crate::model::{AnswerSet, Question};
use crate::score::{ScoreCard, SessionResult};
use crate::snapshot::{SessionSnapshot, SNAPSHOT_VERSION};
use crate::traits::{QuestionSource, ResultStore};

/// Quizzes with at most this many questions get the short time budget.
pub const SHORT_QUIZ_MAX_QUESTIONS: usize = 5;
/// Time budget for short quizzes (4 minutes).
pub const SHORT_QUIZ_SECONDS: u32 = 4 * 60;
/// Time budget for longer quizzes (8 minutes).
pub const LONG_QUIZ_SECONDS: u32 = 8 * 60;
/// How long a validation notice stays visible.
pub const NOTICE_LIFETIME_SECS: i64 = 4;

/// Initial countdown for a session of `question_count` questions.
pub fn time_budget(question_count: usize) -> u32 {
    if question_count <= SHORT_QUIZ_MAX_QUESTIONS {
        SHORT_QUIZ_SECONDS
    } else {
        LONG_QUIZ_SECONDS
    }
}

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Active,
    Submitting,
    Completed,
    Aborted,
}

impl Phase {
    /// `Completed` and `Aborted` accept no further operations.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed | Phase::Aborted)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Active => write!(f, "active"),
            Phase::Submitting => write!(f, "submitting"),
            Phase::Completed => write!(f, "completed"),
            Phase::Aborted => write!(f, "aborted"),
        }
    }
}

/// A transient validation message and the instant it stops showing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

impl Notice {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Result of a user-driven operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The state changed.
    Applied,
    /// Valid call that had nothing to do (e.g. `previous` at index 0).
    Unchanged,
    /// Validation failed; `last_notice` now carries the message.
    Rejected(Rejection),
    /// The session is not `Active`.
    Inactive,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }
}

/// Result of a timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Time left after this tick.
    Running { remaining: u32 },
    /// The budget ran out and the session was submitted.
    Expired(SessionResult),
    /// The session is not `Active`; the tick did nothing.
    Inactive,
}

/// Hooks for presentation layers that want to react to session events.
pub trait SessionObserver: Send + Sync {
    fn on_phase_change(&self, from: Phase, to: Phase);
    fn on_notice(&self, notice: &Notice);
    fn on_time_expired(&self);
}

/// Observer that ignores every event.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_phase_change(&self, _: Phase, _: Phase) {}
    fn on_notice(&self, _: &Notice) {}
    fn on_time_expired(&self) {}
}

/// One attempt at answering an ordered question set under a time budget.
pub struct QuizSession {
    id: Uuid,
    quiz_id: Option<String>,
    questions: Vec<Question>,
    current_index: usize,
    answers: AnswerSet,
    remaining_seconds: u32,
    phase: Phase,
    last_notice: Option<Notice>,
    score_card: Option<ScoreCard>,
    store: Arc<dyn ResultStore>,
    observer: Arc<dyn SessionObserver>,
    clock: Clock,
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("id", &self.id)
            .field("quiz_id", &self.quiz_id)
            .field("questions", &self.questions.len())
            .field("current_index", &self.current_index)
            .field("answers", &self.answers)
            .field("remaining_seconds", &self.remaining_seconds)
            .field("phase", &self.phase)
            .field("last_notice", &self.last_notice)
            .finish()
    }
}

impl QuizSession {
    /// Start a session over `questions`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptySession` if `questions` is empty.
    pub fn new(
        questions: Vec<Question>,
        store: Arc<dyn ResultStore>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::EmptySession);
        }

        let remaining_seconds = time_budget(questions.len());
        let session = Self {
            id: Uuid::new_v4(),
            quiz_id: None,
            questions,
            current_index: 0,
            answers: AnswerSet::new(),
            remaining_seconds,
            phase: Phase::Active,
            last_notice: None,
            score_card: None,
            store,
            observer: Arc::new(NoopObserver),
            clock: Clock::default(),
        };

        tracing::info!(
            session_id = %session.id,
            questions = session.questions.len(),
            remaining_seconds,
            "quiz session started"
        );

        Ok(session)
    }

    /// Start a session from whatever `source` provides.
    ///
    /// A source with no quiz, or an empty one, yields
    /// `SessionError::EmptySession` (downcastable from the returned error).
    pub fn from_source(
        source: &dyn QuestionSource,
        store: Arc<dyn ResultStore>,
    ) -> anyhow::Result<Self> {
        let questions = source.load_questions()?.unwrap_or_default();
        if questions.is_empty() {
            tracing::warn!("question source '{}' has no questions", source.name());
        }
        Ok(Self::new(questions, store)?)
    }

    /// Tag the session with the quiz it was started from. The id travels
    /// with snapshots.
    #[must_use]
    pub fn with_quiz_id(mut self, quiz_id: impl Into<String>) -> Self {
        self.quiz_id = Some(quiz_id.into());
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn quiz_id(&self) -> Option<&str> {
        self.quiz_id.as_deref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    pub fn is_first(&self) -> bool {
        self.current_index == 0
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 == self.questions.len()
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    /// The stored (normalized) answer for `index`.
    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(index)
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// The current notice, if it has not expired yet.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice_at(self.clock.now())
    }

    pub fn notice_at(&self, now: DateTime<Utc>) -> Option<&Notice> {
        self.last_notice.as_ref().filter(|n| !n.is_expired_at(now))
    }

    /// Drop the notice once its display window is over. Returns `true` if
    /// a notice was removed.
    pub fn clear_expired_notice(&mut self) -> bool {
        let now = self.clock.now();
        if self.last_notice.as_ref().is_some_and(|n| n.is_expired_at(now)) {
            self.last_notice = None;
            return true;
        }
        false
    }

    /// `{ score, total }` once the session is completed.
    pub fn result(&self) -> Option<SessionResult> {
        self.score_card.as_ref().map(|c| c.result)
    }

    pub fn score_card(&self) -> Option<&ScoreCard> {
        self.score_card.as_ref()
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Advance the countdown by one second.
    ///
    /// Reaching zero submits the session without the completeness check.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != Phase::Active {
            return TickOutcome::Inactive;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds > 0 {
            return TickOutcome::Running {
                remaining: self.remaining_seconds,
            };
        }

        tracing::info!(
            session_id = %self.id,
            answered = self.answers.len(),
            total = self.questions.len(),
            "time budget exhausted, submitting"
        );
        self.observer.on_time_expired();
        TickOutcome::Expired(self.accept_submission())
    }

    /// Store an answer for the question at `index`.
    ///
    /// Only the question currently displayed can be answered; writes to any
    /// other index are refused. Text that normalizes to nothing clears the
    /// answer.
    pub fn record_answer(&mut self, index: usize, text: &str) -> Outcome {
        if self.phase != Phase::Active {
            return Outcome::Inactive;
        }
        if index != self.current_index {
            tracing::debug!(
                session_id = %self.id,
                index,
                current = self.current_index,
                "refusing answer for a question that is not displayed"
            );
            return Outcome::Unchanged;
        }

        self.answers.record(index, text);
        Outcome::Applied
    }

    /// Answer the question currently displayed.
    pub fn answer_current(&mut self, text: &str) -> Outcome {
        self.record_answer(self.current_index, text)
    }

    /// Answer the current question with one of its [`options`], by
    /// 0-based position. Out-of-range positions change nothing.
    ///
    /// [`options`]: Question::options
    pub fn select_option(&mut self, position: usize) -> Outcome {
        let options = self.current_question().options();
        match options.get(position) {
            Some(option) => self.answer_current(option),
            None if self.phase != Phase::Active => Outcome::Inactive,
            None => Outcome::Unchanged,
        }
    }

    /// Move to the next question if the current one is answered.
    pub fn next(&mut self) -> Outcome {
        if self.phase != Phase::Active {
            return Outcome::Inactive;
        }
        if !self.answers.is_answered(self.current_index) {
            return self.reject(Rejection::CurrentUnanswered);
        }
        if self.is_last() {
            return Outcome::Unchanged;
        }

        self.current_index += 1;
        Outcome::Applied
    }

    /// Move back one question. No validation.
    pub fn previous(&mut self) -> Outcome {
        if self.phase != Phase::Active {
            return Outcome::Inactive;
        }
        if self.current_index == 0 {
            return Outcome::Unchanged;
        }

        self.current_index -= 1;
        Outcome::Applied
    }

    /// Score the session and hand the result to the result store.
    ///
    /// Unless `bypass_validation` is set, every question must be answered.
    pub fn submit(&mut self, bypass_validation: bool) -> Outcome {
        if self.phase != Phase::Active {
            return Outcome::Inactive;
        }

        if !bypass_validation {
            let missing = self.answers.missing(self.questions.len());
            if !missing.is_empty() {
                return self.reject(Rejection::Incomplete { missing });
            }
        }

        self.accept_submission();
        Outcome::Applied
    }

    /// Give up on a session before any progress was made.
    ///
    /// # Errors
    ///
    /// Refuses sessions that are not `Active`, and sessions where an answer
    /// was recorded or the user navigated away from the first question.
    pub fn abort(&mut self) -> Result<(), SessionError> {
        if self.phase != Phase::Active {
            return Err(SessionError::NotActive(self.phase));
        }
        if !self.answers.is_empty() || self.current_index != 0 {
            return Err(SessionError::AbortAfterProgress);
        }

        self.last_notice = None;
        self.transition(Phase::Aborted);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Capture the session state for a later [`restore`](Self::restore).
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            version: SNAPSHOT_VERSION,
            session_id: self.id,
            quiz_id: self.quiz_id.clone(),
            taken_at: self.clock.now(),
            questions: self.questions.clone(),
            current_index: self.current_index,
            answers: self.answers.clone(),
            remaining_seconds: self.remaining_seconds,
            phase: self.phase,
            notice: self.last_notice.clone(),
        }
    }

    /// Rebuild a session from a snapshot.
    ///
    /// A completed snapshot comes back completed, with its score card
    /// recomputed; the result store is not called again.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptySession` for a snapshot without
    /// questions and `SessionError::InvalidSnapshot` for any other
    /// inconsistency.
    pub fn restore(
        snapshot: SessionSnapshot,
        store: Arc<dyn ResultStore>,
    ) -> Result<Self, SessionError> {
        snapshot.validate()?;

        let score_card = (snapshot.phase == Phase::Completed)
            .then(|| ScoreCard::compute(&snapshot.questions, &snapshot.answers));

        tracing::info!(
            session_id = %snapshot.session_id,
            phase = %snapshot.phase,
            remaining_seconds = snapshot.remaining_seconds,
            "quiz session restored"
        );

        Ok(Self {
            id: snapshot.session_id,
            quiz_id: snapshot.quiz_id,
            questions: snapshot.questions,
            current_index: snapshot.current_index,
            answers: snapshot.answers,
            remaining_seconds: snapshot.remaining_seconds,
            phase: snapshot.phase,
            last_notice: snapshot.notice,
            score_card,
            store,
            observer: Arc::new(NoopObserver),
            clock: Clock::default(),
        })
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn reject(&mut self, rejection: Rejection) -> Outcome {
        let notice = Notice {
            message: rejection.to_string(),
            expires_at: self.clock.now() + Duration::seconds(NOTICE_LIFETIME_SECS),
        };
        self.observer.on_notice(&notice);
        self.last_notice = Some(notice);
        Outcome::Rejected(rejection)
    }

    /// Active -> Submitting -> Completed, scoring and persisting on the way.
    fn accept_submission(&mut self) -> SessionResult {
        self.transition(Phase::Submitting);

        let card = ScoreCard::compute(&self.questions, &self.answers);
        let result = card.result;

        match self.store.store_result(&result) {
            Ok(()) => tracing::info!(
                session_id = %self.id,
                score = result.score,
                total = result.total,
                "result stored"
            ),
            Err(e) => tracing::warn!(session_id = %self.id, "failed to store result: {e:#}"),
        }

        self.score_card = Some(card);
        self.last_notice = None;
        self.transition(Phase::Completed);
        result
    }

    fn transition(&mut self, to: Phase) {
        let from = self.phase;
        self.phase = to;
        tracing::info!(session_id = %self.id, %from, %to, "phase change");
        self.observer.on_phase_change(from, to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::fixed_clock;
    use std::sync::Mutex;

    /// Records every stored result; optionally fails.
    #[derive(Default)]
    struct RecordingStore {
        stored: Mutex<Vec<SessionResult>>,
        fail: bool,
    }

    impl ResultStore for RecordingStore {
        fn store_result(&self, result: &SessionResult) -> anyhow::Result<()> {
            self.stored.lock().unwrap().push(*result);
            if self.fail {
                anyhow::bail!("disk full");
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        phases: Mutex<Vec<(Phase, Phase)>>,
        notices: Mutex<Vec<String>>,
        expired: Mutex<u32>,
    }

    impl SessionObserver for RecordingObserver {
        fn on_phase_change(&self, from: Phase, to: Phase) {
            self.phases.lock().unwrap().push((from, to));
        }
        fn on_notice(&self, notice: &Notice) {
            self.notices.lock().unwrap().push(notice.message.clone());
        }
        fn on_time_expired(&self) {
            *self.expired.lock().unwrap() += 1;
        }
    }

    fn capitals(n: usize) -> Vec<Question> {
        let all = [
            ("Capital of France?", "Paris"),
            ("Capital of Italy?", "Rome"),
            ("Capital of Spain?", "Madrid"),
            ("Capital of Japan?", "Tokyo"),
            ("Capital of Kenya?", "Nairobi"),
            ("Capital of Peru?", "Lima"),
            ("Capital of Chile?", "Santiago"),
        ];
        all.iter()
            .cycle()
            .take(n)
            .map(|(p, a)| Question::multiple_choice(p, a, &["Oslo", "Cairo"]))
            .collect()
    }

    fn session(n: usize) -> (QuizSession, Arc<RecordingStore>) {
        let store = Arc::new(RecordingStore::default());
        let session = QuizSession::new(capitals(n), store.clone())
            .unwrap()
            .with_clock(fixed_clock());
        (session, store)
    }

    fn answer_and_advance(session: &mut QuizSession, text: &str) {
        assert!(session.answer_current(text).is_applied());
        session.next();
    }

    #[test]
    fn time_budget_is_a_step_function() {
        for n in 1..=5 {
            assert_eq!(time_budget(n), 240);
        }
        for n in [6, 7, 20, 500] {
            assert_eq!(time_budget(n), 480);
        }
        assert_eq!(session(5).0.remaining_seconds(), 240);
        assert_eq!(session(6).0.remaining_seconds(), 480);
    }

    #[test]
    fn empty_question_list_is_refused() {
        let err = QuizSession::new(vec![], Arc::new(RecordingStore::default())).unwrap_err();
        assert_eq!(err, SessionError::EmptySession);
    }

    #[test]
    fn starts_active_at_first_question() {
        let (s, _) = session(3);
        assert_eq!(s.phase(), Phase::Active);
        assert_eq!(s.current_index(), 0);
        assert!(s.answers().is_empty());
        assert!(s.notice().is_none());
        assert!(s.result().is_none());
    }

    #[test]
    fn record_answer_normalizes() {
        let (mut s, _) = session(3);
        s.record_answer(0, "  Paris ");
        assert_eq!(s.answer(0), Some("paris"));
    }

    #[test]
    fn record_answer_clears_on_blank_text() {
        let (mut s, _) = session(3);
        s.record_answer(0, "Paris");
        s.record_answer(0, "  \t ");
        assert_eq!(s.answer(0), None);
    }

    #[test]
    fn record_answer_refuses_other_indices() {
        let (mut s, _) = session(3);
        assert_eq!(s.record_answer(2, "Madrid"), Outcome::Unchanged);
        assert_eq!(s.answer(2), None);
    }

    #[test]
    fn select_option_uses_sorted_options() {
        let (mut s, _) = session(3);
        // options: Cairo, Oslo, Paris
        assert!(s.select_option(2).is_applied());
        assert_eq!(s.answer(0), Some("paris"));
        assert_eq!(s.select_option(7), Outcome::Unchanged);
    }

    #[test]
    fn next_rejects_unanswered_question() {
        let (mut s, _) = session(3);
        let outcome = s.next();
        assert_eq!(outcome, Outcome::Rejected(Rejection::CurrentUnanswered));
        assert_eq!(s.current_index(), 0);
        assert_eq!(
            s.notice().map(|n| n.message.as_str()),
            Some("Please select an option or enter an answer.")
        );
    }

    #[test]
    fn notice_expires_after_four_seconds() {
        let (mut s, _) = session(3);
        s.next();
        let set_at = fixed_clock().now();

        assert!(s.notice_at(set_at + Duration::seconds(3)).is_some());
        assert!(s.notice_at(set_at + Duration::seconds(4)).is_none());

        let mut later = fixed_clock();
        later.advance(Duration::seconds(5));
        s = s.with_clock(later);
        assert!(s.clear_expired_notice());
        assert!(s.notice().is_none());
        assert!(!s.clear_expired_notice());
    }

    #[test]
    fn next_advances_and_stops_at_last() {
        let (mut s, _) = session(2);
        s.answer_current("paris");
        assert!(s.next().is_applied());
        assert_eq!(s.current_index(), 1);

        s.answer_current("rome");
        assert_eq!(s.next(), Outcome::Unchanged);
        assert_eq!(s.current_index(), 1);
        assert!(s.notice().is_none());
    }

    #[test]
    fn previous_is_noop_at_first_question() {
        let (mut s, _) = session(3);
        assert_eq!(s.previous(), Outcome::Unchanged);
        assert_eq!(s.current_index(), 0);

        answer_and_advance(&mut s, "paris");
        assert!(s.previous().is_applied());
        assert_eq!(s.current_index(), 0);
    }

    #[test]
    fn previous_needs_no_answer() {
        let (mut s, _) = session(3);
        answer_and_advance(&mut s, "paris");
        assert_eq!(s.answer(1), None);
        assert!(s.previous().is_applied());
    }

    #[test]
    fn submit_rejects_incomplete_session() {
        let (mut s, store) = session(3);
        answer_and_advance(&mut s, "paris");

        let outcome = s.submit(false);
        assert_eq!(
            outcome,
            Outcome::Rejected(Rejection::Incomplete {
                missing: vec![1, 2]
            })
        );
        assert_eq!(s.phase(), Phase::Active);
        assert_eq!(
            s.notice().map(|n| n.message.as_str()),
            Some("Please answer all questions before submitting.")
        );
        assert!(store.stored.lock().unwrap().is_empty());
    }

    #[test]
    fn all_correct_scores_full_marks() {
        let (mut s, store) = session(3);
        answer_and_advance(&mut s, "Paris");
        answer_and_advance(&mut s, " ROME");
        s.answer_current("madrid");

        assert!(s.submit(false).is_applied());
        assert_eq!(s.phase(), Phase::Completed);
        assert_eq!(s.result(), Some(SessionResult { score: 3, total: 3 }));
        assert_eq!(
            *store.stored.lock().unwrap(),
            vec![SessionResult { score: 3, total: 3 }]
        );
    }

    #[test]
    fn wrong_answers_score_zero_points() {
        let (mut s, _) = session(2);
        answer_and_advance(&mut s, "Oslo");
        s.answer_current("Cairo");
        s.submit(false);
        assert_eq!(s.result(), Some(SessionResult { score: 0, total: 2 }));
    }

    #[test]
    fn timer_expiry_submits_partial_session() {
        let (mut s, store) = session(6);
        answer_and_advance(&mut s, "paris");
        answer_and_advance(&mut s, "rome");
        answer_and_advance(&mut s, "wrong");
        s.answer_current("tokyo");

        let mut last = TickOutcome::Inactive;
        for _ in 0..480 {
            last = s.tick();
        }

        assert_eq!(s.remaining_seconds(), 0);
        assert_eq!(
            last,
            TickOutcome::Expired(SessionResult { score: 3, total: 6 })
        );
        assert_eq!(s.phase(), Phase::Completed);
        assert_eq!(store.stored.lock().unwrap().len(), 1);
    }

    #[test]
    fn tick_counts_down_then_goes_inactive() {
        let (mut s, store) = session(1);
        assert_eq!(s.tick(), TickOutcome::Running { remaining: 239 });
        for _ in 0..239 {
            s.tick();
        }
        assert_eq!(s.phase(), Phase::Completed);
        assert_eq!(s.result(), Some(SessionResult { score: 0, total: 1 }));

        assert_eq!(s.tick(), TickOutcome::Inactive);
        assert_eq!(s.remaining_seconds(), 0);
        assert_eq!(store.stored.lock().unwrap().len(), 1);
    }

    #[test]
    fn operations_after_completion_are_inactive() {
        let (mut s, store) = session(1);
        s.answer_current("paris");
        s.submit(false);

        assert_eq!(s.answer_current("rome"), Outcome::Inactive);
        assert_eq!(s.next(), Outcome::Inactive);
        assert_eq!(s.previous(), Outcome::Inactive);
        assert_eq!(s.submit(true), Outcome::Inactive);
        assert_eq!(s.abort(), Err(SessionError::NotActive(Phase::Completed)));
        assert_eq!(s.answer(0), Some("paris"));
        assert_eq!(store.stored.lock().unwrap().len(), 1);
    }

    #[test]
    fn failed_persistence_still_completes() {
        let store = Arc::new(RecordingStore {
            fail: true,
            ..Default::default()
        });
        let mut s = QuizSession::new(capitals(1), store.clone()).unwrap();
        s.answer_current("paris");

        assert!(s.submit(false).is_applied());
        assert_eq!(s.phase(), Phase::Completed);
        assert_eq!(s.result(), Some(SessionResult { score: 1, total: 1 }));
        assert_eq!(store.stored.lock().unwrap().len(), 1);
    }

    #[test]
    fn abort_only_before_progress() {
        let (mut s, store) = session(3);
        assert!(s.abort().is_ok());
        assert_eq!(s.phase(), Phase::Aborted);
        assert!(s.is_terminal());
        assert_eq!(s.tick(), TickOutcome::Inactive);
        assert!(s.result().is_none());
        assert!(store.stored.lock().unwrap().is_empty());

        let (mut s, _) = session(3);
        s.answer_current("paris");
        assert_eq!(s.abort(), Err(SessionError::AbortAfterProgress));
        assert_eq!(s.phase(), Phase::Active);
    }

    #[test]
    fn observer_sees_submitting_then_completed() {
        let observer = Arc::new(RecordingObserver::default());
        let (s, _) = session(1);
        let mut s = s.with_observer(observer.clone());

        s.next();
        s.answer_current("paris");
        s.submit(false);

        assert_eq!(
            *observer.phases.lock().unwrap(),
            vec![
                (Phase::Active, Phase::Submitting),
                (Phase::Submitting, Phase::Completed)
            ]
        );
        assert_eq!(observer.notices.lock().unwrap().len(), 1);
        assert_eq!(*observer.expired.lock().unwrap(), 0);
    }

    #[test]
    fn observer_sees_expiry() {
        let observer = Arc::new(RecordingObserver::default());
        let (s, _) = session(2);
        let mut s = s.with_observer(observer.clone());
        while s.phase() == Phase::Active {
            s.tick();
        }
        assert_eq!(*observer.expired.lock().unwrap(), 1);
    }

    #[test]
    fn score_card_breakdown() {
        let (mut s, _) = session(2);
        answer_and_advance(&mut s, "paris");
        s.answer_current("milan");
        s.submit(false);

        let card = s.score_card().unwrap();
        assert_eq!(card.incorrect_indices(), vec![1]);
        assert_eq!(card.outcomes[1].given.as_deref(), Some("milan"));
        assert_eq!(card.outcomes[1].expected, "rome");
    }

    #[test]
    fn snapshot_restore_roundtrip() {
        let (mut s, _) = session(4);
        answer_and_advance(&mut s, "paris");
        s.answer_current("rome");
        s.tick();
        s.tick();

        let json = s.snapshot().to_json().unwrap();
        let restored = QuizSession::restore(
            SessionSnapshot::from_json(&json).unwrap(),
            Arc::new(RecordingStore::default()),
        )
        .unwrap();

        assert_eq!(restored.id(), s.id());
        assert_eq!(restored.current_index(), 1);
        assert_eq!(restored.answers(), s.answers());
        assert_eq!(restored.remaining_seconds(), 238);
        assert_eq!(restored.phase(), Phase::Active);
        assert_eq!(restored.quiz_id(), None);
    }

    #[test]
    fn snapshot_carries_quiz_id() {
        let (s, _) = session(2);
        let s = s.with_quiz_id("capitals");

        let json = s.snapshot().to_json().unwrap();
        let snapshot = SessionSnapshot::from_json(&json).unwrap();
        assert_eq!(snapshot.quiz_id(), Some("capitals"));

        let restored =
            QuizSession::restore(snapshot, Arc::new(RecordingStore::default())).unwrap();
        assert_eq!(restored.quiz_id(), Some("capitals"));
    }

    #[test]
    fn restored_completed_session_keeps_result() {
        let (mut s, _) = session(1);
        s.answer_current("paris");
        s.submit(false);

        let store = Arc::new(RecordingStore::default());
        let restored = QuizSession::restore(s.snapshot(), store.clone()).unwrap();
        assert_eq!(restored.phase(), Phase::Completed);
        assert_eq!(restored.result(), Some(SessionResult { score: 1, total: 1 }));
        assert!(store.stored.lock().unwrap().is_empty());
    }

    #[test]
    fn restore_refuses_inconsistent_snapshots() {
        let (s, _) = session(2);
        let store: Arc<dyn ResultStore> = Arc::new(RecordingStore::default());

        let mut snap = s.snapshot();
        snap.current_index = 2;
        assert!(matches!(
            QuizSession::restore(snap, store.clone()),
            Err(SessionError::InvalidSnapshot(_))
        ));

        let mut snap = s.snapshot();
        snap.phase = Phase::Submitting;
        assert!(matches!(
            QuizSession::restore(snap, store.clone()),
            Err(SessionError::InvalidSnapshot(_))
        ));

        let mut snap = s.snapshot();
        snap.remaining_seconds = 0;
        assert!(matches!(
            QuizSession::restore(snap, store.clone()),
            Err(SessionError::InvalidSnapshot(msg)) if msg.contains("no time left")
        ));

        let mut snap = s.snapshot();
        snap.answers = serde_json::from_str(r#"{"0": "  PARIS "}"#).unwrap();
        assert!(matches!(
            QuizSession::restore(snap, store.clone()),
            Err(SessionError::InvalidSnapshot(_))
        ));

        let mut snap = s.snapshot();
        snap.questions.clear();
        snap.current_index = 0;
        assert_eq!(
            QuizSession::restore(snap, store).unwrap_err(),
            SessionError::EmptySession
        );
    }
}
