//! Groups raw quiz attempts into reporting sessions.
//!
//! A session is a run of attempts on one book where each attempt follows the
//! previous one by at most the configured inactivity gap. Sessions are never
//! stored; they are rebuilt from `quiz_attempts` on every read.

use std::collections::BTreeMap;

use time::{Duration, PrimitiveDateTime};

use crate::db::models::QuizAttempt;
use crate::db::types::QuizMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QuizSession {
    pub(crate) user_id: String,
    pub(crate) book_id: String,
    pub(crate) start_at: PrimitiveDateTime,
    pub(crate) end_at: PrimitiveDateTime,
    pub(crate) attempt_count: u32,
    pub(crate) total_correct: i64,
    pub(crate) total_total: i64,
    pub(crate) percentage: i32,
    pub(crate) mode: QuizMode,
}

impl QuizSession {
    fn open(attempt: &QuizAttempt) -> Self {
        Self {
            user_id: attempt.user_id.clone(),
            book_id: attempt.book_id.clone(),
            start_at: attempt.created_at,
            end_at: attempt.created_at,
            attempt_count: 0,
            total_correct: 0,
            total_total: 0,
            percentage: 0,
            mode: attempt.mode,
        }
    }

    fn absorb(&mut self, attempt: &QuizAttempt) {
        self.end_at = attempt.created_at;
        self.attempt_count += 1;
        self.total_correct += i64::from(attempt.score_correct);
        self.total_total += i64::from(attempt.score_total);
        self.percentage = rounded_percentage(self.total_correct, self.total_total);
        if attempt.mode == QuizMode::Straight {
            self.mode = QuizMode::Straight;
        }
    }
}

/// `round(100 * correct / total)` with halves rounded up; 0 when `total`
/// is not positive.
pub(crate) fn rounded_percentage(correct: i64, total: i64) -> i32 {
    if total <= 0 {
        return 0;
    }
    let correct = correct.clamp(0, total);
    ((200 * correct + total) / (2 * total)) as i32
}

/// Groups the attempts of a single (user, book) scope. Input order does not
/// matter; attempts are processed by creation time, then attempt number.
pub(crate) fn group_sessions(attempts: &[QuizAttempt], gap: Duration) -> Vec<QuizSession> {
    let mut ordered: Vec<&QuizAttempt> = attempts.iter().collect();
    ordered.sort_by_key(|attempt| (attempt.created_at, attempt.attempt_number));

    let mut sessions = Vec::new();
    let mut current: Option<QuizSession> = None;

    for attempt in ordered {
        let starts_new = match current.as_ref() {
            None => true,
            Some(session) => attempt.created_at - session.end_at > gap,
        };

        if starts_new {
            if let Some(finished) = current.take() {
                sessions.push(finished);
            }
            current = Some(QuizSession::open(attempt));
        }

        if let Some(session) = current.as_mut() {
            session.absorb(attempt);
        }
    }

    sessions.extend(current);
    sessions
}

/// Groups every (user, book) scope independently and concatenates the
/// results, scopes ordered by user id then book id.
pub(crate) fn group_sessions_by_book(attempts: &[QuizAttempt], gap: Duration) -> Vec<QuizSession> {
    let mut scopes: BTreeMap<(&str, &str), Vec<QuizAttempt>> = BTreeMap::new();
    for attempt in attempts {
        scopes
            .entry((attempt.user_id.as_str(), attempt.book_id.as_str()))
            .or_default()
            .push(attempt.clone());
    }

    scopes.into_values().flat_map(|scope| group_sessions(&scope, gap)).collect()
}

/// The most recent session of a (user, book) scope, if any attempt exists.
pub(crate) fn latest_session(attempts: &[QuizAttempt], gap: Duration) -> Option<QuizSession> {
    group_sessions(attempts, gap).pop()
}
