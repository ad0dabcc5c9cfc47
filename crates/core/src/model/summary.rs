use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{AnswerMode, AnswerRecord, DifficultyId, SessionId, SessionStats};
use crate::stats::aggregate;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("total questions ({total}) does not match correct + wrong ({sum})")]
    CountMismatch { total: u32, sum: u32 },
}

/// Aggregate record of one finished session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    session_id: SessionId,
    difficulty: DifficultyId,
    mode: AnswerMode,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    stats: SessionStats,
}

impl SessionSummary {
    /// Rehydrate a session summary from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionSummaryError::InvalidTimeRange` if `completed_at` is before `started_at`.
    /// Returns `SessionSummaryError::CountMismatch` if totals do not align.
    pub fn from_persisted(
        session_id: SessionId,
        difficulty: DifficultyId,
        mode: AnswerMode,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        stats: SessionStats,
    ) -> Result<Self, SessionSummaryError> {
        if completed_at < started_at {
            return Err(SessionSummaryError::InvalidTimeRange);
        }
        let sum = stats.correct_count.saturating_add(stats.wrong_count);
        if sum != stats.total_questions {
            return Err(SessionSummaryError::CountMismatch {
                total: stats.total_questions,
                sum,
            });
        }

        Ok(Self {
            session_id,
            difficulty,
            mode,
            started_at,
            completed_at,
            stats,
        })
    }

    /// Build a summary from the answer history of a session.
    ///
    /// A `completed_at` earlier than `started_at` is clamped to `started_at`.
    #[must_use]
    pub fn from_history(
        session_id: SessionId,
        difficulty: DifficultyId,
        mode: AnswerMode,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        history: &[AnswerRecord],
    ) -> Self {
        Self {
            session_id,
            difficulty,
            mode,
            started_at,
            completed_at: completed_at.max(started_at),
            stats: aggregate(history),
        }
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn difficulty(&self) -> DifficultyId {
        self.difficulty
    }

    #[must_use]
    pub fn mode(&self) -> AnswerMode {
        self.mode
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Wall-clock duration of the session in milliseconds.
    #[must_use]
    pub fn play_time_ms(&self) -> u64 {
        let millis = (self.completed_at - self.started_at).num_milliseconds();
        u64::try_from(millis).unwrap_or(0)
    }
}
