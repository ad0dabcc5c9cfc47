use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use drill_core::catalog::difficulty_name;
use drill_core::model::{AnswerMode, DifficultyId, SessionId, SessionSummary};
use storage::repository::{
    InMemoryRepository, SessionSummaryRepository, SessionSummaryRow, StorageError,
};

/// Presentation-agnostic list item for a finished session.
///
/// Timestamps stay as `DateTime<Utc>`; front-ends format them.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummaryListItem {
    pub id: i64,
    pub session_id: SessionId,
    pub difficulty: DifficultyId,
    pub difficulty_name: &'static str,
    pub mode: AnswerMode,
    pub completed_at: DateTime<Utc>,
    pub play_time_ms: u64,

    pub total: u32,
    pub correct: u32,
    pub accuracy_percent: f64,
    pub score: u32,
    pub best_streak: u32,
}

impl SessionSummaryListItem {
    #[must_use]
    pub fn from_row(row: &SessionSummaryRow) -> Self {
        let summary = &row.summary;
        let stats = summary.stats();
        Self {
            id: row.id,
            session_id: summary.session_id(),
            difficulty: summary.difficulty(),
            difficulty_name: difficulty_name(summary.difficulty()),
            mode: summary.mode(),
            completed_at: summary.completed_at(),
            play_time_ms: summary.play_time_ms(),
            total: stats.total_questions,
            correct: stats.correct_count,
            accuracy_percent: stats.accuracy_percent,
            score: stats.total_score,
            best_streak: stats.best_streak,
        }
    }
}

/// Append-only log of finished sessions.
#[derive(Clone)]
pub struct SessionSummaryService {
    summaries: Arc<dyn SessionSummaryRepository>,
}

impl SessionSummaryService {
    #[must_use]
    pub fn new(summaries: Arc<dyn SessionSummaryRepository>) -> Self {
        Self { summaries }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryRepository::new()))
    }

    /// Append a finished session, returning its row id.
    ///
    /// Empty sessions are skipped and failures are logged; neither interrupts play.
    pub async fn record(&self, summary: &SessionSummary) -> Option<i64> {
        if summary.stats().is_empty() {
            return None;
        }
        match self.summaries.append_summary(summary).await {
            Ok(id) => {
                info!(id, session_id = %summary.session_id(), "session summary stored");
                Some(id)
            }
            Err(err) => {
                warn!(session_id = %summary.session_id(), error = %err, "failed to store session summary");
                None
            }
        }
    }

    /// Load the most recent finished sessions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<SessionSummaryListItem>, StorageError> {
        let rows = self.summaries.list_recent(limit).await?;
        Ok(rows.iter().map(SessionSummaryListItem::from_row).collect())
    }

    /// Fetch a stored summary by row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no such row exists.
    pub async fn get(&self, id: i64) -> Result<SessionSummary, StorageError> {
        self.summaries.get_summary(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use drill_core::model::{Answer, AnswerRecord};
    use drill_core::time::fixed_now;

    fn summary(offset_minutes: i64, answers: &[bool]) -> SessionSummary {
        let started = fixed_now() + Duration::minutes(offset_minutes);
        let history: Vec<AnswerRecord> = answers
            .iter()
            .map(|&correct| AnswerRecord {
                target: 12,
                answer: Answer::Spoken(if correct { "十二" } else { "" }.to_string()),
                is_correct: correct,
                points: if correct { 30 } else { 0 },
                latency_ms: Some(1500),
                difficulty: DifficultyId::new(2),
                recorded_at: started,
            })
            .collect();
        SessionSummary::from_history(
            SessionId::generate(),
            DifficultyId::new(2),
            AnswerMode::Speak,
            started,
            started + Duration::seconds(40),
            &history,
        )
    }

    #[tokio::test]
    async fn records_and_lists_newest_first() {
        let svc = SessionSummaryService::in_memory();
        let older = summary(0, &[true, false]);
        let newer = summary(10, &[true, true, true]);

        let older_id = svc.record(&older).await.expect("stored");
        let newer_id = svc.record(&newer).await.expect("stored");

        let items = svc.list_recent(10).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, newer_id);
        assert_eq!(items[0].difficulty_name, "初出茅庐");
        assert_eq!(items[0].correct, 3);
        assert_eq!(items[0].play_time_ms, 40_000);
        assert_eq!(items[1].id, older_id);
        assert!((items[1].accuracy_percent - 50.0).abs() < f64::EPSILON);

        assert_eq!(svc.get(older_id).await.unwrap(), older);
    }

    #[tokio::test]
    async fn empty_sessions_are_not_recorded() {
        let svc = SessionSummaryService::in_memory();
        assert_eq!(svc.record(&summary(0, &[])).await, None);
        assert!(svc.list_recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_session_is_logged_not_fatal() {
        let svc = SessionSummaryService::in_memory();
        let once = summary(0, &[true]);
        assert!(svc.record(&once).await.is_some());
        assert_eq!(svc.record(&once).await, None);
    }
}
