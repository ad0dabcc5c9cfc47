use drill_core::model::SessionSummary;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, map_summary_row, ser, u64_to_i64};
use crate::repository::{SessionSummaryRepository, SessionSummaryRow, StorageError};

fn map_summary_row_with_id(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<SessionSummaryRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    let summary = map_summary_row(row)?;
    Ok(SessionSummaryRow::new(id, summary))
}

fn insert_error(err: sqlx::Error) -> StorageError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
        _ => conn(err),
    }
}

#[async_trait::async_trait]
impl SessionSummaryRepository for SqliteRepository {
    async fn append_summary(&self, summary: &SessionSummary) -> Result<i64, StorageError> {
        let stats = summary.stats();

        let res = sqlx::query(
            r"
                INSERT INTO session_summaries (
                    session_id, difficulty, mode, started_at, completed_at,
                    total_questions, correct_count, wrong_count, accuracy_percent,
                    total_score, average_latency_ms, best_streak
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ",
        )
        .bind(summary.session_id().to_string())
        .bind(i64::from(summary.difficulty().value()))
        .bind(summary.mode().as_str())
        .bind(summary.started_at())
        .bind(summary.completed_at())
        .bind(i64::from(stats.total_questions))
        .bind(i64::from(stats.correct_count))
        .bind(i64::from(stats.wrong_count))
        .bind(stats.accuracy_percent)
        .bind(i64::from(stats.total_score))
        .bind(u64_to_i64(
            "average_latency_ms",
            stats.average_response_latency_ms,
        )?)
        .bind(i64::from(stats.best_streak))
        .execute(&self.pool)
        .await
        .map_err(insert_error)?;

        Ok(res.last_insert_rowid())
    }

    async fn get_summary(&self, id: i64) -> Result<SessionSummary, StorageError> {
        let row = sqlx::query(
            r"
                SELECT
                    session_id, difficulty, mode, started_at, completed_at,
                    total_questions, correct_count, wrong_count, accuracy_percent,
                    total_score, average_latency_ms, best_streak
                FROM session_summaries
                WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_summary_row(&row)
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<SessionSummaryRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    id, session_id, difficulty, mode, started_at, completed_at,
                    total_questions, correct_count, wrong_count, accuracy_percent,
                    total_score, average_latency_ms, best_streak
                FROM session_summaries
                ORDER BY completed_at DESC, id DESC
                LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_summary_row_with_id(&row)?);
        }

        Ok(out)
    }
}
