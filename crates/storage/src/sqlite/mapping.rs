use drill_core::model::{
    AnswerMode, DifficultyId, SessionId, SessionStats, SessionSummary,
};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn u64_from_i64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn u64_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn parse_mode(s: &str) -> Result<AnswerMode, StorageError> {
    s.parse::<AnswerMode>().map_err(ser)
}

pub(crate) fn map_summary_row(row: &sqlx::sqlite::SqliteRow) -> Result<SessionSummary, StorageError> {
    let session_id: SessionId = row
        .try_get::<String, _>("session_id")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let difficulty = DifficultyId::new(u32_from_i64(
        "difficulty",
        row.try_get::<i64, _>("difficulty").map_err(ser)?,
    )?);
    let mode = parse_mode(&row.try_get::<String, _>("mode").map_err(ser)?)?;
    let started_at = row.try_get("started_at").map_err(ser)?;
    let completed_at = row.try_get("completed_at").map_err(ser)?;

    let stats = SessionStats {
        total_questions: u32_from_i64(
            "total_questions",
            row.try_get::<i64, _>("total_questions").map_err(ser)?,
        )?,
        correct_count: u32_from_i64(
            "correct_count",
            row.try_get::<i64, _>("correct_count").map_err(ser)?,
        )?,
        wrong_count: u32_from_i64(
            "wrong_count",
            row.try_get::<i64, _>("wrong_count").map_err(ser)?,
        )?,
        accuracy_percent: row.try_get("accuracy_percent").map_err(ser)?,
        total_score: u32_from_i64(
            "total_score",
            row.try_get::<i64, _>("total_score").map_err(ser)?,
        )?,
        average_response_latency_ms: u64_from_i64(
            "average_latency_ms",
            row.try_get::<i64, _>("average_latency_ms").map_err(ser)?,
        )?,
        best_streak: u32_from_i64(
            "best_streak",
            row.try_get::<i64, _>("best_streak").map_err(ser)?,
        )?,
    };

    SessionSummary::from_persisted(session_id, difficulty, mode, started_at, completed_at, stats)
        .map_err(ser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_modes() {
        assert_eq!(parse_mode("choice").unwrap(), AnswerMode::Choice);
        assert_eq!(parse_mode("speak").unwrap(), AnswerMode::Speak);
        assert!(matches!(
            parse_mode("whisper"),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn rejects_negative_counts() {
        assert!(u32_from_i64("total_questions", -1).is_err());
        assert_eq!(u64_to_i64("latency", 5).unwrap(), 5);
        assert!(u64_to_i64("latency", u64::MAX).is_err());
    }
}
