//! Folding an answer history into session statistics.

use crate::model::{AnswerRecord, SessionStats};

/// Compute summary statistics for an ordered answer history.
///
/// An empty history yields all-zero stats. The average latency only counts
/// records that carry a latency; `best_streak` is the longest run of
/// consecutive correct records.
#[must_use]
pub fn aggregate(history: &[AnswerRecord]) -> SessionStats {
    if history.is_empty() {
        return SessionStats::default();
    }

    let mut correct_count = 0_u32;
    let mut total_score = 0_u32;
    let mut latency_sum = 0_u64;
    let mut latency_samples = 0_u64;
    let mut streak = 0_u32;
    let mut best_streak = 0_u32;

    for record in history {
        if record.is_correct {
            correct_count = correct_count.saturating_add(1);
            streak = streak.saturating_add(1);
            best_streak = best_streak.max(streak);
        } else {
            streak = 0;
        }
        total_score = total_score.saturating_add(record.points);
        if let Some(latency) = record.latency_ms {
            latency_sum = latency_sum.saturating_add(latency);
            latency_samples += 1;
        }
    }

    let total_questions = u32::try_from(history.len()).unwrap_or(u32::MAX);
    let wrong_count = total_questions - correct_count;

    SessionStats {
        total_questions,
        correct_count,
        wrong_count,
        accuracy_percent: accuracy_percent(correct_count, total_questions),
        total_score,
        average_response_latency_ms: average(latency_sum, latency_samples),
        best_streak,
    }
}

/// `correct / total * 100`, rounded to two decimal places.
#[must_use]
pub fn accuracy_percent(correct: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = f64::from(correct) / f64::from(total) * 100.0;
    (raw * 100.0).round() / 100.0
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn average(sum: u64, samples: u64) -> u64 {
    if samples == 0 {
        return 0;
    }
    (sum as f64 / samples as f64).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Answer, DifficultyId};
    use crate::time::fixed_now;

    fn record(correct: bool, latency_ms: Option<u64>, points: u32) -> AnswerRecord {
        AnswerRecord {
            target: 3,
            answer: Answer::Spoken(if correct { "三" } else { "五" }.to_string()),
            is_correct: correct,
            points,
            latency_ms,
            difficulty: DifficultyId::new(1),
            recorded_at: fixed_now(),
        }
    }

    #[test]
    fn empty_history_yields_zero_stats() {
        let stats = aggregate(&[]);
        assert_eq!(stats, SessionStats::default());
        assert_eq!(stats.accuracy_percent, 0.0);
        assert!(stats.is_empty());
    }

    #[test]
    fn seven_of_ten_is_seventy_percent() {
        let mut history = Vec::new();
        for i in 0..10 {
            history.push(record(i < 7, Some(1000), if i < 7 { 19 } else { 0 }));
        }

        let stats = aggregate(&history);

        assert_eq!(stats.total_questions, 10);
        assert_eq!(stats.correct_count, 7);
        assert_eq!(stats.wrong_count, 3);
        assert_eq!(stats.accuracy_percent, 70.00);
        assert_eq!(stats.total_score, 7 * 19);
        assert_eq!(stats.best_streak, 7);
    }

    #[test]
    fn accuracy_rounds_to_two_places() {
        assert_eq!(accuracy_percent(1, 3), 33.33);
        assert_eq!(accuracy_percent(2, 3), 66.67);
        assert_eq!(accuracy_percent(0, 0), 0.0);
    }

    #[test]
    fn best_streak_tracks_longest_run() {
        let history = vec![
            record(true, Some(1), 1),
            record(true, Some(1), 1),
            record(false, Some(1), 0),
            record(true, Some(1), 1),
            record(true, Some(1), 1),
            record(true, Some(1), 1),
            record(false, Some(1), 0),
            record(true, Some(1), 1),
        ];
        assert_eq!(aggregate(&history).best_streak, 3);
    }

    #[test]
    fn average_latency_skips_missing_samples() {
        let history = vec![
            record(true, Some(1000), 19),
            record(false, None, 0),
            record(false, Some(2001), 0),
        ];
        let stats = aggregate(&history);
        assert_eq!(stats.average_response_latency_ms, 1501);
        assert_eq!(stats.total_questions, 3);
    }

    #[test]
    fn prefix_counters_grow_monotonically() {
        let history = vec![
            record(true, Some(900), 19),
            record(false, Some(1200), 0),
            record(true, Some(800), 19),
            record(true, Some(700), 19),
        ];
        let mut previous = aggregate(&[]);
        for k in 1..=history.len() {
            let current = aggregate(&history[..k]);
            assert_eq!(current.total_questions as usize, k);
            assert!(current.correct_count >= previous.correct_count);
            assert!(current.wrong_count >= previous.wrong_count);
            assert!(current.total_score >= previous.total_score);
            previous = current;
        }
    }
}
