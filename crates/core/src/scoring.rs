//! Points awarded for a correct answer.

use crate::model::DifficultyId;

/// Base points before the difficulty multiplier.
pub const BASE_POINTS: f64 = 10.0;

/// Answers faster than this earn a time bonus.
pub const BONUS_WINDOW_MS: u64 = 5_000;

/// Points for a correct answer at `difficulty` given after `latency_ms`.
///
/// `round(10 * (id * 0.5 + 1) + max(0, (5000 - latency) / 1000))`. The base
/// scales with the difficulty id, and the time bonus decays linearly from 5
/// to 0 over the bonus window. Incorrect answers score 0; callers decide
/// whether to call this at all.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn score(difficulty: DifficultyId, latency_ms: u64) -> u32 {
    let multiplier = f64::from(difficulty.value()) * 0.5 + 1.0;
    let bonus = time_bonus(latency_ms);
    (BASE_POINTS * multiplier + bonus).round() as u32
}

/// Bonus points for answering within the bonus window, never negative.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn time_bonus(latency_ms: u64) -> f64 {
    let remaining = BONUS_WINDOW_MS.saturating_sub(latency_ms);
    remaining as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easy_level_fast_answer_scores_nineteen() {
        assert_eq!(score(DifficultyId::new(1), 1000), 19);
    }

    #[test]
    fn slow_answers_get_no_bonus() {
        assert_eq!(score(DifficultyId::new(1), 5000), 15);
        assert_eq!(score(DifficultyId::new(1), 60_000), 15);
        assert_eq!(time_bonus(9_999), 0.0);
    }

    #[test]
    fn half_points_round_up() {
        // 15 + 0.5
        assert_eq!(score(DifficultyId::new(1), 4500), 16);
    }

    #[test]
    fn instant_answer_on_top_level() {
        // 10 * 4 + 5
        assert_eq!(score(DifficultyId::new(6), 0), 45);
    }

    #[test]
    fn non_increasing_in_latency() {
        for id in 1..=6 {
            let difficulty = DifficultyId::new(id);
            let mut previous = score(difficulty, 0);
            for latency in (0..=7000).step_by(125) {
                let current = score(difficulty, latency);
                assert!(current <= previous, "d={id} latency={latency}");
                previous = current;
            }
        }
    }

    #[test]
    fn non_decreasing_in_difficulty() {
        for latency in (0..=5000).step_by(250) {
            let mut previous = score(DifficultyId::new(1), latency);
            for id in 2..=6 {
                let current = score(DifficultyId::new(id), latency);
                assert!(current >= previous, "d={id} latency={latency}");
                previous = current;
            }
        }
    }
}
