//
// ─── SESSION STATS ────────────────────────────────────────────────────────────
//

/// Summary statistics derived from a session's answer history.
///
/// Always recomputed from the history, see [`crate::stats::aggregate`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionStats {
    pub total_questions: u32,
    pub correct_count: u32,
    pub wrong_count: u32,
    /// Percentage rounded to two decimal places.
    pub accuracy_percent: f64,
    pub total_score: u32,
    pub average_response_latency_ms: u64,
    pub best_streak: u32,
}

impl SessionStats {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_questions == 0
    }
}

//
// ─── COMBO STATE ──────────────────────────────────────────────────────────────
//

/// Live consecutive-correct counters owned by a game session.
///
/// `current_combo` and `current_streak` move together within a round; they
/// only differ in what survives a round reset: `best_streak` is kept across
/// rounds, `max_combo` is per round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComboState {
    pub current_combo: u32,
    pub current_streak: u32,
    pub max_combo: u32,
    pub best_streak: u32,
}

impl ComboState {
    /// Apply the outcome of one answer.
    pub fn record(&mut self, correct: bool) {
        if correct {
            self.current_combo = self.current_combo.saturating_add(1);
            self.current_streak = self.current_streak.saturating_add(1);
            self.max_combo = self.max_combo.max(self.current_combo);
            self.best_streak = self.best_streak.max(self.current_streak);
        } else {
            self.current_combo = 0;
            self.current_streak = 0;
        }
    }

    /// Clear per-round counters at the end of a session.
    pub fn reset_round(&mut self) {
        self.current_combo = 0;
        self.current_streak = 0;
        self.max_combo = 0;
    }
}
