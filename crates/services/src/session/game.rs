use chrono::{DateTime, Utc};
use rand::Rng;
use rand::rngs::StdRng;
use std::fmt;
use tracing::{debug, info};

use drill_core::catalog;
use drill_core::model::{
    Answer, AnswerMode, AnswerRecord, ComboState, DifficultyId, Question, SessionId, SessionStats,
    SessionSummary,
};
use drill_core::time::elapsed_ms;
use drill_core::{GameConfig, QuestionGenerator, scoring, stats, verify};

use super::progress::SessionProgress;

//
// ─── PHASES AND OUTCOMES ───────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GamePhase {
    #[default]
    Idle,
    Playing,
    Feedback,
}

/// Result of checking one answer, shown during the feedback phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub points: u32,
    pub correct_answer: u32,
    pub latency_ms: u64,
    pub combo: ComboState,
    pub total_score: u32,
}

/// What `proceed` did after the feedback phase.
#[derive(Debug, Clone, PartialEq)]
pub enum ProceedOutcome {
    NextQuestion,
    /// The round hit its question limit; the summary covers the whole round.
    Finished(SessionSummary),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Pure game state machine for one player.
///
/// Time always comes in as `now` from the caller so the services layer owns
/// the clock. Events that do not fit the current phase are ignored and
/// return `None`.
pub struct GameSession<R = StdRng> {
    config: GameConfig,
    generator: QuestionGenerator<R>,
    difficulty: DifficultyId,
    mode: AnswerMode,
    phase: GamePhase,
    session_id: SessionId,
    session_started_at: Option<DateTime<Utc>>,
    question: Option<Question>,
    question_started_at: Option<DateTime<Utc>>,
    last_outcome: Option<AnswerOutcome>,
    history: Vec<AnswerRecord>,
    score: u32,
    combo: ComboState,
}

impl GameSession<StdRng> {
    /// Session with an OS-seeded generator.
    #[must_use]
    pub fn new(config: GameConfig, difficulty: DifficultyId, mode: AnswerMode) -> Self {
        Self::with_generator(config, QuestionGenerator::from_os_rng(), difficulty, mode)
    }
}

impl<R: Rng> GameSession<R> {
    /// Session drawing questions from `generator`.
    ///
    /// Difficulty ids outside the catalog fall back to the default level.
    #[must_use]
    pub fn with_generator(
        config: GameConfig,
        generator: QuestionGenerator<R>,
        difficulty: DifficultyId,
        mode: AnswerMode,
    ) -> Self {
        Self {
            config,
            generator,
            difficulty: catalog::level_or_default(difficulty).id(),
            mode,
            phase: GamePhase::Idle,
            session_id: SessionId::generate(),
            session_started_at: None,
            question: None,
            question_started_at: None,
            last_outcome: None,
            history: Vec::new(),
            score: 0,
            combo: ComboState::default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.phase
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
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    /// Outcome of the last answer while in the feedback phase.
    #[must_use]
    pub fn last_outcome(&self) -> Option<&AnswerOutcome> {
        self.last_outcome.as_ref()
    }

    #[must_use]
    pub fn history(&self) -> &[AnswerRecord] {
        &self.history
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn combo(&self) -> ComboState {
        self.combo
    }

    /// Aggregate stats over the answers of the current round.
    #[must_use]
    pub fn stats(&self) -> SessionStats {
        stats::aggregate(&self.history)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.config.max_questions();
        let answered = u32::try_from(self.history.len()).unwrap_or(u32::MAX);
        SessionProgress {
            total,
            answered,
            remaining: total.saturating_sub(answered),
            accuracy_percent: self.live_accuracy(),
        }
    }

    /// Integer percent of correct answers in the current round.
    #[must_use]
    pub fn live_accuracy(&self) -> u32 {
        let total = self.history.len();
        if total == 0 {
            return 0;
        }
        let correct = self.history.iter().filter(|r| r.is_correct).count();
        // Rounds half up, like the two-decimal accuracy in the aggregate.
        u32::try_from((correct * 200 + total) / (2 * total)).unwrap_or(100)
    }

    /// Change difficulty for the next generated question.
    ///
    /// Unknown ids fall back to the default level.
    pub fn set_difficulty(&mut self, id: DifficultyId) {
        self.difficulty = catalog::level_or_default(id).id();
    }

    pub fn set_mode(&mut self, mode: AnswerMode) {
        self.mode = mode;
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    /// Idle → playing: open a round with its first question.
    pub fn start(&mut self, now: DateTime<Utc>) -> Option<&Question> {
        if self.phase != GamePhase::Idle {
            debug!(phase = ?self.phase, "start ignored outside idle phase");
            return None;
        }
        self.session_started_at = Some(now);
        info!(
            session_id = %self.session_id,
            difficulty = self.difficulty.value(),
            mode = %self.mode,
            "session started"
        );
        self.next_question(now);
        self.question.as_ref()
    }

    /// Playing → feedback with a chosen option.
    pub fn submit_choice(&mut self, value: u32, now: DateTime<Utc>) -> Option<AnswerOutcome> {
        self.submit(Answer::Choice(value), now)
    }

    /// Playing → feedback with a speech transcript. Empty text counts as wrong.
    pub fn submit_spoken(
        &mut self,
        transcript: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Option<AnswerOutcome> {
        self.submit(Answer::Spoken(transcript.into()), now)
    }

    /// Check an answer against the current question and record it.
    pub fn submit(&mut self, answer: Answer, now: DateTime<Utc>) -> Option<AnswerOutcome> {
        if self.phase != GamePhase::Playing {
            debug!(phase = ?self.phase, "answer ignored outside playing phase");
            return None;
        }
        let question = self.question.as_ref()?;

        let latency_ms = self
            .question_started_at
            .map_or(0, |started| elapsed_ms(started, now));
        let is_correct = match &answer {
            Answer::Choice(value) => verify::check_choice(question, *value),
            Answer::Spoken(text) => verify::check_spoken(question, text),
        };
        let points = if is_correct {
            scoring::score(question.difficulty(), latency_ms)
        } else {
            0
        };
        let target = question.target();
        let difficulty = question.difficulty();

        self.score = self.score.saturating_add(points);
        self.combo.record(is_correct);
        self.history.push(AnswerRecord {
            target,
            answer,
            is_correct,
            points,
            latency_ms: Some(latency_ms),
            difficulty,
            recorded_at: now,
        });

        let outcome = AnswerOutcome {
            is_correct,
            points,
            correct_answer: target,
            latency_ms,
            combo: self.combo,
            total_score: self.score,
        };
        debug!(expected = target, is_correct, points, latency_ms, "answer checked");
        self.last_outcome = Some(outcome.clone());
        self.phase = GamePhase::Feedback;
        Some(outcome)
    }

    /// Feedback → playing with a new question, or → idle when the round is full.
    pub fn proceed(&mut self, now: DateTime<Utc>) -> Option<ProceedOutcome> {
        if self.phase != GamePhase::Feedback {
            debug!(phase = ?self.phase, "proceed ignored outside feedback phase");
            return None;
        }
        self.last_outcome = None;

        let answered = u32::try_from(self.history.len()).unwrap_or(u32::MAX);
        if answered >= self.config.max_questions() {
            return Some(ProceedOutcome::Finished(self.end_round(now)));
        }

        self.next_question(now);
        Some(ProceedOutcome::NextQuestion)
    }

    /// Feedback → playing on the same question.
    ///
    /// The question timer keeps running from when the question was first shown.
    pub fn repeat(&mut self) -> Option<&Question> {
        if self.phase != GamePhase::Feedback {
            debug!(phase = ?self.phase, "repeat ignored outside feedback phase");
            return None;
        }
        self.last_outcome = None;
        self.phase = GamePhase::Playing;
        self.question.as_ref()
    }

    /// End the round early.
    ///
    /// Returns a summary when at least one answer was recorded; an empty
    /// round is dropped.
    pub fn finish(&mut self, now: DateTime<Utc>) -> Option<SessionSummary> {
        if self.phase == GamePhase::Idle {
            return None;
        }
        if self.history.is_empty() {
            debug!(session_id = %self.session_id, "empty session discarded");
            self.reset_round();
            return None;
        }
        Some(self.end_round(now))
    }

    fn next_question(&mut self, now: DateTime<Utc>) {
        let question = self.generator.generate(self.difficulty, now);
        debug!(
            number = question.target(),
            options = question.options().len(),
            "question generated"
        );
        self.question = Some(question);
        self.question_started_at = Some(now);
        self.last_outcome = None;
        self.phase = GamePhase::Playing;
    }

    fn end_round(&mut self, now: DateTime<Utc>) -> SessionSummary {
        let started_at = self.session_started_at.unwrap_or(now);
        let summary = SessionSummary::from_history(
            self.session_id,
            self.difficulty,
            self.mode,
            started_at,
            now,
            &self.history,
        );
        info!(
            session_id = %self.session_id,
            total = summary.stats().total_questions,
            correct = summary.stats().correct_count,
            score = summary.stats().total_score,
            "session finished"
        );
        self.reset_round();
        summary
    }

    fn reset_round(&mut self) {
        self.history.clear();
        self.score = 0;
        self.combo.reset_round();
        self.question = None;
        self.question_started_at = None;
        self.last_outcome = None;
        self.session_started_at = None;
        self.session_id = SessionId::generate();
        self.phase = GamePhase::Idle;
    }
}

impl<R> fmt::Debug for GameSession<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("session_id", &self.session_id)
            .field("phase", &self.phase)
            .field("difficulty", &self.difficulty)
            .field("mode", &self.mode)
            .field("answered", &self.history.len())
            .field("score", &self.score)
            .finish_non_exhaustive()
    }
}
