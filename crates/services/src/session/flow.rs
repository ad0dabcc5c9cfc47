use std::sync::Arc;

use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, warn};

use drill_core::model::{
    AnswerMode, DifficultyId, Question, SessionSummary, UserSettings, VoiceParams,
};

use super::feedback::FeedbackTimer;
use super::game::{AnswerOutcome, GamePhase, GameSession, ProceedOutcome};
use super::summaries::SessionSummaryService;
use crate::Clock;
use crate::speech::{
    FeedbackCue, SpeechInput, SpeechOutput, listen_bounded, play_cue_bounded, speak_bounded,
};
use crate::stats_service::StatsService;

/// Drives a [`GameSession`] against speech backends, the feedback timer and
/// persistence.
///
/// This is the async half of the game: it owns the clock, awaits speech and
/// feedback waits, and writes cumulative stats plus a summary row once per
/// finished session. Nothing here fails the round; backend and storage
/// problems are logged.
pub struct GameFlow<R = StdRng> {
    session: GameSession<R>,
    clock: Clock,
    output: Arc<dyn SpeechOutput>,
    input: Arc<dyn SpeechInput>,
    stats: StatsService,
    summaries: SessionSummaryService,
    feedback: FeedbackTimer,
    voice: VoiceParams,
    sound_enabled: bool,
}

impl<R: Rng> GameFlow<R> {
    #[must_use]
    pub fn new(
        session: GameSession<R>,
        clock: Clock,
        output: Arc<dyn SpeechOutput>,
        input: Arc<dyn SpeechInput>,
        stats: StatsService,
        summaries: SessionSummaryService,
    ) -> Self {
        Self {
            session,
            clock,
            output,
            input,
            stats,
            summaries,
            feedback: FeedbackTimer::new(),
            voice: VoiceParams::default(),
            sound_enabled: true,
        }
    }

    /// Take difficulty, mode and voice from stored settings.
    #[must_use]
    pub fn with_settings(mut self, settings: &UserSettings) -> Self {
        self.apply_settings(settings);
        self
    }

    pub fn apply_settings(&mut self, settings: &UserSettings) {
        self.session.set_difficulty(settings.difficulty());
        self.session.set_mode(settings.preferred_mode());
        self.voice = settings.voice();
        self.sound_enabled = settings.sound_enabled();
    }

    #[must_use]
    pub fn session(&self) -> &GameSession<R> {
        &self.session
    }

    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.session.phase()
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Move a fixed clock forward. No effect on the system clock.
    pub fn advance_clock(&mut self, delta: chrono::Duration) {
        self.clock.advance(delta);
    }

    #[must_use]
    pub fn is_feedback_pending(&self) -> bool {
        self.feedback.is_pending()
    }

    pub fn set_difficulty(&mut self, id: DifficultyId) {
        self.session.set_difficulty(id);
    }

    pub fn set_mode(&mut self, mode: AnswerMode) {
        self.session.set_mode(mode);
    }

    //
    // ─── ROUND EVENTS ──────────────────────────────────────────────────────────
    //

    /// Start a round and announce its first number.
    pub async fn start(&mut self) -> Option<Question> {
        let question = self.session.start(self.clock.now())?.clone();
        self.announce(question.target()).await;
        Some(question)
    }

    pub async fn answer_choice(&mut self, value: u32) -> Option<AnswerOutcome> {
        let outcome = self.session.submit_choice(value, self.clock.now())?;
        self.after_answer(&outcome).await;
        Some(outcome)
    }

    pub async fn answer_spoken(&mut self, transcript: &str) -> Option<AnswerOutcome> {
        let outcome = self.session.submit_spoken(transcript, self.clock.now())?;
        self.after_answer(&outcome).await;
        Some(outcome)
    }

    /// Listen once and submit whatever was heard.
    ///
    /// A failed or timed-out recognition is submitted as an empty transcript,
    /// which counts as a wrong answer.
    pub async fn listen_and_answer(&mut self) -> Option<AnswerOutcome> {
        if self.session.phase() != GamePhase::Playing {
            debug!(phase = ?self.session.phase(), "listen ignored outside playing phase");
            return None;
        }
        let timeout = self.session.config().speech_timeout();
        let transcript = listen_bounded(self.input.as_ref(), timeout)
            .await
            .unwrap_or_else(|err| {
                warn!(error = %err, "speech recognition failed");
                String::new()
            });
        self.answer_spoken(&transcript).await
    }

    /// Wait out the feedback display, then move to the next question or
    /// finish the round.
    pub async fn proceed(&mut self) -> Option<ProceedOutcome> {
        if self.session.phase() != GamePhase::Feedback {
            debug!(phase = ?self.session.phase(), "proceed ignored outside feedback phase");
            return None;
        }
        self.feedback.wait().await;

        let outcome = self.session.proceed(self.clock.now())?;
        match &outcome {
            ProceedOutcome::NextQuestion => self.announce_current().await,
            ProceedOutcome::Finished(summary) => self.persist(summary).await,
        }
        Some(outcome)
    }

    /// Go back to the current question and announce it again.
    pub async fn repeat(&mut self) -> Option<Question> {
        let question = self.session.repeat()?.clone();
        self.feedback.cancel();
        self.announce(question.target()).await;
        Some(question)
    }

    /// Replay the current number while a question is open.
    pub async fn play_current_number(&mut self) {
        if self.session.phase() != GamePhase::Playing {
            debug!(phase = ?self.session.phase(), "replay ignored outside playing phase");
            return;
        }
        self.announce_current().await;
    }

    /// End the round early, persisting it if anything was answered.
    pub async fn quit(&mut self) -> Option<SessionSummary> {
        self.feedback.cancel();
        let summary = self.session.finish(self.clock.now())?;
        self.persist(&summary).await;
        Some(summary)
    }

    //
    // ─── HELPERS ───────────────────────────────────────────────────────────────
    //

    async fn after_answer(&mut self, outcome: &AnswerOutcome) {
        let timeout = self.session.config().speech_timeout();
        if self.sound_enabled {
            play_cue_bounded(
                self.output.as_ref(),
                FeedbackCue::for_result(outcome.is_correct),
                timeout,
            )
            .await;
        }
        self.feedback.begin(self.session.config().feedback_display());
    }

    async fn announce_current(&self) {
        if let Some(target) = self.session.current_question().map(Question::target) {
            self.announce(target).await;
        }
    }

    async fn announce(&self, target: u32) {
        if !self.sound_enabled {
            return;
        }
        let config = self.session.config();
        speak_bounded(
            self.output.as_ref(),
            &target.to_string(),
            config.speech_lang(),
            self.voice,
            config.speech_timeout(),
        )
        .await;
    }

    async fn persist(&self, summary: &SessionSummary) {
        let (_, stored) = self.stats.merge_session(summary.stats()).await;
        if !stored {
            warn!(session_id = %summary.session_id(), "cumulative stats not saved");
        }
        self.summaries.record(summary).await;
    }
}
