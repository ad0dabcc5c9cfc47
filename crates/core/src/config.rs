use std::time::Duration;

/// Key under which user settings are persisted.
pub const SETTINGS_KEY: &str = "number_game_settings";

/// Key under which cumulative stats are persisted.
pub const STATS_KEY: &str = "number_game_stats";

/// Tunables for a game session and its flow.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    max_questions: u32,
    feedback_display: Duration,
    auto_next_delay: Duration,
    speech_timeout: Duration,
    speech_lang: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_questions: 10,
            feedback_display: Duration::from_millis(2000),
            auto_next_delay: Duration::from_millis(1500),
            speech_timeout: Duration::from_millis(8000),
            speech_lang: "zh-CN".to_string(),
        }
    }
}

impl GameConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Questions per session. Zero is treated as one.
    #[must_use]
    pub fn with_max_questions(mut self, max_questions: u32) -> Self {
        self.max_questions = max_questions.max(1);
        self
    }

    #[must_use]
    pub fn with_feedback_display(mut self, duration: Duration) -> Self {
        self.feedback_display = duration;
        self
    }

    #[must_use]
    pub fn with_auto_next_delay(mut self, duration: Duration) -> Self {
        self.auto_next_delay = duration;
        self
    }

    #[must_use]
    pub fn with_speech_timeout(mut self, duration: Duration) -> Self {
        self.speech_timeout = duration;
        self
    }

    #[must_use]
    pub fn with_speech_lang(mut self, lang: impl Into<String>) -> Self {
        self.speech_lang = lang.into();
        self
    }

    #[must_use]
    pub fn max_questions(&self) -> u32 {
        self.max_questions
    }

    /// How long answer feedback stays up before the next question may start.
    #[must_use]
    pub fn feedback_display(&self) -> Duration {
        self.feedback_display
    }

    /// Pause a front-end may insert before auto-advancing.
    #[must_use]
    pub fn auto_next_delay(&self) -> Duration {
        self.auto_next_delay
    }

    /// Upper bound on any single speech call.
    #[must_use]
    pub fn speech_timeout(&self) -> Duration {
        self.speech_timeout
    }

    /// Language tag passed to speech output.
    #[must_use]
    pub fn speech_lang(&self) -> &str {
        &self.speech_lang
    }
}
