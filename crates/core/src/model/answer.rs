use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::DifficultyId;

//
// ─── ANSWER MODE ──────────────────────────────────────────────────────────────
//

/// How the player answers: by picking an option or by saying the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerMode {
    #[default]
    Choice,
    Speak,
}

impl AnswerMode {
    /// Stable string form used in persisted settings.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerMode::Choice => "choice",
            AnswerMode::Speak => "speak",
        }
    }
}

impl fmt::Display for AnswerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseModeError(String);

impl fmt::Display for ParseModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown answer mode: {}", self.0)
    }
}

impl std::error::Error for ParseModeError {}

impl FromStr for AnswerMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "choice" => Ok(AnswerMode::Choice),
            "speak" => Ok(AnswerMode::Speak),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}

//
// ─── ANSWER ───────────────────────────────────────────────────────────────────
//

/// What the player submitted for a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// The option value that was selected.
    Choice(u32),
    /// The final transcript returned by speech recognition.
    Spoken(String),
}

impl Answer {
    #[must_use]
    pub fn mode(&self) -> AnswerMode {
        match self {
            Answer::Choice(_) => AnswerMode::Choice,
            Answer::Spoken(_) => AnswerMode::Speak,
        }
    }
}

//
// ─── ANSWER RECORD ────────────────────────────────────────────────────────────
//

/// One answered question in a session's history.
///
/// Appended once per answer event and never mutated. `points` is zero for
/// incorrect answers. `latency_ms` is `None` only for records rebuilt from
/// sources that did not measure it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRecord {
    pub target: u32,
    pub answer: Answer,
    pub is_correct: bool,
    pub points: u32,
    pub latency_ms: Option<u64>,
    pub difficulty: DifficultyId,
    pub recorded_at: DateTime<Utc>,
}

impl AnswerRecord {
    #[must_use]
    pub fn mode(&self) -> AnswerMode {
        self.answer.mode()
    }
}
