use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::catalog;
use crate::model::{AnswerMode, DifficultyId, SessionStats};

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("unknown difficulty level: {0}")]
    UnknownDifficulty(DifficultyId),

    #[error("speech rate must be in (0, 10], got {0}")]
    InvalidRate(f64),

    #[error("speech pitch must be in [0, 2], got {0}")]
    InvalidPitch(f64),

    #[error("speech volume must be in [0, 1], got {0}")]
    InvalidVolume(f64),
}

//
// ─── VOICE PARAMS ─────────────────────────────────────────────────────────────
//

/// Speech-synthesis tuning passed to the speech output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceParams {
    pub rate: f64,
    pub pitch: f64,
    pub volume: f64,
}

impl VoiceParams {
    pub const DEFAULT_RATE: f64 = 0.4;
    pub const DEFAULT_PITCH: f64 = 1.0;
    pub const DEFAULT_VOLUME: f64 = 1.0;

    /// Validate ranges.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` naming the first out-of-range field.
    pub fn validate(self) -> Result<Self, SettingsError> {
        if !(self.rate > 0.0 && self.rate <= 10.0) {
            return Err(SettingsError::InvalidRate(self.rate));
        }
        if !(0.0..=2.0).contains(&self.pitch) {
            return Err(SettingsError::InvalidPitch(self.pitch));
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(SettingsError::InvalidVolume(self.volume));
        }
        Ok(self)
    }
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            rate: Self::DEFAULT_RATE,
            pitch: Self::DEFAULT_PITCH,
            volume: Self::DEFAULT_VOLUME,
        }
    }
}

//
// ─── USER SETTINGS ────────────────────────────────────────────────────────────
//

/// Player preferences persisted between sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct UserSettings {
    difficulty: DifficultyId,
    preferred_mode: AnswerMode,
    sound_enabled: bool,
    voice: VoiceParams,
    last_updated: DateTime<Utc>,
}

/// Unvalidated settings, as edited by a front-end or read from storage.
#[derive(Debug, Clone)]
pub struct UserSettingsDraft {
    pub difficulty: DifficultyId,
    pub preferred_mode: AnswerMode,
    pub sound_enabled: bool,
    pub voice: VoiceParams,
}

impl Default for UserSettingsDraft {
    fn default() -> Self {
        Self {
            difficulty: catalog::default_level().id(),
            preferred_mode: AnswerMode::Choice,
            sound_enabled: true,
            voice: VoiceParams::default(),
        }
    }
}

impl UserSettingsDraft {
    /// Validate the draft into settings stamped with `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the difficulty is not in the catalog or a
    /// voice parameter is out of range.
    pub fn validate(self, updated_at: DateTime<Utc>) -> Result<UserSettings, SettingsError> {
        if catalog::find_level(self.difficulty).is_none() {
            return Err(SettingsError::UnknownDifficulty(self.difficulty));
        }
        let voice = self.voice.validate()?;
        Ok(UserSettings {
            difficulty: self.difficulty,
            preferred_mode: self.preferred_mode,
            sound_enabled: self.sound_enabled,
            voice,
            last_updated: updated_at,
        })
    }
}

impl UserSettings {
    /// Defaults used when nothing valid is persisted.
    #[must_use]
    pub fn defaults_at(now: DateTime<Utc>) -> Self {
        let draft = UserSettingsDraft::default();
        Self {
            difficulty: draft.difficulty,
            preferred_mode: draft.preferred_mode,
            sound_enabled: draft.sound_enabled,
            voice: draft.voice,
            last_updated: now,
        }
    }

    /// Rehydrate settings from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if any persisted field fails validation.
    pub fn from_persisted(
        draft: UserSettingsDraft,
        last_updated: DateTime<Utc>,
    ) -> Result<Self, SettingsError> {
        draft.validate(last_updated)
    }

    /// Returns an editable copy of these settings.
    #[must_use]
    pub fn to_draft(&self) -> UserSettingsDraft {
        UserSettingsDraft {
            difficulty: self.difficulty,
            preferred_mode: self.preferred_mode,
            sound_enabled: self.sound_enabled,
            voice: self.voice,
        }
    }

    #[must_use]
    pub fn difficulty(&self) -> DifficultyId {
        self.difficulty
    }

    #[must_use]
    pub fn preferred_mode(&self) -> AnswerMode {
        self.preferred_mode
    }

    #[must_use]
    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    #[must_use]
    pub fn voice(&self) -> VoiceParams {
        self.voice
    }

    #[must_use]
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }
}

//
// ─── CUMULATIVE STATS ─────────────────────────────────────────────────────────
//

/// Lifetime totals across all finished sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CumulativeStats {
    pub total_questions: u64,
    pub correct_answers: u64,
    pub wrong_answers: u64,
    pub total_score: u64,
    pub best_streak: u32,
    pub sessions_played: u64,
    pub last_updated: DateTime<Utc>,
}

impl CumulativeStats {
    #[must_use]
    pub fn empty_at(now: DateTime<Utc>) -> Self {
        Self {
            total_questions: 0,
            correct_answers: 0,
            wrong_answers: 0,
            total_score: 0,
            best_streak: 0,
            sessions_played: 0,
            last_updated: now,
        }
    }

    /// Fold one finished session into the totals.
    ///
    /// Counters are summed, `best_streak` keeps the maximum and
    /// `sessions_played` grows by one.
    #[must_use]
    pub fn merge_session(&self, session: &SessionStats, at: DateTime<Utc>) -> Self {
        Self {
            total_questions: self
                .total_questions
                .saturating_add(u64::from(session.total_questions)),
            correct_answers: self
                .correct_answers
                .saturating_add(u64::from(session.correct_count)),
            wrong_answers: self
                .wrong_answers
                .saturating_add(u64::from(session.wrong_count)),
            total_score: self
                .total_score
                .saturating_add(u64::from(session.total_score)),
            best_streak: self.best_streak.max(session.best_streak),
            sessions_played: self.sessions_played.saturating_add(1),
            last_updated: at,
        }
    }
}
