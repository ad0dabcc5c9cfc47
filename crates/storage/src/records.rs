//! Persisted JSON shapes for settings and cumulative stats.
//!
//! Field names are camelCase and `lastUpdated` is epoch milliseconds, so
//! values written by earlier front-ends read back unchanged. Missing fields
//! take their default.

use chrono::{DateTime, Utc};
use drill_core::model::{
    AnswerMode, CumulativeStats, DifficultyId, UserSettings, UserSettingsDraft, VoiceParams,
};
use serde::{Deserialize, Serialize};

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn millis_to_datetime(millis: i64) -> Result<DateTime<Utc>, StorageError> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| StorageError::Serialization(format!("invalid lastUpdated: {millis}")))
}

/// Stored form of [`UserSettings`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettingsRecord {
    pub difficulty: u32,
    pub preferred_mode: String,
    pub sound_enabled: bool,
    pub speech_rate: f64,
    pub speech_pitch: f64,
    pub speech_volume: f64,
    pub last_updated: i64,
}

impl Default for UserSettingsRecord {
    fn default() -> Self {
        let draft = UserSettingsDraft::default();
        Self {
            difficulty: draft.difficulty.value(),
            preferred_mode: draft.preferred_mode.as_str().to_string(),
            sound_enabled: draft.sound_enabled,
            speech_rate: draft.voice.rate,
            speech_pitch: draft.voice.pitch,
            speech_volume: draft.voice.volume,
            last_updated: 0,
        }
    }
}

impl UserSettingsRecord {
    #[must_use]
    pub fn from_settings(settings: &UserSettings) -> Self {
        let voice = settings.voice();
        Self {
            difficulty: settings.difficulty().value(),
            preferred_mode: settings.preferred_mode().as_str().to_string(),
            sound_enabled: settings.sound_enabled(),
            speech_rate: voice.rate,
            speech_pitch: voice.pitch,
            speech_volume: voice.volume,
            last_updated: settings.last_updated().timestamp_millis(),
        }
    }

    /// Convert the record back into validated settings.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the mode, difficulty, voice
    /// parameters, or timestamp are invalid.
    pub fn into_settings(self) -> Result<UserSettings, StorageError> {
        let preferred_mode: AnswerMode = self.preferred_mode.parse().map_err(ser)?;
        let draft = UserSettingsDraft {
            difficulty: DifficultyId::new(self.difficulty),
            preferred_mode,
            sound_enabled: self.sound_enabled,
            voice: VoiceParams {
                rate: self.speech_rate,
                pitch: self.speech_pitch,
                volume: self.speech_volume,
            },
        };
        UserSettings::from_persisted(draft, millis_to_datetime(self.last_updated)?).map_err(ser)
    }
}

/// Stored form of [`CumulativeStats`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CumulativeStatsRecord {
    pub total_questions: u64,
    pub correct_answers: u64,
    pub wrong_answers: u64,
    pub total_score: u64,
    pub best_streak: u32,
    pub sessions_played: u64,
    pub last_updated: i64,
}

impl CumulativeStatsRecord {
    #[must_use]
    pub fn from_stats(stats: &CumulativeStats) -> Self {
        Self {
            total_questions: stats.total_questions,
            correct_answers: stats.correct_answers,
            wrong_answers: stats.wrong_answers,
            total_score: stats.total_score,
            best_streak: stats.best_streak,
            sessions_played: stats.sessions_played,
            last_updated: stats.last_updated.timestamp_millis(),
        }
    }

    /// Convert the record back into domain stats.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the timestamp is out of range.
    pub fn into_stats(self) -> Result<CumulativeStats, StorageError> {
        Ok(CumulativeStats {
            total_questions: self.total_questions,
            correct_answers: self.correct_answers,
            wrong_answers: self.wrong_answers,
            total_score: self.total_score,
            best_streak: self.best_streak,
            sessions_played: self.sessions_played,
            last_updated: millis_to_datetime(self.last_updated)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drill_core::time::fixed_now;

    #[test]
    fn settings_json_uses_camel_case_keys() {
        let settings = UserSettings::defaults_at(fixed_now());
        let json = serde_json::to_value(UserSettingsRecord::from_settings(&settings)).unwrap();
        assert_eq!(json["difficulty"], 1);
        assert_eq!(json["preferredMode"], "choice");
        assert_eq!(json["soundEnabled"], true);
        assert_eq!(json["speechRate"], 0.4);
        assert_eq!(json["speechPitch"], 1.0);
        assert_eq!(json["speechVolume"], 1.0);
        assert_eq!(json["lastUpdated"], fixed_now().timestamp_millis());
    }

    #[test]
    fn settings_round_trip_exactly() {
        let raw = r#"{"difficulty":4,"preferredMode":"speak","soundEnabled":false,"speechRate":0.8,"speechPitch":1.2,"speechVolume":0.5,"lastUpdated":1700000000123}"#;
        let record: UserSettingsRecord = serde_json::from_str(raw).unwrap();
        let settings = record.clone().into_settings().unwrap();
        assert_eq!(settings.difficulty(), DifficultyId::new(4));
        assert_eq!(settings.preferred_mode(), AnswerMode::Speak);
        assert!(!settings.sound_enabled());

        let back = UserSettingsRecord::from_settings(&settings);
        assert_eq!(back, record);
        let reparsed: serde_json::Value = serde_json::from_str(raw).unwrap();
        assert_eq!(serde_json::to_value(&back).unwrap(), reparsed);
    }

    #[test]
    fn partial_settings_fill_defaults() {
        let record: UserSettingsRecord = serde_json::from_str(r#"{"difficulty":3}"#).unwrap();
        assert_eq!(record.preferred_mode, "choice");
        assert!(record.sound_enabled);
        assert_eq!(record.speech_rate, 0.4);
        let settings = record.into_settings().unwrap();
        assert_eq!(settings.difficulty(), DifficultyId::new(3));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let bad_mode = UserSettingsRecord {
            preferred_mode: "shout".into(),
            ..UserSettingsRecord::default()
        };
        assert!(matches!(
            bad_mode.into_settings(),
            Err(StorageError::Serialization(_))
        ));

        let bad_level = UserSettingsRecord {
            difficulty: 12,
            ..UserSettingsRecord::default()
        };
        assert!(bad_level.into_settings().is_err());
    }

    #[test]
    fn stats_round_trip_exactly() {
        let raw = r#"{"totalQuestions":30,"correctAnswers":21,"wrongAnswers":9,"totalScore":512,"bestStreak":8,"sessionsPlayed":3,"lastUpdated":1700000000000}"#;
        let record: CumulativeStatsRecord = serde_json::from_str(raw).unwrap();
        let stats = record.clone().into_stats().unwrap();
        assert_eq!(stats.total_questions, 30);
        assert_eq!(stats.best_streak, 8);
        assert_eq!(stats.last_updated, fixed_now());

        let back = CumulativeStatsRecord::from_stats(&stats);
        assert_eq!(back, record);
        assert_eq!(
            serde_json::to_value(&back).unwrap(),
            serde_json::from_str::<serde_json::Value>(raw).unwrap()
        );
    }
}
