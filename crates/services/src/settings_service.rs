use tracing::{debug, warn};

use drill_core::config::SETTINGS_KEY;
use drill_core::model::{AnswerMode, DifficultyId, SettingsError, UserSettings, UserSettingsDraft};
use storage::JsonStore;
use storage::records::UserSettingsRecord;

use crate::Clock;

/// Loads and stores the player's settings under a fixed key.
///
/// Reads never fail: missing or invalid values fall back to defaults.
#[derive(Clone)]
pub struct SettingsService {
    clock: Clock,
    store: JsonStore,
}

impl SettingsService {
    #[must_use]
    pub fn new(clock: Clock, store: JsonStore) -> Self {
        Self { clock, store }
    }

    /// Load persisted settings (or defaults if missing or invalid).
    pub async fn load(&self) -> UserSettings {
        let record = match self.store.try_get::<UserSettingsRecord>(SETTINGS_KEY).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!("no stored settings, using defaults");
                return UserSettings::defaults_at(self.clock.now());
            }
            Err(err) => {
                warn!(error = %err, "failed to read settings, using defaults");
                return UserSettings::defaults_at(self.clock.now());
            }
        };

        record.into_settings().unwrap_or_else(|err| {
            warn!(error = %err, "stored settings are invalid, using defaults");
            UserSettings::defaults_at(self.clock.now())
        })
    }

    /// Persist settings as-is, returning whether the write succeeded.
    pub async fn save(&self, settings: &UserSettings) -> bool {
        self.store
            .set(SETTINGS_KEY, &UserSettingsRecord::from_settings(settings))
            .await
    }

    /// Validate a draft, stamp it with the current time and persist it.
    ///
    /// A failed write is logged; the validated settings are still returned so
    /// play continues with them.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the draft fails validation.
    pub async fn update(&self, draft: UserSettingsDraft) -> Result<UserSettings, SettingsError> {
        let settings = draft.validate(self.clock.now())?;
        self.save(&settings).await;
        Ok(settings)
    }

    /// Change the stored difficulty.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::UnknownDifficulty` for ids outside the catalog.
    pub async fn set_difficulty(&self, id: DifficultyId) -> Result<UserSettings, SettingsError> {
        let mut draft = self.load().await.to_draft();
        draft.difficulty = id;
        self.update(draft).await
    }

    /// Change the stored answer mode.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the stored settings cannot be revalidated.
    pub async fn set_mode(&self, mode: AnswerMode) -> Result<UserSettings, SettingsError> {
        let mut draft = self.load().await.to_draft();
        draft.preferred_mode = mode;
        self.update(draft).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use drill_core::time::fixed_now;
    use storage::repository::{InMemoryRepository, KeyValueStore};

    fn service(repo: InMemoryRepository) -> SettingsService {
        SettingsService::new(Clock::fixed(fixed_now()), JsonStore::new(Arc::new(repo)))
    }

    #[tokio::test]
    async fn load_defaults_when_missing() {
        let settings = service(InMemoryRepository::new()).load().await;
        assert_eq!(settings, UserSettings::defaults_at(fixed_now()));
    }

    #[tokio::test]
    async fn load_defaults_when_invalid() {
        let repo = InMemoryRepository::new();
        repo.set(SETTINGS_KEY, r#"{"difficulty":42}"#).await.unwrap();
        let settings = service(repo).load().await;
        assert_eq!(settings.difficulty(), DifficultyId::new(1));
    }

    #[tokio::test]
    async fn set_difficulty_and_mode_persist() {
        let repo = InMemoryRepository::new();
        let svc = service(repo.clone());

        svc.set_difficulty(DifficultyId::new(4)).await.unwrap();
        svc.set_mode(AnswerMode::Speak).await.unwrap();

        let reloaded = service(repo).load().await;
        assert_eq!(reloaded.difficulty(), DifficultyId::new(4));
        assert_eq!(reloaded.preferred_mode(), AnswerMode::Speak);
        assert_eq!(reloaded.last_updated(), fixed_now());
    }

    #[tokio::test]
    async fn unknown_difficulty_is_rejected_and_not_stored() {
        let repo = InMemoryRepository::new();
        let svc = service(repo.clone());

        let err = svc.set_difficulty(DifficultyId::new(9)).await.unwrap_err();
        assert!(matches!(err, SettingsError::UnknownDifficulty(_)));
        assert_eq!(repo.get(SETTINGS_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_rejects_out_of_range_voice() {
        let svc = service(InMemoryRepository::new());
        let mut draft = UserSettingsDraft::default();
        draft.voice.volume = 1.5;
        assert!(matches!(
            svc.update(draft).await,
            Err(SettingsError::InvalidVolume(_))
        ));
    }
}
