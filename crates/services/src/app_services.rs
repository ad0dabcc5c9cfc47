use std::sync::Arc;

use drill_core::GameConfig;
use drill_core::model::UserSettings;
use storage::JsonStore;
use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::session::{GameFlow, GameSession, SessionSummaryService};
use crate::settings_service::SettingsService;
use crate::speech::{SpeechInput, SpeechOutput};
use crate::stats_service::StatsService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    settings: Arc<SettingsService>,
    stats: Arc<StatsService>,
    session_summaries: Arc<SessionSummaryService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or migrated.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock))
    }

    /// Build services over process-local storage.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        let store = JsonStore::new(Arc::clone(&storage.kv));
        Self {
            clock,
            settings: Arc::new(SettingsService::new(clock, store.clone())),
            stats: Arc::new(StatsService::new(clock, store)),
            session_summaries: Arc::new(SessionSummaryService::new(Arc::clone(
                &storage.session_summaries,
            ))),
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn settings(&self) -> Arc<SettingsService> {
        Arc::clone(&self.settings)
    }

    #[must_use]
    pub fn stats(&self) -> Arc<StatsService> {
        Arc::clone(&self.stats)
    }

    #[must_use]
    pub fn session_summaries(&self) -> Arc<SessionSummaryService> {
        Arc::clone(&self.session_summaries)
    }

    /// Build a game flow for `session`, applying `settings`.
    #[must_use]
    pub fn game_flow<R: rand::Rng>(
        &self,
        session: GameSession<R>,
        settings: &UserSettings,
        output: Arc<dyn SpeechOutput>,
        input: Arc<dyn SpeechInput>,
    ) -> GameFlow<R> {
        GameFlow::new(
            session,
            self.clock,
            output,
            input,
            self.stats.as_ref().clone(),
            self.session_summaries.as_ref().clone(),
        )
        .with_settings(settings)
    }

    /// Load stored settings and build a flow with an OS-seeded generator.
    pub async fn start_flow(
        &self,
        config: GameConfig,
        output: Arc<dyn SpeechOutput>,
        input: Arc<dyn SpeechInput>,
    ) -> GameFlow {
        let settings = self.settings.load().await;
        let session = GameSession::new(config, settings.difficulty(), settings.preferred_mode());
        self.game_flow(session, &settings, output, input)
    }
}
