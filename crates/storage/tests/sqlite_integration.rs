use chrono::Duration;
use drill_core::model::{
    AnswerMode, CumulativeStats, DifficultyId, SessionId, SessionStats, SessionSummary,
    UserSettings,
};
use drill_core::time::fixed_now;
use std::sync::Arc;
use storage::JsonStore;
use storage::records::{CumulativeStatsRecord, UserSettingsRecord};
use storage::repository::{KeyValueStore, SessionSummaryRepository, StorageError};
use storage::sqlite::SqliteRepository;

fn summary(offset_minutes: i64, correct: u32, wrong: u32) -> SessionSummary {
    let started = fixed_now() + Duration::minutes(offset_minutes);
    let total = correct + wrong;
    SessionSummary::from_persisted(
        SessionId::generate(),
        DifficultyId::new(3),
        AnswerMode::Speak,
        started,
        started + Duration::seconds(75),
        SessionStats {
            total_questions: total,
            correct_count: correct,
            wrong_count: wrong,
            accuracy_percent: 70.0,
            total_score: correct * 26,
            average_response_latency_ms: 2250,
            best_streak: correct.min(4),
        },
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_kv_upserts_and_removes() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get("missing").await.unwrap(), None);

    repo.set("number_game_settings", "{\"difficulty\":2}")
        .await
        .unwrap();
    repo.set("number_game_settings", "{\"difficulty\":5}")
        .await
        .unwrap();
    assert_eq!(
        repo.get("number_game_settings").await.unwrap().as_deref(),
        Some("{\"difficulty\":5}")
    );

    repo.remove("number_game_settings").await.unwrap();
    assert_eq!(repo.get("number_game_settings").await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_round_trips_persisted_records() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_records?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    let store = JsonStore::new(Arc::new(repo));

    let settings = UserSettings::defaults_at(fixed_now());
    let record = UserSettingsRecord::from_settings(&settings);
    assert!(store.set("number_game_settings", &record).await);
    let back: UserSettingsRecord = store
        .try_get("number_game_settings")
        .await
        .unwrap()
        .expect("stored settings");
    assert_eq!(back.into_settings().unwrap(), settings);

    let stats = CumulativeStats::empty_at(fixed_now());
    assert!(
        store
            .set("number_game_stats", &CumulativeStatsRecord::from_stats(&stats))
            .await
    );
    let back = store
        .get_or("number_game_stats", CumulativeStatsRecord::default())
        .await;
    assert_eq!(back.into_stats().unwrap(), stats);
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");
}

#[tokio::test]
async fn sqlite_session_summaries_round_trip() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_summaries?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let first = summary(0, 7, 3);
    let second = summary(30, 9, 1);
    let first_id = repo.append_summary(&first).await.unwrap();
    let second_id = repo.append_summary(&second).await.unwrap();

    let fetched = repo.get_summary(first_id).await.unwrap();
    assert_eq!(fetched, first);
    assert_eq!(fetched.play_time_ms(), 75_000);

    let recent = repo.list_recent(10).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].id, second_id);
    assert_eq!(recent[0].summary, second);
    assert_eq!(recent[1].id, first_id);

    assert!(matches!(
        repo.append_summary(&first).await,
        Err(StorageError::Conflict)
    ));
    assert!(matches!(
        repo.get_summary(9_999).await,
        Err(StorageError::NotFound)
    ));
}
