use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use drill_core::model::{AnswerMode, DifficultyId, UserSettingsDraft, VoiceParams};
use drill_core::time::fixed_now;
use drill_core::{GameConfig, QuestionGenerator};
use services::speech::{FeedbackCue, SpeechInput, SpeechOutput};
use services::{
    AppServices, Clock, GameFlow, GamePhase, GameSession, ProceedOutcome, SpeechError,
};
use storage::repository::{KeyValueStore, Storage, StorageError};

#[derive(Default)]
struct ScriptedSpeech {
    spoken: Mutex<Vec<String>>,
    langs: Mutex<Vec<String>>,
    cues: Mutex<Vec<FeedbackCue>>,
    heard: Mutex<VecDeque<Result<String, SpeechError>>>,
}

impl ScriptedSpeech {
    fn hear(&self, transcript: Result<String, SpeechError>) {
        self.heard.lock().unwrap().push_back(transcript);
    }

    fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    fn cues(&self) -> Vec<FeedbackCue> {
        self.cues.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechOutput for ScriptedSpeech {
    async fn speak(&self, text: &str, lang: &str, _voice: VoiceParams) -> Result<(), SpeechError> {
        self.spoken.lock().unwrap().push(text.to_string());
        self.langs.lock().unwrap().push(lang.to_string());
        Ok(())
    }

    async fn play_cue(&self, cue: FeedbackCue) -> Result<(), SpeechError> {
        self.cues.lock().unwrap().push(cue);
        Ok(())
    }
}

#[async_trait]
impl SpeechInput for ScriptedSpeech {
    async fn listen(&self) -> Result<String, SpeechError> {
        self.heard
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(SpeechError::NoSpeech))
    }
}

struct BrokenStore;

#[async_trait]
impl KeyValueStore for BrokenStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Connection("disk unavailable".into()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk unavailable".into()))
    }

    async fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk unavailable".into()))
    }
}

fn config(max_questions: u32) -> GameConfig {
    GameConfig::new()
        .with_max_questions(max_questions)
        .with_feedback_display(Duration::ZERO)
}

fn flow(
    services: &AppServices,
    speech: &Arc<ScriptedSpeech>,
    max_questions: u32,
    mode: AnswerMode,
) -> GameFlow {
    let settings = UserSettingsDraft {
        preferred_mode: mode,
        ..UserSettingsDraft::default()
    }
    .validate(fixed_now())
    .unwrap();
    let session = GameSession::with_generator(
        config(max_questions),
        QuestionGenerator::seeded(42),
        settings.difficulty(),
        settings.preferred_mode(),
    );
    services.game_flow(session, &settings, speech.clone(), speech.clone())
}

fn current_target(flow: &GameFlow) -> u32 {
    flow.session()
        .current_question()
        .expect("open question")
        .target()
}

#[tokio::test]
async fn full_round_persists_stats_and_summary() {
    let services = AppServices::in_memory(Clock::fixed(fixed_now()));
    let speech = Arc::new(ScriptedSpeech::default());
    let mut flow = flow(&services, &speech, 3, AnswerMode::Choice);

    let first = flow.start().await.expect("first question");
    assert_eq!(speech.spoken(), vec![first.target().to_string()]);

    let mut finished = None;
    for _ in 0..3 {
        flow.advance_clock(chrono::Duration::milliseconds(1000));
        let target = current_target(&flow);
        let outcome = flow.answer_choice(target).await.expect("answered");
        assert!(outcome.is_correct);
        assert_eq!(outcome.points, 19);

        match flow.proceed().await.expect("proceeded") {
            ProceedOutcome::NextQuestion => assert_eq!(flow.phase(), GamePhase::Playing),
            ProceedOutcome::Finished(summary) => finished = Some(summary),
        }
    }

    let summary = finished.expect("round finished");
    assert_eq!(summary.stats().total_questions, 3);
    assert_eq!(summary.stats().total_score, 57);
    assert_eq!(summary.stats().average_response_latency_ms, 1000);
    assert_eq!(flow.phase(), GamePhase::Idle);
    assert_eq!(speech.cues(), vec![FeedbackCue::Correct; 3]);
    assert_eq!(speech.spoken().len(), 3);

    let totals = services.stats().load().await;
    assert_eq!(totals.sessions_played, 1);
    assert_eq!(totals.correct_answers, 3);
    assert_eq!(totals.best_streak, 3);

    let history = services.session_summaries().list_recent(5).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].session_id, summary.session_id());
}

#[tokio::test]
async fn speak_mode_uses_transcripts_and_failed_recognition_is_wrong() {
    let services = AppServices::in_memory(Clock::fixed(fixed_now()));
    let speech = Arc::new(ScriptedSpeech::default());
    let mut flow = flow(&services, &speech, 10, AnswerMode::Speak);

    flow.start().await.expect("question");
    let target = current_target(&flow);
    speech.hear(Ok(format!("我听到的是{target}")));
    let outcome = flow.listen_and_answer().await.expect("answered");
    assert!(outcome.is_correct);

    flow.proceed().await.expect("next");
    speech.hear(Err(SpeechError::NoSpeech));
    let outcome = flow.listen_and_answer().await.expect("answered");
    assert!(!outcome.is_correct);
    assert_eq!(outcome.combo.current_combo, 0);
    assert_eq!(outcome.combo.best_streak, 1);
    assert_eq!(
        speech.cues(),
        vec![FeedbackCue::Correct, FeedbackCue::Encourage]
    );

    assert!(flow.listen_and_answer().await.is_none());
}

#[tokio::test]
async fn repeat_and_replay_reannounce_the_same_number() {
    let services = AppServices::in_memory(Clock::fixed(fixed_now()));
    let speech = Arc::new(ScriptedSpeech::default());
    let mut flow = flow(&services, &speech, 10, AnswerMode::Choice);

    let question = flow.start().await.expect("question");
    flow.play_current_number().await;
    flow.answer_choice(question.target()).await;

    flow.play_current_number().await;
    let repeated = flow.repeat().await.expect("repeat from feedback");
    assert_eq!(repeated, question);
    assert_eq!(flow.phase(), GamePhase::Playing);

    let number = question.target().to_string();
    assert_eq!(speech.spoken(), vec![number.clone(), number.clone(), number]);
}

#[tokio::test]
async fn quit_persists_partial_round_and_skips_empty_one() {
    let services = AppServices::in_memory(Clock::fixed(fixed_now()));
    let speech = Arc::new(ScriptedSpeech::default());
    let mut flow = flow(&services, &speech, 10, AnswerMode::Choice);

    flow.start().await;
    assert!(flow.quit().await.is_none());
    assert_eq!(services.stats().load().await.sessions_played, 0);

    flow.start().await;
    let target = current_target(&flow);
    flow.answer_choice(target).await;
    let summary = flow.quit().await.expect("partial round");
    assert_eq!(summary.stats().total_questions, 1);
    assert!(!flow.is_feedback_pending());
    assert_eq!(services.stats().load().await.sessions_played, 1);
}

#[tokio::test(start_paused = true)]
async fn proceed_waits_for_feedback_display() {
    let services = AppServices::in_memory(Clock::fixed(fixed_now()));
    let speech = Arc::new(ScriptedSpeech::default());
    let settings = UserSettingsDraft::default().validate(fixed_now()).unwrap();
    let session = GameSession::with_generator(
        GameConfig::new(),
        QuestionGenerator::seeded(3),
        DifficultyId::new(2),
        AnswerMode::Choice,
    );
    let mut flow = services.game_flow(session, &settings, speech.clone(), speech.clone());

    flow.start().await;
    let target = current_target(&flow);
    flow.answer_choice(target).await;
    assert!(flow.is_feedback_pending());

    let before = tokio::time::Instant::now();
    flow.proceed().await.expect("next");
    assert_eq!(before.elapsed(), Duration::from_millis(2000));
    assert!(!flow.is_feedback_pending());
}

#[tokio::test]
async fn broken_storage_never_interrupts_play() {
    let storage = Storage {
        kv: Arc::new(BrokenStore),
        ..Storage::in_memory()
    };
    let services = AppServices::from_storage(&storage, Clock::fixed(fixed_now()));
    let speech = Arc::new(ScriptedSpeech::default());

    let settings = services.settings().load().await;
    assert_eq!(settings.difficulty(), DifficultyId::new(1));

    let mut flow = flow(&services, &speech, 1, AnswerMode::Choice);
    flow.start().await;
    let target = current_target(&flow);
    flow.answer_choice(target).await;
    assert!(matches!(
        flow.proceed().await,
        Some(ProceedOutcome::Finished(_))
    ));
    assert_eq!(services.stats().load().await.sessions_played, 0);
    assert_eq!(services.session_summaries().list_recent(5).await.unwrap().len(), 1);
}

#[tokio::test]
async fn start_flow_picks_up_stored_settings() {
    let services = AppServices::in_memory(Clock::fixed(fixed_now()));
    let speech = Arc::new(ScriptedSpeech::default());
    services
        .settings()
        .set_difficulty(DifficultyId::new(4))
        .await
        .expect("known level");
    services
        .settings()
        .set_mode(AnswerMode::Speak)
        .await
        .expect("mode saved");

    let mut flow = services
        .start_flow(config(5), speech.clone(), speech.clone())
        .await;
    assert_eq!(flow.session().difficulty(), DifficultyId::new(4));
    assert_eq!(flow.session().mode(), AnswerMode::Speak);

    let question = flow.start().await.expect("question");
    assert!(question.target() <= 100);
    assert_eq!(question.options().len(), 6);
}

#[tokio::test]
async fn announcements_use_configured_language() {
    let services = AppServices::in_memory(Clock::fixed(fixed_now()));
    let speech = Arc::new(ScriptedSpeech::default());
    let settings = UserSettingsDraft::default().validate(fixed_now()).unwrap();
    let session = GameSession::with_generator(
        config(2).with_speech_lang("en-US"),
        QuestionGenerator::seeded(9),
        settings.difficulty(),
        settings.preferred_mode(),
    );
    let mut flow = services.game_flow(session, &settings, speech.clone(), speech.clone());

    flow.start().await.expect("question");
    flow.play_current_number().await;
    assert_eq!(*speech.langs.lock().unwrap(), vec!["en-US", "en-US"]);
}
