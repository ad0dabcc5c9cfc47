#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod session;
pub mod settings_service;
pub mod speech;
pub mod stats_service;

pub use drill_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, SpeechError};
pub use session::{
    AnswerOutcome, FeedbackTimer, GameFlow, GamePhase, GameSession, ProceedOutcome,
    SessionProgress, SessionSummaryListItem, SessionSummaryService,
};
pub use settings_service::SettingsService;
pub use speech::{FeedbackCue, SilentSpeech, SpeechInput, SpeechOutput};
pub use stats_service::StatsService;
