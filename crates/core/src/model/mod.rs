mod answer;
mod ids;
mod question;
mod settings;
mod stats;
mod summary;

pub use ids::{DifficultyId, ParseIdError, SessionId};

pub use answer::{Answer, AnswerMode, AnswerRecord, ParseModeError};
pub use question::Question;
pub use settings::{CumulativeStats, SettingsError, UserSettings, UserSettingsDraft, VoiceParams};
pub use stats::{ComboState, SessionStats};
pub use summary::{SessionSummary, SessionSummaryError};
