mod feedback;
mod flow;
mod game;
mod progress;
mod summaries;

// Public API of the game session subsystem.
pub use feedback::FeedbackTimer;
pub use flow::GameFlow;
pub use game::{AnswerOutcome, GamePhase, GameSession, ProceedOutcome};
pub use progress::SessionProgress;
pub use summaries::{SessionSummaryListItem, SessionSummaryService};
