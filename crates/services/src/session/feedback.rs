use std::time::Duration;

use tokio::time::Instant;

/// Single pending feedback-display wait.
///
/// Beginning a new wait replaces the pending one instead of stacking, and a
/// wait resolves at most once.
#[derive(Debug, Default)]
pub struct FeedbackTimer {
    deadline: Option<Instant>,
}

impl FeedbackTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the wait.
    pub fn begin(&mut self, duration: Duration) {
        self.deadline = Some(Instant::now() + duration);
    }

    /// Drop the pending wait without waiting.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Wait until the pending deadline, if any, then clear it.
    pub async fn wait(&mut self) {
        if let Some(deadline) = self.deadline.take() {
            tokio::time::sleep_until(deadline).await;
        }
    }
}
