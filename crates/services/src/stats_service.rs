use tracing::{info, warn};

use drill_core::config::STATS_KEY;
use drill_core::model::{CumulativeStats, SessionStats};
use storage::JsonStore;
use storage::records::CumulativeStatsRecord;
use storage::repository::StorageError;

use crate::Clock;

/// Lifetime totals across finished sessions.
///
/// The session flow is the single writer: one read-modify-write per
/// finished session.
#[derive(Clone)]
pub struct StatsService {
    clock: Clock,
    store: JsonStore,
}

impl StatsService {
    #[must_use]
    pub fn new(clock: Clock, store: JsonStore) -> Self {
        Self { clock, store }
    }

    /// Load cumulative stats, or empty totals if missing or unreadable.
    pub async fn load(&self) -> CumulativeStats {
        match self.read().await {
            Ok(stats) => stats,
            Err(err) => {
                warn!(error = %err, "failed to read stats, showing zero");
                CumulativeStats::empty_at(self.clock.now())
            }
        }
    }

    /// Fold a finished session into the stored totals.
    ///
    /// Returns the merged totals and whether they were written. When the
    /// stored totals cannot be read, nothing is written so a transient
    /// failure cannot replace them.
    pub async fn merge_session(&self, session: &SessionStats) -> (CumulativeStats, bool) {
        let now = self.clock.now();
        let current = match self.read().await {
            Ok(stats) => stats,
            Err(err) => {
                warn!(error = %err, "failed to read stats, session not merged");
                return (CumulativeStats::empty_at(now).merge_session(session, now), false);
            }
        };
        let merged = current.merge_session(session, now);
        let stored = self
            .store
            .set(STATS_KEY, &CumulativeStatsRecord::from_stats(&merged))
            .await;
        if stored {
            info!(
                sessions_played = merged.sessions_played,
                total_score = merged.total_score,
                "cumulative stats updated"
            );
        }
        (merged, stored)
    }

    /// Stored totals. Missing, corrupt or invalid values count as zero;
    /// store failures are returned.
    async fn read(&self) -> Result<CumulativeStats, StorageError> {
        let record = match self.store.try_get::<CumulativeStatsRecord>(STATS_KEY).await {
            Ok(Some(record)) => record,
            Ok(None) => return Ok(CumulativeStats::empty_at(self.clock.now())),
            Err(StorageError::Serialization(err)) => {
                warn!(error = %err, "stored stats are unreadable, starting from zero");
                return Ok(CumulativeStats::empty_at(self.clock.now()));
            }
            Err(err) => return Err(err),
        };
        Ok(record.into_stats().unwrap_or_else(|err| {
            warn!(error = %err, "stored stats are invalid, starting from zero");
            CumulativeStats::empty_at(self.clock.now())
        }))
    }

    /// Clear the stored totals.
    pub async fn reset(&self) -> bool {
        self.store.remove(STATS_KEY).await
    }
}
