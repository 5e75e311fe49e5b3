use std::sync::Arc;

use literacy_core::model::{LeaderboardEntry, LearnerId, LearnerProgress};
use storage::repository::LeaderboardRepository;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::Clock;
use crate::error::LeaderboardServiceError;

/// Rows returned by [`LeaderboardService::top`] when no limit is configured.
pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 10;

/// Largest point total the ranking store can hold.
pub const MAX_POINTS: u64 = i64::MAX.unsigned_abs();

/// Reads and writes the shared ranking store.
#[derive(Clone)]
pub struct LeaderboardService {
    clock: Clock,
    leaderboard: Arc<dyn LeaderboardRepository>,
    limit: u32,
}

impl LeaderboardService {
    #[must_use]
    pub fn new(clock: Clock, leaderboard: Arc<dyn LeaderboardRepository>) -> Self {
        Self {
            clock,
            leaderboard,
            limit: DEFAULT_LEADERBOARD_LIMIT,
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.max(1);
        self
    }

    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Highest-ranked rows, at most the configured limit.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardServiceError::Storage` if the store cannot be read.
    pub async fn top(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardServiceError> {
        Ok(self.leaderboard.top(self.limit).await?)
    }

    /// Validates raw totals and merges them into the board.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardServiceError::Id` for an empty learner id,
    /// `EmptyUsername` for a blank name, `PointsOutOfRange` above
    /// [`MAX_POINTS`], or `Storage` if the write fails.
    pub async fn submit(
        &self,
        learner_id: &str,
        username: &str,
        points: u64,
        lessons_completed: u32,
    ) -> Result<LeaderboardEntry, LeaderboardServiceError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(LeaderboardServiceError::EmptyUsername);
        }
        if points > MAX_POINTS {
            return Err(LeaderboardServiceError::PointsOutOfRange(points));
        }
        let entry = LeaderboardEntry {
            learner_id: LearnerId::parse(learner_id)?,
            username: username.to_string(),
            points,
            lessons_completed,
        };
        self.push(&entry).await?;
        Ok(entry)
    }

    /// Merges one row into the board, keeping the larger counters.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardServiceError::Storage` if the write fails.
    pub async fn push(&self, entry: &LeaderboardEntry) -> Result<(), LeaderboardServiceError> {
        self.leaderboard.upsert_max(entry, self.clock.now()).await?;
        Ok(())
    }

    /// Pushes a learner's totals on a detached task.
    ///
    /// Failures are logged and dropped; there is no retry.
    pub fn sync_detached(&self, learner: LearnerId, progress: &LearnerProgress) -> JoinHandle<()> {
        let entry = LeaderboardEntry::from_progress(learner, progress);
        let service = self.clone();
        tokio::spawn(async move {
            match service.push(&entry).await {
                Ok(()) => debug!(learner = %entry.learner_id, points = entry.points, "leaderboard synced"),
                Err(e) => warn!(learner = %entry.learner_id, error = %e, "leaderboard sync failed"),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use literacy_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    fn service() -> LeaderboardService {
        LeaderboardService::new(fixed_clock(), Arc::new(InMemoryRepository::new())).with_limit(2)
    }

    #[tokio::test]
    async fn submit_validates_before_writing() {
        let svc = service();
        assert!(matches!(
            svc.submit("l1", "  ", 10, 1).await,
            Err(LeaderboardServiceError::EmptyUsername)
        ));
        assert!(matches!(
            svc.submit("", "Bé Na", 10, 1).await,
            Err(LeaderboardServiceError::Id(_))
        ));
        assert!(matches!(
            svc.submit("l1", "Bé Na", MAX_POINTS + 1, 1).await,
            Err(LeaderboardServiceError::PointsOutOfRange(_))
        ));
        assert!(svc.top().await.unwrap().is_empty());

        let entry = svc.submit("l1", " Bé Na ", MAX_POINTS, 1).await.unwrap();
        assert_eq!(entry.username, "Bé Na");
    }

    #[tokio::test]
    async fn top_respects_the_configured_limit() {
        let svc = service();
        for (id, points) in [("a", 100), ("b", 300), ("c", 200)] {
            svc.submit(id, id, points, 1).await.unwrap();
        }
        let top = svc.top().await.unwrap();
        let points: Vec<u64> = top.iter().map(|e| e.points).collect();
        assert_eq!(points, vec![300, 200]);
        assert_eq!(svc.limit(), 2);
    }
}
