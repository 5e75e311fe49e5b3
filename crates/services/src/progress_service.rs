use std::sync::Arc;

use literacy_core::accumulator::{AppliedCompletion, CompleteLesson, apply_completion};
use literacy_core::model::{LearnerId, LearnerProgress, Username};
use rand::Rng;
use storage::repository::ProgressRepository;
use tracing::{info, warn};

use crate::Clock;
use crate::error::ProgressServiceError;
use crate::leaderboard_service::LeaderboardService;

/// Runs completion events through the accumulator and persists the result.
///
/// Saves happen inline and never fail the call; leaderboard pushes are
/// detached.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
    leaderboard: LeaderboardService,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        clock: Clock,
        progress: Arc<dyn ProgressRepository>,
        leaderboard: LeaderboardService,
    ) -> Self {
        Self {
            clock,
            progress,
            leaderboard,
        }
    }

    /// Stored progress for a learner, or a fresh record on first access.
    ///
    /// A fresh record, or a stored one without a name, gets a random `Bé NNN`
    /// name that is saved right away so it stays stable across requests.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the stored record cannot be read.
    pub async fn load(&self, learner: &LearnerId) -> Result<LearnerProgress, ProgressServiceError> {
        if let Some(mut progress) = self.progress.load_progress(learner).await? {
            if progress.ensure_username(placeholder_seed()) {
                info!(
                    learner = %learner,
                    username = progress.username(),
                    "assigned placeholder username"
                );
                self.persist(learner, &progress).await;
            }
            return Ok(progress);
        }

        let fresh =
            LearnerProgress::new(Username::placeholder(placeholder_seed()), self.clock.now());
        info!(learner = %learner, username = fresh.username(), "created learner progress");
        self.persist(learner, &fresh).await;
        Ok(fresh)
    }

    /// Applies one completion event for a learner.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the current state cannot be loaded.
    pub async fn complete_lesson(
        &self,
        learner: &LearnerId,
        event: &CompleteLesson,
    ) -> Result<AppliedCompletion, ProgressServiceError> {
        let state = self.load(learner).await?;
        let applied = apply_completion(&state, event, self.clock.now());

        info!(
            learner = %learner,
            lesson = %event.lesson_id,
            new_lesson = applied.is_new_lesson,
            earned = applied.points.total(),
            unlocked = applied.newly_unlocked.len(),
            "lesson completed"
        );

        self.persist(learner, &applied.progress).await;
        self.sync_leaderboard(learner, &applied.progress);
        Ok(applied)
    }

    /// Replaces the learner's display name.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Username` if the name is blank or too
    /// long, or `Storage` if the current state cannot be loaded.
    pub async fn set_username(
        &self,
        learner: &LearnerId,
        raw: &str,
    ) -> Result<LearnerProgress, ProgressServiceError> {
        let username = Username::parse(raw)?;
        let mut progress = self.load(learner).await?;
        progress.set_username(username);

        self.persist(learner, &progress).await;
        self.sync_leaderboard(learner, &progress);
        Ok(progress)
    }

    async fn persist(&self, learner: &LearnerId, progress: &LearnerProgress) {
        if let Err(e) = self.progress.save_progress(learner, progress).await {
            warn!(learner = %learner, error = %e, "failed to save learner progress");
        }
    }

    fn sync_leaderboard(&self, learner: &LearnerId, progress: &LearnerProgress) {
        if progress.points() > 0 {
            let _ = self.leaderboard.sync_detached(learner.clone(), progress);
        }
    }
}

fn placeholder_seed() -> u16 {
    rand::rng().random_range(0..1000)
}
