use serde::{Deserialize, Serialize};

use crate::model::ids::LearnerId;
use crate::model::progress::LearnerProgress;

/// Totals pushed to the shared ranking store.
///
/// Rows are keyed by `learner_id`; `username` is display-only and follows the
/// learner's latest name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub learner_id: LearnerId,
    pub username: String,
    pub points: u64,
    pub lessons_completed: u32,
}

impl LeaderboardEntry {
    #[must_use]
    pub fn from_progress(learner_id: LearnerId, progress: &LearnerProgress) -> Self {
        Self {
            learner_id,
            username: progress.username().to_string(),
            points: progress.points(),
            lessons_completed: u32::try_from(progress.completed_lessons().len())
                .unwrap_or(u32::MAX),
        }
    }

    /// Combines a stored row with an incoming push: counters never go down,
    /// the name always follows the newest push.
    #[must_use]
    pub fn merged_with(&self, incoming: &LeaderboardEntry) -> Self {
        Self {
            learner_id: self.learner_id.clone(),
            username: incoming.username.clone(),
            points: self.points.max(incoming.points),
            lessons_completed: self.lessons_completed.max(incoming.lessons_completed),
        }
    }
}
