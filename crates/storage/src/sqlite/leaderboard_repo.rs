use chrono::{DateTime, Utc};
use literacy_core::model::LeaderboardEntry;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, i64_to_u64, map_leaderboard_row, ser, u64_to_i64};
use crate::repository::{LeaderboardRepository, StorageError};

#[async_trait::async_trait]
impl LeaderboardRepository for SqliteRepository {
    async fn upsert_max(
        &self,
        entry: &LeaderboardEntry,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO leaderboard (learner_id, username, points, lessons_completed, last_updated)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(learner_id) DO UPDATE SET
                username = excluded.username,
                points = MAX(leaderboard.points, excluded.points),
                lessons_completed = MAX(leaderboard.lessons_completed, excluded.lessons_completed),
                last_updated = excluded.last_updated
            ",
        )
        .bind(entry.learner_id.as_str())
        .bind(&entry.username)
        .bind(u64_to_i64("points", entry.points)?)
        .bind(i64::from(entry.lessons_completed))
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn top(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT learner_id, username, points, lessons_completed
            FROM leaderboard
            ORDER BY points DESC, learner_id ASC
            LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_leaderboard_row).collect()
    }

    async fn count(&self) -> Result<u64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM leaderboard")
            .fetch_one(&self.pool)
            .await
            .map_err(conn)?;
        i64_to_u64("count", row.try_get("n").map_err(ser)?)
    }
}
