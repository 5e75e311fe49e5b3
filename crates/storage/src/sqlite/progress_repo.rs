use literacy_core::model::{LearnerId, LearnerProgress};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, progress_from_document, progress_to_document, ser, u64_to_i64};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load_progress(
        &self,
        learner: &LearnerId,
    ) -> Result<Option<LearnerProgress>, StorageError> {
        let row = sqlx::query("SELECT document FROM learner_progress WHERE learner_id = ?1")
            .bind(learner.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.map(|r| {
            let doc: String = r.try_get("document").map_err(ser)?;
            progress_from_document(&doc)
        })
        .transpose()
    }

    async fn save_progress(
        &self,
        learner: &LearnerId,
        progress: &LearnerProgress,
    ) -> Result<(), StorageError> {
        let document = progress_to_document(progress)?;

        sqlx::query(
            r"
            INSERT INTO learner_progress (learner_id, document, points, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(learner_id) DO UPDATE SET
                document = excluded.document,
                points = excluded.points,
                updated_at = excluded.updated_at
            ",
        )
        .bind(learner.as_str())
        .bind(document)
        .bind(u64_to_i64("points", progress.points())?)
        .bind(progress.last_activity())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
