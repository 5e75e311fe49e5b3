use chrono::Utc;
use literacy_core::model::{RecordingId, RecordingLink};

use super::SqliteRepository;
use super::mapping::{conn, map_recording_row};
use crate::repository::{RecordingRepository, StorageError};

#[async_trait::async_trait]
impl RecordingRepository for SqliteRepository {
    async fn save_link(&self, link: &RecordingLink) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO recordings (recording_id, url, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(recording_id) DO UPDATE SET
                url = excluded.url,
                updated_at = excluded.updated_at
            ",
        )
        .bind(link.recording_id().as_str())
        .bind(link.url().as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn get_link(&self, id: &RecordingId) -> Result<Option<RecordingLink>, StorageError> {
        let row = sqlx::query("SELECT recording_id, url FROM recordings WHERE recording_id = ?1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_recording_row).transpose()
    }

    async fn delete_link(&self, id: &RecordingId) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM recordings WHERE recording_id = ?1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
