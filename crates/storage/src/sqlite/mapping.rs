use literacy_core::model::{
    LeaderboardEntry, LearnerId, LearnerProgress, RecordingId, RecordingLink, Role, User, UserId,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Maps a failed write, turning unique-key violations into `Conflict`.
pub(crate) fn write_error(e: sqlx::Error) -> StorageError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
        _ => conn(e),
    }
}

pub(crate) fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn u64_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn progress_to_document(progress: &LearnerProgress) -> Result<String, StorageError> {
    serde_json::to_string(progress).map_err(ser)
}

pub(crate) fn progress_from_document(doc: &str) -> Result<LearnerProgress, StorageError> {
    serde_json::from_str(doc).map_err(ser)
}

pub(crate) fn map_leaderboard_row(row: &SqliteRow) -> Result<LeaderboardEntry, StorageError> {
    let learner_id = LearnerId::parse(row.try_get::<String, _>("learner_id").map_err(ser)?)
        .map_err(ser)?;
    let lessons: i64 = row.try_get("lessons_completed").map_err(ser)?;
    let lessons_completed = u32::try_from(lessons)
        .map_err(|_| StorageError::Serialization(format!("invalid lessons_completed: {lessons}")))?;

    Ok(LeaderboardEntry {
        learner_id,
        username: row.try_get("username").map_err(ser)?,
        points: i64_to_u64("points", row.try_get("points").map_err(ser)?)?,
        lessons_completed,
    })
}

pub(crate) fn map_user_row(row: &SqliteRow) -> Result<User, StorageError> {
    let id: String = row.try_get("id").map_err(ser)?;
    let role: String = row.try_get("role").map_err(ser)?;

    Ok(User::from_persisted(
        id.parse::<UserId>().map_err(ser)?,
        row.try_get("username").map_err(ser)?,
        row.try_get("password").map_err(ser)?,
        row.try_get("full_name").map_err(ser)?,
        Role::parse(&role).map_err(ser)?,
        row.try_get("class_id").map_err(ser)?,
    ))
}

pub(crate) fn map_recording_row(row: &SqliteRow) -> Result<RecordingLink, StorageError> {
    let id = RecordingId::parse(row.try_get::<String, _>("recording_id").map_err(ser)?)
        .map_err(ser)?;
    let url: String = row.try_get("url").map_err(ser)?;
    RecordingLink::new(id, &url).map_err(ser)
}
