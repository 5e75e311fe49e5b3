use async_trait::async_trait;
use chrono::{DateTime, Utc};
use literacy_core::model::{
    LeaderboardEntry, LearnerId, LearnerProgress, RecordingId, RecordingLink, Role, User,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persistence gateway for learner progress documents.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the stored progress for a learner, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or the document is malformed.
    async fn load_progress(
        &self,
        learner: &LearnerId,
    ) -> Result<Option<LearnerProgress>, StorageError>;

    /// Replace the stored progress for a learner.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be written.
    async fn save_progress(
        &self,
        learner: &LearnerId,
        progress: &LearnerProgress,
    ) -> Result<(), StorageError>;
}

/// Shared ranking store.
#[async_trait]
pub trait LeaderboardRepository: Send + Sync {
    /// Insert or merge a row: `points` and `lessons_completed` keep the larger
    /// of stored and incoming, `username` takes the incoming value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be written.
    async fn upsert_max(
        &self,
        entry: &LeaderboardEntry,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Highest-ranked rows by points, ties broken by learner id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn top(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, StorageError>;

    /// Number of rows in the board.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn count(&self) -> Result<u64, StorageError>;
}

/// Account storage.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the username is taken.
    async fn insert_user(&self, user: &User) -> Result<(), StorageError>;

    /// Insert several accounts at once; nothing is written if any username is taken.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` on a duplicate username.
    async fn insert_users(&self, users: &[User]) -> Result<(), StorageError>;

    /// Look an account up by its login name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StorageError>;

    /// Accounts of a class with the given role, ordered by username.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn list_class(
        &self,
        class_id: &str,
        role: Role,
        limit: u32,
    ) -> Result<Vec<User>, StorageError>;
}

/// Hosted audio recordings.
#[async_trait]
pub trait RecordingRepository: Send + Sync {
    /// Remember (or replace) where a recording is hosted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the link cannot be written.
    async fn save_link(&self, link: &RecordingLink) -> Result<(), StorageError>;

    /// Fetch the hosted location of a recording.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn get_link(&self, id: &RecordingId) -> Result<Option<RecordingLink>, StorageError>;

    /// Forget a hosted recording.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no link is stored for `id`.
    async fn delete_link(&self, id: &RecordingId) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY ADAPTER ─────────────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Progress is kept as serialized JSON documents so this adapter exercises
/// the same document contract a remote document store would.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    progress: Arc<Mutex<HashMap<LearnerId, String>>>,
    leaderboard: Arc<Mutex<HashMap<LearnerId, LeaderboardEntry>>>,
    users: Arc<Mutex<HashMap<String, User>>>,
    recordings: Arc<Mutex<HashMap<RecordingId, RecordingLink>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e| StorageError::Connection(e.to_string()))
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load_progress(
        &self,
        learner: &LearnerId,
    ) -> Result<Option<LearnerProgress>, StorageError> {
        let guard = lock(&self.progress)?;
        guard
            .get(learner)
            .map(|doc| {
                serde_json::from_str(doc).map_err(|e| StorageError::Serialization(e.to_string()))
            })
            .transpose()
    }

    async fn save_progress(
        &self,
        learner: &LearnerId,
        progress: &LearnerProgress,
    ) -> Result<(), StorageError> {
        let doc = serde_json::to_string(progress)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        lock(&self.progress)?.insert(learner.clone(), doc);
        Ok(())
    }
}

#[async_trait]
impl LeaderboardRepository for InMemoryRepository {
    async fn upsert_max(
        &self,
        entry: &LeaderboardEntry,
        _at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = lock(&self.leaderboard)?;
        let merged = match guard.get(&entry.learner_id) {
            Some(existing) => existing.merged_with(entry),
            None => entry.clone(),
        };
        guard.insert(entry.learner_id.clone(), merged);
        Ok(())
    }

    async fn top(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, StorageError> {
        let guard = lock(&self.leaderboard)?;
        let mut rows: Vec<LeaderboardEntry> = guard.values().cloned().collect();
        rows.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then_with(|| a.learner_id.cmp(&b.learner_id))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }

    async fn count(&self) -> Result<u64, StorageError> {
        let guard = lock(&self.leaderboard)?;
        Ok(u64::try_from(guard.len()).unwrap_or(u64::MAX))
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn insert_user(&self, user: &User) -> Result<(), StorageError> {
        self.insert_users(std::slice::from_ref(user)).await
    }

    async fn insert_users(&self, users: &[User]) -> Result<(), StorageError> {
        let mut guard = lock(&self.users)?;
        let mut seen = std::collections::HashSet::new();
        for user in users {
            if guard.contains_key(user.username()) || !seen.insert(user.username()) {
                return Err(StorageError::Conflict);
            }
        }
        for user in users {
            guard.insert(user.username().to_string(), user.clone());
        }
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        Ok(lock(&self.users)?.get(username).cloned())
    }

    async fn list_class(
        &self,
        class_id: &str,
        role: Role,
        limit: u32,
    ) -> Result<Vec<User>, StorageError> {
        let guard = lock(&self.users)?;
        let mut found: Vec<User> = guard
            .values()
            .filter(|u| u.class_id() == class_id && u.role() == role)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.username().cmp(b.username()));
        found.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(found)
    }
}

#[async_trait]
impl RecordingRepository for InMemoryRepository {
    async fn save_link(&self, link: &RecordingLink) -> Result<(), StorageError> {
        lock(&self.recordings)?.insert(link.recording_id().clone(), link.clone());
        Ok(())
    }

    async fn get_link(&self, id: &RecordingId) -> Result<Option<RecordingLink>, StorageError> {
        Ok(lock(&self.recordings)?.get(id).cloned())
    }

    async fn delete_link(&self, id: &RecordingId) -> Result<(), StorageError> {
        lock(&self.recordings)?
            .remove(id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub leaderboard: Arc<dyn LeaderboardRepository>,
    pub users: Arc<dyn UserRepository>,
    pub recordings: Arc<dyn RecordingRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    /// Wire every repository to the same backing adapter.
    #[must_use]
    pub fn from_repository<R>(repo: R) -> Self
    where
        R: ProgressRepository
            + LeaderboardRepository
            + UserRepository
            + RecordingRepository
            + Clone
            + 'static,
    {
        Self {
            progress: Arc::new(repo.clone()),
            leaderboard: Arc::new(repo.clone()),
            users: Arc::new(repo.clone()),
            recordings: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use literacy_core::model::{NewUser, UserId, Username};
    use literacy_core::time::fixed_now;

    fn learner(id: &str) -> LearnerId {
        LearnerId::parse(id).unwrap()
    }

    fn entry(id: &str, name: &str, points: u64, lessons: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            learner_id: learner(id),
            username: name.into(),
            points,
            lessons_completed: lessons,
        }
    }

    #[tokio::test]
    async fn progress_round_trips_as_document() {
        let repo = InMemoryRepository::new();
        let progress = LearnerProgress::new(Username::placeholder(3), fixed_now());

        assert!(repo.load_progress(&learner("a")).await.unwrap().is_none());
        repo.save_progress(&learner("a"), &progress).await.unwrap();
        let loaded = repo.load_progress(&learner("a")).await.unwrap().unwrap();
        assert_eq!(loaded, progress);
    }

    #[tokio::test]
    async fn leaderboard_keeps_maxima_and_orders_by_points() {
        let repo = InMemoryRepository::new();
        repo.upsert_max(&entry("a", "Bé Na", 300, 3), fixed_now()).await.unwrap();
        repo.upsert_max(&entry("b", "Bé Tí", 500, 2), fixed_now()).await.unwrap();
        repo.upsert_max(&entry("a", "Na", 100, 4), fixed_now()).await.unwrap();

        let top = repo.top(10).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].learner_id, learner("b"));
        assert_eq!(top[1].points, 300);
        assert_eq!(top[1].lessons_completed, 4);
        assert_eq!(top[1].username, "Na");
        assert_eq!(repo.count().await.unwrap(), 2);
        assert_eq!(repo.top(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_usernames_conflict() {
        let repo = InMemoryRepository::new();
        let user = NewUser {
            username: "hs01".into(),
            full_name: "Hà Tâm An".into(),
            ..NewUser::default()
        }
        .validate(UserId::random())
        .unwrap();

        repo.insert_user(&user).await.unwrap();
        let dup = NewUser {
            username: "hs01".into(),
            full_name: "Other".into(),
            ..NewUser::default()
        }
        .validate(UserId::random())
        .unwrap();
        assert!(matches!(
            repo.insert_user(&dup).await,
            Err(StorageError::Conflict)
        ));

        let listed = repo.list_class("1A3", Role::Student, 50).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].full_name(), "Hà Tâm An");
    }

    #[tokio::test]
    async fn deleting_a_recording_link_forgets_it() {
        let repo = InMemoryRepository::new();
        let id = RecordingId::parse("samples/bai1").unwrap();
        let link = RecordingLink::new(id.clone(), "https://cdn.example.com/bai1.webm").unwrap();

        repo.save_link(&link).await.unwrap();
        repo.delete_link(&id).await.unwrap();
        assert!(repo.get_link(&id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete_link(&id).await,
            Err(StorageError::NotFound)
        ));
    }
}
