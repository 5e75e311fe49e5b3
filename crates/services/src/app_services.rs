use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::account_service::AccountService;
use crate::error::AppServicesError;
use crate::leaderboard_service::{DEFAULT_LEADERBOARD_LIMIT, LeaderboardService};
use crate::progress_service::ProgressService;
use crate::reading_service::{ReadingConfig, ReadingService};
use crate::recording_service::{RecordingConfig, RecordingService};

/// Settings for the services that are not tied to a storage backend.
#[derive(Clone, Debug)]
pub struct ServicesConfig {
    pub leaderboard_limit: u32,
    pub recording: RecordingConfig,
    pub reading: Option<ReadingConfig>,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
            recording: RecordingConfig::default(),
            reading: None,
        }
    }
}

impl ServicesConfig {
    /// Recording host and reading assessment settings from the environment.
    #[must_use]
    pub fn from_env(leaderboard_limit: u32) -> Self {
        Self {
            leaderboard_limit,
            recording: RecordingConfig::from_env(),
            reading: ReadingConfig::from_env(),
        }
    }
}

/// Assembles the app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    progress: Arc<ProgressService>,
    leaderboard: Arc<LeaderboardService>,
    accounts: Arc<AccountService>,
    recordings: Arc<RecordingService>,
    reading: Arc<ReadingService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        config: ServicesConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, config))
    }

    /// Build services over in-memory storage.
    #[must_use]
    pub fn in_memory(clock: Clock, config: ServicesConfig) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, config)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, config: ServicesConfig) -> Self {
        let leaderboard = LeaderboardService::new(clock, Arc::clone(&storage.leaderboard))
            .with_limit(config.leaderboard_limit);
        let progress = Arc::new(ProgressService::new(
            clock,
            Arc::clone(&storage.progress),
            leaderboard.clone(),
        ));
        let accounts = Arc::new(AccountService::new(Arc::clone(&storage.users)));
        let recordings = Arc::new(RecordingService::new(
            config.recording,
            Arc::clone(&storage.recordings),
        ));
        let reading = Arc::new(ReadingService::new(config.reading));

        Self {
            progress,
            leaderboard: Arc::new(leaderboard),
            accounts,
            recordings,
            reading,
        }
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn leaderboard(&self) -> Arc<LeaderboardService> {
        Arc::clone(&self.leaderboard)
    }

    #[must_use]
    pub fn accounts(&self) -> Arc<AccountService> {
        Arc::clone(&self.accounts)
    }

    #[must_use]
    pub fn recordings(&self) -> Arc<RecordingService> {
        Arc::clone(&self.recordings)
    }

    #[must_use]
    pub fn reading(&self) -> Arc<ReadingService> {
        Arc::clone(&self.reading)
    }
}
