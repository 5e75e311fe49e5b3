#![forbid(unsafe_code)]

pub mod account_service;
pub mod app_services;
pub mod error;
pub mod leaderboard_service;
pub mod progress_service;
pub mod reading_service;
pub mod recording_service;

pub use literacy_core::Clock;

pub use account_service::{AccountService, SeedOutcome};
pub use app_services::{AppServices, ServicesConfig};
pub use error::{
    AccountServiceError, AppServicesError, LeaderboardServiceError, ProgressServiceError,
    ReadingError, RecordingServiceError,
};
pub use leaderboard_service::LeaderboardService;
pub use progress_service::ProgressService;
pub use reading_service::{ReadingAssessment, ReadingAttempt, ReadingConfig, ReadingService};
pub use recording_service::{RecordingConfig, RecordingService};
