mod account;
pub mod badge;
mod ids;
mod leaderboard;
mod progress;
mod recording;
pub mod score;

pub use account::{AccountError, DEFAULT_CLASS_ID, NewUser, Role, User};
pub use badge::{Badge, BadgeFacts, BadgeId};
pub use ids::{LearnerId, LessonId, ParseIdError, RecordingId, UserId};
pub use leaderboard::LeaderboardEntry;
pub use progress::{LearnerProgress, ProgressSummary, Username, UsernameError};
pub use recording::{RecordingError, RecordingLink};
pub use score::{LessonScoreBreakdown, PartResult, Score, ScoreError, ScorePart};
