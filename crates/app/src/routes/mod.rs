use axum::Router;
use axum::routing::{get, post, put};

use crate::state::AppState;

mod audio;
mod auth;
mod health;
mod leaderboard;
mod progress;
mod reading;

/// All HTTP routes of the service.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/progress", get(progress::get_progress))
        .route("/api/progress/complete", post(progress::complete_lesson))
        .route("/api/progress/username", put(progress::set_username))
        .route("/api/leaderboard", get(leaderboard::top))
        .route("/api/leaderboard/update", post(leaderboard::update))
        .route("/api/auth", get(auth::list_students).post(auth::auth_action))
        .route("/api/auth/seed", post(auth::seed))
        .route("/api/audio", get(audio::get_link).post(audio::save_link))
        .route(
            "/api/audio/*recording_id",
            get(audio::redirect).delete(audio::delete_link),
        )
        .route("/api/reading/analyze", post(reading::analyze))
}
