use axum::Json;
use axum::extract::State;
use literacy_core::model::LeaderboardEntry;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

/// Public view of a leaderboard row; learner ids stay private.
///
/// Field names are snake_case, as the dashboard reads them.
#[derive(Serialize)]
pub(super) struct LeaderboardRow {
    username: String,
    points: u64,
    lessons_completed: u32,
}

impl From<LeaderboardEntry> for LeaderboardRow {
    fn from(entry: LeaderboardEntry) -> Self {
        Self {
            username: entry.username,
            points: entry.points,
            lessons_completed: entry.lessons_completed,
        }
    }
}

pub(super) async fn top(
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaderboardRow>>, ApiError> {
    let rows = state.services.leaderboard().top().await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdateRequest {
    learner_id: String,
    username: String,
    #[serde(default)]
    points: u64,
    #[serde(default)]
    lessons_completed: u32,
}

pub(super) async fn update(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UpdateRequest>,
) -> Result<Json<Value>, ApiError> {
    state
        .services
        .leaderboard()
        .submit(
            &body.learner_id,
            &body.username,
            body.points,
            body.lessons_completed,
        )
        .await?;
    Ok(Json(json!({ "success": true })))
}
