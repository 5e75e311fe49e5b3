use axum::Json;
use axum::extract::State;
use literacy_core::accumulator::CompleteLesson;
use literacy_core::ledger::PointsEarned;
use literacy_core::model::{
    BadgeId, LearnerId, LearnerProgress, LessonId, PartResult, ProgressSummary,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiJson, ApiQuery};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProgressQuery {
    user_id: Option<String>,
}

#[derive(Serialize)]
pub(super) struct ProgressView {
    #[serde(flatten)]
    progress: LearnerProgress,
    summary: ProgressSummary,
}

impl From<LearnerProgress> for ProgressView {
    fn from(progress: LearnerProgress) -> Self {
        let summary = progress.summary();
        Self { progress, summary }
    }
}

fn learner_id(raw: Option<&str>) -> Result<LearnerId, ApiError> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => Ok(LearnerId::parse(raw)?),
        _ => Err(ApiError::bad_request("userId is required")),
    }
}

pub(super) async fn get_progress(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProgressQuery>,
) -> Result<Json<ProgressView>, ApiError> {
    let learner = learner_id(query.user_id.as_deref())?;
    let progress = state.services.progress().load(&learner).await?;
    Ok(Json(progress.into()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CompleteRequest {
    user_id: Option<String>,
    lesson_id: String,
    part: Option<String>,
    part_index: Option<u32>,
    score: Option<serde_json::Number>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CompleteResponse {
    progress: ProgressView,
    points_earned: PointsEarned,
    newly_unlocked: Vec<BadgeId>,
    is_new_lesson: bool,
}

pub(super) async fn complete_lesson(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CompleteRequest>,
) -> Result<Json<CompleteResponse>, ApiError> {
    let learner = learner_id(body.user_id.as_deref())?;
    let lesson = LessonId::parse(body.lesson_id)?;
    let score = body
        .score
        .map(|n| {
            n.as_i64()
                .ok_or_else(|| ApiError::bad_request("score must be a whole number from 0 to 100"))
        })
        .transpose()?;
    let result = PartResult::from_raw(body.part.as_deref(), body.part_index, score)?;

    let applied = state
        .services
        .progress()
        .complete_lesson(&learner, &CompleteLesson::new(lesson, result))
        .await?;

    Ok(Json(CompleteResponse {
        progress: applied.progress.into(),
        points_earned: applied.points,
        newly_unlocked: applied.newly_unlocked,
        is_new_lesson: applied.is_new_lesson,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UsernameRequest {
    user_id: Option<String>,
    username: String,
}

pub(super) async fn set_username(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UsernameRequest>,
) -> Result<Json<ProgressView>, ApiError> {
    let learner = learner_id(body.user_id.as_deref())?;
    let progress = state
        .services
        .progress()
        .set_username(&learner, &body.username)
        .await?;
    Ok(Json(progress.into()))
}
