use axum::Json;
use axum::extract::{Path, State};
use axum::response::Redirect;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{ApiError, ApiJson, ApiQuery};
use crate::state::AppState;

pub(super) async fn redirect(
    State(state): State<AppState>,
    Path(recording_id): Path<String>,
) -> Result<Redirect, ApiError> {
    let url = state.services.recordings().playback_url(&recording_id)?;
    Ok(Redirect::temporary(url.as_str()))
}

pub(super) async fn delete_link(
    State(state): State<AppState>,
    Path(recording_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .services
        .recordings()
        .delete_link(&recording_id)
        .await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LinkQuery {
    recording_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LinkView {
    recording_id: String,
    url: Option<String>,
}

pub(super) async fn get_link(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LinkQuery>,
) -> Result<Json<LinkView>, ApiError> {
    let recording_id = query
        .recording_id
        .ok_or_else(|| ApiError::bad_request("Recording ID is required"))?;
    let link = state.services.recordings().link(&recording_id).await?;
    Ok(Json(LinkView {
        url: link.map(|l| l.url().to_string()),
        recording_id,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SaveLinkRequest {
    recording_id: String,
    url: String,
}

pub(super) async fn save_link(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SaveLinkRequest>,
) -> Result<Json<LinkView>, ApiError> {
    let link = state
        .services
        .recordings()
        .save_link(&body.recording_id, &body.url)
        .await?;
    Ok(Json(LinkView {
        recording_id: link.recording_id().to_string(),
        url: Some(link.url().to_string()),
    }))
}
