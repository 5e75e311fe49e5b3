use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use services::{ReadingAssessment, ReadingAttempt};

use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AnalyzeRequest {
    audio_base64: String,
    expected_text: String,
    mime_type: Option<String>,
}

pub(super) async fn analyze(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AnalyzeRequest>,
) -> Result<Json<ReadingAssessment>, ApiError> {
    let attempt = ReadingAttempt {
        audio_base64: &body.audio_base64,
        expected_text: body.expected_text.trim(),
        mime_type: body.mime_type.as_deref().filter(|m| !m.trim().is_empty()),
    };
    if !attempt.has_valid_audio() {
        return Err(ApiError::bad_request("audioBase64 must be base64-encoded audio"));
    }
    if attempt.expected_text.is_empty() {
        return Err(ApiError::bad_request("expectedText is required"));
    }

    Ok(Json(state.services.reading().analyze(&attempt).await))
}
