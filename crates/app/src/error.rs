use axum::Json;
use axum::extract::FromRequest;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use literacy_core::model::{ParseIdError, ScoreError};
use serde_json::json;
use services::{
    AccountServiceError, LeaderboardServiceError, ProgressServiceError, RecordingServiceError,
};
use thiserror::Error;
use tracing::error;

/// Errors surfaced to HTTP clients as `{ "error": ... }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    fn internal(e: impl std::fmt::Display) -> Self {
        Self::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Internal(detail) => {
                error!(error = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<ParseIdError> for ApiError {
    fn from(e: ParseIdError) -> Self {
        Self::BadRequest(format!("invalid {}", e.kind()))
    }
}

impl From<ScoreError> for ApiError {
    fn from(e: ScoreError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<ProgressServiceError> for ApiError {
    fn from(e: ProgressServiceError) -> Self {
        match e {
            ProgressServiceError::Username(inner) => Self::BadRequest(inner.to_string()),
            other => Self::internal(other),
        }
    }
}

impl From<LeaderboardServiceError> for ApiError {
    fn from(e: LeaderboardServiceError) -> Self {
        match e {
            e @ (LeaderboardServiceError::EmptyUsername
            | LeaderboardServiceError::PointsOutOfRange(_)) => Self::bad_request(e.to_string()),
            LeaderboardServiceError::Id(inner) => inner.into(),
            other => Self::internal(other),
        }
    }
}

impl From<AccountServiceError> for ApiError {
    fn from(e: AccountServiceError) -> Self {
        match e {
            AccountServiceError::UsernameTaken => Self::bad_request("Tài khoản đã tồn tại"),
            AccountServiceError::InvalidCredentials => {
                Self::Unauthorized("Tên đăng nhập hoặc mật khẩu không đúng".into())
            }
            AccountServiceError::Account(inner) => Self::BadRequest(inner.to_string()),
            other => Self::internal(other),
        }
    }
}

impl From<RecordingServiceError> for ApiError {
    fn from(e: RecordingServiceError) -> Self {
        match e {
            RecordingServiceError::Id(inner) => inner.into(),
            RecordingServiceError::Recording(inner) => Self::BadRequest(inner.to_string()),
            e @ RecordingServiceError::NotFound => Self::NotFound(e.to_string()),
            other => Self::internal(other),
        }
    }
}

/// JSON body extractor whose rejections use the `{ "error": ... }` shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query-string extractor whose rejections use the `{ "error": ... }` shape.
#[derive(axum::extract::FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
