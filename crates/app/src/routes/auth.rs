use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use literacy_core::model::{DEFAULT_CLASS_ID, NewUser, Role, User};
use serde::{Deserialize, Serialize};
use serde_json::json;
use services::SeedOutcome;

use crate::error::{ApiError, ApiJson, ApiQuery};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
pub(super) enum AuthAction {
    Register,
    Login,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AuthRequest {
    action: AuthAction,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    full_name: String,
    role: Option<String>,
    class_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountView {
    id: String,
    username: String,
    full_name: String,
    role: Role,
    class_id: String,
}

impl From<&User> for AccountView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().to_string(),
            full_name: user.full_name().to_string(),
            role: user.role(),
            class_id: user.class_id().to_string(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct StudentView {
    id: String,
    full_name: String,
    username: String,
    role: Role,
}

pub(super) async fn auth_action(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AuthRequest>,
) -> Result<Response, ApiError> {
    let accounts = state.services.accounts();
    match body.action {
        AuthAction::Register => {
            let role = body
                .role
                .as_deref()
                .filter(|r| !r.trim().is_empty())
                .map(Role::parse)
                .transpose()
                .map_err(|e| ApiError::bad_request(e.to_string()))?;
            accounts
                .register(NewUser {
                    username: body.username,
                    password: body.password,
                    full_name: body.full_name,
                    role,
                    class_id: body.class_id,
                })
                .await?;
            Ok((StatusCode::CREATED, Json(json!({ "success": true }))).into_response())
        }
        AuthAction::Login => {
            let user = accounts.login(&body.username, &body.password).await?;
            Ok(Json(json!({ "success": true, "user": AccountView::from(&user) })).into_response())
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ClassQuery {
    class_id: Option<String>,
}

pub(super) async fn list_students(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ClassQuery>,
) -> Result<Json<Vec<StudentView>>, ApiError> {
    let class_id = query
        .class_id
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CLASS_ID.to_string());
    let students = state.services.accounts().list_students(&class_id).await?;
    Ok(Json(
        students
            .iter()
            .map(|u| StudentView {
                id: u.id().to_string(),
                full_name: u.full_name().to_string(),
                username: u.username().to_string(),
                role: u.role(),
            })
            .collect(),
    ))
}

pub(super) async fn seed(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let message = match state.services.accounts().seed_default_class().await? {
        SeedOutcome::Created { .. } => "Admin and Students created successfully",
        SeedOutcome::AlreadySeeded => "Data already exists",
    };
    Ok(Json(json!({ "message": message })))
}
