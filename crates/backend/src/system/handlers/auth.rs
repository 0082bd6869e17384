use axum::{extract::State, http::StatusCode, Json};
use contracts::domain::a004_user::aggregate::UserRecord;
use contracts::system::auth::{LoginRequest, LoginResponse};
use serde::Serialize;

use crate::domain::a004_user::repository as user_repository;
use crate::shared::app_state::AppState;
use crate::shared::error::ApiError;
use crate::system::auth::extractor::CurrentSession;
use crate::system::auth::service;

/// Login handler
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if request.email.trim().is_empty() || request.access_code.trim().is_empty() {
        return Err(ApiError::BadRequest("Email dan kode akses wajib diisi".into()));
    }

    service::login(
        &state.db,
        &state.jwt_secret,
        &request.email,
        &request.access_code,
    )
    .await?
    .map(Json)
    .ok_or(ApiError::Unauthorized)
}

/// Logout handler
pub async fn logout(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<StatusCode, ApiError> {
    service::logout(&state.db, &session).await?;
    Ok(StatusCode::OK)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub session: contracts::system::auth::Session,
    pub user: UserRecord,
}

/// Get current user handler
pub async fn current_user(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<MeResponse>, ApiError> {
    let user = user_repository::get_by_id(&state.db, &session.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(MeResponse { session, user }))
}
