use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use contracts::usecases::u502_register_school::{RegistrationRequest, RegistrationResponse};

use crate::shared::app_state::AppState;
use crate::shared::error::ApiError;
use crate::usecases::u502_register_school;

/// POST /api/registrations
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegistrationRequest>,
) -> Result<(StatusCode, Json<RegistrationResponse>), ApiError> {
    let response = u502_register_school::register(&state.db, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
