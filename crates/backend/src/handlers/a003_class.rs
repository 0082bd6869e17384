use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a003_class::aggregate::{ClassRecord, CreateClassDto};
use contracts::domain::a004_user::aggregate::Role;

use crate::domain::a003_class::repository;
use crate::shared::app_state::AppState;
use crate::shared::error::ApiError;
use crate::system::auth::extractor::{require_role, school_of, CurrentSession};
use crate::usecases::u504_provision;

/// GET /api/classes
pub async fn list(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<Vec<ClassRecord>>, ApiError> {
    require_role(&session, &[Role::SchoolAdmin, Role::Teacher])?;
    let classes = repository::list_by_school(&state.db, school_of(&session)?).await?;
    Ok(Json(classes))
}

/// POST /api/classes
pub async fn create(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(dto): Json<CreateClassDto>,
) -> Result<(StatusCode, Json<ClassRecord>), ApiError> {
    require_role(&session, &[Role::SchoolAdmin])?;
    let record = u504_provision::create_class(&state.db, school_of(&session)?, dto).await?;
    Ok((StatusCode::CREATED, Json(record)))
}
