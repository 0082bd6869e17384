use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a004_user::aggregate::{CreateUserDto, Role, UserListQuery, UserRecord};
use contracts::usecases::u504_provision::ProvisionedUser;

use crate::domain::a004_user::repository;
use crate::shared::app_state::AppState;
use crate::shared::error::ApiError;
use crate::system::auth::extractor::{require_role, school_of, CurrentSession};
use crate::usecases::u504_provision;

/// `?role=` filter; absent or empty means every role
pub fn parse_role_filter(query: &UserListQuery) -> Result<Option<Role>, ApiError> {
    match query.role.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse::<Role>().map(Some).map_err(ApiError::BadRequest),
    }
}

/// GET /api/users
pub async fn list(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Vec<UserRecord>>, ApiError> {
    require_role(&session, &[Role::SchoolAdmin])?;
    let role = parse_role_filter(&query)?;
    let users = repository::list_by_school(&state.db, school_of(&session)?, role).await?;
    Ok(Json(users))
}

/// POST /api/users
pub async fn create(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(dto): Json<CreateUserDto>,
) -> Result<(StatusCode, Json<ProvisionedUser>), ApiError> {
    require_role(&session, &[Role::SchoolAdmin])?;
    let provisioned = u504_provision::create_user(&state.db, school_of(&session)?, dto).await?;
    Ok((StatusCode::CREATED, Json(provisioned)))
}
