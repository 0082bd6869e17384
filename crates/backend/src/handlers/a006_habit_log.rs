use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a004_user::aggregate::Role;
use contracts::domain::a006_habit_log::aggregate::{HabitLog, HabitLogDto};

use crate::domain::a006_habit_log::service;
use crate::shared::app_state::AppState;
use crate::shared::error::ApiError;
use crate::system::auth::extractor::{require_role, school_of, CurrentSession};

/// POST /api/habit-logs
pub async fn create(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(dto): Json<HabitLogDto>,
) -> Result<(StatusCode, Json<HabitLog>), ApiError> {
    require_role(&session, &[Role::Student, Role::Teacher])?;
    // Students only record their own day
    if session.role == Role::Student && dto.student_id != session.user_id {
        return Err(ApiError::Forbidden);
    }

    let school_name = school_of(&session)?;
    let dto = service::resolve_student(&state.db, school_name, dto)
        .await?
        .ok_or_else(|| ApiError::NotFound("Siswa tidak ditemukan".into()))?;

    let log = service::prepare(school_name, dto).map_err(ApiError::BadRequest)?;
    service::save(&state.db, &log).await?;
    Ok((StatusCode::CREATED, Json(log)))
}
