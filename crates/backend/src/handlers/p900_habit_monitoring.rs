use axum::extract::{Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use contracts::domain::a004_user::aggregate::Role;
use contracts::domain::a006_habit_log::aggregate::HabitLog;
use contracts::projections::p900_habit_monitoring::{
    DailyQuery, DailyRow, DetailQuery, MonthlyMatrix, MonthlyQuery,
};

use crate::projections::p900_habit_monitoring::service;
use crate::shared::app_state::AppState;
use crate::shared::error::ApiError;
use crate::system::auth::extractor::{require_role, school_of, CurrentSession};

const MONITORING_ROLES: &[Role] = &[Role::SchoolAdmin, Role::Teacher];

/// Current date in WIB (UTC+7)
fn today() -> NaiveDate {
    (Utc::now() + chrono::Duration::hours(7)).date_naive()
}

/// GET /api/monitoring/daily
pub async fn daily(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<DailyQuery>,
) -> Result<Json<Vec<DailyRow>>, ApiError> {
    require_role(&session, MONITORING_ROLES)?;
    let rows = service::daily(&state.db, school_of(&session)?, &query, today()).await?;
    Ok(Json(rows))
}

/// GET /api/monitoring/monthly
pub async fn monthly(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<MonthlyQuery>,
) -> Result<Json<MonthlyMatrix>, ApiError> {
    require_role(&session, MONITORING_ROLES)?;
    let (year, month) =
        service::resolve_month(query.year, query.month, today()).map_err(ApiError::BadRequest)?;
    let matrix = service::monthly(
        &state.db,
        school_of(&session)?,
        year,
        month,
        query.class_name.as_deref(),
    )
    .await?;
    Ok(Json(matrix))
}

/// GET /api/monitoring/detail
pub async fn detail(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<DetailQuery>,
) -> Result<Json<HabitLog>, ApiError> {
    require_role(&session, MONITORING_ROLES)?;
    service::detail(&state.db, school_of(&session)?, &query.student_id, query.date)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Belum ada catatan untuk tanggal ini".into()))
}
