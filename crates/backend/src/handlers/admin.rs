//! Super admin views across every school.

use axum::extract::{Path, Query, State};
use axum::Json;
use contracts::domain::a001_package::lookup;
use contracts::domain::a002_school::aggregate::{ChangePackageDto, School};
use contracts::domain::a003_class::aggregate::ClassRecord;
use contracts::domain::a004_user::aggregate::{Role, UserListQuery, UserRecord};
use contracts::domain::a005_voucher::aggregate::Voucher;

use super::a004_user::parse_role_filter;
use crate::domain::a002_school::repository as school_repository;
use crate::domain::a003_class::repository as class_repository;
use crate::domain::a004_user::repository as user_repository;
use crate::domain::a005_voucher::repository as voucher_repository;
use crate::shared::app_state::AppState;
use crate::shared::error::ApiError;
use crate::system::auth::extractor::{require_role, CurrentSession};

/// GET /api/admin/schools
pub async fn list_schools(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<Vec<School>>, ApiError> {
    require_role(&session, &[Role::SuperAdmin])?;
    Ok(Json(school_repository::list_all(&state.db).await?))
}

/// GET /api/admin/classes
pub async fn list_classes(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<Vec<ClassRecord>>, ApiError> {
    require_role(&session, &[Role::SuperAdmin])?;
    Ok(Json(class_repository::list_all(&state.db).await?))
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Vec<UserRecord>>, ApiError> {
    require_role(&session, &[Role::SuperAdmin])?;
    let role = parse_role_filter(&query)?;
    Ok(Json(user_repository::list_by_role(&state.db, role).await?))
}

/// GET /api/admin/vouchers, newest first
pub async fn list_vouchers(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<Vec<Voucher>>, ApiError> {
    require_role(&session, &[Role::SuperAdmin])?;
    Ok(Json(voucher_repository::list_all(&state.db).await?))
}

/// GET /api/admin/vouchers/:code
pub async fn get_voucher(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(code): Path<String>,
) -> Result<Json<Voucher>, ApiError> {
    require_role(&session, &[Role::SuperAdmin])?;
    voucher_repository::get_by_code(&state.db, &code)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Voucher '{}' not found", code)))
}

/// PUT /api/admin/schools/:name/package
pub async fn change_package(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(school_name): Path<String>,
    Json(dto): Json<ChangePackageDto>,
) -> Result<Json<School>, ApiError> {
    require_role(&session, &[Role::SuperAdmin])?;
    let package = lookup(&dto.package_type)
        .map_err(|_| ApiError::BadRequest("Invalid package type".into()))?;

    if !school_repository::set_package(&state.db, &school_name, package.id).await? {
        return Err(ApiError::NotFound(format!(
            "Sekolah '{}' tidak ditemukan",
            school_name
        )));
    }
    tracing::info!("School '{}' moved to package {}", school_name, package.id);

    let school = school_repository::get_by_name(&state.db, &school_name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Sekolah '{}' tidak ditemukan", school_name)))?;
    Ok(Json(school))
}
