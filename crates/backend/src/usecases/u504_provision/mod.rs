//! Class and account provisioning for a school admin session.
//!
//! The policy answers from a snapshot of the school row. The answer is made
//! binding by a conditional counter increment, which is the first statement
//! of the transaction that inserts the record.

use chrono::Utc;
use contracts::domain::a001_package::{
    can_create_class, can_create_user, class_capacity_for, get, Decision, DenyReason, Package,
};
use contracts::domain::a002_school::aggregate::School;
use contracts::domain::a003_class::aggregate::{ClassRecord, CreateClassDto};
use contracts::domain::a004_user::aggregate::{CreateUserDto, Role, UserRecord};
use contracts::usecases::u504_provision::ProvisionedUser;
use rand::Rng;
use sea_orm::{DatabaseConnection, TransactionTrait};
use thiserror::Error;

use crate::domain::a002_school::repository as school_repository;
use crate::domain::a003_class::repository as class_repository;
use crate::domain::a004_user::repository as user_repository;
use crate::shared::codes::generate_access_code;
use crate::shared::data::db::is_unique_violation_any;
use crate::system::auth::password::hash_access_code;

/// Domain of generated student emails
const PLACEHOLDER_EMAIL_DOMAIN: &str = "anakhebat.id";

#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("{0}")]
    Denied(DenyReason),

    #[error("{0}")]
    Validation(String),

    #[error("Sekolah '{0}' tidak ditemukan")]
    SchoolNotFound(String),

    #[error("Role {0} cannot be created from the school dashboard")]
    RoleNotAllowed(Role),

    #[error("{0}")]
    Duplicate(String),

    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}

impl From<sea_orm::DbErr> for ProvisioningError {
    fn from(e: sea_orm::DbErr) -> Self {
        ProvisioningError::Persistence(e.into())
    }
}

async fn load_school(
    db: &DatabaseConnection,
    school_name: &str,
) -> Result<School, ProvisioningError> {
    school_repository::get_by_name(db, school_name)
        .await?
        .ok_or_else(|| ProvisioningError::SchoolNotFound(school_name.to_string()))
}

fn check(decision: Decision) -> Result<(), ProvisioningError> {
    match decision {
        Decision::Allow => Ok(()),
        Decision::Deny { reason } => Err(ProvisioningError::Denied(reason)),
    }
}

// ============================================================================
// Classes
// ============================================================================

pub async fn create_class(
    db: &DatabaseConnection,
    school_name: &str,
    dto: CreateClassDto,
) -> Result<ClassRecord, ProvisioningError> {
    let school = load_school(db, school_name).await?;
    provision_class(db, &school, dto.name).await
}

/// Creates a class against a school snapshot. A stale snapshot cannot
/// overshoot the limit: the counter update re-checks it in storage.
pub async fn provision_class(
    db: &DatabaseConnection,
    school: &School,
    name: String,
) -> Result<ClassRecord, ProvisioningError> {
    let package: &Package = get(school.selected_package);
    check(can_create_class(package, school.class_count))?;

    let record = ClassRecord::new_for_insert(
        school.school_name.clone(),
        name,
        class_capacity_for(package.id),
    );
    record.validate().map_err(ProvisioningError::Validation)?;

    let txn = db.begin().await?;
    let reserved = school_repository::try_increment_class_count(
        &txn,
        &school.school_name,
        package.id,
        package.max_classes,
    )
    .await?;
    if !reserved {
        txn.rollback().await?;
        tracing::info!(
            "Class limit reached for '{}' ({} / {})",
            school.school_name,
            package.id,
            package.max_classes
        );
        return Err(ProvisioningError::Denied(DenyReason::LimitReached {
            package: package.id,
            limit: package.max_classes,
        }));
    }
    if let Err(e) = class_repository::insert(&txn, &record).await {
        txn.rollback().await?;
        return Err(if is_unique_violation_any(&e) {
            ProvisioningError::Duplicate(format!("Kelas '{}' sudah ada", record.name))
        } else {
            ProvisioningError::Persistence(e)
        });
    }
    txn.commit().await?;

    tracing::info!(
        "Created class '{}' (capacity {}) in '{}'",
        record.name,
        record.capacity,
        record.school_name
    );
    Ok(record)
}

// ============================================================================
// Users
// ============================================================================

/// `siswa.<millis><4 digits>@anakhebat.id` style address for students added without email
fn placeholder_email(role: Role) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
    format!(
        "{}.{}{:04}@{}",
        role.placeholder_prefix(),
        Utc::now().timestamp_millis(),
        suffix,
        PLACEHOLDER_EMAIL_DOMAIN
    )
}

pub async fn create_user(
    db: &DatabaseConnection,
    school_name: &str,
    dto: CreateUserDto,
) -> Result<ProvisionedUser, ProvisioningError> {
    let role = dto
        .role
        .parse::<Role>()
        .map_err(ProvisioningError::Validation)?;
    if !role.is_provisionable() {
        return Err(ProvisioningError::RoleNotAllowed(role));
    }
    let school = load_school(db, school_name).await?;
    provision_user(db, &school, role, dto).await
}

pub async fn provision_user(
    db: &DatabaseConnection,
    school: &School,
    role: Role,
    dto: CreateUserDto,
) -> Result<ProvisionedUser, ProvisioningError> {
    let package = get(school.selected_package);
    check(can_create_user(package, school.user_count))?;

    let email = match dto.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        Some(email) => email.to_string(),
        None if role == Role::Student => placeholder_email(role),
        None => return Err(ProvisioningError::Validation("Email wajib diisi".into())),
    };
    let class_ref = match role {
        Role::Student | Role::Teacher => dto.class_ref.clone(),
        _ => None,
    };
    let record = UserRecord::new_for_insert(
        Some(school.school_name.clone()),
        dto.name.clone(),
        email,
        class_ref,
        dto.profile_for(role),
    );
    record.validate().map_err(ProvisioningError::Validation)?;

    if let Some(class_name) = &record.class_ref {
        let exists = class_repository::get_by_name(db, &school.school_name, class_name)
            .await?
            .is_some();
        if !exists {
            return Err(ProvisioningError::Validation(format!(
                "Kelas '{}' tidak ditemukan",
                class_name
            )));
        }
    }

    let access_code = generate_access_code();
    let hash = hash_access_code(&access_code)?;

    let txn = db.begin().await?;
    let reserved = school_repository::try_increment_user_count(
        &txn,
        &school.school_name,
        package.id,
        package.account_quota,
    )
    .await?;
    if !reserved {
        txn.rollback().await?;
        tracing::info!(
            "Account quota reached for '{}' ({} / {})",
            school.school_name,
            package.id,
            package.account_quota
        );
        return Err(ProvisioningError::Denied(DenyReason::QuotaExceeded {
            package: package.id,
            quota: package.account_quota,
        }));
    }
    if let Err(e) = user_repository::insert(&txn, &record, &hash).await {
        txn.rollback().await?;
        return Err(if is_unique_violation_any(&e) {
            ProvisioningError::Duplicate(format!("Email '{}' sudah terdaftar", record.email))
        } else {
            ProvisioningError::Persistence(e)
        });
    }
    txn.commit().await?;

    tracing::info!(
        "{} '{}' added to '{}'",
        role.label(),
        record.name,
        school.school_name
    );
    Ok(ProvisionedUser {
        user: record,
        access_code,
    })
}
