use contracts::domain::a001_package::{lookup, PackageNotFound};
use contracts::domain::a002_school::aggregate::School;
use contracts::domain::a004_user::aggregate::{Profile, UserRecord};
use contracts::usecases::u502_register_school::{RegistrationRequest, RegistrationResponse};
use sea_orm::{DatabaseConnection, TransactionTrait};
use thiserror::Error;

use crate::domain::a002_school::repository as school_repository;
use crate::domain::a004_user::repository as user_repository;
use crate::shared::codes::generate_access_code;
use crate::shared::data::db::is_unique_violation_any;
use crate::system::auth::password::hash_access_code;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid package type")]
    UnknownPackage(#[source] PackageNotFound),

    #[error("Sekolah '{0}' sudah terdaftar")]
    SchoolTaken(String),

    #[error("Email '{0}' sudah terdaftar")]
    EmailTaken(String),

    #[error("Failed to save registration: {0}")]
    Persistence(anyhow::Error),
}

/// Creates an unpaid school and its school admin account in one transaction
pub async fn register(
    db: &DatabaseConnection,
    request: RegistrationRequest,
) -> Result<RegistrationResponse, RegistrationError> {
    if request.name.trim().is_empty()
        || request.email.trim().is_empty()
        || request.school.trim().is_empty()
        || request.package_type.is_empty()
    {
        return Err(RegistrationError::Validation("Missing required fields".into()));
    }
    let package = lookup(&request.package_type).map_err(RegistrationError::UnknownPackage)?;

    let school = School::new_for_insert(request.school, request.email.clone(), package.id);
    school.validate().map_err(RegistrationError::Validation)?;

    let admin = UserRecord::new_for_insert(
        Some(school.school_name.clone()),
        request.name,
        request.email,
        None,
        Profile::SchoolAdmin,
    );
    admin.validate().map_err(RegistrationError::Validation)?;

    let access_code = generate_access_code();
    let hash = hash_access_code(&access_code).map_err(RegistrationError::Persistence)?;

    let txn = db
        .begin()
        .await
        .map_err(|e| RegistrationError::Persistence(e.into()))?;
    if let Err(e) = school_repository::insert(&txn, &school).await {
        return Err(if is_unique_violation_any(&e) {
            RegistrationError::SchoolTaken(school.school_name.clone())
        } else {
            RegistrationError::Persistence(e)
        });
    }
    if let Err(e) = user_repository::insert(&txn, &admin, &hash).await {
        return Err(if is_unique_violation_any(&e) {
            RegistrationError::EmailTaken(admin.email.clone())
        } else {
            RegistrationError::Persistence(e)
        });
    }
    txn.commit()
        .await
        .map_err(|e| RegistrationError::Persistence(e.into()))?;

    tracing::info!(
        "Registered school '{}' on package {} (admin {})",
        school.school_name,
        package.id,
        admin.email
    );

    Ok(RegistrationResponse {
        user_id: admin.id.to_string(),
        school_name: school.school_name,
        package: package.id,
        price: package.price,
        payment_status: school.payment_status,
        access_code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;
    use crate::system::auth::password::verify_access_code;
    use contracts::domain::a001_package::PackageId;
    use contracts::domain::a002_school::aggregate::PaymentStatus;

    fn request(school: &str, email: &str, package: &str) -> RegistrationRequest {
        RegistrationRequest {
            name: "Bu Sari".into(),
            email: email.into(),
            school: school.into(),
            package_type: package.into(),
        }
    }

    #[tokio::test]
    async fn test_register_creates_unpaid_school_and_admin() {
        let db = connect_in_memory().await;
        let response = register(&db, request("SD Negeri 1", "sari@sdn1.id", "kelas"))
            .await
            .unwrap();
        assert_eq!(response.package, PackageId::Kelas);
        assert_eq!(response.price, 100_000);
        assert_eq!(response.payment_status, PaymentStatus::Unpaid);
        assert_eq!(response.access_code.len(), 8);

        let school = school_repository::get_by_name(&db, "SD Negeri 1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(school.admin_email, "sari@sdn1.id");

        let (admin, hash) = user_repository::get_by_email_with_hash(&db, "sari@sdn1.id")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.profile, Profile::SchoolAdmin);
        assert!(verify_access_code(&response.access_code, &hash).unwrap());
    }

    #[tokio::test]
    async fn test_unknown_package_is_rejected() {
        let db = connect_in_memory().await;
        let err = register(&db, request("SD 1", "a@b.id", "premium"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::UnknownPackage(_)));
        assert!(school_repository::list_all(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicates_roll_back() {
        let db = connect_in_memory().await;
        register(&db, request("SD 1", "a@b.id", "siswa")).await.unwrap();

        let err = register(&db, request("SD 1", "c@d.id", "siswa")).await.unwrap_err();
        assert!(matches!(err, RegistrationError::SchoolTaken(_)));

        let err = register(&db, request("SD 2", "A@B.id", "siswa")).await.unwrap_err();
        assert!(matches!(err, RegistrationError::EmailTaken(_)));
        assert!(school_repository::get_by_name(&db, "SD 2")
            .await
            .unwrap()
            .is_none());
    }
}
