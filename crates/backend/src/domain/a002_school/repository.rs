use chrono::Utc;
use contracts::domain::a001_package::PackageId;
use contracts::domain::a002_school::aggregate::{PaymentStatus, School};
use contracts::domain::common::EntityMetadata;
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;

use sea_orm::{ConnectionTrait, DatabaseBackend, QueryOrder, Set, Statement};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a002_school")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub school_name: String,
    pub admin_email: String,
    pub package_id: String,
    pub payment_status: String,
    pub class_count: i32,
    pub user_count: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for School {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let selected_package = m.package_id.parse::<PackageId>()?;
        Ok(School {
            school_name: m.school_name,
            admin_email: m.admin_email,
            selected_package,
            payment_status: PaymentStatus::from_str_or_unpaid(&m.payment_status),
            class_count: m.class_count.max(0) as u32,
            user_count: m.user_count.max(0) as u32,
            metadata: EntityMetadata {
                created_at: m.created_at,
                updated_at: m.updated_at,
            },
        })
    }
}

fn to_aggregates(models: Vec<Model>) -> anyhow::Result<Vec<School>> {
    models.into_iter().map(School::try_from).collect()
}

pub async fn insert<C: ConnectionTrait>(db: &C, aggregate: &School) -> anyhow::Result<()> {
    let active = ActiveModel {
        school_name: Set(aggregate.school_name.clone()),
        admin_email: Set(aggregate.admin_email.clone()),
        package_id: Set(aggregate.selected_package.as_str().to_string()),
        payment_status: Set(aggregate.payment_status.as_str().to_string()),
        class_count: Set(aggregate.class_count as i32),
        user_count: Set(aggregate.user_count as i32),
        created_at: Set(aggregate.metadata.created_at),
        updated_at: Set(aggregate.metadata.updated_at),
    };
    active.insert(db).await?;
    Ok(())
}

pub async fn get_by_name<C: ConnectionTrait>(
    db: &C,
    school_name: &str,
) -> anyhow::Result<Option<School>> {
    let result = Entity::find_by_id(school_name.to_string()).one(db).await?;
    result.map(School::try_from).transpose()
}

pub async fn find_by_admin_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> anyhow::Result<Option<School>> {
    let result = Entity::find()
        .filter(Column::AdminEmail.eq(email.trim().to_lowercase()))
        .one(db)
        .await?;
    result.map(School::try_from).transpose()
}

pub async fn list_all<C: ConnectionTrait>(db: &C) -> anyhow::Result<Vec<School>> {
    let models = Entity::find()
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?;
    to_aggregates(models)
}

/// unpaid -> paid. Returns false when the school was already paid or does not exist.
pub async fn mark_paid<C: ConnectionTrait>(db: &C, school_name: &str) -> anyhow::Result<bool> {
    let result = db
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "UPDATE a002_school SET payment_status = 'paid', updated_at = ?
             WHERE school_name = ? AND payment_status = 'unpaid'",
            [Utc::now().into(), school_name.into()],
        ))
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Reserves one class slot. Succeeds only while the school still holds
/// `package` and `class_count < limit`; zero rows affected means denied.
pub async fn try_increment_class_count<C: ConnectionTrait>(
    db: &C,
    school_name: &str,
    package: PackageId,
    limit: u32,
) -> anyhow::Result<bool> {
    let result = db
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "UPDATE a002_school SET class_count = class_count + 1, updated_at = ?
             WHERE school_name = ? AND package_id = ? AND class_count < ?",
            [
                Utc::now().into(),
                school_name.into(),
                package.as_str().into(),
                (limit as i64).into(),
            ],
        ))
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Same as [`try_increment_class_count`] for the account quota
pub async fn try_increment_user_count<C: ConnectionTrait>(
    db: &C,
    school_name: &str,
    package: PackageId,
    quota: u32,
) -> anyhow::Result<bool> {
    let result = db
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "UPDATE a002_school SET user_count = user_count + 1, updated_at = ?
             WHERE school_name = ? AND package_id = ? AND user_count < ?",
            [
                Utc::now().into(),
                school_name.into(),
                package.as_str().into(),
                (quota as i64).into(),
            ],
        ))
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Moves a school to another tier. Existing classes keep their stamped capacity.
pub async fn set_package<C: ConnectionTrait>(
    db: &C,
    school_name: &str,
    package: PackageId,
) -> anyhow::Result<bool> {
    let result = db
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "UPDATE a002_school SET package_id = ?, updated_at = ? WHERE school_name = ?",
            [package.as_str().into(), Utc::now().into(), school_name.into()],
        ))
        .await?;
    Ok(result.rows_affected() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;

    async fn seeded(package: PackageId) -> sea_orm::DatabaseConnection {
        let db = connect_in_memory().await;
        let school = School::new_for_insert("SD 1".into(), "tu@sd1.id".into(), package);
        insert(&db, &school).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let db = seeded(PackageId::Angkatan).await;
        let school = get_by_name(&db, "SD 1").await.unwrap().unwrap();
        assert_eq!(school.selected_package, PackageId::Angkatan);
        assert_eq!(school.payment_status, PaymentStatus::Unpaid);
        assert_eq!(school.class_count, 0);

        let by_email = find_by_admin_email(&db, "TU@sd1.id").await.unwrap();
        assert_eq!(by_email.map(|s| s.school_name), Some("SD 1".to_string()));
    }

    #[tokio::test]
    async fn test_class_counter_stops_at_limit() {
        let db = seeded(PackageId::Kelas).await;
        assert!(try_increment_class_count(&db, "SD 1", PackageId::Kelas, 1).await.unwrap());
        assert!(!try_increment_class_count(&db, "SD 1", PackageId::Kelas, 1).await.unwrap());
        let school = get_by_name(&db, "SD 1").await.unwrap().unwrap();
        assert_eq!(school.class_count, 1);
    }

    #[tokio::test]
    async fn test_counter_rejects_stale_package() {
        let db = seeded(PackageId::Kelas).await;
        assert!(set_package(&db, "SD 1", PackageId::Siswa).await.unwrap());
        assert!(!try_increment_user_count(&db, "SD 1", PackageId::Kelas, 40).await.unwrap());
        assert!(try_increment_user_count(&db, "SD 1", PackageId::Siswa, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_mark_paid_once() {
        let db = seeded(PackageId::Siswa).await;
        assert!(mark_paid(&db, "SD 1").await.unwrap());
        assert!(!mark_paid(&db, "SD 1").await.unwrap());
        assert!(get_by_name(&db, "SD 1").await.unwrap().unwrap().is_paid());
    }
}
