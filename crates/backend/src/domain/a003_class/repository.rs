use contracts::domain::a003_class::aggregate::{ClassId, ClassRecord};
use contracts::domain::common::EntityMetadata;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;

use sea_orm::{ConnectionTrait, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a003_class")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub school_name: String,
    pub name: String,
    pub capacity: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ClassRecord {
    fn from(m: Model) -> Self {
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());
        ClassRecord {
            id: ClassId(uuid),
            school_name: m.school_name,
            name: m.name,
            capacity: m.capacity.max(0) as u32,
            metadata: EntityMetadata {
                created_at: m.created_at,
                updated_at: m.created_at,
            },
        }
    }
}

/// Fails with a UNIQUE violation when the school already has a class of that name
pub async fn insert<C: ConnectionTrait>(db: &C, aggregate: &ClassRecord) -> anyhow::Result<Uuid> {
    let uuid = aggregate.id.value();
    let active = ActiveModel {
        id: Set(uuid.to_string()),
        school_name: Set(aggregate.school_name.clone()),
        name: Set(aggregate.name.clone()),
        capacity: Set(aggregate.capacity as i32),
        created_at: Set(aggregate.metadata.created_at),
    };
    active.insert(db).await?;
    Ok(uuid)
}

pub async fn list_by_school<C: ConnectionTrait>(
    db: &C,
    school_name: &str,
) -> anyhow::Result<Vec<ClassRecord>> {
    let items = Entity::find()
        .filter(Column::SchoolName.eq(school_name))
        .order_by_asc(Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_name<C: ConnectionTrait>(
    db: &C,
    school_name: &str,
    name: &str,
) -> anyhow::Result<Option<ClassRecord>> {
    let result = Entity::find()
        .filter(Column::SchoolName.eq(school_name))
        .filter(Column::Name.eq(name))
        .one(db)
        .await?;
    Ok(result.map(Into::into))
}

pub async fn count_by_school<C: ConnectionTrait>(db: &C, school_name: &str) -> anyhow::Result<u64> {
    let count = Entity::find()
        .filter(Column::SchoolName.eq(school_name))
        .count(db)
        .await?;
    Ok(count)
}

pub async fn list_all<C: ConnectionTrait>(db: &C) -> anyhow::Result<Vec<ClassRecord>> {
    let items = Entity::find()
        .order_by_asc(Column::SchoolName)
        .order_by_asc(Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}
