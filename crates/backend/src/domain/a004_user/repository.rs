use contracts::domain::a004_user::aggregate::{Profile, Role, UserId, UserRecord};
use contracts::domain::common::EntityMetadata;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;

use sea_orm::{ConnectionTrait, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a004_user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub school_name: Option<String>,
    pub role: String,
    pub name: String,
    pub email: String,
    pub class_ref: Option<String>,
    pub nis: Option<String>,
    pub parent_email: Option<String>,
    pub nip: Option<String>,
    pub phone: Option<String>,
    pub child_nis: Option<String>,
    pub access_code_hash: String,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for UserRecord {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let role = m.role.parse::<Role>().map_err(|e| anyhow::anyhow!(e))?;
        let profile = match role {
            Role::Student => Profile::Student {
                nis: m.nis,
                parent_email: m.parent_email,
            },
            Role::Teacher => Profile::Teacher { nip: m.nip },
            Role::Parent => Profile::Parent {
                phone: m.phone,
                child_nis: m.child_nis,
            },
            Role::SchoolAdmin => Profile::SchoolAdmin,
            Role::SuperAdmin => Profile::SuperAdmin,
        };
        let uuid = Uuid::parse_str(&m.id)?;
        Ok(UserRecord {
            id: UserId(uuid),
            school_name: m.school_name,
            name: m.name,
            email: m.email,
            class_ref: m.class_ref,
            profile,
            metadata: EntityMetadata {
                created_at: m.created_at,
                updated_at: m.updated_at,
            },
        })
    }
}

fn to_aggregates(models: Vec<Model>) -> anyhow::Result<Vec<UserRecord>> {
    models.into_iter().map(UserRecord::try_from).collect()
}

/// Fails with a UNIQUE violation when the email is already registered
pub async fn insert<C: ConnectionTrait>(
    db: &C,
    user: &UserRecord,
    access_code_hash: &str,
) -> anyhow::Result<Uuid> {
    let uuid = user.id.value();
    let (mut nis, mut parent_email, mut nip, mut phone, mut child_nis) =
        (None, None, None, None, None);
    match &user.profile {
        Profile::Student {
            nis: n,
            parent_email: p,
        } => {
            nis = n.clone();
            parent_email = p.clone();
        }
        Profile::Teacher { nip: n } => nip = n.clone(),
        Profile::Parent {
            phone: p,
            child_nis: c,
        } => {
            phone = p.clone();
            child_nis = c.clone();
        }
        Profile::SchoolAdmin | Profile::SuperAdmin => {}
    }
    let active = ActiveModel {
        id: Set(uuid.to_string()),
        school_name: Set(user.school_name.clone()),
        role: Set(user.role().as_str().to_string()),
        name: Set(user.name.clone()),
        email: Set(user.email.clone()),
        class_ref: Set(user.class_ref.clone()),
        nis: Set(nis),
        parent_email: Set(parent_email),
        nip: Set(nip),
        phone: Set(phone),
        child_nis: Set(child_nis),
        access_code_hash: Set(access_code_hash.to_string()),
        status: Set("active".to_string()),
        created_at: Set(user.metadata.created_at),
        updated_at: Set(user.metadata.updated_at),
    };
    active.insert(db).await?;
    Ok(uuid)
}

pub async fn get_by_id<C: ConnectionTrait>(db: &C, id: &str) -> anyhow::Result<Option<UserRecord>> {
    let result = Entity::find_by_id(id.to_string()).one(db).await?;
    result.map(UserRecord::try_from).transpose()
}

/// User plus the stored access code hash, for login
pub async fn get_by_email_with_hash<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> anyhow::Result<Option<(UserRecord, String)>> {
    let result = Entity::find()
        .filter(Column::Email.eq(email.trim().to_lowercase()))
        .filter(Column::Status.eq("active"))
        .one(db)
        .await?;
    match result {
        Some(m) => {
            let hash = m.access_code_hash.clone();
            Ok(Some((UserRecord::try_from(m)?, hash)))
        }
        None => Ok(None),
    }
}

pub async fn list_by_school<C: ConnectionTrait>(
    db: &C,
    school_name: &str,
    role: Option<Role>,
) -> anyhow::Result<Vec<UserRecord>> {
    let mut query = Entity::find().filter(Column::SchoolName.eq(school_name));
    if let Some(role) = role {
        query = query.filter(Column::Role.eq(role.as_str()));
    }
    let models = query.order_by_asc(Column::Name).all(db).await?;
    to_aggregates(models)
}

pub async fn list_by_role<C: ConnectionTrait>(
    db: &C,
    role: Option<Role>,
) -> anyhow::Result<Vec<UserRecord>> {
    let mut query = Entity::find();
    if let Some(role) = role {
        query = query.filter(Column::Role.eq(role.as_str()));
    }
    let models = query
        .order_by_asc(Column::SchoolName)
        .order_by_asc(Column::Name)
        .all(db)
        .await?;
    to_aggregates(models)
}

pub async fn count_by_role<C: ConnectionTrait>(db: &C, role: Role) -> anyhow::Result<u64> {
    let count = Entity::find()
        .filter(Column::Role.eq(role.as_str()))
        .count(db)
        .await?;
    Ok(count)
}
