use chrono::NaiveDate;
use contracts::domain::a006_habit_log::aggregate::{HabitLog, HabitLogId};
use contracts::domain::common::EntityMetadata;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use sea_orm::entity::prelude::*;

use sea_orm::{ConnectionTrait, QueryOrder, Select, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a006_habit_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub school_name: String,
    pub date: NaiveDate,
    pub class_name: String,
    pub student_id: String,
    pub student_name: String,
    pub completed_count: i32,
    /// JSON object: habit name -> done
    pub habits: String,
    pub notes: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for HabitLog {
    fn from(m: Model) -> Self {
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());
        let habits: BTreeMap<String, bool> = serde_json::from_str(&m.habits).unwrap_or_else(|e| {
            tracing::warn!("Habit log {} has unreadable habits: {}", m.id, e);
            BTreeMap::new()
        });
        HabitLog {
            id: HabitLogId(uuid),
            school_name: m.school_name,
            date: m.date,
            class_name: m.class_name,
            student_id: m.student_id,
            student_name: m.student_name,
            completed_count: m.completed_count.max(0) as u32,
            habits,
            notes: m.notes,
            metadata: EntityMetadata {
                created_at: m.created_at,
                updated_at: m.created_at,
            },
        }
    }
}

fn with_class(query: Select<Entity>, class_name: Option<&str>) -> Select<Entity> {
    match class_name {
        Some(class_name) => query.filter(Column::ClassName.eq(class_name)),
        None => query,
    }
}

pub async fn insert<C: ConnectionTrait>(db: &C, log: &HabitLog) -> anyhow::Result<Uuid> {
    let uuid = log.id.value();
    let active = ActiveModel {
        id: Set(uuid.to_string()),
        school_name: Set(log.school_name.clone()),
        date: Set(log.date),
        class_name: Set(log.class_name.clone()),
        student_id: Set(log.student_id.clone()),
        student_name: Set(log.student_name.clone()),
        completed_count: Set(log.completed_count as i32),
        habits: Set(serde_json::to_string(&log.habits)?),
        notes: Set(log.notes.clone()),
        created_at: Set(log.metadata.created_at),
    };
    active.insert(db).await?;
    Ok(uuid)
}

pub async fn list_by_date<C: ConnectionTrait>(
    db: &C,
    school_name: &str,
    date: NaiveDate,
    class_name: Option<&str>,
) -> anyhow::Result<Vec<HabitLog>> {
    let query = Entity::find()
        .filter(Column::SchoolName.eq(school_name))
        .filter(Column::Date.eq(date));
    let items = with_class(query, class_name)
        .order_by_asc(Column::StudentName)
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// Inclusive date range
pub async fn list_by_range<C: ConnectionTrait>(
    db: &C,
    school_name: &str,
    from: NaiveDate,
    to: NaiveDate,
    class_name: Option<&str>,
) -> anyhow::Result<Vec<HabitLog>> {
    let query = Entity::find()
        .filter(Column::SchoolName.eq(school_name))
        .filter(Column::Date.gte(from))
        .filter(Column::Date.lte(to));
    let items = with_class(query, class_name)
        .order_by_asc(Column::Date)
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// Latest log of one student on one day
pub async fn find_detail<C: ConnectionTrait>(
    db: &C,
    school_name: &str,
    student_id: &str,
    date: NaiveDate,
) -> anyhow::Result<Option<HabitLog>> {
    let result = Entity::find()
        .filter(Column::SchoolName.eq(school_name))
        .filter(Column::StudentId.eq(student_id))
        .filter(Column::Date.eq(date))
        .order_by_desc(Column::CreatedAt)
        .one(db)
        .await?;
    Ok(result.map(Into::into))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;
    use contracts::domain::a006_habit_log::aggregate::HabitLogDto;

    fn log(day: u32, class_name: &str, student: &str) -> HabitLog {
        let mut habits = BTreeMap::new();
        habits.insert("Bangun Pagi".to_string(), true);
        habits.insert("Membaca".to_string(), day % 2 == 0);
        HabitLog::new_for_insert(
            "SD 1".into(),
            HabitLogDto {
                date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
                class_name: class_name.into(),
                student_id: student.into(),
                student_name: student.to_uppercase(),
                habits,
                notes: None,
            },
        )
    }

    #[tokio::test]
    async fn test_date_and_range_queries() {
        let db = connect_in_memory().await;
        insert(&db, &log(1, "1A", "ani")).await.unwrap();
        insert(&db, &log(2, "1A", "ani")).await.unwrap();
        insert(&db, &log(2, "1B", "budi")).await.unwrap();
        insert(&db, &log(10, "1A", "ani")).await.unwrap();

        let day2 = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        assert_eq!(list_by_date(&db, "SD 1", day2, None).await.unwrap().len(), 2);
        assert_eq!(
            list_by_date(&db, "SD 1", day2, Some("1B")).await.unwrap().len(),
            1
        );

        let from = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let ranged = list_by_range(&db, "SD 1", from, to, Some("1A")).await.unwrap();
        assert_eq!(ranged.len(), 2);

        let detail = find_detail(&db, "SD 1", "ani", day2).await.unwrap().unwrap();
        assert_eq!(detail.completed_count, 2);
        assert_eq!(detail.habits.len(), 2);
        assert!(find_detail(&db, "SD 2", "ani", day2).await.unwrap().is_none());
    }
}
