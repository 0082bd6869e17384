use contracts::domain::a004_user::aggregate::Role;
use contracts::domain::a006_habit_log::aggregate::{HabitLog, HabitLogDto};
use sea_orm::ConnectionTrait;

use super::repository;
use crate::domain::a004_user::repository as user_repository;

/// Looks the student up inside `school_name`. Name and class are taken from
/// the account, not from the request. `None` when no such student exists there.
pub async fn resolve_student<C: ConnectionTrait>(
    db: &C,
    school_name: &str,
    mut dto: HabitLogDto,
) -> anyhow::Result<Option<HabitLogDto>> {
    let Some(student) = user_repository::get_by_id(db, dto.student_id.trim()).await? else {
        return Ok(None);
    };
    if student.role() != Role::Student || student.school_name.as_deref() != Some(school_name) {
        return Ok(None);
    }
    dto.student_name = student.name;
    if let Some(class_name) = student.class_ref {
        dto.class_name = class_name;
    }
    Ok(Some(dto))
}

/// Builds and validates a log for `school_name`
pub fn prepare(school_name: &str, dto: HabitLogDto) -> Result<HabitLog, String> {
    let log = HabitLog::new_for_insert(school_name.to_string(), dto);
    log.validate()?;
    Ok(log)
}

pub async fn save<C: ConnectionTrait>(db: &C, log: &HabitLog) -> anyhow::Result<()> {
    repository::insert(db, log).await?;
    tracing::info!(
        "Habit log {} for {} on {} ({} done)",
        log.id,
        log.student_id,
        log.date,
        log.completed_count
    );
    Ok(())
}
