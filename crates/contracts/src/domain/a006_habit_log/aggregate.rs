use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::common::EntityMetadata;

crate::uuid_aggregate_id!(
    /// Identifier of a daily habit log
    HabitLogId
);

/// Habits a student is expected to report each day
pub const TOTAL_HABITS: u32 = 7;

/// One student's habit report for one day
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitLog {
    pub id: HabitLogId,
    pub school_name: String,
    pub date: NaiveDate,
    pub class_name: String,
    pub student_id: String,
    pub student_name: String,
    pub completed_count: u32,
    /// Habit name -> done
    pub habits: BTreeMap<String, bool>,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

impl HabitLog {
    /// `completed_count` is derived from the habit map
    pub fn new_for_insert(
        school_name: String,
        dto: HabitLogDto,
    ) -> Self {
        let completed_count = dto.habits.values().filter(|done| **done).count() as u32;
        Self {
            id: HabitLogId::new_v4(),
            school_name,
            date: dto.date,
            class_name: dto.class_name,
            student_id: dto.student_id,
            student_name: dto.student_name,
            completed_count,
            habits: dto.habits,
            notes: dto.notes.filter(|n| !n.trim().is_empty()),
            metadata: EntityMetadata::new(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.student_id.trim().is_empty() || self.student_name.trim().is_empty() {
            return Err("Student is required".into());
        }
        if self.habits.len() as u32 > TOTAL_HABITS {
            return Err(format!("At most {} habits per day", TOTAL_HABITS));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitLogDto {
    pub date: NaiveDate,
    pub class_name: String,
    pub student_id: String,
    pub student_name: String,
    pub habits: BTreeMap<String, bool>,
    #[serde(default)]
    pub notes: Option<String>,
}
