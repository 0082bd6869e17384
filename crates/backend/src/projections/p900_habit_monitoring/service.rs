use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate};
use contracts::domain::a006_habit_log::aggregate::HabitLog;
use contracts::projections::p900_habit_monitoring::{
    class_filter, DailyQuery, DailyRow, MonthlyMatrix, MonthlyRow, ScoreBand,
};
use sea_orm::ConnectionTrait;
use std::collections::HashMap;

use crate::domain::a006_habit_log::repository;

/// Number of days in a calendar month, None for an invalid month
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}

/// Year and month to show; missing parts default to `today`
pub fn resolve_month(
    year: Option<i32>,
    month: Option<u32>,
    today: NaiveDate,
) -> std::result::Result<(i32, u32), String> {
    let year = year.unwrap_or_else(|| today.year());
    let month = month.unwrap_or_else(|| today.month());
    if days_in_month(year, month).is_none() {
        return Err(format!("Invalid month: {}-{}", year, month));
    }
    Ok((year, month))
}

/// Daily list: latest log per student, ordered by name
pub async fn daily<C: ConnectionTrait>(
    db: &C,
    school_name: &str,
    query: &DailyQuery,
    today: NaiveDate,
) -> Result<Vec<DailyRow>> {
    let date = query.date.unwrap_or(today);
    let class_name = class_filter(query.class_name.as_deref());
    let logs = repository::list_by_date(db, school_name, date, class_name).await?;

    // Logs arrive ordered by creation; a later log replaces an earlier one
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut rows: Vec<DailyRow> = Vec::new();
    for log in logs {
        let row = DailyRow {
            student_id: log.student_id.clone(),
            student_name: log.student_name,
            class_name: log.class_name,
            score: log.completed_count,
            band: ScoreBand::for_score(log.completed_count),
            notes: log.notes,
        };
        match index.get(&log.student_id) {
            Some(&i) => rows[i] = row,
            None => {
                index.insert(log.student_id, rows.len());
                rows.push(row);
            }
        }
    }
    rows.sort_by(|a, b| {
        a.student_name
            .to_lowercase()
            .cmp(&b.student_name.to_lowercase())
    });
    Ok(rows)
}

/// Student x day matrix. Rows are keyed by student id so two students
/// sharing a name stay apart.
pub fn build_monthly_matrix(year: i32, month: u32, logs: Vec<HabitLog>) -> MonthlyMatrix {
    let days = days_in_month(year, month).unwrap_or(0);
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut rows: Vec<MonthlyRow> = Vec::new();

    for log in logs {
        if log.date.year() != year || log.date.month() != month {
            continue;
        }
        let i = *index.entry(log.student_id.clone()).or_insert_with(|| {
            rows.push(MonthlyRow {
                student_id: log.student_id.clone(),
                student_name: log.student_name.clone(),
                scores: Default::default(),
            });
            rows.len() - 1
        });
        let row = &mut rows[i];
        row.student_name = log.student_name;
        row.scores.insert(log.date.day(), log.completed_count);
    }

    rows.sort_by(|a, b| {
        a.student_name
            .to_lowercase()
            .cmp(&b.student_name.to_lowercase())
            .then_with(|| a.student_id.cmp(&b.student_id))
    });

    MonthlyMatrix {
        year,
        month,
        days_in_month: days,
        rows,
    }
}

pub async fn monthly<C: ConnectionTrait>(
    db: &C,
    school_name: &str,
    year: i32,
    month: u32,
    class_name: Option<&str>,
) -> Result<MonthlyMatrix> {
    let days = days_in_month(year, month).ok_or_else(|| anyhow!("Invalid month {}-{}", year, month))?;
    let from = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| anyhow!("Invalid month {}-{}", year, month))?;
    let to = NaiveDate::from_ymd_opt(year, month, days)
        .ok_or_else(|| anyhow!("Invalid month {}-{}", year, month))?;

    let logs = repository::list_by_range(db, school_name, from, to, class_filter(class_name)).await?;
    Ok(build_monthly_matrix(year, month, logs))
}

pub async fn detail<C: ConnectionTrait>(
    db: &C,
    school_name: &str,
    student_id: &str,
    date: NaiveDate,
) -> Result<Option<HabitLog>> {
    repository::find_detail(db, school_name, student_id, date).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;
    use contracts::domain::a006_habit_log::aggregate::HabitLogDto;
    use std::collections::BTreeMap;

    fn log(date: NaiveDate, id: &str, name: &str, done: usize) -> HabitLog {
        let habits: BTreeMap<String, bool> = (0..7)
            .map(|i| (format!("habit-{}", i), i < done))
            .collect();
        HabitLog::new_for_insert(
            "SD 1".into(),
            HabitLogDto {
                date,
                class_name: "1A".into(),
                student_id: id.into(),
                student_name: name.into(),
                habits,
                notes: None,
            },
        )
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(2024, 12), Some(31));
        assert_eq!(days_in_month(2024, 4), Some(30));
        assert_eq!(days_in_month(2024, 13), None);
        assert_eq!(days_in_month(2024, 0), None);
    }

    #[test]
    fn test_resolve_month_defaults_to_today() {
        let today = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        assert_eq!(resolve_month(None, None, today), Ok((2024, 7)));
        assert_eq!(resolve_month(Some(2023), Some(2), today), Ok((2023, 2)));
        assert!(resolve_month(None, Some(13), today).is_err());
    }

    #[test]
    fn test_matrix_keeps_same_named_students_apart() {
        let logs = vec![
            log(day(1), "s-1", "Ani", 7),
            log(day(1), "s-2", "Ani", 3),
            log(day(2), "s-1", "Ani", 5),
            log(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), "s-1", "Ani", 1),
        ];
        let matrix = build_monthly_matrix(2024, 2, logs);
        assert_eq!(matrix.days_in_month, 29);
        assert_eq!(matrix.rows.len(), 2);
        let s1 = matrix.rows.iter().find(|r| r.student_id == "s-1").unwrap();
        assert_eq!(s1.scores.get(&1), Some(&7));
        assert_eq!(s1.scores.get(&2), Some(&5));
        assert_eq!(s1.scores.len(), 2);
        let s2 = matrix.rows.iter().find(|r| r.student_id == "s-2").unwrap();
        assert_eq!(s2.scores.get(&1), Some(&3));
    }

    #[tokio::test]
    async fn test_daily_bands_and_filter() {
        let db = connect_in_memory().await;
        repository::insert(&db, &log(day(5), "s-1", "Budi", 6)).await.unwrap();
        repository::insert(&db, &log(day(5), "s-2", "Ani", 2)).await.unwrap();
        let mut other = log(day(5), "s-3", "Citra", 4);
        other.class_name = "1B".into();
        repository::insert(&db, &other).await.unwrap();

        let all = daily(
            &db,
            "SD 1",
            &DailyQuery {
                date: Some(day(5)),
                class_name: Some("Semua Kelas".into()),
            },
            day(20),
        )
        .await
        .unwrap();
        let names: Vec<&str> = all.iter().map(|r| r.student_name.as_str()).collect();
        assert_eq!(names, vec!["Ani", "Budi", "Citra"]);
        assert_eq!(all[0].band, ScoreBand::Low);
        assert_eq!(all[1].band, ScoreBand::Good);
        assert_eq!(all[2].band, ScoreBand::Fair);

        let only_1b = daily(
            &db,
            "SD 1",
            &DailyQuery {
                date: Some(day(5)),
                class_name: Some("1B".into()),
            },
            day(20),
        )
        .await
        .unwrap();
        assert_eq!(only_1b.len(), 1);

        let monthly = monthly(&db, "SD 1", 2024, 2, Some("1A")).await.unwrap();
        assert_eq!(monthly.rows.len(), 2);
        let found = detail(&db, "SD 1", "s-1", day(5)).await.unwrap();
        assert_eq!(found.map(|l| l.completed_count), Some(6));
    }
}
