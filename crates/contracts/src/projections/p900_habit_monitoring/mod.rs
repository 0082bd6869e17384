//! Habit monitoring views: a daily list and a monthly student x day matrix.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Class filter value meaning "no filter" in the dashboard select
pub const ALL_CLASSES: &str = "Semua Kelas";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyQuery {
    pub date: Option<NaiveDate>,
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyQuery {
    pub year: Option<i32>,
    /// 1..=12
    pub month: Option<u32>,
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailQuery {
    pub student_id: String,
    pub date: NaiveDate,
}

/// Normalizes a class filter: empty or "Semua Kelas" means all classes
pub fn class_filter(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim)
        .filter(|c| !c.is_empty() && *c != ALL_CLASSES)
}

/// Colour band of a daily score, as shown in the dashboard badges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Good,
    Fair,
    Low,
}

impl ScoreBand {
    pub fn for_score(score: u32) -> Self {
        if score >= 6 {
            ScoreBand::Good
        } else if score >= 4 {
            ScoreBand::Fair
        } else {
            ScoreBand::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRow {
    pub student_id: String,
    pub student_name: String,
    pub class_name: String,
    pub score: u32,
    pub band: ScoreBand,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRow {
    pub student_id: String,
    pub student_name: String,
    /// Day of month -> score. Days without a log are absent.
    pub scores: BTreeMap<u32, u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyMatrix {
    pub year: i32,
    pub month: u32,
    pub days_in_month: u32,
    pub rows: Vec<MonthlyRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_band() {
        assert_eq!(ScoreBand::for_score(7), ScoreBand::Good);
        assert_eq!(ScoreBand::for_score(6), ScoreBand::Good);
        assert_eq!(ScoreBand::for_score(5), ScoreBand::Fair);
        assert_eq!(ScoreBand::for_score(4), ScoreBand::Fair);
        assert_eq!(ScoreBand::for_score(0), ScoreBand::Low);
    }

    #[test]
    fn test_class_filter() {
        assert_eq!(class_filter(None), None);
        assert_eq!(class_filter(Some("")), None);
        assert_eq!(class_filter(Some("Semua Kelas")), None);
        assert_eq!(class_filter(Some(" 1A ")), Some("1A"));
    }
}
