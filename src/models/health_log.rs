use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One health log per (user, UTC calendar day), same identity rule as mood
/// entries: unique index on (user_id, log_date), immutable `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HealthLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub log_date: NaiveDate,
    pub fatigue_level: i32,
    pub sleep_hours: f64,
    pub sleep_quality: i32,
    pub stress: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpsertHealthLogRequest {
    pub fatigue_level: i32,
    pub sleep_hours: f64,
    pub sleep_quality: i32,
    pub stress: i32,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: i32,
    pub month: u32,
}

/// The metric fields alone, used as the value in the month grid. Day slots
/// with no record serialize as null.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HealthMetrics {
    pub fatigue_level: i32,
    pub sleep_hours: f64,
    pub sleep_quality: i32,
    pub stress: i32,
}

impl From<&HealthLog> for HealthMetrics {
    fn from(log: &HealthLog) -> Self {
        Self {
            fatigue_level: log.fatigue_level,
            sleep_hours: log.sleep_hours,
            sleep_quality: log.sleep_quality,
            stress: log.stress,
        }
    }
}
