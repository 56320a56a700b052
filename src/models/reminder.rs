use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reminder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    /// "HH:MM", validated on write.
    pub time: String,
    /// Active weekdays ("mon".."sun"). Empty means one-time.
    pub days: Vec<String>,
    pub is_active: bool,
    /// Timestamp rather than a boolean, so the day of the most recent
    /// check-off is recoverable.
    pub last_completed: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReminderRequest {
    pub title: String,
    pub time: String,
    pub days: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

/// Partial update: each absent field keeps its prior value.
#[derive(Debug, Deserialize)]
pub struct UpdateReminderRequest {
    pub title: Option<String>,
    pub time: Option<String>,
    pub days: Option<Vec<String>>,
    pub is_active: Option<bool>,
}
