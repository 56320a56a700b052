use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One mood entry per (user, UTC calendar day), enforced by the unique index
/// on (user_id, entry_date). `created_at` is set on first insert for a day
/// and never touched by later same-day writes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MoodEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entry_date: NaiveDate,
    pub mood: MoodKind,
    pub reason: String,
    pub sleep: i32,
    pub physical: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Closed set of mood labels. Anything else is rejected at deserialization,
/// before the store is touched.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq)]
#[sqlx(type_name = "mood_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MoodKind {
    Excited,
    Happy,
    Neutral,
    Sad,
    Angry,
}

#[derive(Debug, Deserialize)]
pub struct UpsertMoodRequest {
    pub mood: MoodKind,
    pub reason: Option<String>,
    pub sleep: Option<i32>,
    pub physical: Option<i32>,
}
