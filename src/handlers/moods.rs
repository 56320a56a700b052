use axum::{extract::State, Extension, Json};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::mood::{MoodEntry, UpsertMoodRequest};
use crate::AppState;

const DEFAULT_SCORE: i32 = 5;

fn validate_score(field: &str, value: i32) -> AppResult<()> {
    if !(1..=10).contains(&value) {
        return Err(AppError::Validation(format!(
            "{} must be between 1 and 10",
            field
        )));
    }
    Ok(())
}

/// Daily upsert: the first write on a UTC calendar day creates the entry,
/// later writes on the same day overwrite its fields in place. The unique
/// index on (user_id, entry_date) makes the insert-or-update atomic, so two
/// concurrent writes cannot both create a row.
pub async fn upsert_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpsertMoodRequest>,
) -> AppResult<Json<MoodEntry>> {
    let sleep = body.sleep.unwrap_or(DEFAULT_SCORE);
    let physical = body.physical.unwrap_or(DEFAULT_SCORE);
    validate_score("sleep", sleep)?;
    validate_score("physical", physical)?;

    let entry_date = Utc::now().date_naive();

    let entry = sqlx::query_as::<_, MoodEntry>(
        r#"
        INSERT INTO mood_entries (id, user_id, entry_date, mood, reason, sleep, physical)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (user_id, entry_date) DO UPDATE SET
            mood = EXCLUDED.mood,
            reason = EXCLUDED.reason,
            sleep = EXCLUDED.sleep,
            physical = EXCLUDED.physical,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(entry_date)
    .bind(body.mood)
    .bind(body.reason.as_deref().unwrap_or(""))
    .bind(sleep)
    .bind(physical)
    .fetch_one(&state.db)
    .await?;

    tracing::debug!(user_id = %auth_user.id, date = %entry_date, "Mood entry saved");
    Ok(Json(entry))
}

pub async fn mood_history(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<MoodEntry>>> {
    let entries = sqlx::query_as::<_, MoodEntry>(
        r#"
        SELECT * FROM mood_entries
        WHERE user_id = $1
        ORDER BY entry_date DESC
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(entries))
}
