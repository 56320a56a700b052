use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveTime;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::reminder::{CreateReminderRequest, Reminder, UpdateReminderRequest};
use crate::AppState;

const WEEKDAYS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

fn validate_time(time: &str) -> AppResult<()> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .map(|_| ())
        .map_err(|_| AppError::Validation("Time must be in HH:MM format".into()))
}

fn validate_days(days: &[String]) -> AppResult<()> {
    for day in days {
        if !WEEKDAYS.contains(&day.as_str()) {
            return Err(AppError::Validation(format!("Unknown weekday: {}", day)));
        }
    }
    Ok(())
}

/// Lookup happens before the owner comparison: an absent reminder is
/// NotFound, an existing reminder owned by someone else is Forbidden.
async fn fetch_owned_reminder(db: &PgPool, id: Uuid, user_id: Uuid) -> AppResult<Reminder> {
    let reminder = sqlx::query_as::<_, Reminder>("SELECT * FROM reminders WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound("Reminder not found".into()))?;

    if reminder.user_id != user_id {
        return Err(AppError::Forbidden);
    }
    Ok(reminder)
}

pub async fn list_reminders(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Reminder>>> {
    let reminders = sqlx::query_as::<_, Reminder>(
        r#"
        SELECT * FROM reminders
        WHERE user_id = $1
        ORDER BY time ASC, created_at ASC
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(reminders))
}

pub async fn create_reminder(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateReminderRequest>,
) -> AppResult<(StatusCode, Json<Reminder>)> {
    if body.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".into()));
    }
    validate_time(&body.time)?;
    let days = body.days.unwrap_or_default();
    validate_days(&days)?;

    let reminder = sqlx::query_as::<_, Reminder>(
        r#"
        INSERT INTO reminders (id, user_id, title, time, days, is_active)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.title.trim())
    .bind(&body.time)
    .bind(&days)
    .bind(body.is_active.unwrap_or(true))
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(reminder)))
}

pub async fn update_reminder(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(reminder_id): Path<Uuid>,
    Json(body): Json<UpdateReminderRequest>,
) -> AppResult<Json<Reminder>> {
    fetch_owned_reminder(&state.db, reminder_id, auth_user.id).await?;

    if let Some(title) = &body.title {
        if title.trim().is_empty() {
            return Err(AppError::Validation("Title cannot be empty".into()));
        }
    }
    if let Some(time) = &body.time {
        validate_time(time)?;
    }
    if let Some(days) = &body.days {
        validate_days(days)?;
    }

    let reminder = sqlx::query_as::<_, Reminder>(
        r#"
        UPDATE reminders SET
            title = COALESCE($2, title),
            time = COALESCE($3, time),
            days = COALESCE($4, days),
            is_active = COALESCE($5, is_active),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(reminder_id)
    .bind(&body.title)
    .bind(&body.time)
    .bind(&body.days)
    .bind(body.is_active)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(reminder))
}

pub async fn delete_reminder(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(reminder_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    fetch_owned_reminder(&state.db, reminder_id, auth_user.id).await?;

    sqlx::query("DELETE FROM reminders WHERE id = $1")
        .bind(reminder_id)
        .execute(&state.db)
        .await?;

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Check off a reminder: stamp the completion time so the day of the most
/// recent completion stays recoverable.
pub async fn complete_reminder(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(reminder_id): Path<Uuid>,
) -> AppResult<Json<Reminder>> {
    fetch_owned_reminder(&state.db, reminder_id, auth_user.id).await?;

    let reminder = sqlx::query_as::<_, Reminder>(
        r#"
        UPDATE reminders SET
            last_completed = NOW(),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(reminder_id)
    .fetch_one(&state.db)
    .await?;

    tracing::debug!(user_id = %auth_user.id, reminder_id = %reminder_id, "Reminder completed");
    Ok(Json(reminder))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_format() {
        assert!(validate_time("08:00").is_ok());
        assert!(validate_time("23:59").is_ok());
        assert!(validate_time("24:00").is_err());
        assert!(validate_time("8am").is_err());
        assert!(validate_time("").is_err());
    }

    #[test]
    fn test_days_must_be_known_weekdays() {
        let ok = vec!["mon".to_string(), "fri".to_string()];
        assert!(validate_days(&ok).is_ok());

        assert!(validate_days(&[]).is_ok()); // one-time reminder

        let bad = vec!["monday".to_string()];
        assert!(validate_days(&bad).is_err());
    }

    #[test]
    fn test_update_request_with_no_fields_parses() {
        let req: UpdateReminderRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(req.title.is_none());
        assert!(req.time.is_none());
        assert!(req.days.is_none());
        assert!(req.is_active.is_none());
    }
}
