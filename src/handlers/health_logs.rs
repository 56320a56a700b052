use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{Datelike, NaiveDate, Utc};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::health_log::{HealthLog, HealthMetrics, MonthQuery, UpsertHealthLogRequest};
use crate::AppState;

fn validate_metrics(body: &UpsertHealthLogRequest) -> AppResult<()> {
    if !(0..=10).contains(&body.fatigue_level) {
        return Err(AppError::Validation(
            "fatigue_level must be between 0 and 10".into(),
        ));
    }
    if !(0.0..=24.0).contains(&body.sleep_hours) {
        return Err(AppError::Validation(
            "sleep_hours must be between 0 and 24".into(),
        ));
    }
    if !(0..=10).contains(&body.sleep_quality) {
        return Err(AppError::Validation(
            "sleep_quality must be between 0 and 10".into(),
        ));
    }
    if !(0..=10).contains(&body.stress) {
        return Err(AppError::Validation("stress must be between 0 and 10".into()));
    }
    Ok(())
}

/// Half-open [start, end) range of a calendar month.
fn month_bounds(year: i32, month: u32) -> AppResult<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::Validation("month must be between 1 and 12".into()))?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| AppError::Validation("year out of range".into()))?;

    Ok((start, end))
}

/// One slot per calendar day of the month, keyed by day-of-month. Days with
/// a record carry its metrics, the rest are null. Always exactly
/// days-in-month entries.
fn fill_month_grid(
    year: i32,
    month: u32,
    logs: &[HealthLog],
) -> AppResult<BTreeMap<u32, Option<HealthMetrics>>> {
    let (start, end) = month_bounds(year, month)?;
    let days_in_month = (end - start).num_days() as u32;

    let mut grid: BTreeMap<u32, Option<HealthMetrics>> =
        (1..=days_in_month).map(|d| (d, None)).collect();

    for log in logs {
        if log.log_date >= start && log.log_date < end {
            grid.insert(log.log_date.day(), Some(HealthMetrics::from(log)));
        }
    }

    Ok(grid)
}

/// Same daily identity rule as mood entries: atomic upsert keyed on
/// (user_id, log_date), `created_at` fixed at first write.
pub async fn upsert_health_log(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpsertHealthLogRequest>,
) -> AppResult<Json<HealthLog>> {
    validate_metrics(&body)?;

    let log_date = Utc::now().date_naive();

    let log = sqlx::query_as::<_, HealthLog>(
        r#"
        INSERT INTO health_logs (id, user_id, log_date, fatigue_level, sleep_hours, sleep_quality, stress)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (user_id, log_date) DO UPDATE SET
            fatigue_level = EXCLUDED.fatigue_level,
            sleep_hours = EXCLUDED.sleep_hours,
            sleep_quality = EXCLUDED.sleep_quality,
            stress = EXCLUDED.stress,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(log_date)
    .bind(body.fatigue_level)
    .bind(body.sleep_hours)
    .bind(body.sleep_quality)
    .bind(body.stress)
    .fetch_one(&state.db)
    .await?;

    tracing::debug!(user_id = %auth_user.id, date = %log_date, "Health log saved");
    Ok(Json(log))
}

pub async fn month_grid(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<MonthQuery>,
) -> AppResult<Json<BTreeMap<u32, Option<HealthMetrics>>>> {
    let (start, end) = month_bounds(query.year, query.month)?;

    let logs = sqlx::query_as::<_, HealthLog>(
        r#"
        SELECT * FROM health_logs
        WHERE user_id = $1 AND log_date >= $2 AND log_date < $3
        ORDER BY log_date ASC
        "#,
    )
    .bind(auth_user.id)
    .bind(start)
    .bind(end)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(fill_month_grid(query.year, query.month, &logs)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn log_on(date: NaiveDate, stress: i32) -> HealthLog {
        HealthLog {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            log_date: date,
            fatigue_level: 3,
            sleep_hours: 7.5,
            sleep_quality: 8,
            stress,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn valid_request() -> UpsertHealthLogRequest {
        UpsertHealthLogRequest {
            fatigue_level: 3,
            sleep_hours: 7.5,
            sleep_quality: 8,
            stress: 2,
        }
    }

    // ── validate_metrics ─────────────────────────────────────────────────

    #[test]
    fn test_valid_metrics_accepted() {
        assert!(validate_metrics(&valid_request()).is_ok());
    }

    #[test]
    fn test_out_of_range_metrics_rejected() {
        let mut req = valid_request();
        req.fatigue_level = 11;
        assert!(validate_metrics(&req).is_err());

        let mut req = valid_request();
        req.sleep_hours = 25.0;
        assert!(validate_metrics(&req).is_err());

        let mut req = valid_request();
        req.stress = -1;
        assert!(validate_metrics(&req).is_err());
    }

    // ── month_bounds ─────────────────────────────────────────────────────

    #[test]
    fn test_month_bounds_are_half_open() {
        let (start, end) = month_bounds(2025, 9).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 9, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
    }

    #[test]
    fn test_month_bounds_december_wraps_year() {
        let (start, end) = month_bounds(2025, 12).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    }

    #[test]
    fn test_month_bounds_rejects_month_13() {
        assert!(month_bounds(2025, 13).is_err());
        assert!(month_bounds(2025, 0).is_err());
    }

    // ── fill_month_grid ──────────────────────────────────────────────────

    #[test]
    fn test_leap_year_february_has_29_slots() {
        let grid = fill_month_grid(2024, 2, &[]).unwrap();
        assert_eq!(grid.len(), 29);
        assert!(grid.values().all(Option::is_none));
    }

    #[test]
    fn test_common_february_has_28_slots() {
        let grid = fill_month_grid(2023, 2, &[]).unwrap();
        assert_eq!(grid.len(), 28);
    }

    #[test]
    fn test_thirty_and_thirty_one_day_months() {
        assert_eq!(fill_month_grid(2025, 4, &[]).unwrap().len(), 30);
        assert_eq!(fill_month_grid(2025, 1, &[]).unwrap().len(), 31);
    }

    #[test]
    fn test_records_land_on_their_day() {
        let logs = vec![
            log_on(NaiveDate::from_ymd_opt(2025, 9, 3).unwrap(), 2),
            log_on(NaiveDate::from_ymd_opt(2025, 9, 17).unwrap(), 9),
        ];
        let grid = fill_month_grid(2025, 9, &logs).unwrap();

        assert_eq!(grid.len(), 30);
        assert_eq!(grid[&3].as_ref().unwrap().stress, 2);
        assert_eq!(grid[&17].as_ref().unwrap().stress, 9);
        assert!(grid[&4].is_none());
    }

    #[test]
    fn test_records_outside_month_ignored() {
        let logs = vec![log_on(NaiveDate::from_ymd_opt(2025, 8, 31).unwrap(), 5)];
        let grid = fill_month_grid(2025, 9, &logs).unwrap();
        assert!(grid.values().all(Option::is_none));
    }
}
