use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{
    jwt::{create_token, TokenResponse},
    middleware::AuthUser,
    password::{hash_password, verify_password},
};
use crate::error::{AppError, AppResult};
use crate::models::user::{Gender, User, UserProfile};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub sport: Option<String>,
    #[validate(range(min = 1, max = 120, message = "Age must be between 1 and 120"))]
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub wellness_goals: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub sport: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub wellness_goals: Option<Vec<String>>,
}

/// Emails are stored trimmed and lowercased so uniqueness and login lookups
/// are case-insensitive.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<TokenResponse>)> {
    body.validate()?;
    let email = normalize_email(&body.email);

    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(&state.db)
        .await?;

    if existing > 0 {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let pwd_hash = hash_password(&body.password)?;

    let user_id = Uuid::new_v4();
    let result = sqlx::query(
        r#"
        INSERT INTO users (id, email, password_hash, name, sport, age, gender, height, weight, wellness_goals)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(user_id)
    .bind(&email)
    .bind(&pwd_hash)
    .bind(body.name.trim())
    .bind(&body.sport)
    .bind(body.age)
    .bind(body.gender)
    .bind(body.height)
    .bind(body.weight)
    .bind(body.wellness_goals.unwrap_or_default())
    .execute(&state.db)
    .await;

    // The unique index is the authoritative duplicate guard; the COUNT above
    // only produces the friendlier path for the common case.
    match result {
        Ok(_) => {}
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            return Err(AppError::Conflict("Email already registered".into()));
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(user_id = %user_id, "User registered");

    let token = create_token(user_id, &email, &state.config)?;
    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            token,
            expires_in: state.config.jwt_ttl_secs,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let email = normalize_email(&body.email);

    // Unknown email and wrong password produce the same response; the
    // client must not learn which one it was.
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&body.password, &user.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    let token = create_token(user.id, &user.email, &state.config)?;
    Ok(Json(TokenResponse {
        token,
        expires_in: state.config.jwt_ttl_secs,
    }))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<UserProfile>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(auth_user.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    Ok(Json(user.into()))
}

/// Partial update: only fields present in the request are touched. Email and
/// password are not settable through this path.
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> AppResult<Json<UserProfile>> {
    if let Some(name) = &body.name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("Name cannot be empty".into()));
        }
    }
    if let Some(age) = body.age {
        if !(1..=120).contains(&age) {
            return Err(AppError::Validation("Age must be between 1 and 120".into()));
        }
    }

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            name = COALESCE($2, name),
            sport = COALESCE($3, sport),
            age = COALESCE($4, age),
            gender = COALESCE($5, gender),
            height = COALESCE($6, height),
            weight = COALESCE($7, weight),
            wellness_goals = COALESCE($8, wellness_goals),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(auth_user.id)
    .bind(&body.name)
    .bind(&body.sport)
    .bind(body.age)
    .bind(body.gender)
    .bind(body.height)
    .bind(body.weight)
    .bind(&body.wellness_goals)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("User not found".into()))?;

    tracing::info!(user_id = %user.id, "Profile updated");
    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  A@X.Com "), "a@x.com");
        assert_eq!(normalize_email("a@x.com"), "a@x.com");
    }

    #[test]
    fn test_register_rejects_short_password() {
        let req = RegisterRequest {
            email: "a@x.com".into(),
            password: "short".into(),
            name: "A".into(),
            sport: None,
            age: None,
            gender: None,
            height: None,
            weight: None,
            wellness_goals: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_register_rejects_malformed_email() {
        let req = RegisterRequest {
            email: "not-an-email".into(),
            password: "longenough".into(),
            name: "A".into(),
            sport: None,
            age: None,
            gender: None,
            height: None,
            weight: None,
            wellness_goals: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_register_accepts_minimal_valid_request() {
        let req = RegisterRequest {
            email: "a@x.com".into(),
            password: "longenough".into(),
            name: "A".into(),
            sport: None,
            age: None,
            gender: None,
            height: None,
            weight: None,
            wellness_goals: None,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_profile_request_cannot_name_password() {
        // A client smuggling a password field gets it silently dropped.
        let body = serde_json::json!({ "name": "B", "password": "newpass123" });
        let req: UpdateProfileRequest = serde_json::from_value(body).unwrap();
        assert_eq!(req.name.as_deref(), Some("B"));
    }
}
