use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Token payload. Carries only the user identity — never the password hash
/// or profile fields.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_in: i64,
}

pub fn create_token(user_id: Uuid, email: &str, config: &Config) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: (now + Duration::seconds(config.jwt_ttl_secs)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create token: {}", e)))
}

pub fn verify_token(token: &str, config: &Config) -> AppResult<TokenData<Claims>> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(secret: &str, ttl_secs: i64) -> Config {
        Config {
            database_url: "postgres://localhost/wellpulse".into(),
            host: "127.0.0.1".into(),
            port: 8080,
            frontend_url: "http://localhost:5173".into(),
            jwt_secret: secret.into(),
            jwt_ttl_secs: ttl_secs,
        }
    }

    #[test]
    fn test_token_round_trip() {
        let config = test_config("test-secret", 259_200);
        let user_id = Uuid::new_v4();

        let token = create_token(user_id, "a@x.com", &config).unwrap();
        let data = verify_token(&token, &config).unwrap();

        assert_eq!(data.claims.sub, user_id);
        assert_eq!(data.claims.email, "a@x.com");
        assert_eq!(data.claims.exp - data.claims.iat, 259_200);
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let config = test_config("secret-a", 259_200);
        let other = test_config("secret-b", 259_200);

        let token = create_token(Uuid::new_v4(), "a@x.com", &config).unwrap();
        assert!(matches!(
            verify_token(&token, &other),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Negative TTL puts exp well past the default 60s leeway.
        let config = test_config("test-secret", -3600);

        let token = create_token(Uuid::new_v4(), "a@x.com", &config).unwrap();
        assert!(matches!(
            verify_token(&token, &config),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let config = test_config("test-secret", 259_200);
        assert!(matches!(
            verify_token("not.a.jwt", &config),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_claims_never_carry_password_material() {
        let json = serde_json::to_value(Claims {
            sub: Uuid::new_v4(),
            email: "a@x.com".into(),
            exp: 1,
            iat: 0,
        })
        .unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
    }
}
