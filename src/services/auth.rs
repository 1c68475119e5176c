use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::db::{User, UserRepository};
use crate::error::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}

pub struct AuthService;

impl AuthService {
    /// Register a new user. The username must be unique; the password is
    /// stored as a bcrypt hash.
    pub async fn register(
        state: &Arc<AppState>,
        username: &str,
        password: &str,
    ) -> AppResult<(User, String)> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::Validation("Username must not be empty".to_string()));
        }
        if password.is_empty() {
            return Err(AppError::Validation("Password must not be empty".to_string()));
        }

        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        let user = UserRepository::create(&state.db, username, &password_hash).await?;

        tracing::info!("Registered user {}", user.username);

        let token = Self::create_jwt(state, &user.id)?;
        Ok((user, token))
    }

    /// Verify credentials and issue a JWT. Unknown usernames and wrong
    /// passwords produce the same error so login probing reveals nothing.
    pub async fn login(
        state: &Arc<AppState>,
        username: &str,
        password: &str,
    ) -> AppResult<(User, String)> {
        let user = UserRepository::find_by_username(&state.db, username.trim())
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !bcrypt::verify(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        let token = Self::create_jwt(state, &user.id)?;
        Ok((user, token))
    }

    /// Create a signed JWT for a user id
    pub fn create_jwt(state: &Arc<AppState>, user_id: &str) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::hours(state.config.jwt.expiration_hours);
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(state.config.jwt.secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Decode and validate a JWT, returning its claims
    pub fn decode_jwt(state: &Arc<AppState>, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.config.jwt.secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// Resolve a bearer token to the stored user record
    pub async fn get_user_from_token(state: &Arc<AppState>, token: &str) -> AppResult<User> {
        let claims = Self::decode_jwt(state, token)?;
        let user = UserRepository::find_by_id(&state.db, &claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    async fn test_state() -> Arc<AppState> {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        let mut config = Config::default();
        config.jwt.secret = "test-secret".to_string();
        Arc::new(AppState { db: pool, config })
    }

    #[tokio::test]
    async fn register_then_login_roundtrip() {
        let state = test_state().await;

        let (user, _token) = AuthService::register(&state, "alice", "hunter2")
            .await
            .unwrap();
        assert_eq!(user.username, "alice");

        let (logged_in, token) = AuthService::login(&state, "alice", "hunter2")
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);

        let resolved = AuthService::get_user_from_token(&state, &token)
            .await
            .unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let state = test_state().await;

        AuthService::register(&state, "alice", "hunter2")
            .await
            .unwrap();
        let err = AuthService::register(&state, "alice", "other")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn bad_credentials_are_indistinguishable() {
        let state = test_state().await;

        AuthService::register(&state, "alice", "hunter2")
            .await
            .unwrap();

        let wrong_password = AuthService::login(&state, "alice", "nope")
            .await
            .unwrap_err();
        let unknown_user = AuthService::login(&state, "bob", "hunter2")
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AppError::Unauthorized));
        assert!(matches!(unknown_user, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn empty_fields_are_rejected() {
        let state = test_state().await;

        let err = AuthService::register(&state, "  ", "hunter2")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = AuthService::register(&state, "alice", "").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
