use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::request::Parts,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::db::User;
use crate::error::AppError;
use crate::services::auth::AuthService;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/logout", post(logout))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub created_at: NaiveDateTime,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: UserResponse,
}

// ============================================================================
// Handlers
// ============================================================================

/// Register a new account and issue a token right away
async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CredentialsRequest>,
) -> Result<(http::StatusCode, Json<AuthResponse>), AppError> {
    let (user, token) = AuthService::register(&state, &request.username, &request.password).await?;

    Ok((
        http::StatusCode::CREATED,
        Json(AuthResponse {
            access_token: token,
            token_type: "Bearer".to_string(),
            user: user.into(),
        }),
    ))
}

/// Exchange credentials for a token
async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let (user, token) = AuthService::login(&state, &request.username, &request.password).await?;

    Ok(Json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        user: user.into(),
    }))
}

/// Get current user info
async fn me(
    State(_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    Ok(Json(user.into()))
}

/// Logout - invalidate session
async fn logout(State(_state): State<Arc<AppState>>) -> Result<Json<serde_json::Value>, AppError> {
    // Auth uses stateless JWTs, so there is no server-side session to clear.
    // The endpoint exists so the frontend can call it without 404s and gives
    // a place to implement server-side invalidation later if needed.
    Ok(Json(serde_json::json!({ "message": "Logged out" })))
}

// ============================================================================
// Extractor
// ============================================================================

pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // Extract Authorization header (Bearer token)
        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                tracing::debug!("Missing or invalid Authorization header");
                AppError::Unauthorized
            })?;

        if !auth_header.to_ascii_lowercase().starts_with("bearer ") {
            tracing::debug!("Authorization header doesn't start with 'Bearer '");
            return Err(AppError::Unauthorized);
        }

        let token = auth_header[7..].trim();
        if token.is_empty() {
            tracing::debug!("Empty bearer token in Authorization header");
            return Err(AppError::Unauthorized);
        }

        let user = AuthService::get_user_from_token(state, token)
            .await
            .map_err(|e| {
                tracing::debug!("Failed to get user from token: {:?}", e);
                e
            })?;

        tracing::debug!("Authenticated user: {}", user.id);
        Ok(AuthUser(user))
    }
}
