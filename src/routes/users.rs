use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::{User, UserRepository};
use crate::error::AppResult;
use crate::routes::auth::AuthUser;
use crate::AppState;

/// Router for user-related endpoints (searching users, e.g. to pick a
/// grantee when sharing a task)
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(search_users))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Query string to search usernames for
    pub q: Option<String>,
    /// Maximum number of results to return
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
}

impl From<User> for UserSummary {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
        }
    }
}

/// Search users by username (case-insensitive substring).
/// Requires authentication. Returns an empty array for empty/too-short queries.
async fn search_users(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<UserSummary>>> {
    let q = query.q.unwrap_or_default().trim().to_string();

    // Avoid performing searches for very short queries
    if q.len() < 2 {
        return Ok(Json(Vec::new()));
    }

    let limit = query.limit.unwrap_or(10).min(50) as i64;

    let users = UserRepository::search(&state.db, &q, limit).await?;
    let res: Vec<UserSummary> = users.into_iter().map(Into::into).collect();

    Ok(Json(res))
}
