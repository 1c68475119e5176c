use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub task_id: String,
    /// Free-text author label, not verified against the session identity.
    pub author: String,
    pub content: String,
    pub created_at: NaiveDateTime,
}
