use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::Comment;
use crate::error::{AppError, AppResult};

// ============================================================================
// Comment Repository
// ============================================================================

pub struct CommentRepository;

impl CommentRepository {
    pub async fn create(
        pool: &SqlitePool,
        task_id: &str,
        author: &str,
        content: &str,
    ) -> AppResult<Comment> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();

        sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, task_id, author, content, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, task_id, author, content, created_at
            "#,
        )
        .bind(&id)
        .bind(task_id)
        .bind(author)
        .bind(content)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(AppError::Database)
    }

    /// Comments for a task, newest first.
    pub async fn list_for_task(pool: &SqlitePool, task_id: &str) -> AppResult<Vec<Comment>> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, task_id, author, content, created_at
            FROM comments
            WHERE task_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)
    }
}
