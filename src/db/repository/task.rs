use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::Task;
use crate::error::{AppError, AppResult};

// ============================================================================
// Task Repository
// ============================================================================

/// Passive task store. Performs no authorization checks; the task service
/// decides who may call what.
pub struct TaskRepository;

impl TaskRepository {
    pub async fn create(
        pool: &SqlitePool,
        owner_id: &str,
        title: &str,
        description: Option<&str>,
        status: &str,
        priority: i64,
        assignee: Option<&str>,
    ) -> AppResult<Task> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();

        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (
                id, owner_id, title, description, status, priority, assignee,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING
                id, owner_id, title, description, status, priority, assignee,
                created_at, updated_at
            "#,
        )
        .bind(&id)
        .bind(owner_id)
        .bind(title)
        .bind(description)
        .bind(status)
        .bind(priority)
        .bind(assignee)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(AppError::Database)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> AppResult<Option<Task>> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT
                id, owner_id, title, description, status, priority, assignee,
                created_at, updated_at
            FROM tasks
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)
    }

    pub async fn list_by_owner(pool: &SqlitePool, owner_id: &str) -> AppResult<Vec<Task>> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT
                id, owner_id, title, description, status, priority, assignee,
                created_at, updated_at
            FROM tasks
            WHERE owner_id = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)
    }

    /// Write the full field set of a task. The caller is responsible for
    /// computing the final values (merging permitted updates over the stored
    /// row). Returns `None` when the task no longer exists.
    pub async fn update_fields(
        pool: &SqlitePool,
        task_id: &str,
        title: &str,
        description: Option<&str>,
        status: &str,
        priority: i64,
        assignee: Option<&str>,
    ) -> AppResult<Option<Task>> {
        let now = Utc::now().naive_utc();

        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET
                title = ?,
                description = ?,
                status = ?,
                priority = ?,
                assignee = ?,
                updated_at = ?
            WHERE id = ?
            RETURNING
                id, owner_id, title, description, status, priority, assignee,
                created_at, updated_at
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(status)
        .bind(priority)
        .bind(assignee)
        .bind(now)
        .bind(task_id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)
    }

    /// Delete a task together with its comments and shares, atomically.
    pub async fn delete_cascade(pool: &SqlitePool, task_id: &str) -> AppResult<()> {
        let mut tx = pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("DELETE FROM comments WHERE task_id = ?")
            .bind(task_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        sqlx::query("DELETE FROM task_shares WHERE task_id = ?")
            .bind(task_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(task_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;

        Ok(())
    }
}
