use chrono::Utc;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::db::models::{EffectiveGrant, Task, TaskShare};
use crate::error::{AppError, AppResult};

// ============================================================================
// Task Share Repository
// ============================================================================

/// The sharing ledger. A passive store: it records and returns grants but
/// never checks who is asking — ownership is enforced by the task service
/// before any call lands here.
pub struct TaskShareRepository;

impl TaskShareRepository {
    /// Insert a new grant row. Repeated shares for the same pair add rows;
    /// readers OR-merge them.
    pub async fn create(
        pool: &SqlitePool,
        task_id: &str,
        grantee_user_id: &str,
        can_edit_status: bool,
        can_edit_assignee: bool,
    ) -> AppResult<TaskShare> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();

        sqlx::query_as::<_, TaskShare>(
            r#"
            INSERT INTO task_shares (
                id, task_id, grantee_user_id, can_edit_status, can_edit_assignee, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING
                id, task_id, grantee_user_id, can_edit_status, can_edit_assignee, created_at
            "#,
        )
        .bind(&id)
        .bind(task_id)
        .bind(grantee_user_id)
        .bind(can_edit_status)
        .bind(can_edit_assignee)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(AppError::Database)
    }

    /// Remove all grant rows for the pair. Succeeds silently when there is
    /// nothing to remove (idempotent revoke).
    pub async fn delete(
        pool: &SqlitePool,
        task_id: &str,
        grantee_user_id: &str,
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM task_shares WHERE task_id = ? AND grantee_user_id = ?")
            .bind(task_id)
            .bind(grantee_user_id)
            .execute(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(())
    }

    /// All grant rows for a specific (task, grantee) pair.
    /// [`EffectiveGrant::merge`] turns these into one capability set.
    pub async fn find_for_grantee(
        pool: &SqlitePool,
        task_id: &str,
        grantee_user_id: &str,
    ) -> AppResult<Vec<TaskShare>> {
        sqlx::query_as::<_, TaskShare>(
            r#"
            SELECT id, task_id, grantee_user_id, can_edit_status, can_edit_assignee, created_at
            FROM task_shares
            WHERE task_id = ? AND grantee_user_id = ?
            "#,
        )
        .bind(task_id)
        .bind(grantee_user_id)
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)
    }

    /// All grants on a task with the grantee's username, for the owner's
    /// share management view.
    pub async fn list_for_task(
        pool: &SqlitePool,
        task_id: &str,
    ) -> AppResult<Vec<(TaskShare, String)>> {
        let rows = sqlx::query(
            r#"
            SELECT
                s.id, s.task_id, s.grantee_user_id,
                s.can_edit_status, s.can_edit_assignee, s.created_at,
                u.username AS grantee_username
            FROM task_shares s
            JOIN users u ON u.id = s.grantee_user_id
            WHERE s.task_id = ?
            ORDER BY s.created_at ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            let share = TaskShare {
                id: r.get("id"),
                task_id: r.get("task_id"),
                grantee_user_id: r.get("grantee_user_id"),
                can_edit_status: r.get::<i64, _>("can_edit_status") != 0,
                can_edit_assignee: r.get::<i64, _>("can_edit_assignee") != 0,
                created_at: r.get("created_at"),
            };

            out.push((share, r.get("grantee_username")));
        }

        Ok(out)
    }

    /// Tasks shared to a grantee, each with the merged grant and the owner's
    /// username. Duplicate share rows collapse into one entry per task with
    /// OR-merged capabilities (MAX over the flag columns).
    pub async fn list_tasks_shared_with(
        pool: &SqlitePool,
        grantee_user_id: &str,
    ) -> AppResult<Vec<(Task, EffectiveGrant, String)>> {
        let rows = sqlx::query(
            r#"
            SELECT
                t.id, t.owner_id, t.title, t.description, t.status, t.priority,
                t.assignee, t.created_at, t.updated_at,
                MAX(s.can_edit_status) AS can_edit_status,
                MAX(s.can_edit_assignee) AS can_edit_assignee,
                u.username AS owner_username
            FROM tasks t
            JOIN task_shares s ON s.task_id = t.id
            JOIN users u ON u.id = t.owner_id
            WHERE s.grantee_user_id = ?
            GROUP BY t.id
            ORDER BY t.created_at ASC
            "#,
        )
        .bind(grantee_user_id)
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            let task = Task {
                id: r.get("id"),
                owner_id: r.get("owner_id"),
                title: r.get("title"),
                description: r.get("description"),
                status: r.get("status"),
                priority: r.get("priority"),
                assignee: r.get("assignee"),
                created_at: r.get("created_at"),
                updated_at: r.get("updated_at"),
            };
            let grant = EffectiveGrant {
                can_edit_status: r.get::<i64, _>("can_edit_status") != 0,
                can_edit_assignee: r.get::<i64, _>("can_edit_assignee") != 0,
            };

            out.push((task, grant, r.get("owner_username")));
        }

        Ok(out)
    }
}
