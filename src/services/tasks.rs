use std::sync::Arc;

use crate::db::models::task::status_rank;
use crate::db::{
    Comment, CommentRepository, EffectiveGrant, Task, TaskRepository, TaskShare,
    TaskShareRepository, UserRepository,
};
use crate::error::{AppError, AppResult};
use crate::AppState;

/// The requester's relationship to a task. A user with neither variant is a
/// stranger: the task does not exist as far as they are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAccess {
    Owner,
    Shared(EffectiveGrant),
}

impl TaskAccess {
    pub fn is_owner(&self) -> bool {
        matches!(self, TaskAccess::Owner)
    }

    pub fn can_edit_status(&self) -> bool {
        match self {
            TaskAccess::Owner => true,
            TaskAccess::Shared(grant) => grant.can_edit_status,
        }
    }

    pub fn can_edit_assignee(&self) -> bool {
        match self {
            TaskAccess::Owner => true,
            TaskAccess::Shared(grant) => grant.can_edit_assignee,
        }
    }
}

/// A task as seen by a specific requester.
#[derive(Debug, Clone)]
pub struct TaskView {
    pub task: Task,
    pub access: TaskAccess,
}

/// A visible-list entry. `owner_username` is set for shared entries so the
/// presentation layer can show whose task it is.
#[derive(Debug, Clone)]
pub struct VisibleTask {
    pub task: Task,
    pub access: TaskAccess,
    pub owner_username: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<i64>,
    pub assignee: Option<String>,
}

/// Proposed field changes. `None` means "leave unchanged". Fields a grantee
/// has no grant for are silently dropped, never rejected.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<i64>,
    pub assignee: Option<String>,
}

pub struct TaskService;

impl TaskService {
    pub async fn create_task(
        state: &Arc<AppState>,
        owner_id: &str,
        new_task: NewTask,
    ) -> AppResult<Task> {
        let title = new_task.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("Title must not be empty".to_string()));
        }

        let status = new_task.status.unwrap_or_else(|| "Open".to_string());
        let priority = new_task.priority.unwrap_or(3);

        TaskRepository::create(
            &state.db,
            owner_id,
            &title,
            new_task.description.as_deref(),
            &status,
            priority,
            new_task.assignee.as_deref(),
        )
        .await
    }

    /// Resolve the requester's relationship to a task, reading fresh store
    /// state. `None` covers both "no such task" and "stranger" — callers must
    /// not be able to tell the two apart.
    async fn resolve_access(
        state: &Arc<AppState>,
        requester_id: &str,
        task_id: &str,
    ) -> AppResult<Option<(Task, TaskAccess)>> {
        let task = match TaskRepository::find_by_id(&state.db, task_id).await? {
            Some(task) => task,
            None => return Ok(None),
        };

        if task.owner_id == requester_id {
            return Ok(Some((task, TaskAccess::Owner)));
        }

        let shares = TaskShareRepository::find_for_grantee(&state.db, task_id, requester_id).await?;
        match EffectiveGrant::merge(&shares) {
            Some(grant) => Ok(Some((task, TaskAccess::Shared(grant)))),
            None => Ok(None),
        }
    }

    pub async fn view_task(
        state: &Arc<AppState>,
        requester_id: &str,
        task_id: &str,
    ) -> AppResult<TaskView> {
        let (task, access) = Self::resolve_access(state, requester_id, task_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

        Ok(TaskView { task, access })
    }

    /// Tasks the requester owns plus tasks shared to them, ordered by status
    /// rank (Open, In Progress, Done, other) then ascending priority. The
    /// sort is stable, so ties keep insertion order.
    pub async fn list_visible(
        state: &Arc<AppState>,
        requester_id: &str,
    ) -> AppResult<Vec<VisibleTask>> {
        let mut visible = Vec::new();

        for task in TaskRepository::list_by_owner(&state.db, requester_id).await? {
            visible.push(VisibleTask {
                task,
                access: TaskAccess::Owner,
                owner_username: None,
            });
        }

        for (task, grant, owner_username) in
            TaskShareRepository::list_tasks_shared_with(&state.db, requester_id).await?
        {
            // A share granted to the task's own owner resolves to Owner, not
            // Grantee; the task is already in the owned list above.
            if task.owner_id == requester_id {
                continue;
            }

            visible.push(VisibleTask {
                task,
                access: TaskAccess::Shared(grant),
                owner_username: Some(owner_username),
            });
        }

        visible.sort_by_key(|v| (status_rank(&v.task.status), v.task.priority));

        Ok(visible)
    }

    /// Apply an update under the requester's capability set. Owners may change
    /// every field; grantees only the fields their grant covers — anything
    /// else they submitted is preserved at its stored value, deliberately
    /// without erroring.
    pub async fn update_task(
        state: &Arc<AppState>,
        requester_id: &str,
        task_id: &str,
        update: TaskUpdate,
    ) -> AppResult<Task> {
        let (task, access) = Self::resolve_access(state, requester_id, task_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

        let mut title = task.title.clone();
        let mut description = task.description.clone();
        let mut status = task.status.clone();
        let mut priority = task.priority;
        let mut assignee = task.assignee.clone();

        if access.is_owner() {
            if let Some(new_title) = update.title {
                let new_title = new_title.trim().to_string();
                if new_title.is_empty() {
                    return Err(AppError::Validation("Title must not be empty".to_string()));
                }
                title = new_title;
            }
            if let Some(new_description) = update.description {
                description = Some(new_description);
            }
            if let Some(new_priority) = update.priority {
                priority = new_priority;
            }
        }
        if access.can_edit_status() {
            if let Some(new_status) = update.status {
                status = new_status;
            }
        }
        if access.can_edit_assignee() {
            if let Some(new_assignee) = update.assignee {
                assignee = Some(new_assignee);
            }
        }

        let updated = TaskRepository::update_fields(
            &state.db,
            task_id,
            &title,
            description.as_deref(),
            &status,
            priority,
            assignee.as_deref(),
        )
        .await?
        // The task vanished between the access check and the write
        .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

        Ok(updated)
    }

    /// Owner-only. Grantees get Forbidden (they know the task exists);
    /// strangers get NotFound. The cascade over comments and shares is
    /// transactional.
    pub async fn delete_task(
        state: &Arc<AppState>,
        requester_id: &str,
        task_id: &str,
    ) -> AppResult<()> {
        let (task, access) = Self::resolve_access(state, requester_id, task_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

        if !access.is_owner() {
            return Err(AppError::Forbidden);
        }

        TaskRepository::delete_cascade(&state.db, &task.id).await?;

        tracing::info!("Deleted task {} with comments and shares", task.id);

        Ok(())
    }

    /// Grant capabilities on a task to another user, looked up by username.
    /// Only the owner may share. Re-sharing with the same user adds another
    /// grant row; readers OR-merge.
    pub async fn create_share(
        state: &Arc<AppState>,
        requester_id: &str,
        task_id: &str,
        grantee_username: &str,
        can_edit_status: bool,
        can_edit_assignee: bool,
    ) -> AppResult<(TaskShare, String)> {
        let (task, access) = Self::resolve_access(state, requester_id, task_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

        if !access.is_owner() {
            return Err(AppError::Forbidden);
        }

        let grantee = UserRepository::find_by_username(&state.db, grantee_username.trim())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let share = TaskShareRepository::create(
            &state.db,
            &task.id,
            &grantee.id,
            can_edit_status,
            can_edit_assignee,
        )
        .await?;

        Ok((share, grantee.username))
    }

    /// Remove all grants for a grantee on a task. Owner-only; revoking a
    /// grant that does not exist is a successful no-op.
    pub async fn revoke_share(
        state: &Arc<AppState>,
        requester_id: &str,
        task_id: &str,
        grantee_user_id: &str,
    ) -> AppResult<()> {
        let (task, access) = Self::resolve_access(state, requester_id, task_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

        if !access.is_owner() {
            return Err(AppError::Forbidden);
        }

        TaskShareRepository::delete(&state.db, &task.id, grantee_user_id).await
    }

    /// The owner's share management view. Grantees may not see who else a
    /// task is shared with.
    pub async fn list_shares(
        state: &Arc<AppState>,
        requester_id: &str,
        task_id: &str,
    ) -> AppResult<Vec<(TaskShare, String)>> {
        let (task, access) = Self::resolve_access(state, requester_id, task_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

        if !access.is_owner() {
            return Err(AppError::Forbidden);
        }

        TaskShareRepository::list_for_task(&state.db, &task.id).await
    }

    /// Anyone who can view the task may comment. The author label is free
    /// text and is not matched against the session identity.
    pub async fn add_comment(
        state: &Arc<AppState>,
        requester_id: &str,
        task_id: &str,
        author: &str,
        content: &str,
    ) -> AppResult<Comment> {
        let (task, _access) = Self::resolve_access(state, requester_id, task_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

        CommentRepository::create(&state.db, &task.id, author, content).await
    }

    pub async fn list_comments(
        state: &Arc<AppState>,
        requester_id: &str,
        task_id: &str,
    ) -> AppResult<Vec<Comment>> {
        let (task, _access) = Self::resolve_access(state, requester_id, task_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

        CommentRepository::list_for_task(&state.db, &task.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::User;

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

    async fn make_user(state: &Arc<AppState>, username: &str) -> User {
        UserRepository::create(&state.db, username, "not-a-real-hash")
            .await
            .unwrap()
    }

    async fn make_task(
        state: &Arc<AppState>,
        owner: &User,
        title: &str,
        status: &str,
        priority: i64,
    ) -> Task {
        TaskService::create_task(
            state,
            &owner.id,
            NewTask {
                title: title.to_string(),
                status: Some(status.to_string()),
                priority: Some(priority),
                ..Default::default()
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn stranger_view_returns_not_found() {
        let state = test_state().await;
        let alice = make_user(&state, "alice").await;
        let carol = make_user(&state, "carol").await;
        let task = make_task(&state, &alice, "Fix bug", "Open", 2).await;

        let err = TaskService::view_task(&state, &carol.id, &task.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        // Same signal as a lookup on an id that never existed
        let err = TaskService::view_task(&state, &carol.id, "no-such-task")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn grantee_sees_shared_task_with_flags() {
        let state = test_state().await;
        let alice = make_user(&state, "alice").await;
        let bob = make_user(&state, "bob").await;
        let task = make_task(&state, &alice, "Fix bug", "Open", 2).await;

        TaskService::create_share(&state, &alice.id, &task.id, "bob", true, false)
            .await
            .unwrap();

        let view = TaskService::view_task(&state, &bob.id, &task.id)
            .await
            .unwrap();
        assert!(!view.access.is_owner());
        assert!(view.access.can_edit_status());
        assert!(!view.access.can_edit_assignee());
    }

    #[tokio::test]
    async fn status_only_grantee_cannot_touch_assignee() {
        let state = test_state().await;
        let alice = make_user(&state, "alice").await;
        let bob = make_user(&state, "bob").await;
        let task = make_task(&state, &alice, "Fix bug", "Open", 2).await;

        TaskService::create_share(&state, &alice.id, &task.id, "bob", true, false)
            .await
            .unwrap();

        let updated = TaskService::update_task(
            &state,
            &bob.id,
            &task.id,
            TaskUpdate {
                status: Some("Done".to_string()),
                assignee: Some("bob".to_string()),
                title: Some("Hijacked".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        // Only the status change is honored; everything else stays put
        assert_eq!(updated.status, "Done");
        assert_eq!(updated.assignee, None);
        assert_eq!(updated.title, "Fix bug");
    }

    #[tokio::test]
    async fn assignee_only_grantee_scenario() {
        let state = test_state().await;
        let alice = make_user(&state, "alice").await;
        let bob = make_user(&state, "bob").await;
        let carol = make_user(&state, "carol").await;
        let task = make_task(&state, &alice, "Fix bug", "Open", 2).await;

        TaskService::create_share(&state, &alice.id, &task.id, "bob", false, true)
            .await
            .unwrap();
        TaskService::add_comment(&state, &alice.id, &task.id, "alice", "see stack trace")
            .await
            .unwrap();

        let updated = TaskService::update_task(
            &state,
            &bob.id,
            &task.id,
            TaskUpdate {
                status: Some("Done".to_string()),
                assignee: Some("B".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.status, "Open");
        assert_eq!(updated.assignee.as_deref(), Some("B"));

        let err = TaskService::view_task(&state, &carol.id, &task.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        TaskService::delete_task(&state, &alice.id, &task.id)
            .await
            .unwrap();
        let comments = CommentRepository::list_for_task(&state.db, &task.id)
            .await
            .unwrap();
        assert!(comments.is_empty());
    }

    #[tokio::test]
    async fn owner_update_applies_all_fields() {
        let state = test_state().await;
        let alice = make_user(&state, "alice").await;
        let task = make_task(&state, &alice, "Fix bug", "Open", 2).await;

        let updated = TaskService::update_task(
            &state,
            &alice.id,
            &task.id,
            TaskUpdate {
                title: Some("Fix bug properly".to_string()),
                description: Some("repro attached".to_string()),
                status: Some("In Progress".to_string()),
                priority: Some(1),
                assignee: Some("alice".to_string()),
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.title, "Fix bug properly");
        assert_eq!(updated.description.as_deref(), Some("repro attached"));
        assert_eq!(updated.status, "In Progress");
        assert_eq!(updated.priority, 1);
        assert_eq!(updated.assignee.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn owner_update_rejects_empty_title() {
        let state = test_state().await;
        let alice = make_user(&state, "alice").await;
        let task = make_task(&state, &alice, "Fix bug", "Open", 2).await;

        let err = TaskService::update_task(
            &state,
            &alice.id,
            &task.id,
            TaskUpdate {
                title: Some("   ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_cascades_comments_and_shares() {
        let state = test_state().await;
        let alice = make_user(&state, "alice").await;
        let bob = make_user(&state, "bob").await;
        let task = make_task(&state, &alice, "Fix bug", "Open", 2).await;

        TaskService::create_share(&state, &alice.id, &task.id, "bob", true, true)
            .await
            .unwrap();
        TaskService::add_comment(&state, &bob.id, &task.id, "bob", "on it")
            .await
            .unwrap();

        TaskService::delete_task(&state, &alice.id, &task.id)
            .await
            .unwrap();

        let err = TaskService::view_task(&state, &alice.id, &task.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        assert!(CommentRepository::list_for_task(&state.db, &task.id)
            .await
            .unwrap()
            .is_empty());
        assert!(
            TaskShareRepository::find_for_grantee(&state.db, &task.id, &bob.id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn grantee_delete_is_forbidden_stranger_delete_is_not_found() {
        let state = test_state().await;
        let alice = make_user(&state, "alice").await;
        let bob = make_user(&state, "bob").await;
        let carol = make_user(&state, "carol").await;
        let task = make_task(&state, &alice, "Fix bug", "Open", 2).await;

        TaskService::create_share(&state, &alice.id, &task.id, "bob", true, true)
            .await
            .unwrap();

        let err = TaskService::delete_task(&state, &bob.id, &task.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        let err = TaskService::delete_task(&state, &carol.id, &task.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        // The task is untouched
        TaskService::view_task(&state, &alice.id, &task.id)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn revoke_share_is_idempotent() {
        let state = test_state().await;
        let alice = make_user(&state, "alice").await;
        let bob = make_user(&state, "bob").await;
        let task = make_task(&state, &alice, "Fix bug", "Open", 2).await;

        TaskService::create_share(&state, &alice.id, &task.id, "bob", true, false)
            .await
            .unwrap();

        TaskService::revoke_share(&state, &alice.id, &task.id, &bob.id)
            .await
            .unwrap();
        // Second revoke finds nothing to remove and still succeeds
        TaskService::revoke_share(&state, &alice.id, &task.id, &bob.id)
            .await
            .unwrap();

        let err = TaskService::view_task(&state, &bob.id, &task.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn duplicate_shares_or_merge() {
        let state = test_state().await;
        let alice = make_user(&state, "alice").await;
        let bob = make_user(&state, "bob").await;
        let task = make_task(&state, &alice, "Fix bug", "Open", 2).await;

        TaskService::create_share(&state, &alice.id, &task.id, "bob", true, false)
            .await
            .unwrap();
        TaskService::create_share(&state, &alice.id, &task.id, "bob", false, true)
            .await
            .unwrap();

        let view = TaskService::view_task(&state, &bob.id, &task.id)
            .await
            .unwrap();
        assert!(view.access.can_edit_status());
        assert!(view.access.can_edit_assignee());

        // The shared-task list collapses the two rows into one entry
        let visible = TaskService::list_visible(&state, &bob.id).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert!(visible[0].access.can_edit_status());
        assert!(visible[0].access.can_edit_assignee());
    }

    #[tokio::test]
    async fn sharing_is_owner_only() {
        let state = test_state().await;
        let alice = make_user(&state, "alice").await;
        let bob = make_user(&state, "bob").await;
        let carol = make_user(&state, "carol").await;
        let task = make_task(&state, &alice, "Fix bug", "Open", 2).await;

        TaskService::create_share(&state, &alice.id, &task.id, "bob", true, true)
            .await
            .unwrap();

        // A grantee cannot grant further access or inspect the share list
        let err = TaskService::create_share(&state, &bob.id, &task.id, "carol", true, true)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
        let err = TaskService::list_shares(&state, &bob.id, &task.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        // A stranger is not even told the task exists
        let err = TaskService::create_share(&state, &carol.id, &task.id, "bob", true, true)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let shares = TaskService::list_shares(&state, &alice.id, &task.id)
            .await
            .unwrap();
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].1, "bob");
    }

    #[tokio::test]
    async fn share_with_unknown_handle_is_not_found() {
        let state = test_state().await;
        let alice = make_user(&state, "alice").await;
        let task = make_task(&state, &alice, "Fix bug", "Open", 2).await;

        let err = TaskService::create_share(&state, &alice.id, &task.id, "nobody", true, true)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_orders_by_status_rank_then_priority() {
        let state = test_state().await;
        let alice = make_user(&state, "alice").await;

        make_task(&state, &alice, "done", "Done", 1).await;
        make_task(&state, &alice, "open", "Open", 1).await;
        make_task(&state, &alice, "blocked", "Blocked", 2).await;
        make_task(&state, &alice, "in-progress", "In Progress", 5).await;

        let visible = TaskService::list_visible(&state, &alice.id).await.unwrap();
        let titles: Vec<&str> = visible.iter().map(|v| v.task.title.as_str()).collect();

        // Status rank dominates priority; unknown statuses sort last
        assert_eq!(titles, vec!["open", "in-progress", "done", "blocked"]);
    }

    #[tokio::test]
    async fn list_mixes_owned_and_shared() {
        let state = test_state().await;
        let alice = make_user(&state, "alice").await;
        let bob = make_user(&state, "bob").await;

        make_task(&state, &bob, "bobs own", "Open", 2).await;
        let shared = make_task(&state, &alice, "alices shared", "Open", 1).await;
        TaskService::create_share(&state, &alice.id, &shared.id, "bob", false, false)
            .await
            .unwrap();

        let visible = TaskService::list_visible(&state, &bob.id).await.unwrap();
        assert_eq!(visible.len(), 2);

        let shared_entry = visible
            .iter()
            .find(|v| v.task.id == shared.id)
            .expect("shared task missing from list");
        assert!(!shared_entry.access.is_owner());
        assert_eq!(shared_entry.owner_username.as_deref(), Some("alice"));

        let owned_entry = visible.iter().find(|v| v.task.id != shared.id).unwrap();
        assert!(owned_entry.access.is_owner());
        assert_eq!(owned_entry.owner_username, None);
    }

    #[tokio::test]
    async fn self_share_does_not_duplicate_listing() {
        let state = test_state().await;
        let alice = make_user(&state, "alice").await;
        let task = make_task(&state, &alice, "Fix bug", "Open", 2).await;

        // Nothing stops an owner from granting to their own username; the
        // owner relationship still wins everywhere.
        TaskService::create_share(&state, &alice.id, &task.id, "alice", true, false)
            .await
            .unwrap();

        let visible = TaskService::list_visible(&state, &alice.id).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert!(visible[0].access.is_owner());

        let view = TaskService::view_task(&state, &alice.id, &task.id)
            .await
            .unwrap();
        assert!(view.access.is_owner());
    }

    #[tokio::test]
    async fn any_visible_user_may_comment() {
        let state = test_state().await;
        let alice = make_user(&state, "alice").await;
        let bob = make_user(&state, "bob").await;
        let carol = make_user(&state, "carol").await;
        let task = make_task(&state, &alice, "Fix bug", "Open", 2).await;

        // Share with no edit rights at all: view + comment only
        TaskService::create_share(&state, &alice.id, &task.id, "bob", false, false)
            .await
            .unwrap();

        TaskService::add_comment(&state, &bob.id, &task.id, "someone else", "drive-by note")
            .await
            .unwrap();

        let err = TaskService::add_comment(&state, &carol.id, &task.id, "carol", "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let comments = TaskService::list_comments(&state, &alice.id, &task.id)
            .await
            .unwrap();
        assert_eq!(comments.len(), 1);
        // Author is stored as given, not tied to bob's account
        assert_eq!(comments[0].author, "someone else");
    }

    #[tokio::test]
    async fn comments_list_newest_first() {
        let state = test_state().await;
        let alice = make_user(&state, "alice").await;
        let task = make_task(&state, &alice, "Fix bug", "Open", 2).await;

        TaskService::add_comment(&state, &alice.id, &task.id, "alice", "first")
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        TaskService::add_comment(&state, &alice.id, &task.id, "alice", "second")
            .await
            .unwrap();

        let comments = TaskService::list_comments(&state, &alice.id, &task.id)
            .await
            .unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].content, "second");
        assert_eq!(comments[1].content, "first");
    }
}
