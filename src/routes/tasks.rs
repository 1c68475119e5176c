use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get},
    Json, Router,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::db::{Comment, Task, TaskShare};
use crate::error::{AppError, AppResult};
use crate::routes::auth::AuthUser;
use crate::services::tasks::{NewTask, TaskAccess, TaskService, TaskUpdate, VisibleTask};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route(
            "/:task_id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/:task_id/comments", get(list_comments).post(add_comment))
        .route("/:task_id/shares", get(list_shares).post(create_share))
        .route("/:task_id/shares/:grantee_id", delete(revoke_share))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Exact status filter
    pub status: Option<String>,
    /// Exact priority filter
    pub priority: Option<i64>,
    /// Case-insensitive substring match on the assignee label
    pub assignee: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<i64>,
    pub assignee: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<i64>,
    pub assignee: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: i64,
    pub assignee: Option<String>,
    pub owner_id: String,
    /// Set on shared entries so the UI can show whose task this is
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_username: Option<String>,
    /// "owner" or "shared" — drives which controls the UI renders
    pub role: String,
    pub can_edit_status: bool,
    pub can_edit_assignee: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TaskResponse {
    fn new(task: Task, access: TaskAccess, owner_username: Option<String>) -> Self {
        let role = if access.is_owner() { "owner" } else { "shared" };
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            assignee: task.assignee,
            owner_id: task.owner_id,
            owner_username,
            role: role.to_string(),
            can_edit_status: access.can_edit_status(),
            can_edit_assignee: access.can_edit_assignee(),
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskDetailResponse {
    #[serde(flatten)]
    pub task: TaskResponse,
    pub comments: Vec<CommentResponse>,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: String,
    pub author: String,
    pub content: String,
    pub created_at: NaiveDateTime,
}

impl From<Comment> for CommentResponse {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            author: c.author,
            content: c.content,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    /// Free-text attribution, stored as given
    pub author: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateShareRequest {
    /// Username of the grantee
    pub username: String,
    #[serde(default)]
    pub can_edit_status: bool,
    #[serde(default)]
    pub can_edit_assignee: bool,
}

#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub grantee_user_id: String,
    pub grantee_username: String,
    pub can_edit_status: bool,
    pub can_edit_assignee: bool,
    pub created_at: NaiveDateTime,
}

impl ShareResponse {
    fn new(share: TaskShare, grantee_username: String) -> Self {
        Self {
            grantee_user_id: share.grantee_user_id,
            grantee_username,
            can_edit_status: share.can_edit_status,
            can_edit_assignee: share.can_edit_assignee,
            created_at: share.created_at,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// List tasks visible to the requester: owned plus shared-to, ordered by
/// status rank then priority. Optional filters mirror the classic index view.
async fn list_tasks(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<TaskResponse>>> {
    let visible = TaskService::list_visible(&state, &user.id).await?;

    let assignee_filter = query.assignee.as_deref().map(str::to_lowercase);

    let res: Vec<TaskResponse> = visible
        .into_iter()
        .filter(|v| matches_filters(v, &query, assignee_filter.as_deref()))
        .map(|v| TaskResponse::new(v.task, v.access, v.owner_username))
        .collect();

    Ok(Json(res))
}

fn matches_filters(v: &VisibleTask, query: &ListQuery, assignee_filter: Option<&str>) -> bool {
    if let Some(ref status) = query.status {
        if &v.task.status != status {
            return false;
        }
    }
    if let Some(priority) = query.priority {
        if v.task.priority != priority {
            return false;
        }
    }
    if let Some(needle) = assignee_filter {
        let assignee = v.task.assignee.as_deref().unwrap_or("").to_lowercase();
        if !assignee.contains(needle) {
            return false;
        }
    }
    true
}

/// Create a task owned by the requester
async fn create_task(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(http::StatusCode, Json<TaskResponse>), AppError> {
    let task = TaskService::create_task(
        &state,
        &user.id,
        NewTask {
            title: request.title,
            description: request.description,
            status: request.status,
            priority: request.priority,
            assignee: request.assignee,
        },
    )
    .await?;

    Ok((
        http::StatusCode::CREATED,
        Json(TaskResponse::new(task, TaskAccess::Owner, None)),
    ))
}

/// Task detail with comments, enriched with the requester's edit flags
async fn get_task(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(task_id): Path<String>,
) -> AppResult<Json<TaskDetailResponse>> {
    let view = TaskService::view_task(&state, &user.id, &task_id).await?;
    let comments = TaskService::list_comments(&state, &user.id, &task_id).await?;

    Ok(Json(TaskDetailResponse {
        task: TaskResponse::new(view.task, view.access, None),
        comments: comments.into_iter().map(Into::into).collect(),
    }))
}

/// Update a task. Owners may change everything; grantees only what their
/// grant covers — the rest of the submitted fields are silently preserved.
async fn update_task(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(task_id): Path<String>,
    Json(request): Json<UpdateTaskRequest>,
) -> AppResult<Json<TaskResponse>> {
    let task = TaskService::update_task(
        &state,
        &user.id,
        &task_id,
        TaskUpdate {
            title: request.title,
            description: request.description,
            status: request.status,
            priority: request.priority,
            assignee: request.assignee,
        },
    )
    .await?;

    // Re-derive the requester's flags for the response
    let view = TaskService::view_task(&state, &user.id, &task.id).await?;
    Ok(Json(TaskResponse::new(view.task, view.access, None)))
}

/// Delete a task (owner only); cascades over comments and shares
async fn delete_task(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(task_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    TaskService::delete_task(&state, &user.id, &task_id).await?;

    Ok(Json(serde_json::json!({ "message": "Task deleted" })))
}

/// Comments on a task, newest first
async fn list_comments(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(task_id): Path<String>,
) -> AppResult<Json<Vec<CommentResponse>>> {
    let comments = TaskService::list_comments(&state, &user.id, &task_id).await?;

    Ok(Json(comments.into_iter().map(Into::into).collect()))
}

/// Add a comment. Any user who can view the task may comment.
async fn add_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(task_id): Path<String>,
    Json(request): Json<AddCommentRequest>,
) -> Result<(http::StatusCode, Json<CommentResponse>), AppError> {
    let comment = TaskService::add_comment(
        &state,
        &user.id,
        &task_id,
        &request.author,
        &request.content,
    )
    .await?;

    Ok((http::StatusCode::CREATED, Json(comment.into())))
}

/// The owner's share management view
async fn list_shares(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(task_id): Path<String>,
) -> AppResult<Json<Vec<ShareResponse>>> {
    let shares = TaskService::list_shares(&state, &user.id, &task_id).await?;

    Ok(Json(
        shares
            .into_iter()
            .map(|(share, username)| ShareResponse::new(share, username))
            .collect(),
    ))
}

/// Grant capabilities on a task to another user (owner only)
async fn create_share(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(task_id): Path<String>,
    Json(request): Json<CreateShareRequest>,
) -> Result<(http::StatusCode, Json<ShareResponse>), AppError> {
    let (share, grantee_username) = TaskService::create_share(
        &state,
        &user.id,
        &task_id,
        &request.username,
        request.can_edit_status,
        request.can_edit_assignee,
    )
    .await?;

    Ok((
        http::StatusCode::CREATED,
        Json(ShareResponse::new(share, grantee_username)),
    ))
}

/// Revoke all grants for a grantee on a task (owner only, idempotent)
async fn revoke_share(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path((task_id, grantee_id)): Path<(String, String)>,
) -> AppResult<Json<serde_json::Value>> {
    TaskService::revoke_share(&state, &user.id, &task_id, &grantee_id).await?;

    Ok(Json(serde_json::json!({ "message": "Share revoked" })))
}
