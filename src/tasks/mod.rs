//! Task workflow: role-gated CRUD with the field-level mutation policy,
//! status-driven completion timestamps and optimistic concurrency.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::auth::Principal;
use crate::policy::{self, Action, ResourceRef, TaskEdit};
use crate::shared::errors::AppError;
use crate::shared::models::{TaskItem, TaskPriority, TaskStatus};
use crate::shared::state::AppState;
use crate::store::NewTask;

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: String,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to_id: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(flatten)]
    pub edit: TaskEdit,
    /// The version the client loaded; a mismatch means someone else wrote
    /// the record in between.
    pub version: i64,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub progress_percent: u8,
    pub due_date: DateTime<Utc>,
    pub created_date: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub completed_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub assigned_to_id: i32,
    pub assigned_to_name: Option<String>,
    pub is_overdue: bool,
    pub version: i64,
}

impl TaskResponse {
    pub fn new(task: TaskItem, assigned_to_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: task.id,
            progress_percent: task.status.progress_percent(),
            is_overdue: task.is_overdue(now),
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            created_date: task.created_date,
            last_updated: task.last_updated,
            completed_date: task.completed_date,
            notes: task.notes,
            assigned_to_id: task.assigned_to_id,
            assigned_to_name,
            version: task.version,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteTaskResponse {
    pub success: bool,
    pub message: String,
}

pub fn configure() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_handler))
        .route("/create", post(create_handler))
        .route("/:id", get(detail_handler))
        .route("/:id/edit", post(update_handler))
        .route("/:id/delete", post(delete_handler))
}

const MAX_TITLE: usize = 200;
const MAX_DESCRIPTION: usize = 1000;
const MAX_NOTES: usize = 500;

fn validate_task_fields(
    title: &str,
    description: &str,
    notes: Option<&str>,
) -> Result<(), AppError> {
    let mut issues = Vec::new();
    if title.trim().is_empty() {
        issues.push("Task title is required".to_string());
    } else if title.len() > MAX_TITLE {
        issues.push(format!("Title cannot exceed {} characters", MAX_TITLE));
    }
    if description.trim().is_empty() {
        issues.push("Task description is required".to_string());
    } else if description.len() > MAX_DESCRIPTION {
        issues.push(format!(
            "Description cannot exceed {} characters",
            MAX_DESCRIPTION
        ));
    }
    if notes.is_some_and(|n| n.len() > MAX_NOTES) {
        issues.push(format!("Notes cannot exceed {} characters", MAX_NOTES));
    }
    if issues.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(issues.join("; ")))
    }
}

async fn assignee_names(state: &AppState) -> HashMap<i32, String> {
    state
        .store
        .list_employees()
        .await
        .into_iter()
        .map(|e| (e.id, e.full_name()))
        .collect()
}

/// Admins see every task; employees see only their own. Ordering comes from
/// the store: priority descending, then due date ascending.
pub async fn list_tasks(
    state: &AppState,
    principal: &Principal,
) -> Result<Vec<TaskResponse>, AppError> {
    let tasks = if principal.is_admin() {
        state.store.list_tasks().await
    } else {
        state.store.find_tasks_by_assignee(principal.id).await
    };
    let names = assignee_names(state).await;
    Ok(tasks
        .into_iter()
        .map(|t| {
            let name = names.get(&t.assigned_to_id).cloned();
            TaskResponse::new(t, name)
        })
        .collect())
}

pub async fn task_detail(
    state: &AppState,
    principal: &Principal,
    id: i32,
) -> Result<TaskResponse, AppError> {
    let task = state.store.get_task(id).await.ok_or(AppError::NotFound)?;
    policy::authorize(principal, Action::View, ResourceRef::Task(&task))?;
    let name = state
        .store
        .get_employee(task.assigned_to_id)
        .await
        .map(|e| e.full_name());
    Ok(TaskResponse::new(task, name))
}

pub async fn create_task(
    state: &AppState,
    principal: &Principal,
    req: CreateTaskRequest,
) -> Result<TaskResponse, AppError> {
    policy::require_admin(principal)?;
    validate_task_fields(&req.title, &req.description, req.notes.as_deref())?;
    let due_date = req
        .due_date
        .ok_or_else(|| AppError::Validation("Due date is required".to_string()))?;

    let task = state
        .store
        .create_task(NewTask {
            title: req.title,
            description: req.description,
            status: req.status.unwrap_or(TaskStatus::NotStarted),
            priority: req.priority.unwrap_or(TaskPriority::Medium),
            due_date,
            notes: req.notes.filter(|n| !n.is_empty()),
            assigned_to_id: req.assigned_to_id,
        })
        .await?;

    let assignee = state.store.get_employee(task.assigned_to_id).await;
    let name = assignee.map(|e| e.full_name());
    info!(
        "task {} created by admin {} and assigned to employee {}",
        task.id, principal.id, task.assigned_to_id
    );
    Ok(TaskResponse::new(task, name))
}

/// Re-fetches the persisted record to authorize against and to source the
/// server-authoritative fields, then writes through the version check.
pub async fn update_task(
    state: &AppState,
    principal: &Principal,
    id: i32,
    req: UpdateTaskRequest,
) -> Result<TaskResponse, AppError> {
    let existing = state.store.get_task(id).await.ok_or(AppError::NotFound)?;
    policy::authorize(principal, Action::Edit, ResourceRef::Task(&existing))?;

    let merged = policy::merge_task_edit(principal, &existing, &req.edit, Utc::now());
    validate_task_fields(&merged.title, &merged.description, merged.notes.as_deref())?;

    let stored = state.store.update_task(merged, req.version).await?;
    let name = state
        .store
        .get_employee(stored.assigned_to_id)
        .await
        .map(|e| e.full_name());
    info!("task {} updated by employee {}", stored.id, principal.id);
    Ok(TaskResponse::new(stored, name))
}

pub async fn delete_task(
    state: &AppState,
    principal: &Principal,
    id: i32,
) -> Result<DeleteTaskResponse, AppError> {
    policy::require_admin(principal)?;
    state.store.delete_task(id).await?;
    info!("task {} deleted by admin {}", id, principal.id);
    Ok(DeleteTaskResponse {
        success: true,
        message: "Task deleted successfully.".to_string(),
    })
}

async fn list_handler(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<Vec<TaskResponse>>, AppError> {
    list_tasks(&state, &principal).await.map(Json)
}

async fn detail_handler(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
) -> Result<Json<TaskResponse>, AppError> {
    task_detail(&state, &principal, id).await.map(Json)
}

async fn create_handler(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(req): Json<CreateTaskRequest>,
) -> Result<Json<TaskResponse>, AppError> {
    create_task(&state, &principal, req).await.map(Json)
}

async fn update_handler(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, AppError> {
    update_task(&state, &principal, id, req).await.map(Json)
}

async fn delete_handler(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
) -> Result<Json<DeleteTaskResponse>, AppError> {
    delete_task(&state, &principal, id).await.map(Json)
}
