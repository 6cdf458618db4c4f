//! Employee administration: admin-gated CRUD plus self-view, email
//! uniqueness and the delete-restrict rule surfaced as workflow errors.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::{password, Principal};
use crate::policy::{self, Action, ResourceRef};
use crate::shared::errors::AppError;
use crate::shared::models::{Employee, Role};
use crate::shared::state::AppState;
use crate::store::NewEmployee;
use crate::tasks::TaskResponse;

#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub hire_date: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

/// `None` keeps the stored value; empty strings clear optional fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeEdit {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub hire_date: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    pub version: i64,
}

#[derive(Debug, Serialize)]
pub struct EmployeeResponse {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub hire_date: DateTime<Utc>,
    pub is_active: bool,
    pub assigned_task_count: usize,
    pub version: i64,
}

impl EmployeeResponse {
    fn new(employee: Employee, assigned_task_count: usize) -> Self {
        Self {
            id: employee.id,
            full_name: employee.full_name(),
            first_name: employee.first_name,
            last_name: employee.last_name,
            email: employee.email,
            position: employee.position,
            phone: employee.phone,
            role: employee.role,
            hire_date: employee.hire_date,
            is_active: employee.is_active,
            assigned_task_count,
            version: employee.version,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EmployeeDetailResponse {
    pub employee: EmployeeResponse,
    pub tasks: Vec<TaskResponse>,
}

#[derive(Debug, Serialize)]
pub struct DeleteEmployeeResponse {
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

const MAX_NAME: usize = 50;
const MAX_EMAIL: usize = 100;
const MAX_POSITION: usize = 100;
const MAX_PHONE: usize = 15;
const PASSWORD_RANGE: std::ops::RangeInclusive<usize> = 6..=100;

/// Field checks shared with self-registration. Password is only validated
/// when one is being set.
pub fn validate_profile(
    first_name: &str,
    last_name: &str,
    email: &str,
    password: Option<&str>,
    position: Option<&str>,
    phone: Option<&str>,
) -> Result<(), AppError> {
    let mut issues = Vec::new();
    if first_name.trim().is_empty() {
        issues.push("First name is required".to_string());
    } else if first_name.len() > MAX_NAME {
        issues.push(format!("First name cannot exceed {} characters", MAX_NAME));
    }
    if last_name.trim().is_empty() {
        issues.push("Last name is required".to_string());
    } else if last_name.len() > MAX_NAME {
        issues.push(format!("Last name cannot exceed {} characters", MAX_NAME));
    }
    if email.trim().is_empty() {
        issues.push("Email is required".to_string());
    } else if email.len() > MAX_EMAIL || !email.contains('@') {
        issues.push("Invalid email address".to_string());
    }
    if let Some(password) = password {
        if !PASSWORD_RANGE.contains(&password.len()) {
            issues.push("Password must be at least 6 characters".to_string());
        }
    }
    if position.is_some_and(|p| p.len() > MAX_POSITION) {
        issues.push(format!("Position cannot exceed {} characters", MAX_POSITION));
    }
    if phone.is_some_and(|p| p.len() > MAX_PHONE) {
        issues.push(format!(
            "Phone number cannot exceed {} characters",
            MAX_PHONE
        ));
    }
    if issues.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(issues.join("; ")))
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub async fn list_employees(
    state: &AppState,
    principal: &Principal,
) -> Result<Vec<EmployeeResponse>, AppError> {
    policy::require_admin(principal)?;
    let employees = state.store.list_employees().await;
    let tasks = state.store.list_tasks().await;
    Ok(employees
        .into_iter()
        .map(|employee| {
            let count = tasks
                .iter()
                .filter(|t| t.assigned_to_id == employee.id)
                .count();
            EmployeeResponse::new(employee, count)
        })
        .collect())
}

pub async fn employee_detail(
    state: &AppState,
    principal: &Principal,
    id: i32,
) -> Result<EmployeeDetailResponse, AppError> {
    let employee = state.store.get_employee(id).await.ok_or(AppError::NotFound)?;
    policy::authorize(principal, Action::View, ResourceRef::Employee(&employee))?;

    let tasks = state.store.find_tasks_by_assignee(id).await;
    let full_name = employee.full_name();
    let task_responses = tasks
        .iter()
        .map(|t| TaskResponse::new(t.clone(), Some(full_name.clone())))
        .collect();
    Ok(EmployeeDetailResponse {
        employee: EmployeeResponse::new(employee, tasks.len()),
        tasks: task_responses,
    })
}

pub async fn create_employee(
    state: &AppState,
    principal: &Principal,
    req: CreateEmployeeRequest,
) -> Result<EmployeeResponse, AppError> {
    policy::require_admin(principal)?;
    validate_profile(
        &req.first_name,
        &req.last_name,
        &req.email,
        Some(&req.password),
        req.position.as_deref(),
        req.phone.as_deref(),
    )?;
    let employee = state
        .store
        .create_employee(NewEmployee {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password_hash: password::hash_password(&req.password)?,
            position: normalize_optional(req.position),
            phone: normalize_optional(req.phone),
            role: req.role.unwrap_or(Role::Employee),
            hire_date: req.hire_date.unwrap_or_else(Utc::now),
            is_active: req.is_active.unwrap_or(true),
        })
        .await?;
    info!("employee {} created by admin {}", employee.id, principal.id);
    Ok(EmployeeResponse::new(employee, 0))
}

pub async fn update_employee(
    state: &AppState,
    principal: &Principal,
    id: i32,
    edit: EmployeeEdit,
) -> Result<EmployeeResponse, AppError> {
    policy::require_admin(principal)?;
    let existing = state.store.get_employee(id).await.ok_or(AppError::NotFound)?;

    let mut candidate = existing.clone();
    if let Some(first_name) = edit.first_name {
        candidate.first_name = first_name;
    }
    if let Some(last_name) = edit.last_name {
        candidate.last_name = last_name;
    }
    if let Some(email) = edit.email {
        candidate.email = email;
    }
    if let Some(position) = edit.position {
        candidate.position = normalize_optional(Some(position));
    }
    if let Some(phone) = edit.phone {
        candidate.phone = normalize_optional(Some(phone));
    }
    if let Some(role) = edit.role {
        candidate.role = role;
    }
    if let Some(hire_date) = edit.hire_date {
        candidate.hire_date = hire_date;
    }
    if let Some(is_active) = edit.is_active {
        candidate.is_active = is_active;
    }

    validate_profile(
        &candidate.first_name,
        &candidate.last_name,
        &candidate.email,
        edit.password.as_deref(),
        candidate.position.as_deref(),
        candidate.phone.as_deref(),
    )?;
    if let Some(new_password) = edit.password {
        candidate.password_hash = password::hash_password(&new_password)?;
    }

    let stored = state.store.update_employee(candidate, edit.version).await?;
    info!("employee {} updated by admin {}", stored.id, principal.id);
    let task_count = state.store.find_tasks_by_assignee(stored.id).await.len();
    Ok(EmployeeResponse::new(stored, task_count))
}

pub async fn delete_employee(
    state: &AppState,
    principal: &Principal,
    id: i32,
) -> Result<DeleteEmployeeResponse, AppError> {
    policy::require_admin(principal)?;
    state.store.delete_employee(id).await?;
    info!("employee {} deleted by admin {}", id, principal.id);
    Ok(DeleteEmployeeResponse {
        success: true,
        message: "Employee deleted successfully.".to_string(),
    })
}

async fn list_handler(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<Vec<EmployeeResponse>>, AppError> {
    list_employees(&state, &principal).await.map(Json)
}

async fn detail_handler(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
) -> Result<Json<EmployeeDetailResponse>, AppError> {
    employee_detail(&state, &principal, id).await.map(Json)
}

async fn create_handler(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(req): Json<CreateEmployeeRequest>,
) -> Result<Json<EmployeeResponse>, AppError> {
    create_employee(&state, &principal, req).await.map(Json)
}

async fn update_handler(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
    Json(edit): Json<EmployeeEdit>,
) -> Result<Json<EmployeeResponse>, AppError> {
    update_employee(&state, &principal, id, edit).await.map(Json)
}

async fn delete_handler(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
) -> Result<Json<DeleteEmployeeResponse>, AppError> {
    delete_employee(&state, &principal, id).await.map(Json)
}
