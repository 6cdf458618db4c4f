//! Centralized authorization policy.
//!
//! One declarative table decides, per (principal, action, resource), whether
//! a workflow may run at all; one merge function decides which submitted
//! task fields a principal may actually change. Both are pure so every rule
//! is unit-testable without a server.
//!
//! Rules:
//! - Admins may do anything.
//! - Employees may view their own employee record, and view or edit tasks
//!   assigned to them. Editing an owned task only lets status and notes
//!   through; every other field is server-authoritative.
//! - Employees may never create or delete anything, nor mutate employee
//!   records (employee administration is an admin workflow).

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::auth::session::Principal;
use crate::shared::errors::AppError;
use crate::shared::models::{Employee, TaskItem, TaskPriority, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Edit,
    Create,
    Delete,
}

#[derive(Debug, Clone, Copy)]
pub enum ResourceRef<'a> {
    Employee(&'a Employee),
    Task(&'a TaskItem),
}

pub fn authorize(
    principal: &Principal,
    action: Action,
    resource: ResourceRef<'_>,
) -> Result<(), AppError> {
    if principal.is_admin() {
        return Ok(());
    }
    let allowed = match (action, resource) {
        (Action::View, ResourceRef::Employee(e)) => e.id == principal.id,
        (Action::View | Action::Edit, ResourceRef::Task(t)) => {
            t.assigned_to_id == principal.id
        }
        _ => false,
    };
    if allowed {
        Ok(())
    } else {
        Err(AppError::AccessDenied)
    }
}

/// Gate for operations with no resource instance yet (create, list-all).
pub fn require_admin(principal: &Principal) -> Result<(), AppError> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(AppError::AccessDenied)
    }
}

/// Submitted task edit. `None` keeps the stored value; notes submitted as an
/// empty string clear the field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to_id: Option<i32>,
    pub notes: Option<String>,
}

/// Builds the record that will be written, sourcing server-authoritative
/// fields from the persisted record for non-admins and deriving the
/// completed-date from the status transition. `created_date` is never taken
/// from the client for any role.
pub fn merge_task_edit(
    principal: &Principal,
    existing: &TaskItem,
    edit: &TaskEdit,
    now: DateTime<Utc>,
) -> TaskItem {
    let mut merged = existing.clone();

    if principal.is_admin() {
        if let Some(title) = &edit.title {
            merged.title = title.clone();
        }
        if let Some(description) = &edit.description {
            merged.description = description.clone();
        }
        if let Some(priority) = edit.priority {
            merged.priority = priority;
        }
        if let Some(due_date) = edit.due_date {
            merged.due_date = due_date;
        }
        if let Some(assigned_to_id) = edit.assigned_to_id {
            merged.assigned_to_id = assigned_to_id;
        }
    }

    if let Some(status) = edit.status {
        merged.status = status;
    }
    if let Some(notes) = &edit.notes {
        merged.notes = if notes.is_empty() {
            None
        } else {
            Some(notes.clone())
        };
    }

    merged.completed_date = match (existing.status, merged.status) {
        (TaskStatus::Completed, TaskStatus::Completed) => existing.completed_date,
        (_, TaskStatus::Completed) => Some(now),
        _ => None,
    };
    merged.last_updated = now;
    merged
}
