//! In-memory entity store for employees and tasks.
//!
//! All invariants the database enforced in the original system live here:
//! unique employee email, tasks always referencing an existing employee,
//! delete-restrict on assigned employees, and version compare-on-write for
//! optimistic concurrency. Every mutation holds the write lock for its whole
//! read-check-write sequence, so each call is atomic with respect to other
//! requests.

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::shared::errors::AppError;
use crate::shared::models::{Employee, Role, TaskItem, TaskPriority, TaskStatus};

#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub hire_date: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub assigned_to_id: i32,
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct TaskCounts {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
}

#[derive(Default)]
struct StoreInner {
    employees: HashMap<i32, Employee>,
    tasks: HashMap<i32, TaskItem>,
    next_employee_id: i32,
    next_task_id: i32,
}

#[derive(Default)]
pub struct EntityStore {
    inner: RwLock<StoreInner>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn employee_count(&self) -> usize {
        self.inner.read().await.employees.len()
    }

    pub async fn active_employee_count(&self) -> usize {
        self.inner
            .read()
            .await
            .employees
            .values()
            .filter(|e| e.is_active)
            .count()
    }

    pub async fn get_employee(&self, id: i32) -> Option<Employee> {
        self.inner.read().await.employees.get(&id).cloned()
    }

    /// Login lookup: exact-match email, active accounts only.
    pub async fn find_active_employee_by_email(&self, email: &str) -> Option<Employee> {
        self.inner
            .read()
            .await
            .employees
            .values()
            .find(|e| e.is_active && e.email == email)
            .cloned()
    }

    /// Active first, then first name ascending.
    pub async fn list_employees(&self) -> Vec<Employee> {
        let mut employees: Vec<Employee> =
            self.inner.read().await.employees.values().cloned().collect();
        employees.sort_by(|a, b| {
            b.is_active
                .cmp(&a.is_active)
                .then_with(|| a.first_name.cmp(&b.first_name))
        });
        employees
    }

    pub async fn create_employee(&self, new: NewEmployee) -> Result<Employee, AppError> {
        let mut inner = self.inner.write().await;
        if inner.employees.values().any(|e| e.email == new.email) {
            return Err(AppError::DuplicateEmail);
        }
        inner.next_employee_id += 1;
        let employee = Employee {
            id: inner.next_employee_id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            password_hash: new.password_hash,
            position: new.position,
            phone: new.phone,
            role: new.role,
            hire_date: new.hire_date,
            is_active: new.is_active,
            version: 1,
        };
        inner.employees.insert(employee.id, employee.clone());
        Ok(employee)
    }

    /// Writes `candidate` over the stored record if the caller's loaded
    /// version still matches, enforcing email uniqueness against everyone
    /// but the record itself.
    pub async fn update_employee(
        &self,
        candidate: Employee,
        expected_version: i64,
    ) -> Result<Employee, AppError> {
        let mut inner = self.inner.write().await;
        let current = inner
            .employees
            .get(&candidate.id)
            .ok_or(AppError::NotFound)?;
        if current.version != expected_version {
            return Err(AppError::ConcurrencyConflict);
        }
        if inner
            .employees
            .values()
            .any(|e| e.id != candidate.id && e.email == candidate.email)
        {
            return Err(AppError::DuplicateEmail);
        }
        let mut stored = candidate;
        stored.version = expected_version + 1;
        inner.employees.insert(stored.id, stored.clone());
        Ok(stored)
    }

    /// Delete is restricted, never cascaded: any referencing task blocks it.
    pub async fn delete_employee(&self, id: i32) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        if !inner.employees.contains_key(&id) {
            return Err(AppError::NotFound);
        }
        if inner.tasks.values().any(|t| t.assigned_to_id == id) {
            return Err(AppError::HasAssignedTasks);
        }
        inner.employees.remove(&id);
        Ok(())
    }

    pub async fn get_task(&self, id: i32) -> Option<TaskItem> {
        self.inner.read().await.tasks.get(&id).cloned()
    }

    /// Priority descending, then due date ascending.
    pub async fn list_tasks(&self) -> Vec<TaskItem> {
        let mut tasks: Vec<TaskItem> = self.inner.read().await.tasks.values().cloned().collect();
        Self::sort_tasks(&mut tasks);
        tasks
    }

    /// Explicit id-based join replacing the original's lazy navigation
    /// collection.
    pub async fn find_tasks_by_assignee(&self, employee_id: i32) -> Vec<TaskItem> {
        let mut tasks: Vec<TaskItem> = self
            .inner
            .read()
            .await
            .tasks
            .values()
            .filter(|t| t.assigned_to_id == employee_id)
            .cloned()
            .collect();
        Self::sort_tasks(&mut tasks);
        tasks
    }

    fn sort_tasks(tasks: &mut [TaskItem]) {
        tasks.sort_by_key(|t| (Reverse(t.priority), t.due_date));
    }

    pub async fn create_task(&self, new: NewTask) -> Result<TaskItem, AppError> {
        let now = Utc::now();
        let mut inner = self.inner.write().await;
        if !inner.employees.contains_key(&new.assigned_to_id) {
            return Err(AppError::AssigneeNotFound);
        }
        inner.next_task_id += 1;
        let task = TaskItem {
            id: inner.next_task_id,
            title: new.title,
            description: new.description,
            status: new.status,
            priority: new.priority,
            due_date: new.due_date,
            created_date: now,
            last_updated: now,
            completed_date: (new.status == TaskStatus::Completed).then_some(now),
            notes: new.notes,
            assigned_to_id: new.assigned_to_id,
            version: 1,
        };
        inner.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    pub async fn update_task(
        &self,
        candidate: TaskItem,
        expected_version: i64,
    ) -> Result<TaskItem, AppError> {
        let mut inner = self.inner.write().await;
        let current = inner.tasks.get(&candidate.id).ok_or(AppError::NotFound)?;
        if current.version != expected_version {
            return Err(AppError::ConcurrencyConflict);
        }
        if !inner.employees.contains_key(&candidate.assigned_to_id) {
            return Err(AppError::AssigneeNotFound);
        }
        let mut stored = candidate;
        stored.version = expected_version + 1;
        inner.tasks.insert(stored.id, stored.clone());
        Ok(stored)
    }

    pub async fn delete_task(&self, id: i32) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        inner.tasks.remove(&id).map(|_| ()).ok_or(AppError::NotFound)
    }

    /// Dashboard counts, optionally scoped to one assignee.
    pub async fn task_counts(&self, assignee: Option<i32>, now: DateTime<Utc>) -> TaskCounts {
        let inner = self.inner.read().await;
        let tasks = inner
            .tasks
            .values()
            .filter(|t| assignee.map_or(true, |id| t.assigned_to_id == id));
        let mut counts = TaskCounts {
            total: 0,
            completed: 0,
            pending: 0,
            overdue: 0,
        };
        for task in tasks {
            counts.total += 1;
            if task.status == TaskStatus::Completed {
                counts.completed += 1;
            } else {
                counts.pending += 1;
            }
            if task.is_overdue(now) {
                counts.overdue += 1;
            }
        }
        counts
    }
}
