//! End-to-end workflow scenarios: authentication, role gating, the
//! field-level mutation policy, completion timestamps, delete blocking and
//! optimistic concurrency, all driven through the public workflow API.

use std::sync::Arc;

use chrono::{Duration, Utc};
use taskdesk::auth::{self, Principal, RegisterRequest};
use taskdesk::config::AppConfig;
use taskdesk::dashboard;
use taskdesk::employees::{self, CreateEmployeeRequest, EmployeeEdit};
use taskdesk::policy::TaskEdit;
use taskdesk::shared::errors::AppError;
use taskdesk::shared::models::{Role, TaskPriority, TaskStatus};
use taskdesk::shared::state::AppState;
use taskdesk::tasks::{self, CreateTaskRequest, UpdateTaskRequest};

async fn setup() -> (Arc<AppState>, Principal) {
    let state = Arc::new(AppState::new(AppConfig::from_env()));
    auth::bootstrap_admin(&state).await.unwrap();
    let admin_email = state.config.bootstrap.admin_email.clone();
    let admin_password = state.config.bootstrap.admin_password.clone();
    let admin = auth::authenticate(&state, &admin_email, &admin_password)
        .await
        .unwrap();
    (state, admin)
}

fn new_employee_request(email: &str) -> CreateEmployeeRequest {
    CreateEmployeeRequest {
        first_name: "Obada".into(),
        last_name: "Test".into(),
        email: email.into(),
        password: "worker-pass".into(),
        position: Some("Software Developer".into()),
        phone: Some("53190030211".into()),
        role: None,
        hire_date: None,
        is_active: None,
    }
}

fn new_task_request(assignee: i32, due_in_days: i64) -> CreateTaskRequest {
    CreateTaskRequest {
        title: "Complete project documentation".into(),
        description: "Write the user guide and technical documentation.".into(),
        status: None,
        priority: Some(TaskPriority::High),
        due_date: Some(Utc::now() + Duration::days(due_in_days)),
        assigned_to_id: assignee,
        notes: None,
    }
}

async fn login_employee(state: &AppState, email: &str) -> Principal {
    auth::authenticate(state, email, "worker-pass").await.unwrap()
}

#[tokio::test]
async fn bootstrap_admin_can_login_and_is_admin() {
    let (_state, admin) = setup().await;
    assert_eq!(admin.role, Role::Admin);
}

#[tokio::test]
async fn invalid_credentials_do_not_reveal_whether_email_exists() {
    let (state, _admin) = setup().await;
    let wrong_password =
        auth::authenticate(&state, &state.config.bootstrap.admin_email, "nope").await;
    let unknown_email = auth::authenticate(&state, "ghost@x.com", "nope").await;
    assert!(matches!(wrong_password, Err(AppError::InvalidCredentials)));
    assert!(matches!(unknown_email, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn registration_creates_active_plain_employee() {
    let (state, _admin) = setup().await;
    let employee = auth::register_employee(
        &state,
        RegisterRequest {
            first_name: "New".into(),
            last_name: "Hire".into(),
            email: "hire@x.com".into(),
            password: "worker-pass".into(),
            position: None,
            phone: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(employee.role, Role::Employee);
    assert!(employee.is_active);

    let principal = login_employee(&state, "hire@x.com").await;
    assert_eq!(principal.id, employee.id);

    // Registering the same email again is rejected.
    let duplicate = auth::register_employee(
        &state,
        RegisterRequest {
            first_name: "Other".into(),
            last_name: "Person".into(),
            email: "hire@x.com".into(),
            password: "worker-pass".into(),
            position: None,
            phone: None,
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::DuplicateEmail)));
}

#[tokio::test]
async fn admin_create_with_duplicate_email_fails() {
    let (state, admin) = setup().await;
    employees::create_employee(&state, &admin, new_employee_request("a@x.com"))
        .await
        .unwrap();
    let second =
        employees::create_employee(&state, &admin, new_employee_request("a@x.com")).await;
    assert!(matches!(second, Err(AppError::DuplicateEmail)));
}

#[tokio::test]
async fn assignee_completion_round_trip_drives_completed_date() {
    let (state, admin) = setup().await;
    let worker = employees::create_employee(&state, &admin, new_employee_request("w@x.com"))
        .await
        .unwrap();
    let task = tasks::create_task(&state, &admin, new_task_request(worker.id, 7))
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::NotStarted);
    assert!(task.completed_date.is_none());

    let principal = login_employee(&state, "w@x.com").await;
    let before = Utc::now();
    let done = tasks::update_task(
        &state,
        &principal,
        task.id,
        UpdateTaskRequest {
            edit: TaskEdit {
                status: Some(TaskStatus::Completed),
                ..TaskEdit::default()
            },
            version: task.version,
        },
    )
    .await
    .unwrap();
    let completed_at = done.completed_date.expect("completed date set");
    assert!(completed_at >= before && completed_at <= Utc::now());
    assert_eq!(completed_at, done.last_updated);
    assert_eq!(done.progress_percent, 100);

    let reopened = tasks::update_task(
        &state,
        &principal,
        task.id,
        UpdateTaskRequest {
            edit: TaskEdit {
                status: Some(TaskStatus::InProgress),
                ..TaskEdit::default()
            },
            version: done.version,
        },
    )
    .await
    .unwrap();
    assert!(reopened.completed_date.is_none());
}

#[tokio::test]
async fn assignee_cannot_change_server_authoritative_fields() {
    let (state, admin) = setup().await;
    let worker = employees::create_employee(&state, &admin, new_employee_request("w@x.com"))
        .await
        .unwrap();
    let other = employees::create_employee(&state, &admin, new_employee_request("o@x.com"))
        .await
        .unwrap();
    let task = tasks::create_task(&state, &admin, new_task_request(worker.id, 7))
        .await
        .unwrap();

    let principal = login_employee(&state, "w@x.com").await;
    let updated = tasks::update_task(
        &state,
        &principal,
        task.id,
        UpdateTaskRequest {
            edit: TaskEdit {
                title: Some("Hijacked".into()),
                description: Some("Hijacked".into()),
                priority: Some(TaskPriority::Low),
                due_date: Some(Utc::now() + Duration::days(365)),
                assigned_to_id: Some(other.id),
                status: Some(TaskStatus::InProgress),
                notes: Some("made progress".into()),
            },
            version: task.version,
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.title, task.title);
    assert_eq!(updated.description, task.description);
    assert_eq!(updated.priority, task.priority);
    assert_eq!(updated.due_date, task.due_date);
    assert_eq!(updated.assigned_to_id, worker.id);
    assert_eq!(updated.created_date, task.created_date);
    assert_eq!(updated.status, TaskStatus::InProgress);
    assert_eq!(updated.notes.as_deref(), Some("made progress"));
}

#[tokio::test]
async fn employee_is_denied_everything_not_their_own() {
    let (state, admin) = setup().await;
    let worker = employees::create_employee(&state, &admin, new_employee_request("w@x.com"))
        .await
        .unwrap();
    let other = employees::create_employee(&state, &admin, new_employee_request("o@x.com"))
        .await
        .unwrap();
    let foreign_task = tasks::create_task(&state, &admin, new_task_request(other.id, 7))
        .await
        .unwrap();

    let principal = login_employee(&state, "w@x.com").await;

    assert!(matches!(
        tasks::task_detail(&state, &principal, foreign_task.id).await,
        Err(AppError::AccessDenied)
    ));
    assert!(matches!(
        tasks::update_task(
            &state,
            &principal,
            foreign_task.id,
            UpdateTaskRequest {
                edit: TaskEdit::default(),
                version: foreign_task.version
            }
        )
        .await,
        Err(AppError::AccessDenied)
    ));
    assert!(matches!(
        tasks::create_task(&state, &principal, new_task_request(worker.id, 7)).await,
        Err(AppError::AccessDenied)
    ));
    assert!(matches!(
        tasks::delete_task(&state, &principal, foreign_task.id).await,
        Err(AppError::AccessDenied)
    ));
    assert!(matches!(
        employees::list_employees(&state, &principal).await,
        Err(AppError::AccessDenied)
    ));
    assert!(matches!(
        employees::employee_detail(&state, &principal, other.id).await,
        Err(AppError::AccessDenied)
    ));
    assert!(matches!(
        employees::delete_employee(&state, &principal, other.id).await,
        Err(AppError::AccessDenied)
    ));

    // Their own records stay reachable.
    assert!(tasks::list_tasks(&state, &principal).await.unwrap().is_empty());
    let own = employees::employee_detail(&state, &principal, worker.id)
        .await
        .unwrap();
    assert_eq!(own.employee.id, worker.id);
}

#[tokio::test]
async fn task_listing_is_scoped_and_ordered() {
    let (state, admin) = setup().await;
    let worker = employees::create_employee(&state, &admin, new_employee_request("w@x.com"))
        .await
        .unwrap();
    let other = employees::create_employee(&state, &admin, new_employee_request("o@x.com"))
        .await
        .unwrap();

    let mut low = new_task_request(worker.id, 1);
    low.priority = Some(TaskPriority::Low);
    let mut critical_late = new_task_request(worker.id, 9);
    critical_late.priority = Some(TaskPriority::Critical);
    let mut critical_soon = new_task_request(worker.id, 2);
    critical_soon.priority = Some(TaskPriority::Critical);
    let foreign = new_task_request(other.id, 3);

    tasks::create_task(&state, &admin, low).await.unwrap();
    tasks::create_task(&state, &admin, critical_late).await.unwrap();
    tasks::create_task(&state, &admin, critical_soon).await.unwrap();
    tasks::create_task(&state, &admin, foreign).await.unwrap();

    let all = tasks::list_tasks(&state, &admin).await.unwrap();
    assert_eq!(all.len(), 4);

    let principal = login_employee(&state, "w@x.com").await;
    let own = tasks::list_tasks(&state, &principal).await.unwrap();
    assert_eq!(own.len(), 3);
    let order: Vec<TaskPriority> = own.iter().map(|t| t.priority).collect();
    assert_eq!(
        order,
        vec![
            TaskPriority::Critical,
            TaskPriority::Critical,
            TaskPriority::Low
        ]
    );
    assert!(own[0].due_date <= own[1].due_date);
}

#[tokio::test]
async fn stale_update_reports_concurrency_conflict() {
    let (state, admin) = setup().await;
    let worker = employees::create_employee(&state, &admin, new_employee_request("w@x.com"))
        .await
        .unwrap();
    let task = tasks::create_task(&state, &admin, new_task_request(worker.id, 7))
        .await
        .unwrap();

    // Two admins load version 1; the first write succeeds.
    tasks::update_task(
        &state,
        &admin,
        task.id,
        UpdateTaskRequest {
            edit: TaskEdit {
                title: Some("First writer".into()),
                ..TaskEdit::default()
            },
            version: task.version,
        },
    )
    .await
    .unwrap();

    let stale = tasks::update_task(
        &state,
        &admin,
        task.id,
        UpdateTaskRequest {
            edit: TaskEdit {
                title: Some("Second writer".into()),
                ..TaskEdit::default()
            },
            version: task.version,
        },
    )
    .await;
    assert!(matches!(stale, Err(AppError::ConcurrencyConflict)));
}

#[tokio::test]
async fn employee_delete_blocked_until_tasks_are_gone() {
    let (state, admin) = setup().await;
    let worker = employees::create_employee(&state, &admin, new_employee_request("w@x.com"))
        .await
        .unwrap();
    let task = tasks::create_task(&state, &admin, new_task_request(worker.id, 7))
        .await
        .unwrap();

    assert!(matches!(
        employees::delete_employee(&state, &admin, worker.id).await,
        Err(AppError::HasAssignedTasks)
    ));

    tasks::delete_task(&state, &admin, task.id).await.unwrap();
    employees::delete_employee(&state, &admin, worker.id)
        .await
        .unwrap();
    assert!(matches!(
        employees::employee_detail(&state, &admin, worker.id).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn employee_update_enforces_uniqueness_and_versioning() {
    let (state, admin) = setup().await;
    let first = employees::create_employee(&state, &admin, new_employee_request("a@x.com"))
        .await
        .unwrap();
    let second = employees::create_employee(&state, &admin, new_employee_request("b@x.com"))
        .await
        .unwrap();

    let conflict = employees::update_employee(
        &state,
        &admin,
        second.id,
        EmployeeEdit {
            email: Some(first.email.clone()),
            version: second.version,
            ..EmployeeEdit::default()
        },
    )
    .await;
    assert!(matches!(conflict, Err(AppError::DuplicateEmail)));

    let renamed = employees::update_employee(
        &state,
        &admin,
        second.id,
        EmployeeEdit {
            first_name: Some("Renamed".into()),
            version: second.version,
            ..EmployeeEdit::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(renamed.first_name, "Renamed");

    let stale = employees::update_employee(
        &state,
        &admin,
        second.id,
        EmployeeEdit {
            first_name: Some("Too late".into()),
            version: second.version,
            ..EmployeeEdit::default()
        },
    )
    .await;
    assert!(matches!(stale, Err(AppError::ConcurrencyConflict)));
}

#[tokio::test]
async fn dashboard_counts_are_role_scoped() {
    let (state, admin) = setup().await;
    let worker = employees::create_employee(&state, &admin, new_employee_request("w@x.com"))
        .await
        .unwrap();
    let other = employees::create_employee(&state, &admin, new_employee_request("o@x.com"))
        .await
        .unwrap();

    // One overdue open task and one completed task for the worker, plus an
    // open task for someone else.
    let overdue = tasks::create_task(&state, &admin, new_task_request(worker.id, -2))
        .await
        .unwrap();
    assert!(overdue.is_overdue);
    let done = tasks::create_task(&state, &admin, new_task_request(worker.id, 5))
        .await
        .unwrap();
    tasks::update_task(
        &state,
        &admin,
        done.id,
        UpdateTaskRequest {
            edit: TaskEdit {
                status: Some(TaskStatus::Completed),
                ..TaskEdit::default()
            },
            version: done.version,
        },
    )
    .await
    .unwrap();
    tasks::create_task(&state, &admin, new_task_request(other.id, 5))
        .await
        .unwrap();

    let admin_view = dashboard::summary(&state, &admin).await;
    assert_eq!(admin_view.total_employees, Some(3));
    assert_eq!(admin_view.total_tasks, 3);
    assert_eq!(admin_view.completed_tasks, 1);
    assert_eq!(admin_view.pending_tasks, 2);
    assert_eq!(admin_view.overdue_tasks, 1);

    let principal = login_employee(&state, "w@x.com").await;
    let own_view = dashboard::summary(&state, &principal).await;
    assert_eq!(own_view.total_employees, None);
    assert_eq!(own_view.total_tasks, 2);
    assert_eq!(own_view.completed_tasks, 1);
    assert_eq!(own_view.pending_tasks, 1);
    assert_eq!(own_view.overdue_tasks, 1);
}

#[tokio::test]
async fn reassigning_to_missing_employee_is_rejected() {
    let (state, admin) = setup().await;
    let worker = employees::create_employee(&state, &admin, new_employee_request("w@x.com"))
        .await
        .unwrap();

    let missing = tasks::create_task(&state, &admin, new_task_request(999, 7)).await;
    assert!(matches!(missing, Err(AppError::AssigneeNotFound)));

    let task = tasks::create_task(&state, &admin, new_task_request(worker.id, 7))
        .await
        .unwrap();
    let reassigned = tasks::update_task(
        &state,
        &admin,
        task.id,
        UpdateTaskRequest {
            edit: TaskEdit {
                assigned_to_id: Some(999),
                ..TaskEdit::default()
            },
            version: task.version,
        },
    )
    .await;
    assert!(matches!(reassigned, Err(AppError::AssigneeNotFound)));
}
