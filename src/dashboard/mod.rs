//! Landing-page counts: admins get system-wide numbers, employees get the
//! numbers for their own queue.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use crate::auth::Principal;
use crate::shared::errors::AppError;
use crate::shared::state::AppState;
use crate::store::TaskCounts;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    /// Whether the counts cover every task or just the caller's.
    pub scope: DashboardScope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_employees: Option<usize>,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
    pub overdue_tasks: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardScope {
    All,
    Own,
}

pub async fn summary(state: &AppState, principal: &Principal) -> DashboardResponse {
    let now = Utc::now();
    let (scope, total_employees, counts): (_, _, TaskCounts) = if principal.is_admin() {
        (
            DashboardScope::All,
            Some(state.store.active_employee_count().await),
            state.store.task_counts(None, now).await,
        )
    } else {
        (
            DashboardScope::Own,
            None,
            state.store.task_counts(Some(principal.id), now).await,
        )
    };
    DashboardResponse {
        scope,
        total_employees,
        total_tasks: counts.total,
        completed_tasks: counts.completed,
        pending_tasks: counts.pending,
        overdue_tasks: counts.overdue,
    }
}

pub async fn summary_handler(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<DashboardResponse>, AppError> {
    Ok(Json(summary(&state, &principal).await))
}
