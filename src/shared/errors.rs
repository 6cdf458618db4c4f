use axum::{http::StatusCode, response::IntoResponse, Json};
use log::error;

/// Every expected domain failure plus the generic fallback. Handlers return
/// this directly; the response body is `{"error": message}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("An employee with this email already exists.")]
    DuplicateEmail,
    #[error("The assigned employee does not exist.")]
    AssigneeNotFound,
    #[error("Not found.")]
    NotFound,
    #[error("Access denied.")]
    AccessDenied,
    #[error("Authentication required.")]
    Unauthorized,
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("The record was modified by another user. Please reload and try again.")]
    ConcurrencyConflict,
    #[error("Employee has assigned tasks. Reassign or complete their tasks first.")]
    HasAssignedTasks,
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::DuplicateEmail | Self::ConcurrencyConflict | Self::HasAssignedTasks => {
                (StatusCode::CONFLICT, self.to_string())
            }
            Self::AssigneeNotFound => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            Self::AccessDenied => (StatusCode::FORBIDDEN, self.to_string()),
            Self::Unauthorized | Self::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            Self::Internal(detail) => {
                // Log the detail, never leak it to the client.
                error!("internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred. Please try again.".to_string(),
                )
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
