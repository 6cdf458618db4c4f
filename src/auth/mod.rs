//! Authentication: login, self-registration, logout and the current-user
//! endpoint, plus first-run admin bootstrap.

pub mod extractor;
pub mod password;
pub mod session;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_cookies::{cookie::time, Cookie, Cookies};

use crate::shared::errors::AppError;
use crate::shared::models::{Employee, Role};
use crate::shared::state::AppState;
use crate::store::NewEmployee;

pub use session::{Principal, SESSION_COOKIE};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
    pub return_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub redirect: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub position: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub redirect: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

pub fn configure() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/logout", post(logout))
        .route("/me", get(current_user))
}

/// Credential check. Unknown email, inactive account and wrong password all
/// collapse into the same `InvalidCredentials` so nothing leaks about which
/// emails exist.
pub async fn authenticate(
    state: &AppState,
    email: &str,
    password_attempt: &str,
) -> Result<Principal, AppError> {
    let employee = match state.store.find_active_employee_by_email(email).await {
        Some(employee) => employee,
        None => {
            warn!("login failed: unknown or inactive account");
            return Err(AppError::InvalidCredentials);
        }
    };
    if !password::verify_password(password_attempt, &employee.password_hash) {
        warn!("login failed: bad password for employee {}", employee.id);
        return Err(AppError::InvalidCredentials);
    }
    Ok(Principal::from_employee(&employee))
}

/// Only same-site paths are honoured as post-login redirects.
fn sanitize_return_url(url: Option<String>) -> String {
    match url {
        Some(url) if url.starts_with('/') && !url.starts_with("//") => url,
        _ => "/".to_string(),
    }
}

async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let principal = authenticate(&state, &req.email, &req.password).await?;
    let (token, ttl) = state
        .sessions
        .issue(principal.clone(), req.remember_me)
        .await;

    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_max_age(time::Duration::seconds(ttl.num_seconds()));
    cookies.add(cookie);

    info!("employee {} logged in", principal.id);
    Ok(Json(LoginResponse {
        success: true,
        redirect: sanitize_return_url(req.return_url),
        message: "Login successful".to_string(),
    }))
}

/// Self-registration always creates a plain, active employee hired now;
/// role escalation is an admin workflow.
pub async fn register_employee(
    state: &AppState,
    req: RegisterRequest,
) -> Result<Employee, AppError> {
    crate::employees::validate_profile(
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
            position: req.position,
            phone: req.phone,
            role: Role::Employee,
            hire_date: Utc::now(),
            is_active: true,
        })
        .await?;
    info!("new employee {} registered", employee.id);
    Ok(employee)
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    register_employee(&state, req).await?;
    Ok(Json(RegisterResponse {
        success: true,
        redirect: "/auth/login".to_string(),
        message: "Registration successful! Please login with your credentials.".to_string(),
    }))
}

async fn logout(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Json<LogoutResponse> {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        state.sessions.revoke(cookie.value()).await;
        let mut removal = Cookie::new(SESSION_COOKIE, "");
        removal.set_path("/");
        cookies.remove(removal);
        info!("session revoked on logout");
    }
    // Logging out without a session is not an error.
    Json(LogoutResponse {
        success: true,
        message: "You have been logged out successfully.".to_string(),
    })
}

async fn current_user(principal: Principal) -> Json<Principal> {
    Json(principal)
}

/// Seeds the configured admin account into an empty store so a fresh
/// deployment has a way in. No-op once any employee exists.
pub async fn bootstrap_admin(state: &AppState) -> Result<(), AppError> {
    if state.store.employee_count().await > 0 {
        return Ok(());
    }
    let bootstrap = &state.config.bootstrap;
    let admin = state
        .store
        .create_employee(NewEmployee {
            first_name: "Admin".to_string(),
            last_name: "User".to_string(),
            email: bootstrap.admin_email.clone(),
            password_hash: password::hash_password(&bootstrap.admin_password)?,
            position: Some("System Administrator".to_string()),
            phone: None,
            role: Role::Admin,
            hire_date: Utc::now(),
            is_active: true,
        })
        .await?;
    info!("bootstrap admin {} created", admin.email);
    Ok(())
}
