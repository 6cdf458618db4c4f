//! Server-side session map. Tokens are opaque uuid values handed to the
//! client in a cookie; the principal lives only on this side.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::shared::models::{Employee, Role};

pub const SESSION_COOKIE: &str = "taskdesk_session";

/// The authenticated identity threaded through every workflow call.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Principal {
    pub id: i32,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub position: Option<String>,
}

impl Principal {
    pub fn from_employee(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            full_name: employee.full_name(),
            email: employee.email.clone(),
            role: employee.role,
            position: employee.position.clone(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

struct Session {
    principal: Principal,
    expires_at: DateTime<Utc>,
}

pub struct SessionManager {
    config: SessionConfig,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Issues a fresh token; returns it with its time-to-live so the cookie
    /// Max-Age can match the server-side expiry.
    pub async fn issue(&self, principal: Principal, remember: bool) -> (String, Duration) {
        let ttl = if remember {
            Duration::days(self.config.remember_days)
        } else {
            Duration::hours(self.config.session_hours)
        };
        let token = Uuid::new_v4().to_string();
        let session = Session {
            principal,
            expires_at: Utc::now() + ttl,
        };
        self.sessions.write().await.insert(token.clone(), session);
        (token, ttl)
    }

    pub async fn resolve(&self, token: &str) -> Option<Principal> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                Some(session) if session.expires_at > now => {
                    return Some(session.principal.clone())
                }
                Some(_) => {}
                None => return None,
            }
        }
        // Expired entry: drop it.
        self.sessions.write().await.remove(token);
        None
    }

    /// Idempotent: revoking an unknown or already-revoked token succeeds.
    pub async fn revoke(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }
}
