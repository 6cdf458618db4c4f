use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Lifetime of a normal session, in hours.
    pub session_hours: i64,
    /// Lifetime of a "remember me" session, in days.
    pub remember_days: i64,
}

/// First-run admin account, created only when the store is empty.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub admin_email: String,
    pub admin_password: String,
}

fn get_str(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: get_str("TASKDESK_HOST", "0.0.0.0"),
                port: get_parsed("TASKDESK_PORT", 8080),
            },
            session: SessionConfig {
                session_hours: get_parsed("TASKDESK_SESSION_HOURS", 24),
                remember_days: get_parsed("TASKDESK_REMEMBER_DAYS", 30),
            },
            bootstrap: BootstrapConfig {
                admin_email: get_str("TASKDESK_ADMIN_EMAIL", "admin@taskdesk.local"),
                admin_password: get_str("TASKDESK_ADMIN_PASSWORD", "change-me-admin"),
            },
        }
    }
}
