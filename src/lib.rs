pub mod auth;
pub mod config;
pub mod dashboard;
pub mod employees;
pub mod policy;
pub mod shared;
pub mod store;
pub mod tasks;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::shared::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(dashboard::summary_handler))
        .nest("/auth", auth::configure())
        .nest("/employees", employees::configure())
        .nest("/tasks", tasks::configure())
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
