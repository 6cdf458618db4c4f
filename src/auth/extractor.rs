//! Request-to-principal extraction: the session cookie first, then a bearer
//! token for non-browser clients. Workflows never look at ambient request
//! state; they receive the resolved [`Principal`] explicitly.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
    RequestPartsExt,
};
use std::sync::Arc;
use tower_cookies::Cookies;

use crate::auth::session::{Principal, SESSION_COOKIE};
use crate::shared::errors::AppError;
use crate::shared::state::AppState;

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(String::from)
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = if let Ok(cookies) = parts.extract::<Cookies>().await {
            cookies
                .get(SESSION_COOKIE)
                .map(|c| c.value().to_string())
                .or_else(|| extract_bearer_token(&parts.headers))
        } else {
            extract_bearer_token(&parts.headers)
        };

        let token = token.ok_or(AppError::Unauthorized)?;
        state
            .sessions
            .resolve(&token)
            .await
            .ok_or(AppError::Unauthorized)
    }
}
