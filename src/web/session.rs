//! Session cookie handling and the `CurrentUser` extractor.

use super::server::AppState;
use crate::actions::auth;
use crate::config::SessionConfig;
use crate::error::AppError;
use crate::types::User;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};

/// The authenticated user behind the request's session cookie.
///
/// Rejects with `Unauthorized` (a redirect to `/login`) when the cookie is
/// missing or names an unknown or expired session.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Unauthorized)?;
        let token = session_token(&cookies, &state.session).ok_or(AppError::Unauthorized)?;
        let user = auth::resolve_session(&state.db, &token)?.ok_or(AppError::Unauthorized)?;
        Ok(CurrentUser(user))
    }
}

pub fn session_token(cookies: &Cookies, config: &SessionConfig) -> Option<String> {
    cookies
        .get(&config.cookie_name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

pub fn set_session_cookie(cookies: &Cookies, config: &SessionConfig, token: &str) {
    let cookie = Cookie::build((config.cookie_name.clone(), token.to_string()))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookie)
        .same_site(SameSite::Lax)
        .build();
    cookies.add(cookie);
}

pub fn clear_session_cookie(cookies: &Cookies, config: &SessionConfig) {
    let cookie = Cookie::build((config.cookie_name.clone(), String::new()))
        .path("/")
        .build();
    cookies.remove(cookie);
}
