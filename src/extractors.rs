use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;

use crate::{AppState, error::AppError, models::User, utils};

/// Guard extractor that resolves the session cookie against the database and
/// carries the authenticated user into the handler.
pub struct AuthGuard(pub User);

impl FromRequestParts<AppState> for AuthGuard {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = resolve_session(parts, state).await?;
        user.map(AuthGuard).ok_or(AppError::Unauthorized)
    }
}

/// Admin-only guard: the session must resolve to a user with the admin role
/// before the handler body (and any store side effect) runs.
pub struct AdminGuard(pub User);

impl FromRequestParts<AppState> for AdminGuard {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_session(parts, state).await? {
            Some(user) if user.is_admin() => Ok(AdminGuard(user)),
            _ => Err(AppError::Forbidden),
        }
    }
}

/// The raw session token, when a cookie is present. Used by sign-out, which
/// must work (idempotently) even for stale sessions.
pub struct SessionCookie(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for SessionCookie {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(SessionCookie(session_token(parts)))
    }
}

fn session_token(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    jar.get(utils::SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

async fn resolve_session(parts: &Parts, state: &AppState) -> Result<Option<User>, AppError> {
    match session_token(parts) {
        Some(token) => state.db.get_user_by_session(&token).await,
        None => Ok(None),
    }
}
