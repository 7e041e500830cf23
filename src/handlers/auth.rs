use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router, extract::State};

use crate::extractors::{AuthGuard, SessionCookie};
use crate::models::{Credentials, NewUser};
use crate::{AppState, error::AppError, utils};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(sign_up))
        .route("/api/auth/signin", post(sign_in))
        .route("/api/auth/signout", post(sign_out))
        .route("/api/auth/me", get(me))
}

async fn sign_up(
    State(state): State<AppState>,
    Json(input): Json<NewUser>,
) -> Result<Response, AppError> {
    let (user, session) = state.auth.sign_up(&input).await?;
    let cookie = utils::session_cookie(&session.token, state.secure_cookies)?;

    Ok((
        [(SET_COOKIE, cookie)],
        Json(serde_json::json!({ "user": user })),
    )
        .into_response())
}

async fn sign_in(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Response, AppError> {
    let (user, session) = state
        .auth
        .sign_in(&credentials.identifier, &credentials.password)
        .await?;
    let cookie = utils::session_cookie(&session.token, state.secure_cookies)?;

    Ok((
        [(SET_COOKIE, cookie)],
        Json(serde_json::json!({ "user": user })),
    )
        .into_response())
}

async fn sign_out(
    State(state): State<AppState>,
    SessionCookie(token): SessionCookie,
) -> Result<Response, AppError> {
    if let Some(token) = token {
        state.auth.sign_out(&token).await?;
    }
    let cookie = utils::clear_session_cookie(state.secure_cookies)?;

    Ok((
        [(SET_COOKIE, cookie)],
        Json(serde_json::json!({ "ok": true })),
    )
        .into_response())
}

async fn me(AuthGuard(user): AuthGuard) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "user": user }))
}
