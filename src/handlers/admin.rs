use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::extractors::AdminGuard;
use crate::models::{Category, CategoryInput, NewUser, Quiz, QuizInput, User};
use crate::{AppState, error::AppError};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/pending", get(list_pending))
        .route(
            "/api/admin/pending/{quiz_id}",
            post(moderate_quiz).patch(update_pending),
        )
        .route("/api/admin/quizzes", post(create_quiz))
        .route("/api/admin/quizzes/{quiz_id}", delete(delete_quiz))
        .route("/api/admin/categories", post(create_category))
        .route("/api/admin/categories/{category_id}", delete(delete_category))
        .route("/api/admin/users", get(list_users).post(create_user))
        .route("/api/admin/users/{user_id}", delete(delete_user))
}

async fn list_pending(
    AdminGuard(_admin): AdminGuard,
    State(state): State<AppState>,
) -> Result<Json<Vec<Quiz>>, AppError> {
    Ok(Json(state.db.get_pending_quizzes().await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModerationAction {
    action: String,
    #[serde(default)]
    rejection_reason: Option<String>,
}

async fn moderate_quiz(
    AdminGuard(admin): AdminGuard,
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
    Json(body): Json<ModerationAction>,
) -> Result<Json<serde_json::Value>, AppError> {
    match body.action.as_str() {
        "approve" => state.db.approve_pending_quiz(quiz_id, admin.id).await?,
        "reject" => {
            let reason = body.rejection_reason.as_deref().unwrap_or_default();
            state
                .db
                .reject_pending_quiz(quiz_id, admin.id, reason)
                .await?;
        }
        _ => return Err(AppError::validation("Unknown action.")),
    }

    Ok(Json(serde_json::json!({ "ok": true })))
}

async fn update_pending(
    AdminGuard(_admin): AdminGuard,
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
    Json(input): Json<QuizInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.db.update_pending_quiz(quiz_id, &input).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

async fn create_quiz(
    AdminGuard(admin): AdminGuard,
    State(state): State<AppState>,
    Json(input): Json<QuizInput>,
) -> Result<Json<Quiz>, AppError> {
    Ok(Json(state.db.create_quiz_as_admin(&input, admin.id).await?))
}

async fn delete_quiz(
    AdminGuard(_admin): AdminGuard,
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.db.delete_quiz(quiz_id).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

async fn create_category(
    AdminGuard(_admin): AdminGuard,
    State(state): State<AppState>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<Category>, AppError> {
    Ok(Json(state.db.create_category(&input).await?))
}

async fn delete_category(
    AdminGuard(_admin): AdminGuard,
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.db.delete_category(&category_id).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

async fn list_users(
    AdminGuard(_admin): AdminGuard,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.db.get_users().await?))
}

async fn create_user(
    AdminGuard(_admin): AdminGuard,
    State(state): State<AppState>,
    Json(input): Json<NewUser>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.auth.create_user(&input).await?))
}

async fn delete_user(
    AdminGuard(admin): AdminGuard,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.db.delete_user(user_id, admin.id).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
