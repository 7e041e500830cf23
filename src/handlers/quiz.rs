use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use uuid::Uuid;

use crate::extractors::AuthGuard;
use crate::models::{Category, LeaderboardEntry, Quiz, QuizInput};
use crate::{AppState, error::AppError};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/quizzes", get(list_quizzes))
        .route("/api/quizzes/submit", post(submit_quiz))
        .route("/api/quizzes/submissions", get(list_submissions))
        .route("/api/quizzes/{quiz_id}", get(get_quiz))
        .route("/api/categories", get(list_categories))
        .route("/api/categories/{category_id}", get(get_category))
        .route("/api/leaderboard", get(leaderboard))
}

async fn list_quizzes(State(state): State<AppState>) -> Result<Json<Vec<Quiz>>, AppError> {
    Ok(Json(state.db.get_quizzes().await?))
}

async fn get_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<Quiz>, AppError> {
    let quiz = state
        .db
        .get_quiz_by_id(quiz_id)
        .await?
        .ok_or_else(|| AppError::not_found("Quiz not found."))?;
    Ok(Json(quiz))
}

async fn submit_quiz(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Json(input): Json<QuizInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    let quiz_id = state.db.submit_quiz(&input, user.id).await?;
    Ok(Json(serde_json::json!({ "ok": true, "quizId": quiz_id })))
}

/// The caller's own pending and rejected submissions.
async fn list_submissions(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
) -> Result<Json<Vec<Quiz>>, AppError> {
    Ok(Json(state.db.get_user_submissions(user.id).await?))
}

async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.db.get_categories().await?))
}

async fn get_category(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> Result<Json<Category>, AppError> {
    let category = state
        .db
        .get_category_by_id(&category_id)
        .await?
        .ok_or_else(|| AppError::not_found("Category not found."))?;
    Ok(Json(category))
}

async fn leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    Ok(Json(state.db.get_leaderboard().await?))
}
