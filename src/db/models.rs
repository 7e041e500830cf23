// Row structs private to the db layer; public models live in crate::models.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{QuizStatus, Role, User};

/// Full user row including credential columns. Only the db layer and the
/// auth service ever see it; it converts to the public `User` for callers.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub salt: String,
    pub password_hash: String,
    pub password_algo: String,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            email: self.email,
            username: self.username,
            display_name: self.display_name,
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// Everything needed to insert a user: already validated, already hashed.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub salt: String,
    pub password_hash: String,
    pub password_algo: &'static str,
}

#[derive(Debug, sqlx::FromRow)]
pub struct QuizRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category_id: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub status: QuizStatus,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct QuestionRow {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub prompt: String,
}

#[derive(Debug, sqlx::FromRow)]
pub struct OptionRow {
    pub id: Uuid,
    pub question_id: Uuid,
    pub label: String,
    pub is_correct: bool,
}
