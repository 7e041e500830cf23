use uuid::Uuid;

use super::Db;
use super::models::{NewUserRecord, UserRow};
use crate::error::AppError;
use crate::models::{Role, User};

const USER_COLUMNS: &str = "id, email, username, display_name, role, salt, password_hash, password_algo, created_at";

impl Db {
    /// Insert an already-validated, already-hashed user record. Duplicate
    /// email or username surfaces as a `Conflict`.
    pub async fn insert_user(&self, record: &NewUserRecord) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, email, username, display_name, role, salt, password_hash, password_algo)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(&record.email)
        .bind(&record.username)
        .bind(&record.display_name)
        .bind(record.role)
        .bind(&record.salt)
        .bind(&record.password_hash)
        .bind(record.password_algo)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| AppError::conflict_on_unique(err, "User already exists."))?;

        tracing::info!(user_id = %row.id, "new user created");
        Ok(row.into_user())
    }

    /// Look up the credential row for a sign-in identifier (email or
    /// username, case-insensitive).
    pub async fn find_credentials(&self, identifier: &str) -> Result<Option<UserRow>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = $1 OR lower(username) = $1",
        ))
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_users(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, email, username, display_name, role, created_at FROM users ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Delete a user account. Self-deletion is rejected outright; the last
    /// admin and users still owning quizzes are protected by conflicts.
    pub async fn delete_user(&self, user_id: Uuid, requester_id: Uuid) -> Result<(), AppError> {
        if user_id == requester_id {
            return Err(AppError::validation(
                "You cannot delete your own account.",
            ));
        }

        let role: Option<Role> = sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(role) = role else {
            return Err(AppError::not_found("User not found."));
        };

        if role == Role::Admin {
            let admins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin'")
                .fetch_one(&self.pool)
                .await?;
            if admins <= 1 {
                return Err(AppError::conflict("Cannot delete the last admin."));
            }
        }

        let quizzes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quizzes WHERE created_by = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        if quizzes > 0 {
            return Err(AppError::conflict("Delete this user's quizzes first."));
        }

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        tracing::info!(%user_id, "user deleted");
        Ok(())
    }
}
