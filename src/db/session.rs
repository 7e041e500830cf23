use chrono::{Duration, Utc};
use uuid::Uuid;

use super::Db;
use super::models::UserRow;
use crate::error::AppError;
use crate::models::{SessionToken, User};
use crate::password;

const SESSION_TTL_DAYS: i64 = 7;

impl Db {
    /// Issue a fresh opaque token for the user. Only the token's hash is
    /// persisted; all prior sessions of the user are evicted in the same
    /// transaction (single active session policy).
    pub async fn create_session(&self, user_id: Uuid) -> Result<SessionToken, AppError> {
        let token = Uuid::new_v4().to_string();
        let token_hash = password::hash_token(&token);
        let expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO sessions (token_hash, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(&token_hash)
            .bind(user_id)
            .bind(expires_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(%user_id, "new session created");
        Ok(SessionToken { token, expires_at })
    }

    /// Resolve a session token to its user. An expired session is deleted on
    /// the spot (lazy expiry) and resolves to `None`.
    pub async fn get_user_by_session(&self, token: &str) -> Result<Option<User>, AppError> {
        let token_hash = password::hash_token(token);

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.email, u.username, u.display_name, u.role,
                   u.salt, u.password_hash, u.password_algo, u.created_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token_hash = $1 AND s.expires_at > now()
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row.into_user())),
            None => {
                // Reap the row if it exists but has expired.
                sqlx::query("DELETE FROM sessions WHERE token_hash = $1 AND expires_at <= now()")
                    .bind(&token_hash)
                    .execute(&self.pool)
                    .await?;
                Ok(None)
            }
        }
    }

    /// Idempotent: removing an absent session is not an error.
    pub async fn remove_session(&self, token: &str) -> Result<(), AppError> {
        let token_hash = password::hash_token(token);

        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(&token_hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
