use super::Db;
use crate::error::AppError;
use crate::models::LeaderboardEntry;

impl Db {
    /// Top 25 cumulative scores. Score accrual happens outside this layer;
    /// the listing is read-only here.
    pub async fn get_leaderboard(&self) -> Result<Vec<LeaderboardEntry>, AppError> {
        let entries = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT u.id AS user_id, u.username, l.score
            FROM leaderboard_entries l
            JOIN users u ON u.id = l.user_id
            ORDER BY l.score DESC
            LIMIT 25
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
