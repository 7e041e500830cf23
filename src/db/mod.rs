// Database module - provides data access layer

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::error::AppError;

pub mod models;

mod category;
mod leaderboard;
mod migrations;
mod quiz;
mod session;
mod user;

/// Process-wide storage handle: a lazily shared connection pool, created once
/// at startup and cloned into every request path.
#[derive(Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    pub async fn new(url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new().max_connections(8).connect(url).await?;

        // Verify connection
        let one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&pool).await?;
        assert_eq!(one, 1);

        migrations::run(&pool).await?;

        tracing::info!("database connection has been verified");

        Ok(Self { pool })
    }

    /// Wrap an existing pool (tests construct isolated schemas this way).
    pub async fn from_pool(pool: PgPool) -> Result<Self, AppError> {
        migrations::run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
