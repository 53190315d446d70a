use goalcast_models::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool, Row};

pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<bool> {
        let row = sqlx::query("SELECT 1 as health")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<i32, _>("health") == 1)
    }

    /// Applies the embedded schema. Every statement is `IF NOT
    /// EXISTS`, so running this on every startup is safe.
    pub async fn run_migrations(&self) -> Result<()> {
        for (version, sql) in crate::migrations::get_migrations() {
            tracing::debug!(version, "applying migration");
            self.pool.execute(sql).await?;
        }
        Ok(())
    }
}
