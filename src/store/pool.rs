//! Database connection pool using sqlx

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use tracing::info;

use super::postgres::{ActivityRepository, BanRepository};

const MAX_CONNECTIONS: u32 = 10;

pub struct DatabasePool {
    pool: PgPool,
    activity: Arc<ActivityRepository>,
    bans: Arc<BanRepository>,
}

impl DatabasePool {
    pub async fn new(connection_string: &str) -> Result<Self, String> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(connection_string)
            .await
            .map_err(|e| format!("Failed to connect to PostgreSQL: {}", e))?;

        info!("Connected to PostgreSQL");

        let activity = Arc::new(ActivityRepository::new(pool.clone()));
        let bans = Arc::new(BanRepository::new(pool.clone()));

        Ok(Self {
            pool,
            activity,
            bans,
        })
    }

    /// Create the trust schema and all tables. Safe to run on every startup.
    pub async fn init_schema(&self) -> Result<(), String> {
        info!("Initializing trust schema...");

        sqlx::query("CREATE SCHEMA IF NOT EXISTS trust")
            .execute(&self.pool)
            .await
            .map_err(|e| format!("Failed to create trust schema: {}", e))?;

        self.activity.init_schema().await?;
        self.bans.init_schema().await?;

        info!("Trust schema initialized");
        Ok(())
    }

    pub fn activity(&self) -> Arc<ActivityRepository> {
        self.activity.clone()
    }

    pub fn bans(&self) -> Arc<BanRepository> {
        self.bans.clone()
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
