//! PostgreSQL store implementations using sqlx
//!
//! Both tables are insert-only. Schema setup is idempotent and owned by the
//! repositories so a fresh database bootstraps itself on startup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::postgres::PgPool;
use tracing::{info, warn};

use super::{
    ActivityCounts, ActivityType, BanStore, BannedIdentity, SuspiciousActivityRecord,
    SuspiciousActivityStore,
};

pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the activity table and its query indexes.
    pub async fn init_schema(&self) -> Result<(), String> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trust.suspicious_activity (
                id BIGSERIAL PRIMARY KEY,
                identity VARCHAR(320) NOT NULL,
                activity_type VARCHAR(50) NOT NULL,
                details JSONB NOT NULL,
                network_origin VARCHAR(64) NOT NULL,
                created_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()
            )
        "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to create suspicious_activity table: {}", e))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_activity_origin_time \
             ON trust.suspicious_activity(network_origin, activity_type, created_at)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to create activity origin index: {}", e))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_activity_identity \
             ON trust.suspicious_activity(identity)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to create activity identity index: {}", e))?;

        Ok(())
    }
}

#[async_trait]
impl SuspiciousActivityStore for ActivityRepository {
    async fn append(&self, record: SuspiciousActivityRecord) -> Result<(), String> {
        sqlx::query(
            r#"
            INSERT INTO trust.suspicious_activity
                (identity, activity_type, details, network_origin, created_at)
            VALUES ($1, $2, $3, $4, $5)
        "#,
        )
        .bind(&record.identity)
        .bind(record.activity_type.as_str())
        .bind(&record.details)
        .bind(&record.network_origin)
        .bind(record.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to append activity record: {}", e))?;

        Ok(())
    }

    async fn count_signup_attempts(
        &self,
        origin: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, String> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS attempt_count
            FROM trust.suspicious_activity
            WHERE network_origin = $1
              AND activity_type = $2
              AND created_at >= $3
        "#,
        )
        .bind(origin)
        .bind(ActivityType::SignupAttempt.as_str())
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| format!("Failed to count signup attempts: {}", e))?;

        Ok(row.get("attempt_count"))
    }

    async fn recent(
        &self,
        identity: Option<&str>,
        limit: i64,
    ) -> Result<Vec<SuspiciousActivityRecord>, String> {
        let rows = sqlx::query(
            r#"
            SELECT identity, activity_type, details, network_origin, created_at
            FROM trust.suspicious_activity
            WHERE ($1::VARCHAR IS NULL OR identity = $1)
            ORDER BY created_at DESC
            LIMIT $2
        "#,
        )
        .bind(identity)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| format!("Failed to load recent activity: {}", e))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let tag: String = row.get("activity_type");
            let Some(activity_type) = ActivityType::parse(&tag) else {
                warn!("Skipping activity record with unknown type: {}", tag);
                continue;
            };

            records.push(SuspiciousActivityRecord {
                identity: row.get("identity"),
                activity_type,
                details: row.get("details"),
                network_origin: row.get("network_origin"),
                timestamp: row.get("created_at"),
            });
        }

        Ok(records)
    }

    async fn counts_since(&self, since: DateTime<Utc>) -> Result<ActivityCounts, String> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE activity_type = 'signup_attempt') AS signup_attempts,
                COUNT(*) FILTER (WHERE activity_type = 'human_verification_passed') AS passed,
                COUNT(*) FILTER (WHERE activity_type = 'human_verification_failed') AS failed,
                COUNT(*) FILTER (WHERE activity_type = 'captcha_completed') AS captchas,
                COUNT(DISTINCT network_origin) AS distinct_origins
            FROM trust.suspicious_activity
            WHERE created_at >= $1
        "#,
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| format!("Failed to aggregate activity counts: {}", e))?;

        Ok(ActivityCounts {
            signup_attempts: row.get("signup_attempts"),
            verifications_passed: row.get("passed"),
            verifications_failed: row.get("failed"),
            captchas_completed: row.get("captchas"),
            distinct_origins: row.get("distinct_origins"),
        })
    }
}

pub struct BanRepository {
    pool: PgPool,
}

impl BanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<(), String> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trust.banned_identities (
                id BIGSERIAL PRIMARY KEY,
                email VARCHAR(320) NOT NULL,
                reason TEXT NOT NULL,
                evidence JSONB NOT NULL,
                network_origin VARCHAR(64) NOT NULL,
                banned_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()
            )
        "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to create banned_identities table: {}", e))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_banned_email ON trust.banned_identities(email)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to create ban email index: {}", e))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_banned_origin \
             ON trust.banned_identities(network_origin)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to create ban origin index: {}", e))?;

        info!("Ban ledger schema initialized");
        Ok(())
    }
}

#[async_trait]
impl BanStore for BanRepository {
    async fn insert(&self, record: BannedIdentity) -> Result<(), String> {
        sqlx::query(
            r#"
            INSERT INTO trust.banned_identities
                (email, reason, evidence, network_origin, banned_at)
            VALUES ($1, $2, $3, $4, $5)
        "#,
        )
        .bind(&record.email)
        .bind(&record.reason)
        .bind(&record.evidence)
        .bind(&record.network_origin)
        .bind(record.banned_at)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to insert ban record: {}", e))?;

        Ok(())
    }

    async fn matches(&self, email: &str, origin: &str) -> Result<bool, String> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM trust.banned_identities
                WHERE email = $1 OR network_origin = $2
            ) AS is_banned
        "#,
        )
        .bind(email)
        .bind(origin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| format!("Failed to check ban ledger: {}", e))?;

        Ok(row.get("is_banned"))
    }

    async fn recent(&self, limit: i64) -> Result<Vec<BannedIdentity>, String> {
        let rows = sqlx::query(
            r#"
            SELECT email, reason, evidence, network_origin, banned_at
            FROM trust.banned_identities
            ORDER BY banned_at DESC
            LIMIT $1
        "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| format!("Failed to load ban ledger: {}", e))?;

        Ok(rows
            .into_iter()
            .map(|row| BannedIdentity {
                email: row.get("email"),
                reason: row.get("reason"),
                evidence: row.get("evidence"),
                network_origin: row.get("network_origin"),
                banned_at: row.get("banned_at"),
            })
            .collect())
    }

    async fn count(&self) -> Result<i64, String> {
        let row = sqlx::query("SELECT COUNT(*) AS ban_count FROM trust.banned_identities")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| format!("Failed to count ban records: {}", e))?;

        Ok(row.get("ban_count"))
    }
}
